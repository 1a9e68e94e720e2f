use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use marchelo_core::domain::shipment::ShipmentType;

use crate::state::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub pricing: HealthCheck,
    pub storage: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let pricing = pricing_check(&state);
    let storage = storage_check(&state).await;
    let ready = pricing.status == "ready" && storage.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "marchelo-server runtime initialized".to_string(),
        },
        pricing,
        storage,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn pricing_check(state: &AppState) -> HealthCheck {
    let tiers = state.tables.tiers().count();
    let zones = state.tables.destinations().len();

    if tiers == ShipmentType::ALL.len() && zones > 0 {
        HealthCheck {
            status: "ready",
            detail: format!("{tiers} pricing tiers and {zones} destination zones loaded"),
        }
    } else {
        HealthCheck {
            status: "degraded",
            detail: format!("pricing tables incomplete: {tiers} tiers, {zones} zones"),
        }
    }
}

async fn storage_check(state: &AppState) -> HealthCheck {
    match state.shipments.list(None).await {
        Ok(shipments) => HealthCheck {
            status: "ready",
            detail: format!("shipment store reachable ({} records)", shipments.len()),
        },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("shipment store failed: {error}") }
        }
    }
}
