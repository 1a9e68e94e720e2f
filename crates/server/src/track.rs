//! Shipment tracking routes.
//!
//! - `GET /api/track?trackingNumber=|bookingNumber=`: look up a shipment timeline
//! - `POST /api/track`: append a status update

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use marchelo_core::domain::tracking::{ShipmentStatus, TrackingEvent, TrackingRecord};
use marchelo_core::errors::ApplicationError;
use marchelo_core::identifiers::{BookingNumber, TrackingNumber};
use marchelo_core::timeline::{append_event, EventUpdate};

use crate::error::{bad_request, correlation_id, reject, ApiFailure, ApiJson};
use crate::state::AppState;

const MISSING_KEY: &str = "Tracking number or booking number is required";
const NOT_FOUND: &str = "Shipment not found";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackQuery {
    pub tracking_number: Option<String>,
    pub booking_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackUpdateRequest {
    pub tracking_number: Option<String>,
    pub booking_number: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub success: bool,
    pub data: TrackingRecord,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TrackUpdateResponse {
    pub success: bool,
    pub message: String,
    pub data: TrackingEvent,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/track", get(track_shipment).post(add_tracking_event))
        .with_state(state)
}

pub async fn track_shipment(
    State(state): State<AppState>,
    Query(query): Query<TrackQuery>,
) -> Result<Json<TrackResponse>, ApiFailure> {
    let correlation_id = correlation_id();
    let shipment = resolve(
        &state,
        query.tracking_number.as_deref(),
        query.booking_number.as_deref(),
        &correlation_id,
    )
    .await?;

    let now = Utc::now();
    let policy = state.timeline;
    let events_before = shipment.events.len();
    let refreshed = state
        .shipments
        .update(
            &shipment.tracking_number,
            Box::new(move |record: &mut TrackingRecord| {
                policy.apply_live_update(record, now);
            }),
        )
        .await
        .map_err(|error| reject(error.into(), &correlation_id))?
        .unwrap_or(shipment);

    if refreshed.events.len() > events_before {
        info!(
            event_name = "tracking.live_update.appended",
            correlation_id = %correlation_id,
            tracking_number = %refreshed.tracking_number,
            "live transit event appended"
        );
    }

    info!(
        event_name = "tracking.lookup.found",
        correlation_id = %correlation_id,
        tracking_number = %refreshed.tracking_number,
        status = %refreshed.status,
        "shipment located"
    );

    Ok(Json(TrackResponse { success: true, data: refreshed, last_updated: now }))
}

pub async fn add_tracking_event(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TrackUpdateRequest>,
) -> Result<Json<TrackUpdateResponse>, ApiFailure> {
    let correlation_id = correlation_id();

    let status = match non_blank(body.status.as_deref()) {
        Some(raw) => Some(
            raw.parse::<ShipmentStatus>()
                .map_err(|error| reject(error.into(), &correlation_id))?,
        ),
        None => None,
    };
    let update = EventUpdate {
        status,
        location: non_blank(body.location.as_deref()).map(str::to_string),
        description: non_blank(body.description.as_deref()).map(str::to_string),
    };

    let shipment = resolve(
        &state,
        body.tracking_number.as_deref(),
        body.booking_number.as_deref(),
        &correlation_id,
    )
    .await?;

    let now = Utc::now();
    let updated = state
        .shipments
        .update(
            &shipment.tracking_number,
            Box::new(move |record: &mut TrackingRecord| {
                append_event(record, update, now);
            }),
        )
        .await
        .map_err(|error| reject(error.into(), &correlation_id))?
        .ok_or_else(|| {
            reject(ApplicationError::NotFound(NOT_FOUND.to_string()), &correlation_id)
        })?;
    let event = updated.last_event().cloned().ok_or_else(|| {
        reject(
            ApplicationError::Persistence("appended event missing from timeline".to_string()),
            &correlation_id,
        )
    })?;

    info!(
        event_name = "tracking.event.appended",
        correlation_id = %correlation_id,
        tracking_number = %updated.tracking_number,
        status = %event.status,
        location = %event.location,
        "tracking event added"
    );

    Ok(Json(TrackUpdateResponse {
        success: true,
        message: "Tracking event added successfully".to_string(),
        data: event,
    }))
}

/// Tracking number wins when both keys are supplied.
async fn resolve(
    state: &AppState,
    tracking_number: Option<&str>,
    booking_number: Option<&str>,
    correlation_id: &str,
) -> Result<TrackingRecord, ApiFailure> {
    let found = match (non_blank(tracking_number), non_blank(booking_number)) {
        (Some(tracking), _) => {
            state.shipments.find_by_tracking_number(&TrackingNumber::normalized(tracking)).await
        }
        (None, Some(booking)) => {
            state.shipments.find_by_booking_number(&BookingNumber::normalized(booking)).await
        }
        (None, None) => return Err(bad_request(MISSING_KEY)),
    }
    .map_err(|error| reject(error.into(), correlation_id))?;

    found.ok_or_else(|| {
        warn!(
            event_name = "tracking.lookup.not_found",
            correlation_id = %correlation_id,
            tracking_number = tracking_number.unwrap_or_default(),
            booking_number = booking_number.unwrap_or_default(),
            "shipment lookup missed"
        );
        reject(ApplicationError::NotFound(NOT_FOUND.to_string()), correlation_id)
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        extract::{Query, State},
        http::{Request, StatusCode},
        Json,
    };
    use tower::ServiceExt;

    use marchelo_core::config::AppConfig;
    use marchelo_core::domain::tracking::{EventIcon, ShipmentStatus};
    use marchelo_db::seed_demo_data;

    use crate::state::AppState;

    use super::*;

    async fn seeded_state() -> AppState {
        let config = AppConfig::default();
        let state = AppState::new(&config, config.pricing_tables().expect("canonical tables"));
        seed_demo_data(state.quotes.as_ref(), state.shipments.as_ref())
            .await
            .expect("seed demo data");
        state
    }

    #[tokio::test]
    async fn lookup_by_tracking_number_appends_live_event_once() {
        let state = seeded_state().await;

        let Json(first) = track_shipment(
            State(state.clone()),
            Query(TrackQuery {
                tracking_number: Some("ml123456789".to_string()),
                booking_number: None,
            }),
        )
        .await
        .expect("lookup should succeed");

        // The fixture's newest event is from 2024, so it is always stale.
        assert_eq!(first.data.events.len(), 5);
        let live = first.data.last_event().expect("live event");
        assert_eq!(live.description, "Package continues in transit");
        assert_eq!(live.icon, EventIcon::Truck);

        let Json(second) = track_shipment(
            State(state),
            Query(TrackQuery {
                tracking_number: Some("ML123456789".to_string()),
                booking_number: None,
            }),
        )
        .await
        .expect("lookup should succeed");
        assert_eq!(second.data.events.len(), 5, "fresh live event suppresses another");
    }

    #[tokio::test]
    async fn lookup_by_booking_number_leaves_delivered_timeline_alone() {
        let state = seeded_state().await;

        let Json(response) = track_shipment(
            State(state),
            Query(TrackQuery {
                tracking_number: None,
                booking_number: Some("bk123456789".to_string()),
            }),
        )
        .await
        .expect("lookup should succeed");

        assert_eq!(response.data.tracking_number.0, "ML987654321");
        assert_eq!(response.data.events.len(), 5);
    }

    #[tokio::test]
    async fn tracking_number_wins_over_booking_number() {
        let state = seeded_state().await;

        let Json(response) = track_shipment(
            State(state),
            Query(TrackQuery {
                tracking_number: Some("ML456789123".to_string()),
                booking_number: Some("BK123456789".to_string()),
            }),
        )
        .await
        .expect("lookup should succeed");

        assert_eq!(response.data.tracking_number.0, "ML456789123");
    }

    #[tokio::test]
    async fn lookup_without_keys_is_bad_request() {
        let (status, body) = track_shipment(State(seeded_state().await), Query(TrackQuery::default()))
            .await
            .expect_err("missing keys should be rejected");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0.error, "Tracking number or booking number is required");
    }

    #[tokio::test]
    async fn unknown_shipment_is_not_found() {
        let (status, body) = track_shipment(
            State(seeded_state().await),
            Query(TrackQuery {
                tracking_number: Some("ML000000000".to_string()),
                booking_number: None,
            }),
        )
        .await
        .expect_err("unknown shipment should be rejected");

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0.error, "Shipment not found");
    }

    #[tokio::test]
    async fn posted_event_updates_status_and_location() {
        let state = seeded_state().await;

        let Json(response) = add_tracking_event(
            State(state.clone()),
            ApiJson(TrackUpdateRequest {
                booking_number: Some("BK456789123".to_string()),
                status: Some("in transit".to_string()),
                location: Some("Shannon Airport, Ireland".to_string()),
                ..TrackUpdateRequest::default()
            }),
        )
        .await
        .expect("append should succeed");

        assert_eq!(response.data.id, "2");
        assert_eq!(response.data.status, ShipmentStatus::InTransit);
        assert_eq!(response.data.description, "Status update");

        let stored = state
            .shipments
            .find_by_tracking_number(&TrackingNumber("ML456789123".to_string()))
            .await
            .expect("lookup")
            .expect("shipment");
        assert_eq!(stored.status, ShipmentStatus::InTransit);
        assert_eq!(stored.current_location, "Shannon Airport, Ireland");
    }

    #[tokio::test]
    async fn posted_event_with_unknown_status_is_rejected() {
        let (status, _) = add_tracking_event(
            State(seeded_state().await),
            ApiJson(TrackUpdateRequest {
                tracking_number: Some("ML123456789".to_string()),
                status: Some("teleported".to_string()),
                ..TrackUpdateRequest::default()
            }),
        )
        .await
        .expect_err("unknown status should be rejected");

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn router_serves_tracking_lookup() {
        let request = Request::builder()
            .uri("/api/track?bookingNumber=BK987654321")
            .body(Body::empty())
            .expect("request");

        let response = router(seeded_state().await).oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["trackingNumber"], "ML123456789");
        assert_eq!(json["data"]["status"], "In Transit");
        assert!(json.get("lastUpdated").is_some());
    }

    #[tokio::test]
    async fn router_rejects_malformed_update_body_as_json() {
        for body in ["{not json", r#"{"trackingNumber": 5}"#] {
            let request = Request::builder()
                .method("POST")
                .uri("/api/track")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .expect("request");

            let response =
                router(seeded_state().await).oneshot(request).await.expect("response");
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");

            let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
            let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
            assert_eq!(json["error"], "Invalid request body");
        }
    }
}
