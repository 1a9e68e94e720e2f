//! Client portal listing routes.
//!
//! - `GET /api/portal/shipments?search=`: shipments by tracking number or destination
//! - `GET /api/portal/quotes?search=`: quotes by destination or shipment type

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use marchelo_core::domain::quote::{QuoteId, QuoteRecord, QuoteStatus};
use marchelo_core::domain::tracking::{ShipmentStatus, TrackingRecord};
use marchelo_core::identifiers::{BookingNumber, TrackingNumber};
use marchelo_db::QuoteFilter;

use crate::error::{correlation_id, reject, ApiFailure};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// Row in the portal's shipment table.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalShipment {
    pub tracking_number: TrackingNumber,
    pub booking_number: BookingNumber,
    pub status: ShipmentStatus,
    pub origin: String,
    pub destination: String,
    pub estimated_delivery: NaiveDate,
    pub service: String,
    pub cost: Option<Decimal>,
    pub created_at: NaiveDate,
}

impl From<TrackingRecord> for PortalShipment {
    fn from(record: TrackingRecord) -> Self {
        Self {
            tracking_number: record.tracking_number,
            booking_number: record.booking_number,
            status: record.status,
            origin: record.origin,
            destination: record.destination,
            estimated_delivery: record.estimated_delivery,
            service: record.details.service,
            cost: record.cost,
            created_at: record.created_at,
        }
    }
}

/// Row in the portal's quote table. The shipment type is shown by its label.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalQuote {
    pub id: QuoteId,
    pub shipment_type: String,
    pub destination: String,
    pub weight: String,
    pub estimated_cost: Decimal,
    pub status: QuoteStatus,
    pub created_at: NaiveDate,
}

impl From<QuoteRecord> for PortalQuote {
    fn from(record: QuoteRecord) -> Self {
        Self {
            id: record.id,
            shipment_type: record.shipment_type.display_label().to_string(),
            destination: record.destination,
            weight: format!("{} kg", record.weight.normalize()),
            estimated_cost: record.estimated_cost,
            status: record.status,
            created_at: record.created_at.date_naive(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PortalListing<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub count: usize,
}

impl<T> PortalListing<T> {
    fn new(data: Vec<T>) -> Self {
        Self { success: true, count: data.len(), data }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/portal/shipments", get(list_shipments))
        .route("/api/portal/quotes", get(list_quotes))
        .with_state(state)
}

pub async fn list_shipments(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PortalListing<PortalShipment>>, ApiFailure> {
    let correlation_id = correlation_id();
    let shipments = state
        .shipments
        .list(query.search.as_deref())
        .await
        .map_err(|error| reject(error.into(), &correlation_id))?;

    info!(
        event_name = "portal.shipments.listed",
        correlation_id = %correlation_id,
        count = shipments.len(),
        "portal shipments listed"
    );

    Ok(Json(PortalListing::new(shipments.into_iter().map(PortalShipment::from).collect())))
}

pub async fn list_quotes(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PortalListing<PortalQuote>>, ApiFailure> {
    let correlation_id = correlation_id();
    let filter = QuoteFilter { search: query.search, ..QuoteFilter::default() };
    let quotes = state
        .quotes
        .list(&filter)
        .await
        .map_err(|error| reject(error.into(), &correlation_id))?;

    info!(
        event_name = "portal.quotes.listed",
        correlation_id = %correlation_id,
        count = quotes.len(),
        "portal quotes listed"
    );

    Ok(Json(PortalListing::new(quotes.into_iter().map(PortalQuote::from).collect())))
}
