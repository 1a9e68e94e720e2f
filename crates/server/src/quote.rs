//! Quote routes.
//!
//! - `POST /api/quote/estimate`: live estimate from a partial form
//! - `POST /api/quote`: submit a quote request
//! - `GET /api/quote`: list stored quotes (`?email=&status=`)

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use marchelo_core::domain::quote::QuoteRecord;
use marchelo_core::errors::ApplicationError;
use marchelo_core::intake::{prepare_quote, QuoteReceipt, QuoteSubmission};
use marchelo_core::pricing::{InsufficientReason, QuoteDraft, QuoteEstimate, QuoteOutcome};
use marchelo_db::QuoteFilter;

use crate::error::{correlation_id, reject, ApiFailure, ApiJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EstimateResponse {
    Insufficient { detail: InsufficientReason },
    Quoted { quote: QuoteEstimate },
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub data: QuoteReceipt,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub email: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub data: Vec<QuoteRecord>,
    pub count: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/quote", post(submit_quote).get(list_quotes))
        .route("/api/quote/estimate", post(estimate_quote))
        .with_state(state)
}

pub async fn estimate_quote(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<QuoteDraft>,
) -> Result<Json<EstimateResponse>, ApiFailure> {
    let today = Utc::now().date_naive();
    let outcome = state
        .engine
        .estimate(&draft, today)
        .map_err(|error| reject(ApplicationError::from(error), &correlation_id()))?;

    Ok(Json(match outcome {
        QuoteOutcome::Quoted(quote) => EstimateResponse::Quoted { quote },
        QuoteOutcome::Insufficient(detail) => EstimateResponse::Insufficient { detail },
    }))
}

pub async fn submit_quote(
    State(state): State<AppState>,
    ApiJson(submission): ApiJson<QuoteSubmission>,
) -> Result<Json<SubmitResponse>, ApiFailure> {
    let correlation_id = correlation_id();

    let pending = prepare_quote(submission, state.engine.as_ref(), &state.issuer, Utc::now())
        .map_err(|error| reject(error.into(), &correlation_id))?;
    let record = state
        .quotes
        .insert(pending)
        .await
        .map_err(|error| reject(error.into(), &correlation_id))?;
    let receipt = QuoteReceipt::from(&record);

    info!(
        event_name = "quote.submitted",
        correlation_id = %correlation_id,
        quote_id = receipt.quote_id.0,
        tracking_number = %receipt.tracking_number,
        estimated_cost = %receipt.estimated_cost,
        "quote request submitted"
    );

    Ok(Json(SubmitResponse {
        success: true,
        message: "Quote request submitted successfully".to_string(),
        data: receipt,
    }))
}

pub async fn list_quotes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiFailure> {
    let filter = QuoteFilter { email: query.email, status: query.status, search: None };
    let data = state
        .quotes
        .list(&filter)
        .await
        .map_err(|error| reject(error.into(), &correlation_id()))?;

    Ok(Json(ListResponse { success: true, count: data.len(), data }))
}
