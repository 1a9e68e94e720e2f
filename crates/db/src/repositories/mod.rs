use async_trait::async_trait;
use thiserror::Error;

use marchelo_core::domain::quote::{QuoteId, QuoteRecord};
use marchelo_core::domain::tracking::TrackingRecord;
use marchelo_core::errors::ApplicationError;
use marchelo_core::identifiers::{BookingNumber, TrackingNumber};
use marchelo_core::intake::PendingQuote;

pub mod memory;

pub use memory::{InMemoryQuoteRepository, InMemoryShipmentRepository};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("conflicting record: {0}")]
    Conflict(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        ApplicationError::Persistence(error.to_string())
    }
}

/// Listing filters for stored quotes. Every present filter must match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuoteFilter {
    pub email: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl QuoteFilter {
    pub fn matches(&self, quote: &QuoteRecord) -> bool {
        let email = non_blank(self.email.as_deref());
        let status = non_blank(self.status.as_deref());
        let search = non_blank(self.search.as_deref());

        email.map_or(true, |email| quote.belongs_to(email))
            && status.map_or(true, |status| quote.status.matches_filter(status))
            && search.map_or(true, |term| quote.matches_search(term))
    }
}

/// In-place edit applied to a stored shipment under the repository's write lock.
pub type ShipmentEdit = Box<dyn FnOnce(&mut TrackingRecord) + Send>;

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Stores a new quote under the next sequential id.
    async fn insert(&self, quote: PendingQuote) -> Result<QuoteRecord, RepositoryError>;
    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<QuoteRecord>, RepositoryError>;
    async fn find_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Result<Option<QuoteRecord>, RepositoryError>;
    async fn save(&self, quote: QuoteRecord) -> Result<(), RepositoryError>;
    /// Matching quotes in id order.
    async fn list(&self, filter: &QuoteFilter) -> Result<Vec<QuoteRecord>, RepositoryError>;
}

#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    async fn find_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Result<Option<TrackingRecord>, RepositoryError>;
    async fn find_by_booking_number(
        &self,
        booking_number: &BookingNumber,
    ) -> Result<Option<TrackingRecord>, RepositoryError>;
    async fn save(&self, shipment: TrackingRecord) -> Result<(), RepositoryError>;
    /// Applies `edit` atomically and returns the updated record, `None` if unknown.
    async fn update(
        &self,
        tracking_number: &TrackingNumber,
        edit: ShipmentEdit,
    ) -> Result<Option<TrackingRecord>, RepositoryError>;
    /// Shipments whose tracking number or destination contains `search`, oldest first.
    async fn list(&self, search: Option<&str>) -> Result<Vec<TrackingRecord>, RepositoryError>;
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
