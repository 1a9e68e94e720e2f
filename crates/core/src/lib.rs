pub mod config;
pub mod domain;
pub mod errors;
pub mod identifiers;
pub mod intake;
pub mod pricing;
pub mod timeline;

pub use domain::quote::{AttachmentMeta, CustomerContact, QuoteId, QuoteRecord, QuoteStatus};
pub use domain::shipment::ShipmentType;
pub use domain::tracking::{
    EventIcon, ShipmentDetails, ShipmentStatus, TrackingEvent, TrackingRecord,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use identifiers::{BookingNumber, ReferenceIssuer, TrackingNumber};
pub use intake::{PendingQuote, QuoteReceipt, QuoteSubmission};
pub use pricing::tables::{PricingTables, PricingTier, TableError};
pub use pricing::{
    DeterministicPricingEngine, PricingEngine, QuoteDraft, QuoteEstimate, QuoteOutcome,
    QuoteRequest, UnknownTypePolicy,
};
pub use timeline::{EventUpdate, TimelinePolicy};
