use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shipment::ShipmentType;
use crate::identifiers::{BookingNumber, TrackingNumber};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Expired => "Expired",
        }
    }

    pub fn matches_filter(&self, filter: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(filter.trim())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Metadata of a file attached to a quote request. File contents are never retained.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentMeta {
    pub name: String,
    pub size: u64,
    pub content_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    pub id: QuoteId,
    pub tracking_number: TrackingNumber,
    pub booking_number: BookingNumber,
    pub shipment_type: ShipmentType,
    pub origin: String,
    pub destination: String,
    pub weight: Decimal,
    pub dimensions: Option<String>,
    pub description: Option<String>,
    pub customer: CustomerContact,
    pub files: Vec<AttachmentMeta>,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub estimated_delivery: NaiveDate,
    pub estimated_cost: Decimal,
}

impl QuoteRecord {
    pub fn belongs_to(&self, email: &str) -> bool {
        self.customer.email.eq_ignore_ascii_case(email.trim())
    }

    /// Free-text portal search over destination and shipment type (slug or label).
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.destination.to_lowercase().contains(&needle)
            || self.shipment_type.as_str().contains(&needle)
            || self.shipment_type.display_label().to_lowercase().contains(&needle)
    }
}
