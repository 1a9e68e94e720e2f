//! Quote submission: validates the customer's form, prices it and stamps references.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::quote::{
    AttachmentMeta, CustomerContact, QuoteId, QuoteRecord, QuoteStatus,
};
use crate::domain::shipment::ShipmentType;
use crate::errors::DomainError;
use crate::identifiers::{BookingNumber, ReferenceIssuer, TrackingNumber};
use crate::pricing::{parse_weight, weight_field, PricingEngine, QuoteRequest};

pub const DEFAULT_ORIGIN: &str = "Ireland";

/// Quote request form as posted by a customer. Attachments carry metadata only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteSubmission {
    pub shipment_type: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    #[serde(deserialize_with = "weight_field")]
    pub weight: Option<String>,
    pub dimensions: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub files: Vec<AttachmentMeta>,
}

/// What the customer gets back after a successful submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteReceipt {
    pub quote_id: QuoteId,
    pub tracking_number: TrackingNumber,
    pub booking_number: BookingNumber,
    pub estimated_cost: Decimal,
    pub estimated_delivery: NaiveDate,
}

impl From<&QuoteRecord> for QuoteReceipt {
    fn from(record: &QuoteRecord) -> Self {
        Self {
            quote_id: record.id,
            tracking_number: record.tracking_number.clone(),
            booking_number: record.booking_number.clone(),
            estimated_cost: record.estimated_cost,
            estimated_delivery: record.estimated_delivery,
        }
    }
}

/// A validated, priced submission that has not been given a storage id yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingQuote {
    record: QuoteRecord,
}

impl PendingQuote {
    pub fn tracking_number(&self) -> &TrackingNumber {
        &self.record.tracking_number
    }

    pub fn into_record(self, id: QuoteId) -> QuoteRecord {
        QuoteRecord { id, ..self.record }
    }
}

/// Validates and prices a submission. Storage assigns the id once the quote is
/// accepted, so rejected forms never consume one.
pub fn prepare_quote(
    submission: QuoteSubmission,
    engine: &dyn PricingEngine,
    issuer: &ReferenceIssuer,
    now: DateTime<Utc>,
) -> Result<PendingQuote, DomainError> {
    let missing = missing_fields(&submission);
    if !missing.is_empty() {
        return Err(DomainError::MissingRequiredFields(missing));
    }

    let QuoteSubmission {
        shipment_type,
        origin,
        destination,
        weight,
        dimensions,
        description,
        name,
        email,
        phone,
        files,
    } = submission;

    let shipment_type: ShipmentType = trimmed(shipment_type).parse()?;
    let destination = trimmed(destination);
    let weight = parse_weight(&trimmed(weight))?;
    let dimensions = dimensions.map(|value| value.trim().to_string()).filter(|v| !v.is_empty());

    let estimate = engine.quote(
        &QuoteRequest {
            shipment_type,
            destination: destination.clone(),
            weight,
            dimensions: dimensions.clone(),
        },
        now.date_naive(),
    )?;

    let (tracking_number, booking_number) = issuer.issue(now);

    let record = QuoteRecord {
        // Replaced in `PendingQuote::into_record`.
        id: QuoteId(0),
        tracking_number,
        booking_number,
        shipment_type,
        origin: origin
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
        destination,
        weight,
        dimensions,
        description: description.filter(|value| !value.trim().is_empty()),
        customer: CustomerContact {
            name: trimmed(name),
            email: trimmed(email),
            phone: trimmed(phone),
        },
        files: files.into_iter().filter(|file| file.size > 0).collect(),
        status: QuoteStatus::Pending,
        created_at: now,
        estimated_delivery: estimate.estimated_delivery,
        estimated_cost: estimate.estimated_cost,
    };
    Ok(PendingQuote { record })
}

fn missing_fields(submission: &QuoteSubmission) -> Vec<String> {
    let required = [
        ("shipmentType", &submission.shipment_type),
        ("destination", &submission.destination),
        ("weight", &submission.weight),
        ("name", &submission.name),
        ("email", &submission.email),
        ("phone", &submission.phone),
    ];

    required
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(field, _)| field.to_string())
        .collect()
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
