use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::identifiers::{BookingNumber, TrackingNumber};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    Processing,
    #[serde(rename = "In Transit")]
    InTransit,
    Delivered,
    Delayed,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::InTransit => "In Transit",
            Self::Delivered => "Delivered",
            Self::Delayed => "Delayed",
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "processing" => Ok(Self::Processing),
            "in transit" => Ok(Self::InTransit),
            "delivered" => Ok(Self::Delivered),
            "delayed" => Ok(Self::Delayed),
            _ => Err(DomainError::UnknownShipmentStatus(value.trim().to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventIcon {
    Package,
    Truck,
    Ship,
    CheckCircle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub id: String,
    pub status: ShipmentStatus,
    pub location: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub icon: EventIcon,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentDetails {
    pub weight: String,
    pub dimensions: String,
    pub service: String,
    pub carrier: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRecord {
    pub tracking_number: TrackingNumber,
    pub booking_number: BookingNumber,
    pub status: ShipmentStatus,
    pub origin: String,
    pub destination: String,
    pub estimated_delivery: NaiveDate,
    pub current_location: String,
    pub events: Vec<TrackingEvent>,
    pub details: ShipmentDetails,
    pub cost: Option<Decimal>,
    pub created_at: NaiveDate,
}

impl TrackingRecord {
    pub fn last_event(&self) -> Option<&TrackingEvent> {
        self.events.last()
    }

    /// Event ids are their one-based position in the timeline.
    pub fn next_event_id(&self) -> String {
        (self.events.len() + 1).to_string()
    }

    /// Portal search over tracking number and destination.
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.tracking_number.0.to_lowercase().contains(&needle)
            || self.destination.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::ShipmentStatus;

    #[test]
    fn status_parses_display_and_slug_forms() {
        assert_eq!("In Transit".parse::<ShipmentStatus>().ok(), Some(ShipmentStatus::InTransit));
        assert_eq!("in_transit".parse::<ShipmentStatus>().ok(), Some(ShipmentStatus::InTransit));
        assert_eq!("DELIVERED".parse::<ShipmentStatus>().ok(), Some(ShipmentStatus::Delivered));
        assert!("lost at sea".parse::<ShipmentStatus>().is_err());
    }

    #[test]
    fn status_serializes_with_display_name() {
        let json = serde_json::to_string(&ShipmentStatus::InTransit).expect("serialize");
        assert_eq!(json, "\"In Transit\"");
    }
}
