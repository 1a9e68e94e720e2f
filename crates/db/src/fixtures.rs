//! Deterministic demo data seeded at startup: the client portal's shipments and quotes.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use marchelo_core::domain::quote::{CustomerContact, QuoteId, QuoteRecord, QuoteStatus};
use marchelo_core::domain::shipment::ShipmentType;
use marchelo_core::domain::tracking::{
    EventIcon, ShipmentDetails, ShipmentStatus, TrackingEvent, TrackingRecord,
};
use marchelo_core::identifiers::{BookingNumber, TrackingNumber};

use crate::repositories::{QuoteRepository, RepositoryError, ShipmentRepository};

const CARRIER: &str = "Marchelo Logistics";
const DEMO_CUSTOMER_NAME: &str = "Demo Customer";
const DEMO_CUSTOMER_EMAIL: &str = "demo@marchelo.ie";
const DEMO_CUSTOMER_PHONE: &str = "+353 1 555 0100";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub shipments: usize,
    pub quotes: usize,
}

pub async fn seed_demo_data(
    quotes: &dyn QuoteRepository,
    shipments: &dyn ShipmentRepository,
) -> Result<SeedResult, RepositoryError> {
    let demo_shipments = demo_shipments()?;
    let demo_quotes = demo_quotes()?;
    let result = SeedResult { shipments: demo_shipments.len(), quotes: demo_quotes.len() };

    for shipment in demo_shipments {
        shipments.save(shipment).await?;
    }
    for quote in demo_quotes {
        quotes.save(quote).await?;
    }

    Ok(result)
}

pub fn demo_shipments() -> Result<Vec<TrackingRecord>, RepositoryError> {
    Ok(vec![
        TrackingRecord {
            tracking_number: TrackingNumber("ML123456789".to_string()),
            booking_number: BookingNumber("BK987654321".to_string()),
            status: ShipmentStatus::InTransit,
            origin: "Dublin, Ireland".to_string(),
            destination: "New York, USA".to_string(),
            estimated_delivery: date("2024-01-15")?,
            current_location: "Atlantic Ocean".to_string(),
            events: vec![
                event(
                    1,
                    ShipmentStatus::Delivered,
                    "Dublin, Ireland",
                    "2024-01-08T10:00:00Z",
                    "Package picked up from sender",
                    EventIcon::Package,
                )?,
                event(
                    2,
                    ShipmentStatus::InTransit,
                    "Dublin Port, Ireland",
                    "2024-01-08T14:30:00Z",
                    "Package arrived at origin facility",
                    EventIcon::Truck,
                )?,
                event(
                    3,
                    ShipmentStatus::InTransit,
                    "Dublin Port, Ireland",
                    "2024-01-09T08:00:00Z",
                    "Package loaded onto vessel",
                    EventIcon::Ship,
                )?,
                event(
                    4,
                    ShipmentStatus::InTransit,
                    "Atlantic Ocean",
                    "2024-01-10T12:00:00Z",
                    "Package in transit via sea freight",
                    EventIcon::Ship,
                )?,
            ],
            details: details("25.5 kg", "60×40×30 cm", "Sea Freight"),
            cost: Some(Decimal::new(1250, 0)),
            created_at: date("2024-01-08")?,
        },
        TrackingRecord {
            tracking_number: TrackingNumber("ML987654321".to_string()),
            booking_number: BookingNumber("BK123456789".to_string()),
            status: ShipmentStatus::Delivered,
            origin: "Cork, Ireland".to_string(),
            destination: "London, UK".to_string(),
            estimated_delivery: date("2024-01-12")?,
            current_location: "London, UK".to_string(),
            events: vec![
                event(
                    1,
                    ShipmentStatus::Delivered,
                    "Cork, Ireland",
                    "2024-01-10T09:00:00Z",
                    "Package picked up from sender",
                    EventIcon::Package,
                )?,
                event(
                    2,
                    ShipmentStatus::Delivered,
                    "Cork Port, Ireland",
                    "2024-01-10T11:30:00Z",
                    "Package arrived at origin facility",
                    EventIcon::Truck,
                )?,
                event(
                    3,
                    ShipmentStatus::Delivered,
                    "Cork Port, Ireland",
                    "2024-01-10T16:00:00Z",
                    "Package loaded onto vessel",
                    EventIcon::Ship,
                )?,
                event(
                    4,
                    ShipmentStatus::Delivered,
                    "Liverpool, UK",
                    "2024-01-11T08:00:00Z",
                    "Package arrived at destination port",
                    EventIcon::Ship,
                )?,
                event(
                    5,
                    ShipmentStatus::Delivered,
                    "London, UK",
                    "2024-01-12T14:30:00Z",
                    "Package delivered to recipient",
                    EventIcon::CheckCircle,
                )?,
            ],
            details: details("12.3 kg", "45×30×20 cm", "Express Shipping"),
            cost: Some(Decimal::new(85, 0)),
            created_at: date("2024-01-10")?,
        },
        TrackingRecord {
            tracking_number: TrackingNumber("ML456789123".to_string()),
            booking_number: BookingNumber("BK456789123".to_string()),
            status: ShipmentStatus::Processing,
            origin: "Galway, Ireland".to_string(),
            destination: "Sydney, Australia".to_string(),
            estimated_delivery: date("2024-01-20")?,
            current_location: "Galway, Ireland".to_string(),
            events: vec![event(
                1,
                ShipmentStatus::Processing,
                "Galway, Ireland",
                "2024-01-12T09:00:00Z",
                "Booking confirmed, awaiting pickup",
                EventIcon::Package,
            )?],
            details: details("8 kg", "40×30×25 cm", "Air Express"),
            cost: Some(Decimal::new(450, 0)),
            created_at: date("2024-01-12")?,
        },
    ])
}

pub fn demo_quotes() -> Result<Vec<QuoteRecord>, RepositoryError> {
    Ok(vec![
        quote(
            1,
            ShipmentType::Car,
            "Germany",
            Decimal::new(1500, 0),
            1200,
            QuoteStatus::Pending,
            "2024-01-13T09:00:00Z",
            "2024-01-21",
        )?,
        quote(
            2,
            ShipmentType::Parcel,
            "France",
            Decimal::new(5, 0),
            35,
            QuoteStatus::Approved,
            "2024-01-12T09:00:00Z",
            "2024-01-16",
        )?,
        quote(
            3,
            ShipmentType::Container,
            "China",
            Decimal::new(25_000, 0),
            3500,
            QuoteStatus::Expired,
            "2024-01-10T09:00:00Z",
            "2024-02-21",
        )?,
    ])
}

#[allow(clippy::too_many_arguments)]
fn quote(
    id: u64,
    shipment_type: ShipmentType,
    destination: &str,
    weight: Decimal,
    estimated_cost: i64,
    status: QuoteStatus,
    created_at: &str,
    estimated_delivery: &str,
) -> Result<QuoteRecord, RepositoryError> {
    Ok(QuoteRecord {
        id: QuoteId(id),
        tracking_number: TrackingNumber(format!("ML{:09}", 240_000_000 + id)),
        booking_number: BookingNumber(format!("BK{:09}", 240_000_000 + id)),
        shipment_type,
        origin: "Ireland".to_string(),
        destination: destination.to_string(),
        weight,
        dimensions: None,
        description: None,
        customer: CustomerContact {
            name: DEMO_CUSTOMER_NAME.to_string(),
            email: DEMO_CUSTOMER_EMAIL.to_string(),
            phone: DEMO_CUSTOMER_PHONE.to_string(),
        },
        files: Vec::new(),
        status,
        created_at: timestamp(created_at)?,
        estimated_delivery: date(estimated_delivery)?,
        estimated_cost: Decimal::new(estimated_cost, 0),
    })
}

fn event(
    position: usize,
    status: ShipmentStatus,
    location: &str,
    timestamp_raw: &str,
    description: &str,
    icon: EventIcon,
) -> Result<TrackingEvent, RepositoryError> {
    Ok(TrackingEvent {
        id: position.to_string(),
        status,
        location: location.to_string(),
        timestamp: timestamp(timestamp_raw)?,
        description: description.to_string(),
        icon,
    })
}

fn details(weight: &str, dimensions: &str, service: &str) -> ShipmentDetails {
    ShipmentDetails {
        weight: weight.to_string(),
        dimensions: dimensions.to_string(),
        service: service.to_string(),
        carrier: CARRIER.to_string(),
    }
}

fn date(raw: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|error| RepositoryError::Decode(format!("fixture date `{raw}`: {error}")))
}

fn timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("fixture timestamp `{raw}`: {error}")))
}

#[cfg(test)]
mod tests {
    use marchelo_core::domain::quote::QuoteId;
    use marchelo_core::domain::tracking::ShipmentStatus;
    use marchelo_core::identifiers::{BookingNumber, TrackingNumber};

    use crate::repositories::{
        InMemoryQuoteRepository, InMemoryShipmentRepository, QuoteFilter, QuoteRepository,
        ShipmentRepository,
    };

    use super::{demo_quotes, demo_shipments, seed_demo_data, SeedResult};

    #[test]
    fn fixture_event_ids_follow_timeline_positions() {
        let shipments = demo_shipments().expect("fixtures decode");
        for shipment in &shipments {
            for (index, event) in shipment.events.iter().enumerate() {
                assert_eq!(event.id, (index + 1).to_string());
            }
        }
        assert_eq!(shipments[0].status, ShipmentStatus::InTransit);
    }

    #[test]
    fn fixture_quotes_have_unique_references() {
        let quotes = demo_quotes().expect("fixtures decode");
        assert_eq!(quotes[0].tracking_number.0, "ML240000001");
        assert_ne!(quotes[0].tracking_number, quotes[1].tracking_number);
    }

    #[tokio::test]
    async fn seeding_populates_both_repositories() {
        let quotes = InMemoryQuoteRepository::default();
        let shipments = InMemoryShipmentRepository::default();

        let result = seed_demo_data(&quotes, &shipments).await.expect("seed");
        assert_eq!(result, SeedResult { shipments: 3, quotes: 3 });

        let delivered = shipments
            .find_by_booking_number(&BookingNumber("BK123456789".to_string()))
            .await
            .expect("lookup")
            .expect("seeded shipment");
        assert_eq!(delivered.tracking_number, TrackingNumber("ML987654321".to_string()));
        assert_eq!(delivered.events.len(), 5);

        assert_eq!(quotes.list(&QuoteFilter::default()).await.expect("list").len(), 3);
        let expired = quotes.find_by_id(&QuoteId(3)).await.expect("lookup").expect("seeded quote");
        assert_eq!(expired.destination, "China");
    }
}
