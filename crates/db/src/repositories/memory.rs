use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use marchelo_core::domain::quote::{QuoteId, QuoteRecord};
use marchelo_core::domain::tracking::TrackingRecord;
use marchelo_core::identifiers::{BookingNumber, TrackingNumber};
use marchelo_core::intake::PendingQuote;

use super::{QuoteFilter, QuoteRepository, RepositoryError, ShipmentEdit, ShipmentRepository};

pub struct InMemoryQuoteRepository {
    quotes: RwLock<HashMap<QuoteId, QuoteRecord>>,
    next_id: AtomicU64,
}

impl Default for InMemoryQuoteRepository {
    fn default() -> Self {
        Self { quotes: RwLock::new(HashMap::new()), next_id: AtomicU64::new(1) }
    }
}

#[async_trait::async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn insert(&self, quote: PendingQuote) -> Result<QuoteRecord, RepositoryError> {
        let mut quotes = self.quotes.write().await;
        if quotes.values().any(|stored| &stored.tracking_number == quote.tracking_number()) {
            return Err(RepositoryError::Conflict(format!(
                "tracking number {} already belongs to another quote",
                quote.tracking_number()
            )));
        }

        let record = quote.into_record(QuoteId(self.next_id.fetch_add(1, Ordering::Relaxed)));
        quotes.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<QuoteRecord>, RepositoryError> {
        let quotes = self.quotes.read().await;
        Ok(quotes.get(id).cloned())
    }

    async fn find_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Result<Option<QuoteRecord>, RepositoryError> {
        let quotes = self.quotes.read().await;
        Ok(quotes.values().find(|quote| &quote.tracking_number == tracking_number).cloned())
    }

    async fn save(&self, quote: QuoteRecord) -> Result<(), RepositoryError> {
        let mut quotes = self.quotes.write().await;
        let clash = quotes
            .values()
            .any(|stored| stored.tracking_number == quote.tracking_number && stored.id != quote.id);
        if clash {
            return Err(RepositoryError::Conflict(format!(
                "tracking number {} already belongs to another quote",
                quote.tracking_number
            )));
        }

        // Seeded ids must never be handed out again.
        self.next_id.fetch_max(quote.id.0.saturating_add(1), Ordering::Relaxed);
        quotes.insert(quote.id, quote);
        Ok(())
    }

    async fn list(&self, filter: &QuoteFilter) -> Result<Vec<QuoteRecord>, RepositoryError> {
        let quotes = self.quotes.read().await;
        let mut matching: Vec<QuoteRecord> =
            quotes.values().filter(|quote| filter.matches(quote)).cloned().collect();
        matching.sort_by_key(|quote| quote.id);
        Ok(matching)
    }
}

/// Shipments keyed by upper-cased tracking number.
#[derive(Default)]
pub struct InMemoryShipmentRepository {
    shipments: RwLock<HashMap<TrackingNumber, TrackingRecord>>,
}

#[async_trait::async_trait]
impl ShipmentRepository for InMemoryShipmentRepository {
    async fn find_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Result<Option<TrackingRecord>, RepositoryError> {
        let shipments = self.shipments.read().await;
        Ok(shipments.get(&TrackingNumber::normalized(&tracking_number.0)).cloned())
    }

    async fn find_by_booking_number(
        &self,
        booking_number: &BookingNumber,
    ) -> Result<Option<TrackingRecord>, RepositoryError> {
        let key = BookingNumber::normalized(&booking_number.0);
        let shipments = self.shipments.read().await;
        Ok(shipments
            .values()
            .find(|shipment| BookingNumber::normalized(&shipment.booking_number.0) == key)
            .cloned())
    }

    async fn save(&self, shipment: TrackingRecord) -> Result<(), RepositoryError> {
        let key = TrackingNumber::normalized(&shipment.tracking_number.0);
        let mut shipments = self.shipments.write().await;
        shipments.insert(key, shipment);
        Ok(())
    }

    async fn update(
        &self,
        tracking_number: &TrackingNumber,
        edit: ShipmentEdit,
    ) -> Result<Option<TrackingRecord>, RepositoryError> {
        let mut shipments = self.shipments.write().await;
        let Some(shipment) = shipments.get_mut(&TrackingNumber::normalized(&tracking_number.0))
        else {
            return Ok(None);
        };

        edit(shipment);
        Ok(Some(shipment.clone()))
    }

    async fn list(&self, search: Option<&str>) -> Result<Vec<TrackingRecord>, RepositoryError> {
        let term = search.unwrap_or_default();
        let shipments = self.shipments.read().await;
        let mut matching: Vec<TrackingRecord> =
            shipments.values().filter(|shipment| shipment.matches_search(term)).cloned().collect();
        matching.sort_by(|a, b| {
            a.created_at.cmp(&b.created_at).then_with(|| a.tracking_number.cmp(&b.tracking_number))
        });
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use marchelo_core::domain::quote::{CustomerContact, QuoteId, QuoteRecord, QuoteStatus};
    use marchelo_core::domain::shipment::ShipmentType;
    use marchelo_core::domain::tracking::{ShipmentDetails, ShipmentStatus, TrackingRecord};
    use marchelo_core::identifiers::{BookingNumber, ReferenceIssuer, TrackingNumber};
    use marchelo_core::intake::{prepare_quote, PendingQuote, QuoteSubmission};
    use marchelo_core::pricing::DeterministicPricingEngine;

    use crate::repositories::{
        InMemoryQuoteRepository, InMemoryShipmentRepository, QuoteFilter, QuoteRepository,
        RepositoryError, ShipmentRepository,
    };

    fn quote(id: u64, email: &str, status: QuoteStatus) -> QuoteRecord {
        QuoteRecord {
            id: QuoteId(id),
            tracking_number: TrackingNumber(format!("ML00000000{id}")),
            booking_number: BookingNumber(format!("BK00000000{id}")),
            shipment_type: ShipmentType::Freight,
            origin: "Ireland".to_string(),
            destination: "Spain".to_string(),
            weight: Decimal::new(120, 0),
            dimensions: None,
            description: None,
            customer: CustomerContact {
                name: "Ciara Walsh".to_string(),
                email: email.to_string(),
                phone: "+353 21 555 0199".to_string(),
            },
            files: Vec::new(),
            status,
            created_at: Utc.with_ymd_and_hms(2024, 1, 9, 12, 0, 0).single().expect("valid time"),
            estimated_delivery: NaiveDate::from_ymd_opt(2024, 1, 16).expect("valid date"),
            estimated_cost: Decimal::new(429, 0),
        }
    }

    fn shipment(tracking: &str, booking: &str, destination: &str, day: u32) -> TrackingRecord {
        TrackingRecord {
            tracking_number: TrackingNumber(tracking.to_string()),
            booking_number: BookingNumber(booking.to_string()),
            status: ShipmentStatus::InTransit,
            origin: "Dublin, Ireland".to_string(),
            destination: destination.to_string(),
            estimated_delivery: NaiveDate::from_ymd_opt(2024, 1, 20).expect("valid date"),
            current_location: "Dublin Port, Ireland".to_string(),
            events: Vec::new(),
            details: ShipmentDetails {
                weight: "10 kg".to_string(),
                dimensions: "40×30×20 cm".to_string(),
                service: "Sea Freight".to_string(),
                carrier: "Marchelo Logistics".to_string(),
            },
            cost: None,
            created_at: NaiveDate::from_ymd_opt(2024, 1, day).expect("valid date"),
        }
    }

    fn pending(email: &str) -> PendingQuote {
        let engine = DeterministicPricingEngine::canonical().expect("canonical tables");
        let form = QuoteSubmission {
            shipment_type: Some("parcel".to_string()),
            destination: Some("France".to_string()),
            weight: Some("5".to_string()),
            name: Some("Aoife Byrne".to_string()),
            email: Some(email.to_string()),
            phone: Some("+353 1 555 0100".to_string()),
            ..QuoteSubmission::default()
        };
        prepare_quote(form, &engine, &ReferenceIssuer::new(), Utc::now()).expect("valid form")
    }

    #[tokio::test]
    async fn inserted_quotes_get_sequential_ids_after_seeded_ones() {
        let repo = InMemoryQuoteRepository::default();
        let first = repo.insert(pending("a@example.ie")).await.expect("insert");
        assert_eq!(first.id, QuoteId(1));

        repo.save(quote(5, "b@example.ie", QuoteStatus::Pending)).await.expect("save");
        let next = repo.insert(pending("c@example.ie")).await.expect("insert");
        assert_eq!(next.id, QuoteId(6));
        assert_eq!(repo.find_by_id(&QuoteId(6)).await.expect("lookup"), Some(next));
    }

    #[tokio::test]
    async fn rejected_insert_does_not_consume_an_id() {
        let repo = InMemoryQuoteRepository::default();
        let quote = pending("a@example.ie");
        let duplicate = quote.clone();

        repo.insert(quote).await.expect("insert");
        let result = repo.insert(duplicate).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));

        let next = repo.insert(pending("b@example.ie")).await.expect("insert");
        assert_eq!(next.id, QuoteId(2));
    }

    #[tokio::test]
    async fn quote_lookup_by_tracking_number() {
        let repo = InMemoryQuoteRepository::default();
        let stored = quote(1, "a@example.ie", QuoteStatus::Pending);
        repo.save(stored.clone()).await.expect("save");

        let found = repo
            .find_by_tracking_number(&stored.tracking_number)
            .await
            .expect("lookup should succeed");
        assert_eq!(found, Some(stored.clone()));
        assert_eq!(repo.find_by_id(&QuoteId(1)).await.expect("lookup"), Some(stored));
    }

    #[tokio::test]
    async fn duplicate_tracking_number_on_other_quote_conflicts() {
        let repo = InMemoryQuoteRepository::default();
        repo.save(quote(1, "a@example.ie", QuoteStatus::Pending)).await.expect("save");

        let mut clash = quote(2, "b@example.ie", QuoteStatus::Pending);
        clash.tracking_number = TrackingNumber("ML000000001".to_string());

        let result = repo.save(clash).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn list_filters_by_email_and_status_ignoring_case() {
        let repo = InMemoryQuoteRepository::default();
        repo.save(quote(2, "Ciara@Example.ie", QuoteStatus::Pending)).await.expect("save");
        repo.save(quote(1, "ciara@example.ie", QuoteStatus::Approved)).await.expect("save");
        repo.save(quote(3, "other@example.ie", QuoteStatus::Pending)).await.expect("save");

        let by_email = repo
            .list(&QuoteFilter {
                email: Some("CIARA@example.ie".to_string()),
                ..QuoteFilter::default()
            })
            .await
            .expect("list");
        assert_eq!(by_email.iter().map(|q| q.id.0).collect::<Vec<_>>(), vec![1, 2]);

        let pending_for_ciara = repo
            .list(&QuoteFilter {
                email: Some("ciara@example.ie".to_string()),
                status: Some("pending".to_string()),
                search: None,
            })
            .await
            .expect("list");
        assert_eq!(pending_for_ciara.len(), 1);
        assert_eq!(pending_for_ciara[0].id, QuoteId(2));

        let everything = repo.list(&QuoteFilter::default()).await.expect("list");
        assert_eq!(everything.len(), 3);
    }

    #[tokio::test]
    async fn shipment_lookup_ignores_case_for_both_keys() {
        let repo = InMemoryShipmentRepository::default();
        repo.save(shipment("ML123456789", "BK987654321", "New York, USA", 8)).await.expect("save");

        let by_tracking = repo
            .find_by_tracking_number(&TrackingNumber("ml123456789".to_string()))
            .await
            .expect("lookup");
        let by_booking = repo
            .find_by_booking_number(&BookingNumber("bk987654321".to_string()))
            .await
            .expect("lookup");

        assert!(by_tracking.is_some());
        assert_eq!(by_tracking, by_booking);
    }

    #[tokio::test]
    async fn update_edits_in_place_and_reports_unknown_keys() {
        let repo = InMemoryShipmentRepository::default();
        repo.save(shipment("ML123456789", "BK987654321", "New York, USA", 8)).await.expect("save");

        let updated = repo
            .update(
                &TrackingNumber("ML123456789".to_string()),
                Box::new(|record: &mut TrackingRecord| record.status = ShipmentStatus::Delayed),
            )
            .await
            .expect("update");
        assert_eq!(updated.map(|record| record.status), Some(ShipmentStatus::Delayed));

        let missing = repo
            .update(
                &TrackingNumber("ML000000000".to_string()),
                Box::new(|_: &mut TrackingRecord| {}),
            )
            .await
            .expect("update");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_searches_tracking_number_and_destination_oldest_first() {
        let repo = InMemoryShipmentRepository::default();
        repo.save(shipment("ML456789123", "BK456789123", "Sydney, Australia", 12))
            .await
            .expect("save");
        repo.save(shipment("ML123456789", "BK987654321", "New York, USA", 8)).await.expect("save");

        let all = repo.list(None).await.expect("list");
        assert_eq!(all[0].tracking_number.0, "ML123456789");

        let sydney = repo.list(Some("sydney")).await.expect("list");
        assert_eq!(sydney.len(), 1);

        let by_number = repo.list(Some("ml4567")).await.expect("list");
        assert_eq!(by_number[0].tracking_number.0, "ML456789123");
    }
}
