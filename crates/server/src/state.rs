use std::sync::Arc;

use marchelo_core::config::AppConfig;
use marchelo_core::identifiers::ReferenceIssuer;
use marchelo_core::pricing::tables::PricingTables;
use marchelo_core::pricing::{DeterministicPricingEngine, PricingEngine};
use marchelo_core::timeline::TimelinePolicy;
use marchelo_db::{
    InMemoryQuoteRepository, InMemoryShipmentRepository, QuoteRepository, ShipmentRepository,
};

/// Shared handler state. Cloning is cheap; everything behind it is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub tables: Arc<PricingTables>,
    pub engine: Arc<dyn PricingEngine>,
    pub quotes: Arc<dyn QuoteRepository>,
    pub shipments: Arc<dyn ShipmentRepository>,
    pub issuer: Arc<ReferenceIssuer>,
    pub timeline: TimelinePolicy,
}

impl AppState {
    pub fn new(config: &AppConfig, tables: PricingTables) -> Self {
        let tables = Arc::new(tables);
        let engine =
            DeterministicPricingEngine::new(tables.clone(), config.pricing.unknown_type_policy);

        Self {
            tables,
            engine: Arc::new(engine),
            quotes: Arc::new(InMemoryQuoteRepository::default()),
            shipments: Arc::new(InMemoryShipmentRepository::default()),
            issuer: Arc::new(ReferenceIssuer::new()),
            timeline: config.timeline_policy(),
        }
    }
}
