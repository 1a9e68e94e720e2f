pub mod fixtures;
pub mod repositories;

pub use fixtures::{seed_demo_data, SeedResult};
pub use repositories::{
    InMemoryQuoteRepository, InMemoryShipmentRepository, QuoteFilter, QuoteRepository,
    RepositoryError, ShipmentEdit, ShipmentRepository,
};
