use marchelo_core::config::{AppConfig, ConfigError};
use marchelo_db::{seed_demo_data, RepositoryError};
use thiserror::Error;
use tracing::info;

use crate::state::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("demo data seeding failed: {0}")]
    Seed(#[source] RepositoryError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let tables = config.pricing_tables()?;
    info!(
        event_name = "system.bootstrap.tables_loaded",
        correlation_id = "bootstrap",
        destinations = tables.destinations().len(),
        configured_destinations = config.pricing.destinations.len(),
        "pricing tables validated"
    );

    let state = AppState::new(&config, tables);
    let seeded = seed_demo_data(state.quotes.as_ref(), state.shipments.as_ref())
        .await
        .map_err(BootstrapError::Seed)?;
    info!(
        event_name = "system.bootstrap.fixtures_seeded",
        correlation_id = "bootstrap",
        shipments = seeded.shipments,
        quotes = seeded.quotes,
        "demo data seeded"
    );

    Ok(Application { config, state })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use marchelo_core::config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
    use marchelo_core::pricing::UnknownTypePolicy;
    use marchelo_db::QuoteFilter;
    use rust_decimal::Decimal;

    use crate::bootstrap::{bootstrap_with_config, BootstrapError};

    #[tokio::test]
    async fn bootstrap_seeds_demo_data_and_applies_overrides() {
        let config = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                port: Some(18080),
                unknown_type_policy: Some(UnknownTypePolicy::LegacyDefaults),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("config should load with defaults");
        let app = bootstrap_with_config(config).await.expect("bootstrap should succeed");

        assert_eq!(app.config.server.port, 18080);
        let quotes = app.state.quotes.list(&QuoteFilter::default()).await.expect("list quotes");
        assert_eq!(quotes.len(), 3);
        let shipments = app.state.shipments.list(None).await.expect("list shipments");
        assert_eq!(shipments.len(), 3);
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_drifted_destination_zone() {
        let mut config = AppConfig::default();
        config.pricing.destinations =
            BTreeMap::from([("Japan".to_string(), Decimal::new(30, 1))]);

        let result = bootstrap_with_config(config).await;

        let message = match result {
            Ok(_) => panic!("conflicting zone should abort bootstrap"),
            Err(error) => {
                assert!(matches!(error, BootstrapError::Config(ConfigError::PricingTables(_))));
                error.to_string()
            }
        };
        assert!(message.contains("japan"));
    }
}
