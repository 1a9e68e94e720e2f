use marchelo_core::config::{AppConfig, LoadOptions};
use marchelo_core::pricing::tables::{PricingTables, DEFAULT_DESTINATION_MULTIPLIER};
use serde_json::json;

use super::{CommandResult, EXIT_CONFIG};

const COMMAND: &str = "tables";

pub fn run(json_output: bool) -> CommandResult {
    let tables = match AppConfig::load(LoadOptions::default())
        .map_err(|error| error.to_string())
        .and_then(|config| config.pricing_tables().map_err(|error| error.to_string()))
    {
        Ok(tables) => tables,
        Err(message) => {
            return CommandResult::failure(COMMAND, "config_validation", message, EXIT_CONFIG)
        }
    };

    if json_output {
        let tiers: Vec<_> = tables
            .tiers()
            .map(|(kind, tier)| json!({ "shipmentType": kind.as_str(), "tier": tier }))
            .collect();
        let data = json!({
            "tiers": tiers,
            "destinations": tables.destinations(),
            "defaultMultiplier": DEFAULT_DESTINATION_MULTIPLIER,
        });
        return CommandResult::success_with_data(
            COMMAND,
            format!("{} tiers, {} destination zones", tiers.len(), tables.destinations().len()),
            Some(data),
        );
    }

    CommandResult::text(render_human(&tables))
}

fn render_human(tables: &PricingTables) -> String {
    let mut lines = vec!["pricing tiers:".to_string()];
    for (kind, tier) in tables.tiers() {
        lines.push(format!(
            "- {kind}: base {}, per kg {}, {} days, minimum {} ({})",
            tier.base_price,
            tier.weight_multiplier,
            tier.estimated_days,
            tier.minimum_charge,
            tier.description
        ));
    }

    lines.push(format!(
        "destination zones (unlisted destinations use x{DEFAULT_DESTINATION_MULTIPLIER}):"
    ));
    for (name, multiplier) in tables.destinations() {
        lines.push(format!("- {name}: x{multiplier}"));
    }

    lines.join("\n")
}
