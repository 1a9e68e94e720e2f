use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use marchelo_core::config::{AppConfig, LoadOptions};
use marchelo_core::pricing::{
    DeterministicPricingEngine, InsufficientReason, PricingEngine, QuoteDraft, QuoteEstimate,
    QuoteOutcome,
};

use super::{CommandResult, EXIT_CONFIG, EXIT_FAILURE, EXIT_INPUT, EXIT_INSUFFICIENT};

const COMMAND: &str = "quote";

#[derive(Clone, Debug, Default)]
pub struct QuoteArgs {
    pub shipment_type: String,
    pub destination: String,
    pub weight: String,
    pub dimensions: Option<String>,
    pub json: bool,
}

pub fn run(args: &QuoteArgs) -> CommandResult {
    run_at(args, Utc::now().date_naive())
}

/// Prices `args` as if today were `today`.
pub fn run_at(args: &QuoteArgs, today: NaiveDate) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(COMMAND, "config_validation", error.to_string(), EXIT_CONFIG)
        }
    };
    let tables = match config.pricing_tables() {
        Ok(tables) => tables,
        Err(error) => {
            return CommandResult::failure(COMMAND, "pricing_tables", error.to_string(), EXIT_CONFIG)
        }
    };
    let engine = DeterministicPricingEngine::new(Arc::new(tables), config.pricing.unknown_type_policy);

    let draft = QuoteDraft {
        shipment_type: Some(args.shipment_type.clone()),
        destination: Some(args.destination.clone()),
        weight: Some(args.weight.clone()),
        dimensions: args.dimensions.clone(),
    };

    match engine.estimate(&draft, today) {
        Ok(QuoteOutcome::Quoted(estimate)) => render(&estimate, args.json),
        Ok(QuoteOutcome::Insufficient(reason)) => CommandResult::failure(
            COMMAND,
            "insufficient_data",
            describe_insufficient(&reason),
            EXIT_INSUFFICIENT,
        ),
        Err(error) => CommandResult::failure(COMMAND, "validation", error.to_string(), EXIT_INPUT),
    }
}

fn render(estimate: &QuoteEstimate, json: bool) -> CommandResult {
    let summary = format!(
        "{} to {}: {} (delivery {})",
        estimate.shipment_type,
        estimate.destination,
        estimate.estimated_cost,
        estimate.estimated_delivery
    );

    if json {
        let data = match serde_json::to_value(estimate) {
            Ok(data) => data,
            Err(error) => {
                let message = error.to_string();
                return CommandResult::failure(COMMAND, "serialization", message, EXIT_FAILURE);
            }
        };
        return CommandResult::success_with_data(COMMAND, summary, Some(data));
    }

    let zone = if estimate.destination_known { "zone" } else { "default zone" };
    let mut lines = vec![
        format!("quote: {} ({})", estimate.shipment_type, estimate.description),
        format!("- destination: {} ({zone} x{})", estimate.destination, estimate.destination_multiplier),
        format!("- base price: {}", estimate.breakdown.base_price),
        format!("- weight cost: {}", estimate.breakdown.weight_cost),
        format!("- distance surcharge: {}", estimate.breakdown.distance_surcharge),
    ];
    if let Some(volume) = estimate.breakdown.volume_surcharge {
        lines.push(format!("- volume surcharge: {volume}"));
    }
    if estimate.minimum_applied {
        lines.push(format!("- minimum charge applied: {}", estimate.minimum_charge));
    }
    lines.push(format!("estimated cost: {}", estimate.estimated_cost));
    lines.push(format!(
        "estimated delivery: {} ({} days)",
        estimate.estimated_delivery, estimate.estimated_days
    ));

    CommandResult::text(lines.join("\n"))
}

fn describe_insufficient(reason: &InsufficientReason) -> String {
    match reason {
        InsufficientReason::MissingShipmentType => "shipment type is required".to_string(),
        InsufficientReason::MissingDestination => "destination is required".to_string(),
        InsufficientReason::MissingWeight => "weight is required".to_string(),
        InsufficientReason::UnknownShipmentType(kind) => {
            format!("no pricing tier for shipment type `{kind}`")
        }
    }
}
