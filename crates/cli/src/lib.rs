pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::quote::QuoteArgs;

#[derive(Debug, Parser)]
#[command(
    name = "marchelo",
    about = "Marchelo shipping operator CLI",
    long_about = "Price shipments offline, inspect pricing tables and configuration, and check a running server.",
    after_help = "Examples:\n  marchelo quote --type parcel --destination France --weight 5\n  marchelo tables --json\n  marchelo doctor"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Estimate the cost and delivery date of a shipment")]
    Quote {
        #[arg(long = "type", help = "Shipment type: car, parcel, container, air-express or freight")]
        shipment_type: String,
        #[arg(long)]
        destination: String,
        #[arg(long, help = "Weight in kilograms")]
        weight: String,
        #[arg(long, help = "Dimensions in centimeters, e.g. 30x20x10")]
        dimensions: Option<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List pricing tiers and destination zones")]
    Tables {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and pricing tables, then check the server health endpoint")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Quote { shipment_type, destination, weight, dimensions, json } => {
            commands::quote::run(&QuoteArgs { shipment_type, destination, weight, dimensions, json })
        }
        Command::Tables { json } => commands::tables::run(json),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use marchelo_core::domain::shipment::ShipmentType;

    use super::Cli;

    #[test]
    fn type_help_lists_every_shipment_slug() {
        let command = Cli::command();
        let quote = command.find_subcommand("quote").expect("quote subcommand");
        let help = quote
            .get_arguments()
            .find(|arg| arg.get_long() == Some("type"))
            .and_then(|arg| arg.get_help())
            .map(ToString::to_string)
            .expect("--type help");

        for kind in ShipmentType::ALL {
            assert!(help.contains(kind.as_str()), "help should mention `{kind}`: {help}");
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
