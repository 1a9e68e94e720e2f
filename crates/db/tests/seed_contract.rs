use std::collections::HashSet;

use serde_json::Value;

use marchelo_db::fixtures::{demo_quotes, demo_shipments};

type SeedContractTestResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            return Err(format!(
                "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                $left,
                $right
            ));
        }
    };
    ($left:expr, $right:expr, $($arg:tt)*) => {
        if $left != $right {
            return Err(format!($($arg)*));
        }
    };
}

fn require_field<'a>(value: &'a Value, field_name: &str) -> SeedContractTestResult<&'a Value> {
    value.get(field_name).ok_or_else(|| format!("{field_name} should be present"))
}

fn require_str<'a>(value: &'a Value, field_name: &str) -> SeedContractTestResult<&'a str> {
    require_field(value, field_name)?
        .as_str()
        .ok_or_else(|| format!("{field_name} should be a string"))
}

fn to_json<T: serde::Serialize>(value: &T) -> SeedContractTestResult<Value> {
    serde_json::to_value(value).map_err(|error| format!("fixture should serialize: {error}"))
}

#[test]
fn shipment_fixtures_match_tracking_wire_contract() -> SeedContractTestResult {
    let shipments = demo_shipments().map_err(|error| error.to_string())?;
    require_eq!(shipments.len(), 3, "portal lists exactly three demo shipments");

    let expected = [
        ("ML123456789", "BK987654321", "In Transit", 4),
        ("ML987654321", "BK123456789", "Delivered", 5),
        ("ML456789123", "BK456789123", "Processing", 1),
    ];

    for (shipment, (tracking, booking, status, event_count)) in shipments.iter().zip(expected) {
        let json = to_json(shipment)?;
        require_eq!(require_str(&json, "trackingNumber")?, tracking);
        require_eq!(require_str(&json, "bookingNumber")?, booking);
        require_eq!(require_str(&json, "status")?, status);
        require!(json.get("currentLocation").is_some(), "{tracking} should expose currentLocation");
        require!(json.get("estimatedDelivery").is_some(), "{tracking} should expose estimatedDelivery");

        let events = require_field(&json, "events")?
            .as_array()
            .ok_or_else(|| "events should be an array".to_string())?;
        require_eq!(events.len(), event_count, "{tracking} event count drifted");

        let details = require_field(&json, "details")?;
        require_eq!(require_str(details, "carrier")?, "Marchelo Logistics");
    }

    Ok(())
}

#[test]
fn quote_fixtures_match_portal_contract() -> SeedContractTestResult {
    let quotes = demo_quotes().map_err(|error| error.to_string())?;

    let labels: Vec<&str> = quotes.iter().map(|quote| quote.shipment_type.display_label()).collect();
    require_eq!(labels, vec!["Car Shipping", "Parcel Delivery", "Container Shipping"]);

    let statuses: Vec<&str> = quotes.iter().map(|quote| quote.status.as_str()).collect();
    require_eq!(statuses, vec!["Pending", "Approved", "Expired"]);

    let tracking_numbers: HashSet<&str> =
        quotes.iter().map(|quote| quote.tracking_number.0.as_str()).collect();
    require_eq!(tracking_numbers.len(), quotes.len(), "fixture tracking numbers must be unique");

    let parcel = to_json(&quotes[1])?;
    require_eq!(require_str(&parcel, "shipmentType")?, "parcel");
    require_eq!(require_str(&parcel, "destination")?, "France");

    Ok(())
}
