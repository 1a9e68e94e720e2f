//! Quote pricing engine: deterministic cost and transit-time estimates.

pub mod dimensions;
pub mod tables;

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::shipment::ShipmentType;
use crate::errors::DomainError;

use self::dimensions::Dimensions;
use self::tables::{DestinationFactor, PricingTables, PricingTier, TableError};

/// Charge per cubic meter for shipment types priced by volume.
pub const VOLUME_RATE_PER_M3: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// What to do when the requested shipment type has no pricing tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTypePolicy {
    /// Report insufficient data instead of quoting.
    #[default]
    Insufficient,
    /// Price with [`PricingTier::legacy_fallback`].
    LegacyDefaults,
}

impl UnknownTypePolicy {
    /// Spelling used in configuration files and environment variables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insufficient => "insufficient",
            Self::LegacyDefaults => "legacy_defaults",
        }
    }
}

impl FromStr for UnknownTypePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "insufficient" => Ok(Self::Insufficient),
            "legacy_defaults" | "legacy-defaults" => Ok(Self::LegacyDefaults),
            other => Err(format!(
                "unsupported unknown type policy `{other}` (expected insufficient|legacy_defaults)"
            )),
        }
    }
}

/// A complete, typed quote request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub shipment_type: ShipmentType,
    pub destination: String,
    pub weight: Decimal,
    pub dimensions: Option<String>,
}

/// Raw form input as typed by a user, any field possibly missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteDraft {
    pub shipment_type: Option<String>,
    pub destination: Option<String>,
    #[serde(deserialize_with = "weight_field")]
    pub weight: Option<String>,
    pub dimensions: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub base_price: Decimal,
    pub weight_cost: Decimal,
    pub distance_surcharge: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_surcharge: Option<Decimal>,
}

impl CostBreakdown {
    pub fn total(&self) -> Decimal {
        self.base_price
            + self.weight_cost
            + self.distance_surcharge
            + self.volume_surcharge.unwrap_or_default()
    }
}

/// Unrounded breakdown figures reconcile with `unclamped_total`; `estimated_cost`
/// is the clamped total rounded to a whole currency unit and may exceed the
/// breakdown sum when the minimum charge applies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEstimate {
    pub shipment_type: String,
    pub destination: String,
    pub description: String,
    pub destination_multiplier: Decimal,
    pub destination_known: bool,
    pub subtotal: Decimal,
    pub breakdown: CostBreakdown,
    pub unclamped_total: Decimal,
    pub minimum_charge: Decimal,
    pub minimum_applied: bool,
    pub estimated_cost: Decimal,
    pub estimated_days: u32,
    pub estimated_delivery: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "value")]
pub enum InsufficientReason {
    MissingShipmentType,
    MissingDestination,
    MissingWeight,
    UnknownShipmentType(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuoteOutcome {
    Quoted(QuoteEstimate),
    Insufficient(InsufficientReason),
}

impl QuoteOutcome {
    pub fn quoted(self) -> Option<QuoteEstimate> {
        match self {
            Self::Quoted(estimate) => Some(estimate),
            Self::Insufficient(_) => None,
        }
    }
}

pub trait PricingEngine: Send + Sync {
    fn quote(&self, request: &QuoteRequest, today: NaiveDate)
        -> Result<QuoteEstimate, DomainError>;

    fn estimate(&self, draft: &QuoteDraft, today: NaiveDate) -> Result<QuoteOutcome, DomainError>;
}

#[derive(Clone, Debug)]
pub struct DeterministicPricingEngine {
    tables: Arc<PricingTables>,
    unknown_type_policy: UnknownTypePolicy,
}

impl DeterministicPricingEngine {
    pub fn new(tables: Arc<PricingTables>, unknown_type_policy: UnknownTypePolicy) -> Self {
        Self { tables, unknown_type_policy }
    }

    pub fn canonical() -> Result<Self, TableError> {
        let tables = PricingTables::canonical()?.clone();
        Ok(Self::new(Arc::new(tables), UnknownTypePolicy::default()))
    }
}

impl PricingEngine for DeterministicPricingEngine {
    fn quote(
        &self,
        request: &QuoteRequest,
        today: NaiveDate,
    ) -> Result<QuoteEstimate, DomainError> {
        if request.weight.is_sign_negative() && !request.weight.is_zero() {
            return Err(DomainError::InvalidWeight(request.weight.to_string()));
        }

        let kind = request.shipment_type;
        let dimensions = request
            .dimensions
            .as_deref()
            .filter(|_| kind.uses_dimensions())
            .and_then(Dimensions::parse);

        price(
            PricingInput {
                shipment_type: kind.as_str(),
                tier: self.tables.tier(kind),
                destination: request.destination.trim(),
                factor: self.tables.destination(&request.destination),
                weight: request.weight,
                dimensions,
            },
            today,
        )
    }

    fn estimate(&self, draft: &QuoteDraft, today: NaiveDate) -> Result<QuoteOutcome, DomainError> {
        let Some(raw_type) = non_empty(draft.shipment_type.as_deref()) else {
            return Ok(QuoteOutcome::Insufficient(InsufficientReason::MissingShipmentType));
        };
        let Some(destination) = non_empty(draft.destination.as_deref()) else {
            return Ok(QuoteOutcome::Insufficient(InsufficientReason::MissingDestination));
        };
        let Some(raw_weight) = non_empty(draft.weight.as_deref()) else {
            return Ok(QuoteOutcome::Insufficient(InsufficientReason::MissingWeight));
        };
        let weight = parse_weight(raw_weight)?;

        if let Some(kind) = ShipmentType::parse_lenient(raw_type) {
            let request = QuoteRequest {
                shipment_type: kind,
                destination: destination.to_string(),
                weight,
                dimensions: draft.dimensions.clone(),
            };
            return self.quote(&request, today).map(QuoteOutcome::Quoted);
        }

        match self.unknown_type_policy {
            UnknownTypePolicy::Insufficient => Ok(QuoteOutcome::Insufficient(
                InsufficientReason::UnknownShipmentType(raw_type.to_string()),
            )),
            UnknownTypePolicy::LegacyDefaults => {
                let tier = PricingTier::legacy_fallback();
                price(
                    PricingInput {
                        shipment_type: raw_type,
                        tier: &tier,
                        destination,
                        factor: self.tables.destination(destination),
                        weight,
                        dimensions: None,
                    },
                    today,
                )
                .map(QuoteOutcome::Quoted)
            }
        }
    }
}

/// Parses a user-supplied weight. Negative or non-numeric input is rejected.
pub fn parse_weight(raw: &str) -> Result<Decimal, DomainError> {
    let trimmed = raw.trim();
    let weight =
        Decimal::from_str(trimmed).map_err(|_| DomainError::InvalidWeight(trimmed.to_string()))?;

    if weight.is_sign_negative() && !weight.is_zero() {
        return Err(DomainError::InvalidWeight(trimmed.to_string()));
    }
    Ok(weight)
}

/// Reads a form weight posted either as text or as a bare JSON number.
pub fn weight_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawWeight {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(Option::<RawWeight>::deserialize(deserializer)?.map(|raw| match raw {
        RawWeight::Text(text) => text,
        RawWeight::Integer(value) => value.to_string(),
        RawWeight::Float(value) => value.to_string(),
    }))
}

/// Rounds a money amount to a whole currency unit, halves away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

struct PricingInput<'a> {
    shipment_type: &'a str,
    tier: &'a PricingTier,
    destination: &'a str,
    factor: DestinationFactor,
    weight: Decimal,
    dimensions: Option<Dimensions>,
}

fn price(input: PricingInput<'_>, today: NaiveDate) -> Result<QuoteEstimate, DomainError> {
    let PricingInput { shipment_type, tier, destination, factor, weight, dimensions } = input;
    let multiplier = factor.multiplier;
    let overflow = || {
        DomainError::PriceOverflow(format!(
            "{shipment_type} to {destination} at x{multiplier} for {weight} kg"
        ))
    };

    let base_price = tier.base_price;
    let weight_cost = weight
        .checked_mul(tier.weight_multiplier)
        .ok_or_else(|| DomainError::InvalidWeight(format!("{weight} is too large to price")))?;
    let subtotal = base_price.checked_add(weight_cost).ok_or_else(overflow)?;
    let distance_surcharge =
        subtotal.checked_mul(multiplier - Decimal::ONE).ok_or_else(overflow)?;
    let mut total = subtotal.checked_mul(multiplier).ok_or_else(overflow)?;

    // Dimensions whose volume overflows are treated like malformed input.
    let volume_surcharge = dimensions
        .and_then(|dimensions| dimensions.volume_m3())
        .and_then(|volume| volume.checked_mul(VOLUME_RATE_PER_M3));
    if let Some(surcharge) = volume_surcharge {
        total = total.checked_add(surcharge).ok_or_else(overflow)?;
    }

    let unclamped_total = total;
    let minimum_applied = unclamped_total < tier.minimum_charge;
    let clamped_total = unclamped_total.max(tier.minimum_charge);

    let estimated_days = transit_days(tier.estimated_days, multiplier);
    let estimated_delivery =
        today.checked_add_days(Days::new(u64::from(estimated_days))).ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "delivery date overflows calendar: {today} + {estimated_days} days"
            ))
        })?;

    Ok(QuoteEstimate {
        shipment_type: shipment_type.to_string(),
        destination: destination.to_string(),
        description: tier.description.clone(),
        destination_multiplier: multiplier,
        destination_known: factor.known,
        subtotal,
        breakdown: CostBreakdown { base_price, weight_cost, distance_surcharge, volume_surcharge },
        unclamped_total,
        minimum_charge: tier.minimum_charge,
        minimum_applied,
        estimated_cost: round_currency(clamped_total),
        estimated_days,
        estimated_delivery,
    })
}

fn transit_days(baseline_days: u32, multiplier: Decimal) -> u32 {
    (Decimal::from(baseline_days) * multiplier).ceil().to_u32().unwrap_or(u32::MAX)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
