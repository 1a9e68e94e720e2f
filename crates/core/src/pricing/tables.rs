//! Reference tables consumed by the pricing engine.
//!
//! There is exactly one canonical copy of the per-type tiers and the
//! per-destination zone factors. Additional sources (for example destination
//! zones declared in configuration) are merged through [`TableBuilder`], which
//! rejects any key that two sources define with different values.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::domain::shipment::ShipmentType;

/// Multiplier used for destinations missing from the zone table.
pub const DEFAULT_DESTINATION_MULTIPLIER: Decimal = Decimal::TWO;

pub const CANONICAL_SOURCE: &str = "canonical";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PricingTier {
    pub base_price: Decimal,
    pub weight_multiplier: Decimal,
    /// Per-tier distance baseline. Pricing uses the destination zone factor instead.
    pub distance_multiplier: Decimal,
    pub estimated_days: u32,
    pub minimum_charge: Decimal,
    pub description: String,
}

impl PricingTier {
    /// Tier substituted for unrecognized shipment types when the legacy
    /// unknown-type policy is enabled.
    pub fn legacy_fallback() -> Self {
        Self {
            base_price: Decimal::new(100, 0),
            weight_multiplier: Decimal::ONE,
            distance_multiplier: Decimal::ONE,
            estimated_days: 5,
            minimum_charge: Decimal::new(50, 0),
            description: "General shipment".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DestinationFactor {
    pub multiplier: Decimal,
    /// `false` when the destination was not in the table and the default applied.
    pub known: bool,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error(
        "destination `{destination}` is defined as {existing} by `{existing_source}` \
         but as {incoming} by `{incoming_source}`"
    )]
    ConflictingDestination {
        destination: String,
        existing: Decimal,
        existing_source: String,
        incoming: Decimal,
        incoming_source: String,
    },
    #[error(
        "pricing tier for `{shipment_type}` is defined differently by `{existing_source}` \
         and `{incoming_source}`"
    )]
    ConflictingTier { shipment_type: ShipmentType, existing_source: String, incoming_source: String },
    #[error("no pricing tier configured for `{0}`")]
    MissingTier(ShipmentType),
    #[error("invalid pricing tier for `{shipment_type}`: {reason}")]
    InvalidTier { shipment_type: ShipmentType, reason: String },
    #[error("invalid multiplier {multiplier} for destination `{destination}` (must be at least 1)")]
    InvalidMultiplier { destination: String, multiplier: Decimal },
    #[error("destination name must not be empty")]
    EmptyDestination,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PricingTables {
    tiers: [PricingTier; 5],
    destinations: BTreeMap<String, Decimal>,
}

impl PricingTables {
    /// The process-wide canonical tables, built once on first use.
    pub fn canonical() -> Result<&'static PricingTables, TableError> {
        static CANONICAL: OnceLock<Result<PricingTables, TableError>> = OnceLock::new();
        CANONICAL
            .get_or_init(|| canonical_builder().and_then(TableBuilder::build))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn tier(&self, shipment_type: ShipmentType) -> &PricingTier {
        &self.tiers[tier_index(shipment_type)]
    }

    pub fn tiers(&self) -> impl Iterator<Item = (ShipmentType, &PricingTier)> {
        ShipmentType::ALL.into_iter().map(move |kind| (kind, self.tier(kind)))
    }

    pub fn destination(&self, name: &str) -> DestinationFactor {
        match self.destinations.get(&normalize_destination(name)) {
            Some(multiplier) => DestinationFactor { multiplier: *multiplier, known: true },
            None => {
                DestinationFactor { multiplier: DEFAULT_DESTINATION_MULTIPLIER, known: false }
            }
        }
    }

    pub fn destinations(&self) -> &BTreeMap<String, Decimal> {
        &self.destinations
    }

    /// Returns a copy of these tables with extra destination zones merged in.
    pub fn with_destinations<'a>(
        &self,
        source: &str,
        extra: impl IntoIterator<Item = (&'a String, &'a Decimal)>,
    ) -> Result<PricingTables, TableError> {
        let mut builder = TableBuilder::from_tables(self, CANONICAL_SOURCE)?;
        for (name, multiplier) in extra {
            builder.add_destination(source, name, *multiplier)?;
        }
        builder.build()
    }
}

/// Accumulates tiers and zones from named sources, detecting drift between them.
#[derive(Debug, Default)]
pub struct TableBuilder {
    tiers: [Option<(PricingTier, String)>; 5],
    destinations: BTreeMap<String, (Decimal, String)>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: &PricingTables, source: &str) -> Result<Self, TableError> {
        let mut builder = Self::new();
        for (kind, tier) in tables.tiers() {
            builder.add_tier(source, kind, tier.clone())?;
        }
        for (name, multiplier) in &tables.destinations {
            builder.add_destination(source, name, *multiplier)?;
        }
        Ok(builder)
    }

    pub fn add_tier(
        &mut self,
        source: &str,
        shipment_type: ShipmentType,
        tier: PricingTier,
    ) -> Result<&mut Self, TableError> {
        validate_tier(shipment_type, &tier)?;

        let slot = &mut self.tiers[tier_index(shipment_type)];
        if let Some((existing, existing_source)) = slot.as_ref() {
            if *existing != tier {
                return Err(TableError::ConflictingTier {
                    shipment_type,
                    existing_source: existing_source.clone(),
                    incoming_source: source.to_string(),
                });
            }
            return Ok(self);
        }

        *slot = Some((tier, source.to_string()));
        Ok(self)
    }

    pub fn add_destination(
        &mut self,
        source: &str,
        name: &str,
        multiplier: Decimal,
    ) -> Result<&mut Self, TableError> {
        let key = normalize_destination(name);
        if key.is_empty() {
            return Err(TableError::EmptyDestination);
        }
        if multiplier < Decimal::ONE {
            return Err(TableError::InvalidMultiplier { destination: key, multiplier });
        }

        match self.destinations.get(&key) {
            Some((existing, existing_source)) if *existing != multiplier => {
                Err(TableError::ConflictingDestination {
                    destination: key,
                    existing: *existing,
                    existing_source: existing_source.clone(),
                    incoming: multiplier,
                    incoming_source: source.to_string(),
                })
            }
            Some(_) => Ok(self),
            None => {
                self.destinations.insert(key, (multiplier, source.to_string()));
                Ok(self)
            }
        }
    }

    pub fn build(self) -> Result<PricingTables, TableError> {
        let [car, parcel, container, air_express, freight] = self.tiers;
        let take = |slot: Option<(PricingTier, String)>, kind| {
            slot.map(|(tier, _)| tier).ok_or(TableError::MissingTier(kind))
        };

        Ok(PricingTables {
            tiers: [
                take(car, ShipmentType::Car)?,
                take(parcel, ShipmentType::Parcel)?,
                take(container, ShipmentType::Container)?,
                take(air_express, ShipmentType::AirExpress)?,
                take(freight, ShipmentType::Freight)?,
            ],
            destinations: self
                .destinations
                .into_iter()
                .map(|(name, (multiplier, _))| (name, multiplier))
                .collect(),
        })
    }
}

pub fn normalize_destination(name: &str) -> String {
    name.trim().to_lowercase()
}

fn tier_index(shipment_type: ShipmentType) -> usize {
    match shipment_type {
        ShipmentType::Car => 0,
        ShipmentType::Parcel => 1,
        ShipmentType::Container => 2,
        ShipmentType::AirExpress => 3,
        ShipmentType::Freight => 4,
    }
}

fn validate_tier(shipment_type: ShipmentType, tier: &PricingTier) -> Result<(), TableError> {
    let invalid =
        |reason: &str| TableError::InvalidTier { shipment_type, reason: reason.to_string() };

    if tier.base_price.is_sign_negative() {
        return Err(invalid("base_price must not be negative"));
    }
    if tier.weight_multiplier.is_sign_negative() {
        return Err(invalid("weight_multiplier must not be negative"));
    }
    if tier.minimum_charge.is_sign_negative() {
        return Err(invalid("minimum_charge must not be negative"));
    }
    if tier.estimated_days == 0 {
        return Err(invalid("estimated_days must be greater than zero"));
    }
    Ok(())
}

fn tier(
    base_price: i64,
    weight_tenths: i64,
    distance_tenths: i64,
    estimated_days: u32,
    minimum_charge: i64,
    description: &str,
) -> PricingTier {
    PricingTier {
        base_price: Decimal::new(base_price, 0),
        weight_multiplier: Decimal::new(weight_tenths, 1),
        distance_multiplier: Decimal::new(distance_tenths, 1),
        estimated_days,
        minimum_charge: Decimal::new(minimum_charge, 0),
        description: description.to_string(),
    }
}

// Multipliers in tenths.
const DESTINATION_ZONES: &[(&str, i64)] = &[
    // Europe
    ("ireland", 10),
    ("united kingdom", 12),
    ("france", 11),
    ("germany", 11),
    ("spain", 13),
    ("italy", 12),
    ("netherlands", 10),
    ("belgium", 10),
    ("switzerland", 12),
    ("austria", 11),
    ("poland", 11),
    ("czech republic", 11),
    ("sweden", 12),
    ("norway", 13),
    ("denmark", 11),
    ("finland", 12),
    // North America
    ("united states", 25),
    ("canada", 23),
    ("mexico", 20),
    // Asia
    ("china", 30),
    ("japan", 28),
    ("south korea", 27),
    ("singapore", 25),
    ("hong kong", 26),
    ("india", 22),
    ("thailand", 23),
    ("malaysia", 24),
    ("indonesia", 25),
    ("philippines", 26),
    ("vietnam", 24),
    ("sri lanka", 39),
    // Oceania
    ("australia", 32),
    ("new zealand", 33),
    // Africa
    ("south africa", 28),
    ("egypt", 22),
    ("morocco", 18),
    ("nigeria", 25),
    ("kenya", 26),
    ("tanzania", 27),
    ("uganda", 28),
    ("malawi", 29),
    ("zambia", 30),
    ("zimbabwe", 31),
    ("rwanda", 32),
    ("burundi", 33),
    ("congo", 34),
    ("madagascar", 35),
    ("malagasy", 36),
    ("comoros", 37),
    ("seychelles", 38),
    ("cameroon", 40),
    ("gabon", 41),
    ("equatorial guinea", 42),
    ("congo brazzaville", 43),
    ("congo kinshasa", 44),
    // South America
    ("brazil", 27),
    ("argentina", 28),
    ("chile", 29),
    ("colombia", 26),
    ("peru", 27),
    // Middle East
    ("united arab emirates", 20),
    ("saudi arabia", 21),
    ("israel", 19),
    ("turkey", 14),
    ("qatar", 20),
    ("kuwait", 20),
    ("bahrain", 20),
    ("oman", 21),
];

fn canonical_builder() -> Result<TableBuilder, TableError> {
    let mut builder = TableBuilder::new();
    builder
        .add_tier(
            CANONICAL_SOURCE,
            ShipmentType::Car,
            tier(800, 0, 8, 7, 500, "Vehicle transportation with insurance"),
        )?
        .add_tier(
            CANONICAL_SOURCE,
            ShipmentType::Parcel,
            tier(25, 25, 3, 3, 15, "Small package delivery"),
        )?
        .add_tier(
            CANONICAL_SOURCE,
            ShipmentType::Container,
            tier(1200, 5, 12, 14, 800, "Full container shipping"),
        )?
        .add_tier(
            CANONICAL_SOURCE,
            ShipmentType::AirExpress,
            tier(45, 80, 4, 2, 30, "Fast air freight service"),
        )?
        .add_tier(
            CANONICAL_SOURCE,
            ShipmentType::Freight,
            tier(150, 15, 6, 5, 100, "General cargo forwarding"),
        )?;

    for (name, tenths) in DESTINATION_ZONES {
        builder.add_destination(CANONICAL_SOURCE, name, Decimal::new(*tenths, 1))?;
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;

    use crate::domain::shipment::ShipmentType;

    use super::{
        PricingTables, PricingTier, TableBuilder, TableError, DEFAULT_DESTINATION_MULTIPLIER,
    };

    fn canonical() -> &'static PricingTables {
        PricingTables::canonical().expect("canonical tables build without conflicts")
    }

    #[test]
    fn canonical_tables_cover_every_shipment_type() {
        let tables = canonical();
        assert_eq!(tables.tiers().count(), 5);
        assert_eq!(tables.tier(ShipmentType::Car).base_price, Decimal::new(800, 0));
        assert_eq!(tables.tier(ShipmentType::AirExpress).weight_multiplier, Decimal::new(8, 0));
        assert_eq!(tables.tier(ShipmentType::Container).minimum_charge, Decimal::new(800, 0));
    }

    #[test]
    fn destination_lookup_trims_and_ignores_case() {
        let factor = canonical().destination("  United States ");
        assert!(factor.known);
        assert_eq!(factor.multiplier, Decimal::new(25, 1));
    }

    #[test]
    fn unknown_destination_uses_default_multiplier() {
        let factor = canonical().destination("Atlantis");
        assert!(!factor.known);
        assert_eq!(factor.multiplier, DEFAULT_DESTINATION_MULTIPLIER);
        assert_eq!(factor.multiplier, Decimal::new(2, 0));
    }

    #[test]
    fn conflicting_destination_sources_are_rejected() {
        let mut builder = TableBuilder::new();
        builder.add_destination("calculator", "United States", Decimal::new(25, 1)).expect("first");

        let error = builder
            .add_destination("submission", "united states", Decimal::new(20, 1))
            .expect_err("drifted value must be rejected");

        assert!(matches!(
            error,
            TableError::ConflictingDestination { ref destination, .. } if destination == "united states"
        ));
        assert!(error.to_string().contains("submission"));
    }

    #[test]
    fn identical_duplicates_across_sources_are_accepted() {
        let extra = BTreeMap::from([("France".to_string(), Decimal::new(11, 1))]);
        let merged = canonical().with_destinations("config", &extra).expect("same value is fine");
        assert_eq!(merged.destinations().len(), canonical().destinations().len());
    }

    #[test]
    fn config_destinations_extend_the_canonical_zone_table() {
        let extra = BTreeMap::from([("Iceland".to_string(), Decimal::new(15, 1))]);
        let merged = canonical().with_destinations("config", &extra).expect("new zone");

        assert_eq!(merged.destination("iceland").multiplier, Decimal::new(15, 1));
        assert!(!canonical().destination("iceland").known);
    }

    #[test]
    fn config_destinations_cannot_override_canonical_values() {
        let extra = BTreeMap::from([("japan".to_string(), Decimal::new(25, 1))]);
        let error = canonical().with_destinations("config", &extra).expect_err("drift");
        assert!(matches!(error, TableError::ConflictingDestination { .. }));
    }

    #[test]
    fn multipliers_below_one_are_rejected() {
        let error = TableBuilder::new()
            .add_destination("config", "nowhere", Decimal::new(9, 1))
            .map(|_| ())
            .expect_err("discounting zones are not allowed");
        assert!(matches!(error, TableError::InvalidMultiplier { .. }));
    }

    #[test]
    fn build_requires_every_tier() {
        let mut builder = TableBuilder::new();
        builder
            .add_tier("partial", ShipmentType::Car, PricingTier::legacy_fallback())
            .expect("valid tier");

        let error = builder.build().expect_err("four tiers missing");
        assert_eq!(error, TableError::MissingTier(ShipmentType::Parcel));
    }

    #[test]
    fn conflicting_tiers_are_rejected() {
        let mut builder = TableBuilder::new();
        builder
            .add_tier("a", ShipmentType::Freight, PricingTier::legacy_fallback())
            .expect("first");
        let mut drifted = PricingTier::legacy_fallback();
        drifted.minimum_charge = Decimal::new(75, 0);

        let error = builder
            .add_tier("b", ShipmentType::Freight, drifted)
            .map(|_| ())
            .expect_err("drifted tier");
        assert!(matches!(error, TableError::ConflictingTier { .. }));
    }

    #[test]
    fn zero_day_tiers_are_invalid() {
        let mut broken = PricingTier::legacy_fallback();
        broken.estimated_days = 0;

        let error = TableBuilder::new()
            .add_tier("a", ShipmentType::Parcel, broken)
            .map(|_| ())
            .expect_err("zero transit days");
        assert!(matches!(error, TableError::InvalidTier { .. }));
    }
}
