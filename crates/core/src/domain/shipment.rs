use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShipmentType {
    Car,
    Parcel,
    Container,
    AirExpress,
    Freight,
}

impl ShipmentType {
    pub const ALL: [ShipmentType; 5] =
        [Self::Car, Self::Parcel, Self::Container, Self::AirExpress, Self::Freight];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Parcel => "parcel",
            Self::Container => "container",
            Self::AirExpress => "air-express",
            Self::Freight => "freight",
        }
    }

    /// Label shown in the client portal quote list.
    pub fn display_label(&self) -> &'static str {
        match self {
            Self::Car => "Car Shipping",
            Self::Parcel => "Parcel Delivery",
            Self::Container => "Container Shipping",
            Self::AirExpress => "Air Express",
            Self::Freight => "Freight Forwarding",
        }
    }

    /// Only these types pay a volume surcharge derived from package dimensions.
    pub fn uses_dimensions(&self) -> bool {
        matches!(self, Self::Parcel | Self::AirExpress)
    }

    /// Lenient lookup used by form input: trims and ignores case, `None` if unrecognized.
    pub fn parse_lenient(value: &str) -> Option<Self> {
        let key = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == key)
    }
}

impl fmt::Display for ShipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(value)
            .ok_or_else(|| DomainError::UnsupportedShipmentType(value.trim().to_string()))
    }
}
