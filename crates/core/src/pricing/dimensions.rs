use std::str::FromStr;

use rust_decimal::Decimal;

/// Package dimensions in centimeters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub length_cm: Decimal,
    pub width_cm: Decimal,
    pub height_cm: Decimal,
}

const CM3_PER_M3: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

impl Dimensions {
    /// Parses `"L×W×H"`. An ASCII `x` is accepted in place of `×` and each part
    /// may carry a trailing `cm`. Returns `None` unless there are exactly three
    /// positive numeric parts.
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.split(['×', 'x', 'X']).collect();
        let [length, width, height] = parts.as_slice() else {
            return None;
        };

        Some(Self {
            length_cm: parse_component(length)?,
            width_cm: parse_component(width)?,
            height_cm: parse_component(height)?,
        })
    }

    /// Volume in cubic meters, `None` if the product overflows.
    pub fn volume_m3(&self) -> Option<Decimal> {
        self.length_cm
            .checked_mul(self.width_cm)?
            .checked_mul(self.height_cm)?
            .checked_div(CM3_PER_M3)
    }
}

fn parse_component(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let numeric = trimmed
        .strip_suffix("cm")
        .or_else(|| trimmed.strip_suffix("CM"))
        .unwrap_or(trimmed)
        .trim_end();

    Decimal::from_str(numeric).ok().filter(|value| value.is_sign_positive() && !value.is_zero())
}
