use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const TRACKING_PREFIX: &str = "ML";
const BOOKING_PREFIX: &str = "BK";
const SUFFIX_MODULUS: u64 = 1_000_000_000;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingNumber(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingNumber(pub String);

impl TrackingNumber {
    /// Lookup keys are compared upper-cased and trimmed.
    pub fn normalized(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }
}

impl BookingNumber {
    pub fn normalized(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }
}

impl fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for BookingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues tracking/booking number pairs from the trailing nine digits of a
/// millisecond clock. The clock reading is forced to be strictly increasing so
/// two submissions landing in the same millisecond still get distinct numbers.
#[derive(Debug, Default)]
pub struct ReferenceIssuer {
    last_issued: AtomicU64,
}

impl ReferenceIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, now: DateTime<Utc>) -> (TrackingNumber, BookingNumber) {
        let now_ms = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let mut current = self.last_issued.load(Ordering::Relaxed);
        let issued = loop {
            let candidate = now_ms.max(current + 1);
            match self.last_issued.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break candidate,
                Err(observed) => current = observed,
            }
        };

        let suffix = issued % SUFFIX_MODULUS;
        (
            TrackingNumber(format!("{TRACKING_PREFIX}{suffix:09}")),
            BookingNumber(format!("{BOOKING_PREFIX}{suffix:09}")),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{BookingNumber, ReferenceIssuer, TrackingNumber};

    #[test]
    fn numbers_use_trailing_nine_clock_digits() {
        let issuer = ReferenceIssuer::new();
        let now = Utc.timestamp_millis_opt(1_704_708_000_123).single().expect("valid instant");

        let (tracking, booking) = issuer.issue(now);

        assert_eq!(tracking.0, "ML708000123");
        assert_eq!(booking.0, "BK708000123");
    }

    #[test]
    fn same_millisecond_never_repeats_a_number() {
        let issuer = ReferenceIssuer::new();
        let now = Utc.timestamp_millis_opt(1_704_708_000_123).single().expect("valid instant");

        let (first, _) = issuer.issue(now);
        let (second, _) = issuer.issue(now);

        assert_ne!(first, second);
        assert_eq!(second.0, "ML708000124");
    }

    #[test]
    fn lookup_keys_are_upper_cased() {
        assert_eq!(TrackingNumber::normalized(" ml123 ").0, "ML123");
        assert_eq!(BookingNumber::normalized("bk9").0, "BK9");
    }
}
