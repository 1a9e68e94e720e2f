//! Mock tracking timeline rules: live "still moving" updates and manual event appends.

use chrono::{DateTime, Duration, Utc};

use crate::domain::tracking::{EventIcon, ShipmentStatus, TrackingEvent, TrackingRecord};

pub const DEFAULT_LIVE_UPDATE_AFTER_MINS: u64 = 120;

const LIVE_UPDATE_LOCATION: &str = "In Transit";
const LIVE_UPDATE_DESCRIPTION: &str = "Package continues in transit";
const DEFAULT_EVENT_LOCATION: &str = "Unknown";
const DEFAULT_EVENT_DESCRIPTION: &str = "Status update";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimelinePolicy {
    pub live_update_after: Duration,
}

impl Default for TimelinePolicy {
    fn default() -> Self {
        Self::from_minutes(DEFAULT_LIVE_UPDATE_AFTER_MINS)
    }
}

/// Manual status update posted for a shipment. Missing fields fall back to defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventUpdate {
    pub status: Option<ShipmentStatus>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl TimelinePolicy {
    pub fn from_minutes(minutes: u64) -> Self {
        let minutes = i64::try_from(minutes).unwrap_or(i64::MAX).min(i64::MAX / 60_000);
        Self { live_update_after: Duration::minutes(minutes) }
    }

    /// An in-transit shipment whose newest event is older than the threshold
    /// gets a synthetic "continues in transit" event stamped `now`.
    pub fn live_update(
        &self,
        record: &TrackingRecord,
        now: DateTime<Utc>,
    ) -> Option<TrackingEvent> {
        if record.status != ShipmentStatus::InTransit {
            return None;
        }

        let stale = match record.last_event() {
            Some(last) => now.signed_duration_since(last.timestamp) > self.live_update_after,
            None => true,
        };
        stale.then(|| TrackingEvent {
            id: record.next_event_id(),
            status: ShipmentStatus::InTransit,
            location: LIVE_UPDATE_LOCATION.to_string(),
            timestamp: now,
            description: LIVE_UPDATE_DESCRIPTION.to_string(),
            icon: EventIcon::Truck,
        })
    }

    /// Appends the live-update event if one is due. Returns whether the record changed.
    pub fn apply_live_update(&self, record: &mut TrackingRecord, now: DateTime<Utc>) -> bool {
        match self.live_update(record, now) {
            Some(event) => {
                record.events.push(event);
                true
            }
            None => false,
        }
    }
}

/// Records a manual update, moving the shipment's status and current location
/// when the update carries them.
pub fn append_event(
    record: &mut TrackingRecord,
    update: EventUpdate,
    now: DateTime<Utc>,
) -> TrackingEvent {
    let event = TrackingEvent {
        id: record.next_event_id(),
        status: update.status.unwrap_or(ShipmentStatus::InTransit),
        location: update.location.clone().unwrap_or_else(|| DEFAULT_EVENT_LOCATION.to_string()),
        timestamp: now,
        description: update.description.unwrap_or_else(|| DEFAULT_EVENT_DESCRIPTION.to_string()),
        icon: EventIcon::Truck,
    };

    if let Some(status) = update.status {
        record.status = status;
    }
    if let Some(location) = update.location {
        record.current_location = location;
    }
    record.events.push(event.clone());
    event
}
