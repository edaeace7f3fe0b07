//! Display formatting for entitlement expiry.

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;

use crate::domain::foundation::Timestamp;

use super::window::is_active;

/// What the client shows next to a gated feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "until", rename_all = "snake_case")]
pub enum EntitlementDisplay {
    NotActivated,
    Expired,
    ActiveUntil(NaiveDate),
}

impl EntitlementDisplay {
    /// Returns true for the `ActiveUntil` variant.
    pub fn is_active(&self) -> bool {
        matches!(self, EntitlementDisplay::ActiveUntil(_))
    }
}

impl std::fmt::Display for EntitlementDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntitlementDisplay::NotActivated => write!(f, "not activated"),
            EntitlementDisplay::Expired => write!(f, "expired"),
            EntitlementDisplay::ActiveUntil(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Formats an expiry for display in the viewer's UTC offset.
pub fn present(
    expires_at: Option<Timestamp>,
    now: Timestamp,
    offset: &FixedOffset,
) -> EntitlementDisplay {
    match expires_at {
        None => EntitlementDisplay::NotActivated,
        Some(expiry) if !is_active(Some(expiry), now) => EntitlementDisplay::Expired,
        Some(expiry) => EntitlementDisplay::ActiveUntil(expiry.local_date(offset)),
    }
}

/// Whole days left, rounded up. Zero when not active.
pub fn days_remaining(expires_at: Option<Timestamp>, now: Timestamp) -> u32 {
    match expires_at {
        Some(expiry) if is_active(Some(expiry), now) => {
            let millis = expiry.duration_since(&now).num_milliseconds();
            let day = 86_400_000i64;
            let days = (millis + day - 1) / day;
            u32::try_from(days).unwrap_or(u32::MAX)
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn now() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap())
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn missing_expiry_is_not_activated() {
        let display = present(None, now(), &utc());
        assert_eq!(display, EntitlementDisplay::NotActivated);
        assert_eq!(display.to_string(), "not activated");
    }

    #[test]
    fn expiry_at_now_is_expired() {
        let display = present(Some(now()), now(), &utc());
        assert_eq!(display.to_string(), "expired");
    }

    #[test]
    fn active_expiry_formats_as_date() {
        let expiry = now().offset_by(Duration::days(30));
        let display = present(Some(expiry), now(), &utc());
        assert!(display.is_active());
        assert_eq!(display.to_string(), "2026-11-18");
    }

    #[test]
    fn date_uses_viewer_offset() {
        // 2026-10-20 18:00 UTC is 2026-10-21 02:00 in UTC+8.
        let expiry = Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 10, 20, 18, 0, 0).unwrap());
        let east = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(present(Some(expiry), now(), &east).to_string(), "2026-10-21");
        assert_eq!(present(Some(expiry), now(), &utc()).to_string(), "2026-10-20");
    }

    #[test]
    fn display_serializes_with_state_tag() {
        let expiry = now().offset_by(Duration::days(1));
        let json = serde_json::to_value(present(Some(expiry), now(), &utc())).unwrap();
        assert_eq!(json["state"], "active_until");
        assert_eq!(json["until"], "2026-10-20");

        let json = serde_json::to_value(EntitlementDisplay::Expired).unwrap();
        assert_eq!(json["state"], "expired");
    }

    #[test]
    fn days_remaining_rounds_up() {
        let expiry = now().offset_by(Duration::hours(25));
        assert_eq!(days_remaining(Some(expiry), now()), 2);
        assert_eq!(days_remaining(Some(now().offset_by(Duration::days(10))), now()), 10);
    }

    #[test]
    fn days_remaining_is_zero_when_inactive() {
        assert_eq!(days_remaining(None, now()), 0);
        assert_eq!(days_remaining(Some(now()), now()), 0);
    }
}
