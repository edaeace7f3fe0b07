//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Days, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
///
/// Entitlement arithmetic never reads the wall clock on its own; callers pass a
/// `Timestamp` for "now" so every rule stays deterministic under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Adds whole calendar days, keeping the time of day.
    ///
    /// Returns `None` when the result falls outside chrono's representable range.
    pub fn checked_add_days(&self, days: u32) -> Option<Self> {
        self.0.checked_add_days(Days::new(u64::from(days))).map(Self)
    }

    /// Subtracts whole calendar days, keeping the time of day.
    pub fn checked_sub_days(&self, days: u32) -> Option<Self> {
        self.0.checked_sub_days(Days::new(u64::from(days))).map(Self)
    }

    /// Offsets by an arbitrary signed duration.
    pub fn offset_by(&self, duration: Duration) -> Self {
        Self(self.0 + duration)
    }

    /// Calendar date of this instant as seen from the given UTC offset.
    pub fn local_date(&self, offset: &FixedOffset) -> NaiveDate {
        self.0.with_timezone(offset).date_naive()
    }

    /// Creates a timestamp from Unix milliseconds.
    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis).map(Self)
    }

    /// Returns the timestamp as Unix milliseconds.
    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn ordering_helpers_agree_with_ord() {
        let earlier = at(2026, 1, 1, 0);
        let later = at(2026, 1, 2, 0);

        assert!(earlier.is_before(&later));
        assert!(later.is_after(&earlier));
        assert!(earlier < later);
        assert!(!earlier.is_after(&earlier));
    }

    #[test]
    fn add_days_crosses_month_and_leap_day() {
        let ts = at(2028, 2, 20, 9);
        let later = ts.checked_add_days(10).unwrap();

        assert_eq!(later.as_datetime().month(), 3);
        assert_eq!(later.as_datetime().day(), 1);
        assert_eq!(later.as_datetime().hour(), 9);
    }

    #[test]
    fn add_days_matches_whole_day_durations_in_utc() {
        let ts = at(2026, 10, 19, 12);
        let later = ts.checked_add_days(40).unwrap();
        assert_eq!(later.duration_since(&ts), Duration::days(40));
    }

    #[test]
    fn add_days_overflow_returns_none() {
        let max = Timestamp::from_datetime(DateTime::<Utc>::MAX_UTC);
        assert!(max.checked_add_days(1).is_none());
    }

    #[test]
    fn sub_days_moves_backwards() {
        let ts = at(2026, 3, 5, 0);
        assert_eq!(ts.checked_sub_days(5).unwrap(), at(2026, 2, 28, 0));
    }

    #[test]
    fn local_date_respects_offset() {
        // 2026-01-31 20:00 UTC is already Feb 1st in UTC+8.
        let ts = at(2026, 1, 31, 20);
        let east = FixedOffset::east_opt(8 * 3600).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();

        assert_eq!(ts.local_date(&east), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(ts.local_date(&utc), NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
    }

    #[test]
    fn unix_millis_roundtrip() {
        let ts = Timestamp::from_unix_millis(1_705_276_800_123).unwrap();
        assert_eq!(ts.as_unix_millis(), 1_705_276_800_123);
    }

    #[test]
    fn serializes_as_rfc3339_string() {
        let ts = at(2024, 1, 15, 10);
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15T10:00:00"));

        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
