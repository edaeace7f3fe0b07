//! Time window evaluation for entitlement expiry.

use crate::domain::foundation::Timestamp;

/// Returns true when an entitlement expiring at `expires_at` is still in force at `now`.
///
/// A missing expiry means the entitlement was never granted. An expiry equal
/// to `now` is already expired.
pub fn is_active(expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    match expires_at {
        Some(expiry) => expiry.is_after(&now),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn base() -> Timestamp {
        Timestamp::from_unix_millis(1_790_000_000_000).unwrap()
    }

    #[test]
    fn never_granted_is_inactive() {
        assert!(!is_active(None, base()));
    }

    #[test]
    fn expiry_at_now_is_inactive() {
        let now = base();
        assert!(!is_active(Some(now), now));
    }

    #[test]
    fn expiry_one_millisecond_ahead_is_active() {
        let now = base();
        let expiry = now.offset_by(Duration::milliseconds(1));
        assert!(is_active(Some(expiry), now));
    }

    #[test]
    fn past_expiry_is_inactive() {
        let now = base();
        let expiry = now.offset_by(Duration::days(-3));
        assert!(!is_active(Some(expiry), now));
    }

    proptest! {
        #[test]
        fn activeness_matches_strict_ordering(offset_ms in -10_000_000_000i64..10_000_000_000i64) {
            let now = base();
            let expiry = now.offset_by(Duration::milliseconds(offset_ms));
            prop_assert_eq!(is_active(Some(expiry), now), offset_ms > 0);
        }
    }
}
