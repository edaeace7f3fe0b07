//! Entitlement accumulation.
//!
//! A grant always extends from the later of the current expiry and the
//! redemption moment, so time left on an active entitlement is never lost
//! and a lapsed entitlement restarts from the redemption moment.

use crate::domain::foundation::{Timestamp, ValidationError};

use super::window::is_active;

/// Computes the expiry that results from adding `grant_days` to an entitlement.
///
/// Day arithmetic is calendar-based (chrono `Days`), not `days * 86400` seconds.
///
/// # Errors
///
/// - `OutOfRange` if `grant_days` is zero
/// - `InvalidFormat` if the result is not representable
pub fn extend(
    current_expires_at: Option<Timestamp>,
    grant_days: u32,
    now: Timestamp,
) -> Result<Timestamp, ValidationError> {
    if grant_days == 0 {
        return Err(ValidationError::out_of_range(
            "grant_days",
            1,
            i64::from(u32::MAX),
            0,
        ));
    }

    let base = match current_expires_at {
        Some(expiry) if is_active(Some(expiry), now) => expiry,
        _ => now,
    };

    base.checked_add_days(grant_days).ok_or_else(|| {
        ValidationError::invalid_format("expires_at", "extended expiry is out of range")
    })
}
