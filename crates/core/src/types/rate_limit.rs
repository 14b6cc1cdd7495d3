//! Client-side rate-limit cooldown data.

use serde::{Deserialize, Serialize};

/// Remaining cooldown for an endpoint after a 429 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    /// Whole seconds left before the endpoint may be retried (rounded up).
    pub remaining_time: u64,
    /// Expiry timestamp in milliseconds since the Unix epoch.
    pub expiry_time: i64,
}

impl RateLimitStatus {
    /// Build the status for a marker expiring at `expiry_time`, observed at `now`.
    ///
    /// Returns `None` once the marker has expired (`expiry_time <= now`).
    #[must_use]
    pub fn at(expiry_time: i64, now: i64) -> Option<Self> {
        let remaining_ms = expiry_time.checked_sub(now)?;
        if remaining_ms <= 0 {
            return None;
        }

        let remaining_ms = u64::try_from(remaining_ms).ok()?;
        Some(Self {
            remaining_time: remaining_ms.div_ceil(1000),
            expiry_time,
        })
    }
}
