#![forbid(unsafe_code)]

use std::time::Duration;

const DEFAULT_LISTING_TTL: Duration = Duration::from_secs(60 * 60);
const DEFAULT_INVALIDATE_ATTEMPTS: u32 = 3;
const DEFAULT_INVALIDATE_BACKOFF: Duration = Duration::from_millis(20);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Lifetime of a cached listing. A tunable; correctness never depends on it.
    pub listing_ttl: Duration,
    /// How many times a failed invalidation is tried before the mutation reports
    /// `CacheUnavailable`. Values below 1 are treated as 1.
    pub invalidate_attempts: u32,
    /// Pause between invalidation attempts, multiplied by the attempt number.
    pub invalidate_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            listing_ttl: DEFAULT_LISTING_TTL,
            invalidate_attempts: DEFAULT_INVALIDATE_ATTEMPTS,
            invalidate_backoff: DEFAULT_INVALIDATE_BACKOFF,
        }
    }
}
