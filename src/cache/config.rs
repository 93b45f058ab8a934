use std::time::Duration;

use smart_default::SmartDefault;

#[derive(Debug, Clone, SmartDefault)]
pub struct CacheConfig {
    /// Maximum age of a snapshot before the next read refetches.
    #[default(_code = "Duration::from_secs(60 * 60)")]
    pub ttl: Duration,

    #[default(_code = "Duration::from_secs(10)")]
    pub fetch_timeout: Duration,

    /// Answer reads with the last good snapshot when a fetch fails.
    pub serve_stale_on_error: bool,
}
