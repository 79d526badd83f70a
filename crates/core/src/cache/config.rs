use std::time::Duration;

/// Default maximum number of entries per cache.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Default sliding expiry after last access.
pub const DEFAULT_TTL: Duration = Duration::from_millis(60_000);

/// Default period of the full-refresh job.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Capacity and staleness bounds of a single cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub max_entries: usize,
    /// Sliding TTL: reset on every successful read.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: DEFAULT_TTL,
        }
    }
}

/// Whether, and how often, a cached repository reloads its full snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshJobConfig {
    pub enabled: bool,
    pub interval: Duration,
}

impl RefreshJobConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn every(interval: Duration) -> Self {
        Self {
            enabled: true,
            interval,
        }
    }
}

impl Default for RefreshJobConfig {
    fn default() -> Self {
        Self::disabled()
    }
}
