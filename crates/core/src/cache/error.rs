use thiserror::Error;

/// Errors that can occur when building caches or their refresh jobs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache capacity must be greater than zero")]
    ZeroCapacity,
    #[error("Refresh interval must be greater than zero")]
    ZeroRefreshInterval,
    #[error("Refresh job already running for {0} cache")]
    RefreshJobAlreadyRunning(&'static str),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
