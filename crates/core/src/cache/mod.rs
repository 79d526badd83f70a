mod config;
mod error;

pub use config::{
    CacheConfig, RefreshJobConfig, DEFAULT_MAX_ENTRIES, DEFAULT_REFRESH_INTERVAL, DEFAULT_TTL,
};
pub use error::{CacheError, Result};
