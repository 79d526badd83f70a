use std::{env, time::Duration};

use courtside_auth::AuthConfig;
use courtside_core::cache::{
    CacheConfig, RefreshJobConfig, DEFAULT_MAX_ENTRIES, DEFAULT_REFRESH_INTERVAL, DEFAULT_TTL,
};

/// Credentials of the administrator created at startup when none exists.
#[derive(Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Capacity and sliding TTL shared by every repository cache.
    pub cache: CacheConfig,
    /// Periodic full reload of every repository cache.
    pub refresh: RefreshJobConfig,
    /// Optional bootstrap administrator.
    pub seed_admin: Option<SeedAdmin>,
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_MAX_ENTRIES` - Maximum entries per cache (default: 50)
    /// - `CACHE_TTL_MS` - Sliding cache TTL in milliseconds (default: 60,000)
    /// - `CACHE_REFRESH_ENABLED` - Run the periodic refresh job (default: false)
    /// - `CACHE_REFRESH_INTERVAL_SECONDS` - Refresh period (default: 300)
    /// - `SEED_ADMIN_EMAIL` / `SEED_ADMIN_PASSWORD` - Bootstrap admin (optional)
    /// - `JWT_SECRET` - Token signing key, see [`AuthConfig::from_env`]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok(), AuthConfig::from_env())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, auth: AuthConfig) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let cache = CacheConfig {
            max_entries: parsed("CACHE_MAX_ENTRIES")
                .map(|v| v as usize)
                .unwrap_or(DEFAULT_MAX_ENTRIES),
            ttl: parsed("CACHE_TTL_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TTL),
        };

        let refresh = RefreshJobConfig {
            enabled: lookup("CACHE_REFRESH_ENABLED")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            interval: parsed("CACHE_REFRESH_INTERVAL_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REFRESH_INTERVAL),
        };

        let seed_admin = match (lookup("SEED_ADMIN_EMAIL"), lookup("SEED_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(SeedAdmin { email, password })
            }
            _ => None,
        };

        Self {
            cache,
            refresh,
            seed_admin,
            auth,
        }
    }
}
