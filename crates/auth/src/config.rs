/// Secret used when `JWT_SECRET` is not set. Only suitable for local runs.
const DEV_JWT_SECRET: &str = "courtside-dev-secret-change-me";

/// Complete auth configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// Pre-shared HMAC key for signing session tokens.
    pub jwt_secret: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `JWT_SECRET`: HMAC-SHA256 signing key. Falls back to a development
    ///   key (with a warning) when unset or empty.
    pub fn from_env() -> Self {
        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, using development signing key");
                DEV_JWT_SECRET.to_string()
            }
        };

        Self { jwt_secret }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}
