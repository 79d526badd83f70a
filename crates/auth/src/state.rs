//! Application state for auth.

use std::sync::Arc;

use axum::extract::FromRef;
use courtside_core::auth::{AuthError as CoreAuthError, Role, TokenClaims};
use courtside_core::shop::User;
use courtside_core::storage::Repository;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::gate::AuthorizationGate;
use crate::token::TokenService;

/// Shared state for auth handlers and extractors.
#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<dyn Repository<User>>,
    pub tokens: Arc<TokenService>,
    pub gate: AuthorizationGate,
}

impl AuthState {
    /// Creates a new AuthState signing tokens with the configured secret.
    pub fn new(users: Arc<dyn Repository<User>>, config: &AuthConfig) -> Self {
        let tokens = Arc::new(TokenService::new(config.jwt_secret.as_bytes()));
        let gate = AuthorizationGate::new(tokens.clone());

        Self {
            users,
            tokens,
            gate,
        }
    }

    /// Runs the gate, then requires the token subject to still be an active
    /// account in the user store.
    ///
    /// Tokens cannot be revoked, so this is what turns a deactivation into a
    /// 401 for tokens issued before it.
    pub async fn check(
        &self,
        token: Option<&str>,
        required: Role,
    ) -> Result<TokenClaims, AuthError> {
        let claims = self.gate.check(token, required)?;
        let subject = claims.subject().ok_or(CoreAuthError::MissingClaim("id"))?;

        match self.users.find_by_uuid(subject).await? {
            Some(user) if user.active => Ok(claims),
            Some(_) => {
                tracing::warn!(user_uuid = %subject, "Token of a deactivated account");
                Err(CoreAuthError::InactiveAccount.into())
            }
            None => {
                tracing::warn!(user_uuid = %subject, "Token of an unknown account");
                Err(CoreAuthError::InactiveAccount.into())
            }
        }
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
