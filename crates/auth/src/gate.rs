//! Role-based authorization gate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use courtside_core::auth::{authorize, AuthError, Role, TokenClaims};

use crate::token::TokenService;

/// Checks a bearer token against a minimum required role.
///
/// Stateless and synchronous: it only verifies the signature and evaluates
/// the claims, so it never touches stored data and needs no locking.
#[derive(Clone)]
pub struct AuthorizationGate {
    tokens: Arc<TokenService>,
}

impl AuthorizationGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Allows the call if `token` carries at least the `required` role.
    pub fn check(&self, token: Option<&str>, required: Role) -> Result<TokenClaims, AuthError> {
        self.check_at(token, required, Utc::now())
    }

    /// Same as [`check`](Self::check), evaluated at `now`.
    pub fn check_at(
        &self,
        token: Option<&str>,
        required: Role,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        let claims = self.tokens.verify(token).ok_or(AuthError::InvalidToken)?;

        match authorize(&claims, required, now) {
            Ok(_) => Ok(claims),
            Err(err) => {
                tracing::warn!(
                    subject = %claims.id,
                    required = %required,
                    reason = ?err,
                    "Authorization denied"
                );
                Err(err)
            }
        }
    }
}
