//! Session token issuance and verification.
//!
//! Tokens are JWTs signed with HMAC-SHA256 using the pre-shared secret from
//! [`AuthConfig`](crate::AuthConfig).

use chrono::{DateTime, Utc};
use courtside_core::auth::{AuthError, Identity, TokenClaims};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Issues and verifies signed session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Creates a token service keyed with `secret`.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is judged by the authorization gate so that it can report
        // "token expired" separately from a bad signature.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issues a token for `identity`, valid for 24 hours from now.
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issues a token for `identity` as if the current time were `issued_at`.
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims::for_identity(identity, issued_at);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verifies the token signature and decodes its claims.
    ///
    /// Returns `None` for malformed tokens, signature mismatches, other
    /// algorithms and claim payloads that do not decode. Expiry is not
    /// checked here.
    pub fn verify(&self, token: &str) -> Option<TokenClaims> {
        match decode::<TokenClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(err) => {
                tracing::debug!(error = %err, "Token verification failed");
                None
            }
        }
    }
}
