use thiserror::Error;

use super::Role;

/// Reasons a token fails the authorization check.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No or invalid token")]
    MissingToken,

    #[error("No or invalid token")]
    InvalidToken,

    #[error("Invalid token")]
    MissingClaim(&'static str),

    #[error("Invalid token")]
    InactiveAccount,

    #[error("Token expired")]
    TokenExpired,

    #[error("Insufficient role: requires {required}")]
    InsufficientRole { required: Role },

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Maps an [`AuthError`] to an HTTP status code.
///
/// Authentication failures are 401, an authenticated caller with too little
/// privilege is 403, and signing failures are 500.
pub fn auth_error_to_status_code(error: &AuthError) -> u16 {
    match error {
        AuthError::MissingToken
        | AuthError::InvalidToken
        | AuthError::MissingClaim(_)
        | AuthError::InactiveAccount
        | AuthError::TokenExpired => 401,
        AuthError::InsufficientRole { .. } => 403,
        AuthError::Signing(_) => 500,
    }
}
