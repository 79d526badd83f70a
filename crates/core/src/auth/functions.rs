use chrono::{DateTime, Duration, Utc};

use super::{AuthError, Role, TokenClaims};

/// Lifetime of an issued token.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Calculate token expiry from its issuance time.
pub fn token_expiry(issued_at: DateTime<Utc>) -> DateTime<Utc> {
    issued_at + Duration::hours(TOKEN_TTL_HOURS)
}

/// Check if a token has expired. A token is expired from its `exp` second on.
pub fn is_token_expired(claims: &TokenClaims, now: DateTime<Utc>) -> bool {
    now.timestamp() >= claims.exp
}

/// Decides whether verified `claims` grant access at the `required` level.
///
/// Checks run in a fixed order so that the first failing rule determines the
/// rejection: claim presence, account activity, expiry, then role.
pub fn authorize(
    claims: &TokenClaims,
    required: Role,
    now: DateTime<Utc>,
) -> Result<Role, AuthError> {
    let profile = claims.profile.ok_or(AuthError::MissingClaim("profile"))?;
    let active = claims.active.ok_or(AuthError::MissingClaim("active"))?;

    if !active {
        return Err(AuthError::InactiveAccount);
    }

    if is_token_expired(claims, now) {
        return Err(AuthError::TokenExpired);
    }

    if !profile.satisfies(required) {
        return Err(AuthError::InsufficientRole { required });
    }

    Ok(profile)
}
