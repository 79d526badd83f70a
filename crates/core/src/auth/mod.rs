mod error;
mod functions;
mod types;

pub use error::{auth_error_to_status_code, AuthError};
pub use functions::{authorize, is_token_expired, token_expiry, TOKEN_TTL_HOURS};
pub use types::{Identity, Role, TokenClaims};
