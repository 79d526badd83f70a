use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use courtside_core::auth::auth_error_to_status_code;
use courtside_core::shop::ValidationError;
use courtside_core::storage::{repository_error_to_status_code, RepositoryError};
use thiserror::Error;

/// Auth errors for the courtside_auth crate.
///
/// This wraps the core `AuthError` and adds the failures of the login and
/// registration flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Rejection from the authorization rules or token signing.
    #[error(transparent)]
    Core(#[from] courtside_core::auth::AuthError),

    /// User lookup or persistence failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Registration payload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl AuthError {
    /// HTTP status for this error. Shared with the server's error type so
    /// auth rejections keep their codes outside the auth routes.
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            AuthError::Core(core_err) => auth_error_to_status_code(core_err),
            AuthError::Repository(repo_err) => repository_error_to_status_code(repo_err),
            AuthError::Validation(_) => 400,
            AuthError::InvalidCredentials | AuthError::AccountInactive => 401,
            AuthError::EmailTaken(_) => 409,
            AuthError::PasswordHash(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Auth error: {}", self);
            return (status, "Internal server error".to_string()).into_response();
        }

        (status, self.to_string()).into_response()
    }
}
