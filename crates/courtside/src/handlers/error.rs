use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use courtside_core::auth::{auth_error_to_status_code, AuthError};
use courtside_core::shop::ValidationError;
use courtside_core::storage::{repository_error_to_status_code, RepositoryError};

/// Handler error wrapping `anyhow::Error`.
///
/// Known domain errors are downcast to pick the status code; anything else
/// is a 500 whose details only go to the log.
pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status_code(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<courtside_auth::AuthError>() {
            return err.status_code();
        }

        let code = if let Some(err) = self.0.downcast_ref::<AuthError>() {
            auth_error_to_status_code(err)
        } else if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            repository_error_to_status_code(err)
        } else if self.0.downcast_ref::<ValidationError>().is_some() {
            400
        } else {
            500
        };

        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
            return (status, "Internal server error").into_response();
        }

        (status, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
