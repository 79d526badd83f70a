//! User administration beyond generic CRUD.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use courtside_auth::BearerToken;
use courtside_core::auth::Role;
use courtside_core::shop::User;
use courtside_core::storage::{Repository, RepositoryError};

use crate::handlers::AppError;
use crate::state::AppState;

/// POST /api/users/{uuid}/deactivate - Soft-deactivate a user.
///
/// Stores a new inactive version of the user. Every token of the account,
/// including ones issued before the call, is refused from then on.
pub async fn deactivate_user(
    State(state): State<AppState>,
    token: BearerToken,
    Path(uuid): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let claims = state.auth.check(token.as_deref(), Role::Admin).await?;

    let user = state
        .users
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| RepositoryError::NotFound {
            entity_type: "User",
            id: uuid.to_string(),
        })?;

    let saved = state.users.save(&user.deactivated()).await?;
    tracing::info!(user_uuid = %uuid, by = %claims.id, "User deactivated");

    Ok(Json(saved))
}
