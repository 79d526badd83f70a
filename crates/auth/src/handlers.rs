//! HTTP handlers for auth routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use courtside_core::auth::{Role, TokenClaims};
use courtside_core::shop::{validate_user, User, ValidationError};
use courtside_core::storage::{RepositoryError, UserRepositoryExt};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::extractors::{Authorized, RequireClient};
use crate::password::{hash_password, verify_password};
use crate::AuthState;

/// Registration payload. New accounts are always clients.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Creates the auth router.
///
/// Routes:
/// - `POST /auth/register` - Create a client account and return a token
/// - `POST /auth/login` - Exchange email and password for a token
/// - `GET /auth/me` - Claims of the current token
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    if payload.password.trim().is_empty() {
        return Err(ValidationError::EmptyField("password").into());
    }

    let candidate = User::new(
        payload.name,
        payload.surname,
        payload.email,
        String::new(),
        Role::Client,
    );
    validate_user(&candidate)?;

    if state.users.find_by_email(&candidate.email).await?.is_some() {
        return Err(AuthError::EmailTaken(candidate.email));
    }

    let user = User {
        password_hash: hash_password(&payload.password)?,
        ..candidate
    };
    // The pre-check above races with concurrent registrations; the store
    // enforces email uniqueness on write.
    let saved = state.users.save(&user).await.map_err(|err| match err {
        RepositoryError::AlreadyExists { .. } => AuthError::EmailTaken(user.email.clone()),
        other => other.into(),
    })?;
    let token = state.tokens.issue(&saved.identity())?;

    tracing::info!(user_uuid = %saved.uuid, "Registered new client");

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let user = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&payload.password, &user.password_hash) {
        tracing::warn!(user_uuid = %user.uuid, "Login with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    if !user.active {
        tracing::warn!(user_uuid = %user.uuid, "Login attempt on inactive account");
        return Err(AuthError::AccountInactive);
    }

    let token = state.tokens.issue(&user.identity())?;
    tracing::debug!(user_uuid = %user.uuid, profile = %user.profile, "Issued session token");

    Ok(Json(TokenResponse { token }))
}

async fn me(auth: Authorized<RequireClient>) -> Json<TokenClaims> {
    Json(auth.into_claims())
}
