//! Axum extractors for authorization.

use std::convert::Infallible;
use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use courtside_core::auth::{Role, TokenClaims};

use crate::error::AuthError;
use crate::AuthState;

/// Raw bearer token from the `Authorization` header, if any.
///
/// Never rejects: a missing, non-UTF-8 or non-bearer header yields `None`
/// and the gate turns that into a 401.
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        Ok(BearerToken(token))
    }
}

/// Minimum role demanded by an [`Authorized`] extractor.
pub trait RequiredRole: Send + Sync + 'static {
    const ROLE: Role;
}

pub struct RequireAdmin;
pub struct RequireWorker;
pub struct RequireClient;

impl RequiredRole for RequireAdmin {
    const ROLE: Role = Role::Admin;
}

impl RequiredRole for RequireWorker {
    const ROLE: Role = Role::Worker;
}

impl RequiredRole for RequireClient {
    const ROLE: Role = Role::Client;
}

/// Extractor for a caller holding at least `R::ROLE`.
///
/// Rejects with 401 or 403 as decided by [`AuthState::check`].
pub struct Authorized<R: RequiredRole> {
    pub claims: TokenClaims,
    _role: PhantomData<R>,
}

impl<R: RequiredRole> Authorized<R> {
    pub fn into_claims(self) -> TokenClaims {
        self.claims
    }
}

impl<S, R> FromRequestParts<S> for Authorized<R>
where
    AuthState: FromRef<S>,
    S: Send + Sync,
    R: RequiredRole,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let Ok(BearerToken(token)) = BearerToken::from_request_parts(parts, state).await;

        let claims = auth_state.check(token.as_deref(), R::ROLE).await?;

        Ok(Authorized {
            claims,
            _role: PhantomData,
        })
    }
}
