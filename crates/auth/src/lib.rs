//! Token-based authorization for courtside.
//!
//! This crate provides:
//! - HMAC-SHA256 session tokens ([`TokenService`])
//! - The role gate every protected operation passes ([`AuthorizationGate`])
//! - Register/login routes backed by a user repository
//! - Axum extractors for bearer tokens and role requirements

mod config;
mod error;
mod extractors;
mod gate;
mod handlers;
mod password;
mod state;
mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::{
    Authorized, BearerToken, RequireAdmin, RequireClient, RequireWorker, RequiredRole,
};
pub use gate::AuthorizationGate;
pub use handlers::{auth_routes, LoginRequest, RegisterRequest, TokenResponse};
pub use password::{hash_password, verify_password};
pub use state::AuthState;
pub use token::TokenService;
