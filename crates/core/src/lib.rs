//! Functional core of the courtside shop backend.
//!
//! Pure types and functions shared by the server and auth crates: shop
//! documents, the repository port, cache configuration and the role-based
//! authorization rules.

pub mod auth;
pub mod cache;
pub mod shop;
pub mod storage;
