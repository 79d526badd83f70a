//! In-memory document store.
//!
//! Keeps every entity kind in its own `HashMap` behind `Arc<RwLock<_>>`.
//! Data is lost when the process exits.

mod repository;

pub use repository::InMemoryStore;
