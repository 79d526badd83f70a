//! Cached repository decorator.
//!
//! Wraps any [`Repository`](courtside_core::storage::Repository) with a
//! [`BoundedCache`](crate::cache::BoundedCache) keyed by entity uuid:
//!
//! - **Reads**: Check cache first, on miss fetch from repository and populate cache
//! - **Writes**: Persist to repository, then cache the persisted value
//! - **Deletes**: Persist deletion, then invalidate the cached value
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryStore::<Order>::new());
//! let orders = Arc::new(CachedRepository::new(
//!     store,
//!     CacheConfig::default(),
//!     RefreshJobConfig::every(Duration::from_secs(300)),
//! )?);
//! let job = orders.spawn_refresh_job(shutdown.child_token())?;
//! ```

mod repository;

pub use repository::CachedRepository;
