//! Storage backend and caching decorator.
//!
//! The repository contract lives in `courtside_core::storage`. This module
//! provides the in-memory document store and the generic cached decorator
//! that every entity repository is wrapped in.

pub mod cached;
pub mod inmemory;

pub use cached::CachedRepository;
pub use inmemory::InMemoryStore;
