//! In-process caches backing the cached repositories.

mod bounded;

pub use bounded::BoundedCache;
