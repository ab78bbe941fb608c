//! Local record cache for offline support.
//!
//! This module provides a TMDB-agnostic caching mechanism that:
//! - Stores entities as JSON keyed by (entity type, identity)
//! - Upserts idempotently, so re-storing a page never duplicates entries
//! - Returns every call's outcome as a `Result`; deciding whether a failed
//!   write matters is left to the caller

mod error;
mod storage;
mod traits;

pub use error::CacheError;
pub use storage::{CacheStorage, NoopStorage, SqliteStorage};
pub use traits::{CacheSource, Cacheable};
