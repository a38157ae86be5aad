//! Registry lookup module.
//!
//! Queries PyPI-style JSON endpoints for package existence, extracts
//! metadata from taken names, and caches outcomes to avoid duplicate
//! API calls.

pub mod cache;
pub mod metadata;
pub mod pypi;

pub use cache::HttpCache;
pub use pypi::{PypiClient, PYPI, TEST_PYPI};
