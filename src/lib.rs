//! nscout - PyPI package name availability checker.
//!
//! Checks whether package names are already registered on PyPI and
//! TestPyPI, reports one unified status per name, and extracts package
//! metadata for taken names:
//! - Each name is looked up on both indexes concurrently.
//! - Heterogeneous HTTP outcomes classify into taken / not taken / error.
//! - Lookup outcomes are cached (failures too) and concurrent lookups for
//!   the same URL are coalesced into one request.
//!
//! # Example
//!
//! ```no_run
//! use nscout::{Config, NameChecker};
//!
//! #[tokio::main]
//! async fn main() {
//!     let checker = NameChecker::new(&Config::default()).unwrap();
//!     let result = checker.check_name("my-package-name").await;
//!     println!("{:?}", result.status);
//! }
//! ```

pub mod checker;
pub mod config;
pub mod notify;
pub mod registry;
pub mod types;

pub use checker::{exit_code, NameChecker};
pub use config::Config;
pub use registry::{HttpCache, PypiClient, PYPI, TEST_PYPI};
pub use types::{
    AggregateResult, ErrorKind, ErrorRecord, Metadata, NscoutError, RegistryVerdict, Result,
    Status,
};
