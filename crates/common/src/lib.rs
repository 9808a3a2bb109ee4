//! Shared building blocks for the WeCom SDK crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error classification shared by every crate
//! - `runtime`: async infrastructure (cache store, HTTP client, credential
//!   engine)
//! - `observability`: tracing (enabled by `runtime`)
//! - `test-utils`: instrumented mocks for downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;
#[cfg(feature = "runtime")]
pub mod credential;
#[cfg(feature = "runtime")]
pub mod http;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", all(test, feature = "runtime")))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use cache::{CacheError, CacheStore, MemoryCacheStore};
#[cfg(feature = "runtime")]
pub use credential::{
    AccessTokenHandle, CorpChainAccessToken, CredentialError, CredentialResult,
    DefaultAccessToken, ParentTokenHandle, TokenEndpoint, TtlPolicy, WorkAccessToken,
    WorkJsTicket,
};
#[cfg(feature = "foundation")]
pub use error::{ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use http::{HttpClient, HttpError};
