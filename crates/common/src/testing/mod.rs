//! Testing utilities and helpers
//!
//! - **[`mocks`]**: instrumented cache stores and token handles
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use wecom_common::credential::WorkAccessToken;
//! use wecom_common::testing::RecordingCacheStore;
//!
//! let store = Arc::new(RecordingCacheStore::new());
//! let handle = WorkAccessToken::builder()
//!     .corp_id("ww-test")
//!     .corp_secret("secret")
//!     .cache(store.clone())
//!     .build()
//!     .unwrap();
//! assert_eq!(store.set_count(), 0);
//! # let _ = handle;
//! ```

pub mod mocks;

pub use mocks::{FailingCacheStore, RecordingCacheStore, StaticTokenHandle};
