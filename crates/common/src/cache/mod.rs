//! Pluggable key-value cache stores for credentials
//!
//! Credential handles never hold token values themselves; every issued token
//! lives in a [`CacheStore`] under a key derived from the credential identity.
//! The store decides expiry: handles only trust presence or absence of a key.
//!
//! # Contract
//!
//! - `get` is a plain lookup. Absence and backend failure both read as a miss.
//! - `set` stores a value with its own time-to-live and may fail.
//! - Atomicity is only required per single `get`/`set` call.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use wecom_common::cache::{CacheStore, MemoryCacheStore};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryCacheStore::new();
//! store.set("gowechat_work__access_token_corp", "T1", Duration::from_secs(5700)).await?;
//! assert_eq!(store.get("gowechat_work__access_token_corp").await.as_deref(), Some("T1"));
//! # Ok(())
//! # }
//! ```
//!
//! Distributed deployments plug their own store (Redis, memcached) in by
//! implementing [`CacheStore`] and handing an `Arc<dyn CacheStore>` to every
//! credential handle that should share tokens.

mod memory;
mod store;

pub use memory::{MemoryCacheStore, DEFAULT_MEMORY_CAPACITY};
pub use store::{CacheError, CacheStore};
