//! Credential cache and refresh engine
//!
//! Short-lived provider credentials are cached in a shared [`CacheStore`]
//! under deterministic keys and refreshed on demand:
//!
//! - [`DefaultAccessToken`]: official account / mini program (app id + secret)
//! - [`WorkAccessToken`]: enterprise corp (corp id + secret)
//! - [`CorpChainAccessToken`]: downstream corp, via the parent corp's token
//! - [`WorkJsTicket`]: JS-SDK ticket, via any [`AccessTokenHandle`]
//!
//! Each handle owns one refresh guard, so concurrent cache misses on the same
//! handle trigger a single provider call. Tokens are cached for
//! `expires_in - margin` (see [`TtlPolicy`]) so a cached value is never handed
//! out close to its provider-side expiry. Failures are returned as a typed
//! [`CredentialError`] and are never cached.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wecom_common::cache::MemoryCacheStore;
//! use wecom_common::credential::{AccessTokenHandle, WorkAccessToken};
//!
//! # async fn example() -> Result<(), wecom_common::credential::CredentialError> {
//! let handle = WorkAccessToken::builder()
//!     .corp_id("ww0123456789")
//!     .corp_secret("app-secret")
//!     .cache(Arc::new(MemoryCacheStore::new()))
//!     .build()?;
//!
//! let token = handle.get_access_token().await?;
//! # let _ = token;
//! # Ok(())
//! # }
//! ```
//!
//! [`CacheStore`]: crate::cache::CacheStore

mod access_token;
mod corp_chain;
mod endpoint;
mod error;
mod handle;
mod js_ticket;
mod single_flight;
mod token;

pub use access_token::{
    secret_fingerprint, DefaultAccessToken, DefaultAccessTokenBuilder, WorkAccessToken,
    WorkAccessTokenBuilder, CACHE_KEY_MINI_PROGRAM_PREFIX, CACHE_KEY_OFFICIAL_ACCOUNT_PREFIX,
    CACHE_KEY_WORK_PREFIX,
};
pub use corp_chain::{CorpChainAccessToken, CorpChainAccessTokenBuilder};
pub use endpoint::{
    ChainTokenRequest, TicketKind, TokenEndpoint, DEFAULT_OFFICIAL_API_DOMAIN,
    DEFAULT_WORK_API_DOMAIN,
};
pub use error::{
    CredentialError, CredentialResult, PROVIDER_CONCURRENCY_LIMITED, PROVIDER_FREQUENCY_LIMITED,
    PROVIDER_SYSTEM_BUSY,
};
pub use handle::{AccessTokenHandle, ParentTokenHandle};
pub use js_ticket::{WorkJsTicket, WorkJsTicketBuilder};
pub use single_flight::CredentialCache;
pub use token::{IssuedToken, RemoteToken, TtlPolicy, DEFAULT_SAFETY_MARGIN};
