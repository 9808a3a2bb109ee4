//! WeCom (enterprise WeChat) API clients.
//!
//! [`Work`] wires a [`WorkConfig`] and a cache store into the corp
//! credential handle; resource clients ([`oauth::OAuth`], [`agent::Agent`],
//! [`corpchain::CorpChain`]) borrow that credential through a shared
//! [`Context`].
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use wecom_common::MemoryCacheStore;
//! use wecom_work::{Work, WorkConfig};
//!
//! # async fn run() -> wecom_work::WorkResult<()> {
//! let config = WorkConfig::new("ww-corp", "corp-secret").with_agent_id(1_000_002);
//! let work = Work::new(config, Some(Arc::new(MemoryCacheStore::new())))?;
//!
//! let agents = work.agent().list().await?;
//! let chain = work.corp_chain("ww-child", 1_000_002, 1)?;
//! let chains = chain.get_chain_list().await?;
//! # let _ = (agents, chains);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod agent;
pub mod config;
pub mod context;
pub mod corpchain;
mod error;
pub mod oauth;
mod work;

pub use config::WorkConfig;
pub use context::Context;
pub use error::{WorkError, WorkResult};
pub use work::Work;
pub use wecom_common::credential::TicketKind;
