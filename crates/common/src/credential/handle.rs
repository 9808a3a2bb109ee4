//! Capabilities exposed by credential handles
//!
//! Resource clients only ever see these traits. Handles that can also act as
//! their parent principal implement the narrower [`ParentTokenHandle`], so a
//! client that needs the parent token asks for that capability in its type
//! instead of downcasting.

use async_trait::async_trait;

use super::error::CredentialResult;

/// Anything that can hand out a currently valid access token
#[async_trait]
pub trait AccessTokenHandle: Send + Sync {
    /// Return a valid token, refreshing it from the provider only when the
    /// cache holds none.
    ///
    /// # Errors
    /// Returns the typed [`CredentialError`](super::CredentialError) of the
    /// failed refresh; nothing is cached on failure.
    async fn get_access_token(&self) -> CredentialResult<String>;
}

/// A delegated handle that can also authenticate as its parent principal
#[async_trait]
pub trait ParentTokenHandle: AccessTokenHandle {
    /// Return the parent principal's current token.
    ///
    /// # Errors
    /// Returns the parent handle's refresh error.
    async fn get_parent_access_token(&self) -> CredentialResult<String>;
}
