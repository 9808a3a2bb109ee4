//! Wire response of the token endpoints and the TTL policy applied to it

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{CredentialError, CredentialResult};

/// Seconds subtracted from the provider's `expires_in` before caching.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(1500);

/// Response body shared by every token/ticket issuance endpoint
///
/// The token field is named `access_token` by the token endpoints, `token` by
/// some gateways and `ticket` by the JS-SDK ticket endpoints; all three
/// decode into [`RemoteToken::access_token`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteToken {
    #[serde(default, alias = "token", alias = "ticket")]
    pub access_token: String,

    #[serde(default)]
    pub expires_in: i64,

    #[serde(default)]
    pub errcode: i64,

    #[serde(default)]
    pub errmsg: String,
}

impl RemoteToken {
    /// Validate the envelope: `errcode == 0` iff the token is usable.
    ///
    /// # Errors
    /// - [`CredentialError::Provider`] when `errcode != 0`
    /// - [`CredentialError::Decode`] when `errcode == 0` but no token was sent
    pub fn into_issued(self) -> CredentialResult<IssuedToken> {
        if self.errcode != 0 {
            return Err(CredentialError::provider(self.errcode, self.errmsg));
        }
        if self.access_token.is_empty() {
            return Err(CredentialError::decode("response carried errcode 0 but no token"));
        }
        Ok(IssuedToken { value: self.access_token, expires_in: self.expires_in })
    }
}

/// A freshly issued credential value and its provider-declared lifetime
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub value: String,
    pub expires_in: i64,
}

impl IssuedToken {
    pub fn new(value: impl Into<String>, expires_in: i64) -> Self {
        Self { value: value.into(), expires_in }
    }
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// How long a freshly issued token may live in the cache store
///
/// - `expires_in > margin`: cache for `expires_in - margin`
/// - `0 < expires_in <= margin`: cache for half the lifetime (at least 1s)
/// - `expires_in <= 0`: do not cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    margin: Duration,
}

impl TtlPolicy {
    #[must_use]
    pub const fn new(margin: Duration) -> Self {
        Self { margin }
    }

    #[must_use]
    pub const fn margin(&self) -> Duration {
        self.margin
    }

    /// TTL for a token the provider declared valid for `expires_in` seconds.
    #[must_use]
    pub fn ttl_for(&self, expires_in: i64) -> Option<Duration> {
        let lifetime = u64::try_from(expires_in).ok().filter(|secs| *secs > 0)?;
        let margin = self.margin.as_secs();

        if lifetime > margin {
            Some(Duration::from_secs(lifetime - margin))
        } else {
            Some(Duration::from_secs((lifetime / 2).max(1)))
        }
    }

    /// True when `expires_in` is too short for the configured margin.
    #[must_use]
    pub fn is_clamped(&self, expires_in: i64) -> bool {
        expires_in > 0 && u64::try_from(expires_in).is_ok_and(|secs| secs <= self.margin.as_secs())
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SAFETY_MARGIN)
    }
}
