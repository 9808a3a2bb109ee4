//! Mini-program session exchange for downstream corps

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::WorkResult;

const TRANSFER_SESSION_PATH: &str = "/cgi-bin/miniprogram/transfer_session";

#[derive(Debug, Serialize)]
struct TransferSessionRequest<'a> {
    userid: &'a str,
    session_key: &'a str,
}

/// A mini-program session re-issued for the downstream corp
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransferredSession {
    #[serde(rename = "userid")]
    pub user_id: String,
    pub session_key: String,
}

/// Session exchange, authenticated with the corp chain token
#[derive(Debug, Clone)]
pub struct Auth {
    context: Context,
}

impl Auth {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    /// Convert an upstream mini-program session into the downstream corp's.
    ///
    /// # Errors
    /// Credential, transport, decode or API errors.
    pub async fn transfer_session(
        &self,
        user_id: &str,
        session_key: &str,
    ) -> WorkResult<TransferredSession> {
        self.context
            .post_api(
                TRANSFER_SESSION_PATH,
                &[],
                &TransferSessionRequest { userid: user_id, session_key },
            )
            .await
    }
}
