//! Game endpoints on top of the signed transport.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::constants::{attendance_url, binding_url, player_info_url};
use crate::credential::Credential;
use crate::error::{Result, SklandError};
use crate::http::create_client_builder;
use crate::models::{
    BindingCharacter, PlayerStatus, SignInResult, parse_awards, parse_bindings, parse_player_info,
};
use crate::transport::SignedTransport;

/// Server messages meaning today's attendance was already recorded.
const ALREADY_SIGNED_MARKERS: [&str; 3] = ["已经", "已签到", "重复签到"];

/// Attendance body; field order is signed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AttendanceRequest<'a> {
    uid: &'a str,
    game_id: &'a str,
}

/// Whether a failed attendance message reports a duplicate sign-in.
pub fn is_already_signed(message: &str) -> bool {
    ALREADY_SIGNED_MARKERS.iter().any(|m| message.contains(m))
}

/// Authenticated client for one Skland session.
pub struct SklandClient {
    transport: SignedTransport,
}

impl SklandClient {
    pub fn new(credential: Credential, timeout: Option<Duration>) -> Result<Self> {
        let client = create_client_builder(timeout)
            .build()
            .map_err(SklandError::network)?;
        Ok(Self::with_transport(SignedTransport::new(client, credential)))
    }

    pub fn with_transport(transport: SignedTransport) -> Self {
        Self { transport }
    }

    pub fn credential(&self) -> Arc<Credential> {
        self.transport.credential()
    }

    pub fn replace_credential(&self, credential: Credential) {
        self.transport.replace_credential(credential);
    }

    /// Arknights characters bound to this account.
    #[instrument(skip(self))]
    pub async fn get_binding(&self) -> Result<Vec<BindingCharacter>> {
        let payload = self.transport.get(&binding_url()).await?;
        let characters = parse_bindings(&payload)?;
        debug!(count = characters.len(), "Fetched bound characters");
        Ok(characters)
    }

    #[instrument(skip(self))]
    pub async fn get_player_info(&self, uid: &str) -> Result<PlayerStatus> {
        let payload = self.transport.get(&player_info_url(uid)).await?;
        parse_player_info(&payload, Utc::now())
    }

    /// Daily attendance.
    ///
    /// Rejections and network failures come back as an unsuccessful
    /// [`SignInResult`]. [`SklandError::Unauthorized`] is returned as `Err` so
    /// the caller can recover the session first.
    #[instrument(skip(self))]
    pub async fn sign(&self, uid: &str, channel_master_id: &str) -> Result<SignInResult> {
        let body = AttendanceRequest {
            uid,
            game_id: channel_master_id,
        };

        match self.transport.post(&attendance_url(), &body).await {
            Ok(payload) => {
                let awards = parse_awards(&payload).unwrap_or_else(|e| {
                    warn!(error = %e, "Attendance succeeded but awards could not be read");
                    Vec::new()
                });
                info!(awards = awards.len(), "Signed in");
                Ok(SignInResult::signed(awards))
            }
            Err(SklandError::RequestFailed(message)) if is_already_signed(&message) => {
                debug!("Already signed in today");
                Ok(SignInResult::already_signed())
            }
            Err(SklandError::RequestFailed(message)) => {
                warn!(%message, "Sign-in rejected");
                Ok(SignInResult::failed(format!("签到失败: {message}")))
            }
            Err(e) => Err(e),
        }
    }
}
