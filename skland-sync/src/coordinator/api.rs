//! Upstream seams used by the coordinator.

use std::sync::Arc;

use async_trait::async_trait;
use skland_api::{Credential, PlayerStatus, SignInResult, SklandAuth, SklandClient};

/// Signed game endpoints bound to one session.
#[async_trait]
pub trait PlayerApi: Send + Sync {
    async fn fetch_player_info(&self, uid: &str) -> skland_api::Result<PlayerStatus>;

    async fn sign(&self, uid: &str, channel_master_id: &str) -> skland_api::Result<SignInResult>;

    /// Credential the next request will be signed with.
    fn credential(&self) -> Arc<Credential>;

    /// Swap the session wholesale.
    fn replace_credential(&self, credential: Credential);
}

/// Credential exchange endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn refresh_token(&self, cred: &str) -> skland_api::Result<String>;

    async fn authenticate(&self, user_token: &str) -> skland_api::Result<Credential>;
}

#[async_trait]
impl PlayerApi for SklandClient {
    async fn fetch_player_info(&self, uid: &str) -> skland_api::Result<PlayerStatus> {
        self.get_player_info(uid).await
    }

    async fn sign(&self, uid: &str, channel_master_id: &str) -> skland_api::Result<SignInResult> {
        SklandClient::sign(self, uid, channel_master_id).await
    }

    fn credential(&self) -> Arc<Credential> {
        SklandClient::credential(self)
    }

    fn replace_credential(&self, credential: Credential) {
        SklandClient::replace_credential(self, credential);
    }
}

#[async_trait]
impl AuthApi for SklandAuth {
    async fn refresh_token(&self, cred: &str) -> skland_api::Result<String> {
        SklandAuth::refresh_token(self, cred).await
    }

    async fn authenticate(&self, user_token: &str) -> skland_api::Result<Credential> {
        SklandAuth::authenticate(self, user_token).await
    }
}
