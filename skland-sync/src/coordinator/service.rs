//! Per-account poll and recovery state machine.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use skland_api::{Credential, PlayerStatus, SignInResult, SklandError};
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, instrument, warn};

use super::api::{AuthApi, PlayerApi};
use super::error::PollError;
use super::status::{CoordinatorState, CoordinatorStatus};
use crate::credentials::CredentialStore;

/// The game character a coordinator polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountIdentity {
    pub uid: String,
    pub nickname: String,
    /// Sent as `gameId` on sign-in.
    pub channel_master_id: String,
}

/// Polls one account and keeps its session alive.
///
/// Every operation that may replace the credential runs under one async
/// mutex, so a sign-in issued while a poll is recovering waits for it.
pub struct AccountCoordinator {
    account: AccountIdentity,
    player: Arc<dyn PlayerApi>,
    auth: Arc<dyn AuthApi>,
    store: Arc<dyn CredentialStore>,
    /// User token for full re-authentication.
    user_token: RwLock<Option<String>>,
    recovery_lock: Mutex<()>,
    next_generation: AtomicU64,
    published_generation: AtomicU64,
    snapshot_tx: watch::Sender<Option<Arc<PlayerStatus>>>,
    status_tx: watch::Sender<CoordinatorStatus>,
}

impl std::fmt::Debug for AccountCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCoordinator")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl AccountCoordinator {
    pub fn new(
        account: AccountIdentity,
        user_token: Option<String>,
        player: Arc<dyn PlayerApi>,
        auth: Arc<dyn AuthApi>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (status_tx, _) = watch::channel(CoordinatorStatus::default());
        Self {
            account,
            player,
            auth,
            store,
            user_token: RwLock::new(user_token),
            recovery_lock: Mutex::new(()),
            next_generation: AtomicU64::new(0),
            published_generation: AtomicU64::new(0),
            snapshot_tx,
            status_tx,
        }
    }

    pub fn account(&self) -> &AccountIdentity {
        &self.account
    }

    pub fn uid(&self) -> &str {
        &self.account.uid
    }

    /// Latest successful snapshot.
    pub fn snapshot(&self) -> Option<Arc<PlayerStatus>> {
        self.snapshot_tx.borrow().clone()
    }

    pub fn status(&self) -> CoordinatorStatus {
        self.status_tx.borrow().clone()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Option<Arc<PlayerStatus>>> {
        self.snapshot_tx.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<CoordinatorStatus> {
        self.status_tx.subscribe()
    }

    /// Fetch player info, recovering the session if it was rejected.
    #[instrument(skip(self), fields(uid = %self.account.uid))]
    pub async fn poll(&self) -> Result<Arc<PlayerStatus>, PollError> {
        let _guard = self.recovery_lock.lock().await;
        self.poll_locked().await
    }

    async fn poll_locked(&self) -> Result<Arc<PlayerStatus>, PollError> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_state(CoordinatorState::Fetching);

        match self.fetch_with_recovery().await {
            Ok(status) => {
                let status = Arc::new(status);
                self.publish(generation, Arc::clone(&status));
                debug!(
                    sanity = status.sanity.current,
                    generation, "Player snapshot updated"
                );
                Ok(status)
            }
            Err(e) => {
                if e.requires_reconfiguration() {
                    error!(error = %e, "Session could not be recovered, a new user token is required");
                } else {
                    warn!(error = %e, "Poll failed, will retry on the next tick");
                }
                self.status_tx.send_modify(|s| s.record_failure(&e));
                Err(e)
            }
        }
    }

    /// Publish a snapshot unless a newer one was already published.
    fn publish(&self, generation: u64, status: Arc<PlayerStatus>) -> bool {
        let previous = self
            .published_generation
            .fetch_max(generation, Ordering::SeqCst);
        if previous > generation {
            debug!(generation, previous, "Discarding superseded poll result");
            return false;
        }

        let fetched_at = status.fetched_at;
        self.snapshot_tx.send_replace(Some(status));
        self.status_tx.send_modify(|s| s.record_success(fetched_at));
        true
    }

    /// Fetch, then refresh and retry, then re-authenticate and retry.
    async fn fetch_with_recovery(&self) -> Result<PlayerStatus, PollError> {
        match self.player.fetch_player_info(&self.account.uid).await {
            Ok(status) => return Ok(status),
            Err(e) if e.is_unauthorized() => {
                info!(reason = %e, "Session rejected, starting recovery");
            }
            Err(e) => return Err(e.into()),
        }

        self.set_state(CoordinatorState::AuthRecovering);

        match self.refresh_session().await {
            Ok(()) => match self.player.fetch_player_info(&self.account.uid).await {
                Ok(status) => {
                    info!("Session recovered with a refreshed token");
                    return Ok(status);
                }
                Err(e) if e.is_unauthorized() => {
                    warn!(reason = %e, "Refreshed token was rejected as well");
                }
                Err(e) => return Err(e.into()),
            },
            Err(e) => warn!(error = %e, "Token refresh failed"),
        }

        self.reauthenticate().await?;
        match self.player.fetch_player_info(&self.account.uid).await {
            Ok(status) => {
                info!("Session recovered by re-authentication");
                Ok(status)
            }
            Err(e) if e.is_unauthorized() => Err(PollError::TerminalAuthFailure(format!(
                "new session rejected: {e}"
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn refresh_session(&self) -> Result<(), SklandError> {
        let current = self.player.credential();
        let token = self.auth.refresh_token(&current.cred).await?;
        self.install_credential(current.with_token(token)).await;
        Ok(())
    }

    async fn reauthenticate(&self) -> Result<(), PollError> {
        let Some(user_token) = self.user_token.read().clone() else {
            return Err(PollError::TerminalAuthFailure(
                "no user token configured for re-authentication".to_string(),
            ));
        };

        let credential = self
            .auth
            .authenticate(&user_token)
            .await
            .map_err(|e| PollError::TerminalAuthFailure(e.to_string()))?;
        self.install_credential(credential).await;
        Ok(())
    }

    /// Swap the session in and hand it to the store. A transient store
    /// failure is retried once; store failures are logged only.
    async fn install_credential(&self, credential: Credential) {
        self.player.replace_credential(credential.clone());
        let mut saved = self.store.save(&self.account.uid, &credential).await;
        if let Err(e) = &saved {
            if e.is_transient() {
                debug!(error = %e, "Retrying credential write");
                saved = self.store.save(&self.account.uid, &credential).await;
            }
        }
        if let Err(e) = saved {
            warn!(error = %e, "Failed to persist credential");
        }
    }

    /// Daily attendance. Never fails: errors become an unsuccessful result.
    ///
    /// A rejected session triggers one full poll (with its recovery) and one
    /// more attempt.
    #[instrument(skip(self), fields(uid = %self.account.uid))]
    pub async fn sign_in(&self) -> SignInResult {
        let _guard = self.recovery_lock.lock().await;
        let uid = &self.account.uid;
        let channel = &self.account.channel_master_id;

        match self.player.sign(uid, channel).await {
            Ok(result) => return result,
            Err(e) if e.is_unauthorized() => {
                info!(reason = %e, "Sign-in rejected, refreshing session first");
            }
            Err(e) => return SignInResult::failed(format!("签到失败: {e}")),
        }

        if let Err(e) = self.poll_locked().await {
            return SignInResult::failed(format!("签到失败: {e}"));
        }

        match self.player.sign(uid, channel).await {
            Ok(result) => result,
            Err(e) => SignInResult::failed(format!("签到失败: {e}")),
        }
    }

    /// Re-authenticate with a new user token and poll.
    #[instrument(skip(self, user_token), fields(uid = %self.account.uid))]
    pub async fn reconfigure(&self, user_token: String) -> Result<Arc<PlayerStatus>, PollError> {
        let _guard = self.recovery_lock.lock().await;

        let credential = self
            .auth
            .authenticate(&user_token)
            .await
            .map_err(|e| PollError::TerminalAuthFailure(e.to_string()))?;
        self.install_credential(credential).await;
        *self.user_token.write() = Some(user_token);
        self.status_tx
            .send_modify(|s| s.requires_reconfiguration = false);
        info!("Account reconfigured with a new user token");

        self.poll_locked().await
    }

    fn set_state(&self, state: CoordinatorState) {
        self.status_tx.send_modify(|s| s.state = state);
    }
}
