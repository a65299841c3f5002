//! Per-account actor.
//!
//! The actor owns the poll cadence of one account. Scheduled polls and
//! mailbox commands run on the same task, one at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span};

use super::handle::{AccountHandle, DEFAULT_MAILBOX_CAPACITY};
use super::messages::AccountMessage;
use crate::coordinator::AccountCoordinator;

/// Why an actor loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorExit {
    /// `Stop` received or every handle dropped.
    Stopped,
    Cancelled,
}

pub struct AccountActor {
    coordinator: Arc<AccountCoordinator>,
    mailbox: mpsc::Receiver<AccountMessage>,
    cancellation_token: CancellationToken,
    interval: Duration,
    next_poll: Instant,
}

impl AccountActor {
    /// Spawn the actor. The first poll runs immediately.
    pub fn spawn(
        coordinator: Arc<AccountCoordinator>,
        interval: Duration,
        parent_token: &CancellationToken,
    ) -> (AccountHandle, JoinHandle<ActorExit>) {
        let (sender, mailbox) = mpsc::channel(DEFAULT_MAILBOX_CAPACITY);
        let cancellation_token = parent_token.child_token();
        let handle = AccountHandle::new(
            sender,
            Arc::clone(&coordinator),
            cancellation_token.clone(),
        );

        let span = info_span!("account", uid = %coordinator.uid());
        let actor = Self {
            coordinator,
            mailbox,
            cancellation_token,
            interval,
            next_poll: Instant::now(),
        };
        let task = tokio::spawn(actor.run().instrument(span));
        (handle, task)
    }

    pub async fn run(mut self) -> ActorExit {
        info!(
            interval_secs = self.interval.as_secs(),
            "Account actor started"
        );

        let exit = loop {
            let sleep_duration = self.next_poll.saturating_duration_since(Instant::now());
            let poll_timer = Self::create_poll_timer(sleep_duration);

            tokio::select! {
                biased;

                msg = self.mailbox.recv() => {
                    let Some(msg) = msg else {
                        debug!("All handles dropped");
                        break ActorExit::Stopped;
                    };
                    if self.handle_message(msg).await {
                        break ActorExit::Stopped;
                    }
                }

                _ = poll_timer => {
                    self.poll().await;
                }

                _ = self.cancellation_token.cancelled() => {
                    break ActorExit::Cancelled;
                }
            }
        };

        info!(?exit, "Account actor stopped");
        exit
    }

    async fn create_poll_timer(duration: Duration) {
        if duration.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(duration).await;
        }
    }

    /// Returns true when the actor should stop.
    async fn handle_message(&mut self, msg: AccountMessage) -> bool {
        debug!(message = msg.name(), "Handling message");
        match msg {
            AccountMessage::Refresh => {
                self.poll().await;
            }
            AccountMessage::SignIn { reply } => {
                let result = self.coordinator.sign_in().await;
                info!(success = result.success, message = %result.message, "Sign-in finished");
                let _ = reply.send(result);
            }
            AccountMessage::Reconfigure { user_token, reply } => {
                let outcome = self.coordinator.reconfigure(user_token).await.map(|_| ());
                self.next_poll = Instant::now() + self.interval;
                let _ = reply.send(outcome);
            }
            AccountMessage::Stop => return true,
        }
        false
    }

    async fn poll(&mut self) {
        // The coordinator logs and records failures itself.
        if let Err(e) = self.coordinator.poll().await {
            debug!(error = %e, transient = e.is_transient(), "Scheduled poll failed");
        }
        self.next_poll = Instant::now() + self.interval;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use skland_api::models::parse_player_info;
    use skland_api::{Credential, PlayerStatus, SignInResult, SklandError};

    use super::*;
    use crate::coordinator::{AccountIdentity, AuthApi, PlayerApi};
    use crate::credentials::{CredentialError, CredentialStore};
    use crate::scheduler::SendError;

    const INTERVAL: Duration = Duration::from_secs(600);

    struct CountingPlayer {
        fetches: AtomicUsize,
        credential: StdMutex<Arc<Credential>>,
    }

    #[async_trait]
    impl PlayerApi for CountingPlayer {
        async fn fetch_player_info(&self, uid: &str) -> skland_api::Result<PlayerStatus> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            parse_player_info(
                &json!({"code": 0, "data": {"status": {"uid": uid, "name": "Doctor", "level": 1}}}),
                Utc::now(),
            )
        }

        async fn sign(&self, _uid: &str, _channel: &str) -> skland_api::Result<SignInResult> {
            Ok(SignInResult::already_signed())
        }

        fn credential(&self) -> Arc<Credential> {
            self.credential.lock().unwrap().clone()
        }

        fn replace_credential(&self, credential: Credential) {
            *self.credential.lock().unwrap() = Arc::new(credential);
        }
    }

    struct NoAuth;

    #[async_trait]
    impl AuthApi for NoAuth {
        async fn refresh_token(&self, _cred: &str) -> skland_api::Result<String> {
            Err(SklandError::Auth("unused".into()))
        }

        async fn authenticate(&self, _user_token: &str) -> skland_api::Result<Credential> {
            Ok(Credential::new("cred-new", "token-new"))
        }
    }

    struct NullStore;

    #[async_trait]
    impl CredentialStore for NullStore {
        async fn save(&self, _uid: &str, _credential: &Credential) -> Result<(), CredentialError> {
            Ok(())
        }
    }

    fn spawn_actor(
        token: &CancellationToken,
    ) -> (AccountHandle, JoinHandle<ActorExit>, Arc<CountingPlayer>) {
        let player = Arc::new(CountingPlayer {
            fetches: AtomicUsize::new(0),
            credential: StdMutex::new(Arc::new(Credential::new("cred", "token"))),
        });
        let coordinator = Arc::new(AccountCoordinator::new(
            AccountIdentity {
                uid: "12345678".into(),
                nickname: "Doctor".into(),
                channel_master_id: "1".into(),
            },
            None,
            player.clone(),
            Arc::new(NoAuth),
            Arc::new(NullStore),
        ));
        let (handle, task) = AccountActor::spawn(coordinator, INTERVAL, token);
        (handle, task, player)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_poll_is_immediate() {
        let token = CancellationToken::new();
        let (handle, _task, player) = spawn_actor(&token);
        let mut snapshots = handle.coordinator().subscribe_snapshot();
        let start = Instant::now();

        snapshots.changed().await.unwrap();
        assert!(start.elapsed() < INTERVAL);
        assert_eq!(player.fetches.load(Ordering::SeqCst), 1);
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_interval() {
        let token = CancellationToken::new();
        let (handle, _task, player) = spawn_actor(&token);
        let mut snapshots = handle.coordinator().subscribe_snapshot();

        snapshots.changed().await.unwrap();
        let first = Instant::now();
        snapshots.changed().await.unwrap();

        assert!(first.elapsed() >= INTERVAL);
        assert_eq!(player.fetches.load(Ordering::SeqCst), 2);
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_polls_immediately() {
        let token = CancellationToken::new();
        let (handle, _task, player) = spawn_actor(&token);
        let mut snapshots = handle.coordinator().subscribe_snapshot();
        snapshots.changed().await.unwrap();
        let first = Instant::now();

        handle.refresh().await.unwrap();
        snapshots.changed().await.unwrap();

        assert!(first.elapsed() < INTERVAL);
        assert_eq!(player.fetches.load(Ordering::SeqCst), 2);
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_replies() {
        let token = CancellationToken::new();
        let (handle, _task, _player) = spawn_actor(&token);

        let result = handle.sign_in().await.unwrap();
        assert!(result.success);
        assert_eq!(result.message, SignInResult::ALREADY_SIGNED_MESSAGE);
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_swaps_credential() {
        let token = CancellationToken::new();
        let (handle, _task, player) = spawn_actor(&token);

        handle.reconfigure("fresh".into()).await.unwrap();
        assert_eq!(player.credential().cred, "cred-new");
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_and_cancel() {
        let token = CancellationToken::new();
        let (handle, task, _player) = spawn_actor(&token);
        handle.stop().await.unwrap();
        assert_eq!(task.await.unwrap(), ActorExit::Stopped);
        assert!(matches!(handle.refresh().await, Err(SendError::ActorStopped)));

        let token = CancellationToken::new();
        let (_handle, task, _player) = spawn_actor(&token);
        token.cancel();
        assert_eq!(task.await.unwrap(), ActorExit::Cancelled);
    }
}
