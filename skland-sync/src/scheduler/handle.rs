//! Handle for sending commands to an account actor.

use std::sync::Arc;
use std::time::Duration;

use skland_api::SignInResult;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::messages::AccountMessage;
use crate::coordinator::{AccountCoordinator, PollError};

pub const DEFAULT_MAILBOX_CAPACITY: usize = 32;

/// Timeout for a send when the mailbox is full.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("Actor has stopped")]
    ActorStopped,
    #[error("Send operation timed out")]
    Timeout,
}

/// Cloneable handle to one account actor.
///
/// Reads go straight to the coordinator's published state; commands go
/// through the mailbox so they serialize with scheduled polls.
#[derive(Clone)]
pub struct AccountHandle {
    sender: mpsc::Sender<AccountMessage>,
    coordinator: Arc<AccountCoordinator>,
    cancellation_token: CancellationToken,
}

impl AccountHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<AccountMessage>,
        coordinator: Arc<AccountCoordinator>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            sender,
            coordinator,
            cancellation_token,
        }
    }

    pub fn uid(&self) -> &str {
        self.coordinator.uid()
    }

    pub fn coordinator(&self) -> &Arc<AccountCoordinator> {
        &self.coordinator
    }

    pub async fn send(&self, msg: AccountMessage) -> Result<(), SendError> {
        self.send_with_timeout(msg, DEFAULT_SEND_TIMEOUT).await
    }

    pub async fn send_with_timeout(
        &self,
        msg: AccountMessage,
        timeout: Duration,
    ) -> Result<(), SendError> {
        match self.sender.try_send(msg) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(msg)) => {
                match tokio::time::timeout(timeout, self.sender.reserve()).await {
                    Ok(Ok(permit)) => {
                        permit.send(msg);
                        Ok(())
                    }
                    Ok(Err(_)) => Err(SendError::ActorStopped),
                    Err(_) => Err(SendError::Timeout),
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SendError::ActorStopped),
        }
    }

    /// Ask for an immediate poll.
    pub async fn refresh(&self) -> Result<(), SendError> {
        self.send(AccountMessage::Refresh).await
    }

    /// Run the daily attendance and wait for the outcome.
    pub async fn sign_in(&self) -> Result<SignInResult, SendError> {
        let (reply, rx) = oneshot::channel();
        self.send(AccountMessage::SignIn { reply }).await?;
        rx.await.map_err(|_| SendError::ActorStopped)
    }

    /// Replace the user token and re-authenticate.
    pub async fn reconfigure(&self, user_token: String) -> crate::Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(AccountMessage::Reconfigure { user_token, reply })
            .await?;
        let outcome: Result<(), PollError> = rx.await.map_err(|_| SendError::ActorStopped)?;
        Ok(outcome?)
    }

    /// Graceful stop.
    pub async fn stop(&self) -> Result<(), SendError> {
        self.send(AccountMessage::Stop).await
    }

    /// Cancel without going through the mailbox.
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    pub fn is_alive(&self) -> bool {
        !self.sender.is_closed() && !self.cancellation_token.is_cancelled()
    }
}

impl std::fmt::Debug for AccountHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountHandle")
            .field("uid", &self.uid())
            .field("alive", &self.is_alive())
            .finish()
    }
}
