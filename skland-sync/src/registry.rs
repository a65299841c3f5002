//! Process-wide account registry.
//!
//! Owns one actor per configured account and answers the queries of the
//! HTTP surface and the CLI. Lookups are by game uid; listing keeps the
//! registration order.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use skland_api::SignInResult;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::coordinator::{AccountCoordinator, CoordinatorStatus};
use crate::error::{Error, Result};
use crate::projection::{AccountData, AccountSummary};
use crate::scheduler::{AccountActor, AccountHandle, ActorExit};
use crate::sensors::{self, SensorReading};

/// Sign-in outcome of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignInOutcome {
    pub uid: String,
    pub nickname: String,
    #[serde(flatten)]
    pub result: SignInResult,
}

pub struct AccountRegistry {
    accounts: DashMap<String, AccountHandle>,
    order: RwLock<Vec<String>>,
    tasks: Mutex<Vec<JoinHandle<ActorExit>>>,
    cancellation_token: CancellationToken,
}

impl AccountRegistry {
    pub fn new(cancellation_token: CancellationToken) -> Self {
        Self {
            accounts: DashMap::new(),
            order: RwLock::new(Vec::new()),
            tasks: Mutex::new(Vec::new()),
            cancellation_token,
        }
    }

    /// Spawn an actor for the coordinator's account.
    pub fn register(
        &self,
        coordinator: Arc<AccountCoordinator>,
        interval: Duration,
    ) -> Result<AccountHandle> {
        let uid = coordinator.uid().to_string();
        // The shard lock is held until the handle is inserted, so two
        // registrations of one uid cannot both spawn.
        let handle = match self.accounts.entry(uid.clone()) {
            Entry::Occupied(_) => {
                return Err(Error::validation(format!(
                    "account {uid} is already registered"
                )));
            }
            Entry::Vacant(vacant) => {
                let (handle, task) =
                    AccountActor::spawn(coordinator, interval, &self.cancellation_token);
                vacant.insert(handle.clone());
                self.tasks.lock().push(task);
                handle
            }
        };
        self.order.write().push(uid.clone());
        info!(uid = %uid, interval_secs = interval.as_secs(), "Account registered");
        Ok(handle)
    }

    pub fn get(&self, uid: &str) -> Option<AccountHandle> {
        self.accounts.get(uid).map(|entry| entry.value().clone())
    }

    fn require(&self, uid: &str) -> Result<AccountHandle> {
        self.get(uid).ok_or_else(|| Error::not_found("Account", uid))
    }

    /// Registered uids in registration order.
    pub fn uids(&self) -> Vec<String> {
        self.order.read().clone()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn handles(&self) -> Vec<AccountHandle> {
        self.order
            .read()
            .iter()
            .filter_map(|uid| self.get(uid))
            .collect()
    }

    /// Accounts that have data, in registration order.
    pub fn list_accounts(&self) -> Vec<AccountSummary> {
        self.handles()
            .iter()
            .filter_map(|h| h.coordinator().snapshot())
            .map(|status| AccountSummary::from(status.as_ref()))
            .collect()
    }

    /// Full projection of one account at `now`.
    pub fn account_data(&self, uid: &str, now: i64) -> Result<AccountData> {
        let handle = self.require(uid)?;
        let status = handle
            .coordinator()
            .snapshot()
            .ok_or_else(|| Error::not_found("AccountData", uid))?;
        Ok(AccountData::project(&status, now))
    }

    pub fn sensors(&self, uid: &str, now: i64) -> Result<Vec<SensorReading>> {
        let handle = self.require(uid)?;
        let status = handle
            .coordinator()
            .snapshot()
            .ok_or_else(|| Error::not_found("AccountData", uid))?;
        Ok(sensors::evaluate_all(&status, now))
    }

    pub fn status(&self, uid: &str) -> Result<CoordinatorStatus> {
        Ok(self.require(uid)?.coordinator().status())
    }

    pub async fn refresh(&self, uid: &str) -> Result<()> {
        self.require(uid)?.refresh().await?;
        Ok(())
    }

    pub async fn reconfigure(&self, uid: &str, user_token: String) -> Result<()> {
        self.require(uid)?.reconfigure(user_token).await
    }

    /// Sign in one account, or every account when `uid` is `None`.
    ///
    /// Accounts are signed one after another; a failure of one does not
    /// stop the others.
    pub async fn sign_in(&self, uid: Option<&str>) -> Result<Vec<SignInOutcome>> {
        let targets = match uid {
            Some(uid) => vec![self.require(uid)?],
            None => self.handles(),
        };

        let mut outcomes = Vec::with_capacity(targets.len());
        for handle in targets {
            let result = match handle.sign_in().await {
                Ok(result) => result,
                Err(e) => {
                    warn!(uid = %handle.uid(), error = %e, "Sign-in could not be dispatched");
                    SignInResult::failed(format!("签到失败: {e}"))
                }
            };
            outcomes.push(SignInOutcome {
                uid: handle.uid().to_string(),
                nickname: handle.coordinator().account().nickname.clone(),
                result,
            });
        }
        Ok(outcomes)
    }

    /// Ask every actor to stop, cancel the ones that cannot take the
    /// message, and wait for all of them to finish.
    pub async fn shutdown(&self) -> Vec<ActorExit> {
        info!(accounts = self.len(), "Shutting down account actors");
        for handle in self.handles() {
            if let Err(e) = handle.stop().await {
                debug!(uid = %handle.uid(), error = %e, "Stop not delivered, cancelling");
            }
        }
        self.cancellation_token.cancel();

        let tasks: Vec<_> = std::mem::take(&mut *self.tasks.lock());
        let mut exits = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(exit) => {
                    debug!(?exit, "Account actor joined");
                    exits.push(exit);
                }
                Err(e) => warn!(error = %e, "Account actor panicked"),
            }
        }
        exits
    }
}
