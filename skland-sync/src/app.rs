//! Process wiring: config to coordinators, actors and the API server.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use skland_api::{BindingCharacter, Credential, SklandAuth, SklandClient};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::api::{ApiServer, ApiServerConfig, AppState};
use crate::config::{AccountConfig, AppConfig};
use crate::coordinator::{AccountCoordinator, AccountIdentity};
use crate::credentials::{CredentialStore, JsonCredentialStore};
use crate::error::{Error, Result};
use crate::logging::LoggingConfig;
use crate::registry::AccountRegistry;

/// Session to start an account with: the stored one wins over the config file.
pub fn initial_credential(
    account: &AccountConfig,
    stored: Option<Credential>,
) -> Option<Credential> {
    stored.or_else(|| account.configured_credential())
}

/// Builds coordinators for configured accounts.
pub struct AccountFactory {
    config: AppConfig,
    auth: SklandAuth,
    store: Arc<JsonCredentialStore>,
}

impl AccountFactory {
    pub fn new(config: AppConfig) -> Result<Self> {
        let auth = SklandAuth::new()?;
        let store = Arc::new(JsonCredentialStore::new(config.credentials_path.clone()));
        Ok(Self {
            config,
            auth,
            store,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// One coordinator per configured account, in config order.
    ///
    /// An account that cannot obtain a session is skipped with an error
    /// log; having none at all is an error.
    pub async fn build_all(&self) -> Result<Vec<Arc<AccountCoordinator>>> {
        let mut stored = self.store.load_all().await?;
        let mut coordinators = Vec::with_capacity(self.config.accounts.len());

        for account in &self.config.accounts {
            match self.build(account, stored.remove(&account.uid)).await {
                Ok(coordinator) => coordinators.push(Arc::new(coordinator)),
                Err(e) => error!(uid = %account.uid, error = %e, "Skipping account"),
            }
        }

        if coordinators.is_empty() {
            return Err(Error::config("no account could be started"));
        }
        Ok(coordinators)
    }

    /// Coordinator for one configured account. Unlike [`Self::build_all`],
    /// a failure to obtain its session is returned as is.
    pub async fn build_one(&self, uid: &str) -> Result<Arc<AccountCoordinator>> {
        let account = self
            .config
            .account(uid)
            .ok_or_else(|| Error::not_found("Account", uid))?;
        let stored = self.store.load_all().await?.remove(uid);
        Ok(Arc::new(self.build(account, stored).await?))
    }

    async fn build(
        &self,
        account: &AccountConfig,
        stored: Option<Credential>,
    ) -> Result<AccountCoordinator> {
        let credential = match initial_credential(account, stored) {
            Some(credential) => credential,
            None => {
                let token = account.user_token().ok_or_else(|| {
                    Error::config(format!("account {} has no session and no token", account.uid))
                })?;
                info!(uid = %account.uid, "No stored session, authenticating");
                let credential = self.auth.authenticate(token).await?;
                if let Err(e) = self.store.save(&account.uid, &credential).await {
                    warn!(uid = %account.uid, error = %e, "Failed to persist credential");
                }
                credential
            }
        };

        let client = SklandClient::new(credential, Some(self.config.request_timeout()))?;
        let store: Arc<dyn CredentialStore> = self.store.clone();
        Ok(AccountCoordinator::new(
            AccountIdentity {
                uid: account.uid.clone(),
                nickname: account.display_name().to_string(),
                channel_master_id: account.channel_master_id.clone(),
            },
            account.user_token().map(str::to_string),
            Arc::new(client),
            Arc::new(self.auth.clone()),
            store,
        ))
    }
}

/// Run the polling service until Ctrl-C or until the API server exits.
pub async fn run_service(config: AppConfig, logging: Option<Arc<LoggingConfig>>) -> Result<()> {
    let interval = config.scan_interval();
    let api_config = config.api.clone();
    let factory = AccountFactory::new(config)?;
    let coordinators = factory.build_all().await?;

    let registry = Arc::new(AccountRegistry::new(CancellationToken::new()));
    for coordinator in coordinators {
        registry.register(coordinator, interval)?;
    }
    info!(
        accounts = registry.len(),
        interval_secs = interval.as_secs(),
        "Polling started"
    );

    let server = api_config.enabled.then(|| {
        let mut state = AppState::new(Arc::clone(&registry));
        if let Some(logging) = logging {
            state = state.with_logging_config(logging);
        }
        Arc::new(ApiServer::new(ApiServerConfig::from(&api_config), state))
    });

    supervise(&registry, server, tokio::signal::ctrl_c()).await
}

/// Wait for `shutdown_signal` or for the API server to exit, whichever
/// comes first, then stop the server and every actor.
///
/// A server that exits on its own ends the service with its error.
async fn supervise(
    registry: &AccountRegistry,
    server: Option<Arc<ApiServer>>,
    shutdown_signal: impl Future<Output = std::io::Result<()>>,
) -> Result<()> {
    let mut server_task = server.as_ref().map(|server| {
        let server = Arc::clone(server);
        tokio::spawn(async move { server.run().await })
    });
    let mut server_exited = false;

    let outcome = match server_task.as_mut() {
        Some(task) => tokio::select! {
            signal = shutdown_signal => {
                info!("Shutdown requested");
                signal.map_err(Error::from)
            }
            joined = task => {
                server_exited = true;
                let exit = server_exit(joined).and_then(|()| {
                    Err(Error::ApiError("API server stopped unexpectedly".into()))
                });
                if let Err(e) = &exit {
                    error!(error = %e, "API server exited, shutting down");
                }
                exit
            }
        },
        None => {
            let signal = shutdown_signal.await;
            info!("Shutdown requested");
            signal.map_err(Error::from)
        }
    };

    if let Some(server) = &server {
        server.shutdown();
    }
    registry.shutdown().await;

    match server_task {
        Some(task) if !server_exited => outcome.and(server_exit(task.await)),
        _ => outcome,
    }
}

fn server_exit(joined: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    joined.map_err(|e| Error::Other(format!("API server task failed: {e}")))?
}

/// Build the selected accounts (all when `uid` is `None`).
///
/// A single selected account is built on its own, so its session error
/// is returned instead of being skipped.
pub async fn select_accounts(
    factory: &AccountFactory,
    uid: Option<&str>,
) -> Result<Vec<Arc<AccountCoordinator>>> {
    match uid {
        None => factory.build_all().await,
        Some(uid) => Ok(vec![factory.build_one(uid).await?]),
    }
}

/// Poll the selected accounts once, concurrently.
pub async fn poll_once(
    factory: &AccountFactory,
    uid: Option<&str>,
) -> Result<Vec<Arc<AccountCoordinator>>> {
    let coordinators = select_accounts(factory, uid).await?;
    let results = join_all(coordinators.iter().map(|c| c.poll())).await;
    for (coordinator, result) in coordinators.iter().zip(results) {
        if let Err(e) = result {
            warn!(uid = %coordinator.uid(), error = %e, "Poll failed");
        }
    }
    Ok(coordinators)
}

/// Exchange a user token for a session and list the bound characters.
pub async fn login(
    user_token: &str,
    store: &JsonCredentialStore,
) -> Result<Vec<BindingCharacter>> {
    let auth = SklandAuth::new()?;
    let credential = auth.authenticate(user_token).await?;
    let client = SklandClient::new(credential.clone(), None)?;
    let bindings = client.get_binding().await?;

    for binding in &bindings {
        store.save(&binding.uid, &credential).await?;
    }
    info!(characters = bindings.len(), "Login succeeded");
    Ok(bindings)
}

/// `[[accounts]]` entries for the config file.
pub fn render_account_entries(user_token: &str, bindings: &[BindingCharacter]) -> Result<String> {
    let accounts: Vec<AccountConfig> = bindings
        .iter()
        .map(|b| AccountConfig {
            token: Some(user_token.to_string()),
            uid: b.uid.clone(),
            nickname: b.nickname.clone(),
            channel_master_id: b.channel_master_id.clone(),
            cred: None,
            cred_token: None,
        })
        .collect();

    #[derive(serde::Serialize)]
    struct Entries<'a> {
        accounts: &'a [AccountConfig],
    }

    toml::to_string(&Entries {
        accounts: &accounts,
    })
    .map_err(|e| Error::Other(format!("failed to render accounts: {e}")))
}
