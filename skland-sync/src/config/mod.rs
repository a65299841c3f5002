//! File-based application configuration.
//!
//! The config file is TOML:
//!
//! ```toml
//! scan_interval = 10
//! credentials_path = "credentials.json"
//!
//! [api]
//! port = 12556
//!
//! [log]
//! filter = "skland_sync=debug"
//!
//! [[accounts]]
//! token = "<user token from the Skland app>"
//! uid = "12345678"
//! nickname = "Doctor"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Default poll interval in minutes.
pub const DEFAULT_SCAN_INTERVAL: u64 = 10;
pub const MIN_SCAN_INTERVAL: u64 = 5;
pub const MAX_SCAN_INTERVAL: u64 = 60;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SKLAND_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_request_timeout() -> u64 {
    15
}

fn default_channel_master_id() -> String {
    "1".to_string()
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    12556
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Poll interval in minutes.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: Option<String>,
    /// Directory for daily-rolling log files. Console only when unset.
    pub dir: Option<PathBuf>,
}

/// One bound game character.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// User token used for full re-authentication.
    #[serde(default)]
    pub token: Option<String>,
    pub uid: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default = "default_channel_master_id")]
    pub channel_master_id: String,
    /// Pre-issued session, used when no stored credential exists.
    #[serde(default)]
    pub cred: Option<String>,
    #[serde(default)]
    pub cred_token: Option<String>,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("uid", &self.uid)
            .field("nickname", &self.nickname)
            .field("channel_master_id", &self.channel_master_id)
            .field("has_token", &self.token.is_some())
            .field("has_cred", &self.cred.is_some())
            .finish()
    }
}

impl AccountConfig {
    /// The configured session, if both halves are present.
    pub fn configured_credential(&self) -> Option<skland_api::Credential> {
        match (&self.cred, &self.cred_token) {
            (Some(cred), Some(token)) if !cred.is_empty() && !token.is_empty() => {
                Some(skland_api::Credential::new(cred.clone(), token.clone()))
            }
            _ => None,
        }
    }

    pub fn user_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn display_name(&self) -> &str {
        if self.nickname.is_empty() {
            &self.uid
        } else {
            &self.nickname
        }
    }
}

impl AppConfig {
    /// Resolve the config path: explicit argument, then `SKLAND_CONFIG`, then `config.toml`.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Read, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        debug!(path = %path.display(), accounts = config.accounts.len(), "Loaded configuration");
        Ok(config)
    }

    /// Credential file named by the config at `path`, read without
    /// validating the rest. A missing config file gives the default.
    pub fn credentials_path_at(path: &Path) -> Result<PathBuf> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::from_toml(&content)?.credentials_path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(default_credentials_path()),
            Err(e) => Err(Error::config(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// `API_BIND_ADDRESS` / `API_PORT` override the `[api]` section.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bind_address) = std::env::var("API_BIND_ADDRESS")
            && !bind_address.trim().is_empty()
        {
            self.api.bind_address = bind_address;
        }

        if let Ok(port) = std::env::var("API_PORT")
            && let Ok(parsed) = port.parse::<u16>()
        {
            self.api.port = parsed;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_SCAN_INTERVAL..=MAX_SCAN_INTERVAL).contains(&self.scan_interval) {
            return Err(Error::validation(format!(
                "scan_interval must be between {MIN_SCAN_INTERVAL} and {MAX_SCAN_INTERVAL} minutes, got {}",
                self.scan_interval
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::validation("request_timeout_secs must be positive"));
        }
        if self.accounts.is_empty() {
            return Err(Error::validation("at least one [[accounts]] entry is required"));
        }

        let mut seen = HashSet::new();
        for account in &self.accounts {
            if account.uid.trim().is_empty() {
                return Err(Error::validation("account uid must not be empty"));
            }
            if !seen.insert(account.uid.as_str()) {
                return Err(Error::validation(format!(
                    "duplicate account uid {}",
                    account.uid
                )));
            }
            if account.user_token().is_none() && account.configured_credential().is_none() {
                return Err(Error::validation(format!(
                    "account {} needs a token or a cred/cred_token pair",
                    account.uid
                )));
            }
        }
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval * 60)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn account(&self, uid: &str) -> Option<&AccountConfig> {
        self.accounts.iter().find(|a| a.uid == uid)
    }
}
