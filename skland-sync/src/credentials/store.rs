//! Credential persistence.
//!
//! Refreshed and re-issued sessions are written back so a restart does not
//! need a full re-authentication.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use skland_api::Credential;
use tokio::sync::Mutex;
use tracing::debug;

use super::error::CredentialError;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist the current credential of an account.
    async fn save(&self, uid: &str, credential: &Credential) -> Result<(), CredentialError>;
}

/// Credentials kept in one JSON object keyed by uid.
pub struct JsonCredentialStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl JsonCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored credential. A missing file is an empty store.
    pub async fn load_all(&self) -> Result<BTreeMap<String, Credential>, CredentialError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn load(&self, uid: &str) -> Result<Option<Credential>, CredentialError> {
        Ok(self.load_all().await?.remove(uid))
    }

    /// Write to a sibling temp file, then rename over the target.
    async fn write_all(&self, entries: &BTreeMap<String, Credential>) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let bytes = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for JsonCredentialStore {
    async fn save(&self, uid: &str, credential: &Credential) -> Result<(), CredentialError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load_all().await?;
        entries.insert(uid.to_string(), credential.clone());
        self.write_all(&entries).await?;
        debug!(uid = %uid, path = %self.path.display(), "Credential persisted");
        Ok(())
    }
}
