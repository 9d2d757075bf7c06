//! Persisted wallet session: the last-connected address, used only for
//! silent reconnection on the next start.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;
use crate::wallet::{Address, WalletKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub wallet_address: Address,
    /// Provider the address was connected through, when known.
    #[serde(default)]
    pub wallet_kind: Option<WalletKind>,
}

/// JSON file holding at most one [`StoredSession`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session. A missing file is `None`; a corrupt file is
    /// discarded and also reads as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Session`] if the file exists but cannot be read.
    pub async fn load(&self) -> Result<Option<StoredSession>, AppError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "discarding corrupt session file");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`AppError::Session`] if the file cannot be written.
    pub async fn save(&self, session: &StoredSession) -> Result<(), AppError> {
        let json = serde_json::to_vec_pretty(session).map_err(|e| AppError::Session(e.to_string()))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Remove the stored session. Clearing an absent session succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Session`] if the file exists but cannot be removed.
    pub async fn clear(&self) -> Result<(), AppError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
