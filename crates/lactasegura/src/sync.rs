//! Stub cloud sync: backup and restore of the two record stores.
//!
//! "Sync" here serializes both store files into one backup blob and back.
//! Authentication is a placeholder session gate, not a security mechanism:
//! it only checks that credentials are non-empty and mints an opaque local
//! token. A real deployment would delegate to an identity provider.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::SyncBackup;
use crate::store;

/// Backup/restore service over the IMC history and named-records files.
#[derive(Debug)]
pub struct SyncService {
    imc_history_path: PathBuf,
    records_path: PathBuf,
    backup_path: PathBuf,
    token: Option<String>,
    last_sync: Option<DateTime<Utc>>,
    status: String,
}

impl SyncService {
    /// Build the service from the application configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_paths(
            config.imc_history_path(),
            config.records_path(),
            config.backup_path(),
        )
    }

    /// Build the service from explicit file paths.
    #[must_use]
    pub fn with_paths(
        imc_history_path: PathBuf,
        records_path: PathBuf,
        backup_path: PathBuf,
    ) -> Self {
        Self {
            imc_history_path,
            records_path,
            backup_path,
            token: None,
            last_sync: None,
            status: "not synchronized".to_string(),
        }
    }

    /// Authenticate the session. Succeeds iff both credentials are
    /// non-empty; on success an opaque in-memory token is stored.
    pub fn authenticate(&mut self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            return false;
        }
        self.token = Some(Uuid::new_v4().to_string());
        info!("sync session authenticated");
        true
    }

    /// Check whether a session token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Human-readable sync status.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// When the last successful sync happened, if any.
    #[must_use]
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.last_sync
    }

    /// Serialize both record stores into the backup file.
    ///
    /// Requires a prior successful [`authenticate`](Self::authenticate).
    /// On success the status string is updated with a timestamp; on failure
    /// it carries the error and `false` is returned.
    pub fn sync_data(&mut self) -> bool {
        match self.try_sync() {
            Ok(()) => {
                let now = Utc::now();
                self.last_sync = Some(now);
                self.status = format!("last sync {}", now.format("%d/%m/%Y %H:%M"));
                info!("backup written to {}", self.backup_path.display());
                true
            }
            Err(err) => {
                self.status = format!("sync failed: {err}");
                warn!("sync failed: {err}");
                false
            }
        }
    }

    fn try_sync(&self) -> Result<()> {
        if self.token.is_none() {
            return Err(Error::NotAuthenticated);
        }
        // Read the files themselves so the backup reflects what is on disk.
        let backup = SyncBackup {
            imc_history: store::read_array(&self.imc_history_path),
            records: store::read_array(&self.records_path),
        };
        store::write_json(&self.backup_path, &backup)
    }

    /// Restore both record stores wholesale from the backup file.
    ///
    /// This is destructive: records created since the backup are lost.
    /// Returns `false` if the backup is absent or unparsable, or if a store
    /// rewrite fails.
    pub fn restore_data(&mut self) -> bool {
        match self.try_restore() {
            Ok(()) => {
                info!("stores restored from {}", self.backup_path.display());
                true
            }
            Err(err) => {
                warn!("restore failed: {err}");
                false
            }
        }
    }

    fn try_restore(&self) -> Result<()> {
        if !self.backup_path.exists() {
            return Err(Error::BackupMissing {
                path: self.backup_path.clone(),
            });
        }
        let body = std::fs::read_to_string(&self.backup_path)?;
        let backup: SyncBackup = serde_json::from_str(&body)?;

        store::write_array(&self.imc_history_path, &backup.imc_history)?;
        store::write_array(&self.records_path, &backup.records)?;
        Ok(())
    }
}
