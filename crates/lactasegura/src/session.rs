//! The application session: one explicit context object wiring the stores
//! and services together.
//!
//! Screens receive a `Session` (or a piece of it) instead of reaching for
//! ambient global state. All store operations run on the caller's thread;
//! only article fetches are detached (see the articles module).

use std::path::PathBuf;

use crate::articles::ArticleService;
use crate::bmi::{self, BmiAssessment};
use crate::config::Config;
use crate::error::Result;
use crate::export;
use crate::logging;
use crate::model::{BmiRecord, NamedRecord};
use crate::store::RecordStore;
use crate::sync::SyncService;

/// Long-lived application context.
#[derive(Debug)]
pub struct Session {
    config: Config,
    /// Append-only BMI history.
    pub imc_history: RecordStore<BmiRecord>,
    /// The named record log.
    pub records: RecordStore<NamedRecord>,
    /// Article working set and refresh service.
    pub articles: ArticleService,
    /// Backup/restore service.
    pub sync: SyncService,
}

impl Session {
    /// Open a session from the given configuration.
    ///
    /// Stores open leniently (missing or corrupt files behave as empty).
    ///
    /// # Errors
    ///
    /// Returns an error if the article service's HTTP client cannot be
    /// constructed.
    pub fn open(config: Config) -> Result<Self> {
        let imc_history = RecordStore::open(config.imc_history_path());
        let records = RecordStore::open(config.records_path());
        let articles = ArticleService::new(&config)?;
        let sync = SyncService::new(&config);

        Ok(Self {
            config,
            imc_history,
            records,
            articles,
            sync,
        })
    }

    /// Open a session, writing a crash file on failure.
    ///
    /// Startup failures are the only fatal errors in this crate; they are
    /// recorded to `crash_log.txt` in the data directory before being
    /// propagated so the host can terminate.
    ///
    /// # Errors
    ///
    /// Propagates the error from [`open`](Self::open) after logging it.
    pub fn open_logged(config: Config) -> Result<Self> {
        let data_dir = config.data_dir();
        Self::open(config).map_err(|err| {
            logging::write_crash_log(&data_dir, &err);
            err
        })
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compute a BMI and append it to the history store.
    ///
    /// # Errors
    ///
    /// Returns a validation error for out-of-range input, or a store error
    /// if the history rewrite fails.
    pub fn assess_and_record(
        &mut self,
        weight_kg: f64,
        height_cm: f64,
        age_months: f64,
    ) -> Result<BmiAssessment> {
        bmi::assess_and_record(&mut self.imc_history, weight_kg, height_cm, age_months)
    }

    /// Restore both stores from the backup file and refresh the in-memory
    /// mirrors. Returns `false` if the restore failed.
    pub fn restore_data(&mut self) -> bool {
        let restored = self.sync.restore_data();
        if restored {
            self.imc_history.reload();
            self.records.reload();
        }
        restored
    }

    /// Export the IMC history to its default CSV file in the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export_imc_history(&self) -> Result<PathBuf> {
        let path = self.config.data_dir().join(export::IMC_HISTORY_CSV);
        export::export_imc_history(self.imc_history.records(), &path)?;
        Ok(path)
    }

    /// Export the named records to their default CSV file in the data
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export_records(&self) -> Result<PathBuf> {
        let path = self.config.data_dir().join(export::RECORDS_CSV);
        export::export_named_records(self.records.records(), &path)?;
        Ok(path)
    }
}
