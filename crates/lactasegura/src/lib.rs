//! `lactasegura` - local persistence and sync core for the LactaSegura app
//!
//! This library provides the non-UI core of an infant-nutrition caregiver
//! app: JSON-file record stores, an age-gated infant BMI calculator with
//! automatic history persistence, a cached article list with best-effort
//! remote refresh, a stub cloud sync (backup/restore), and CSV export.
//!
//! Screens drive everything through a [`Session`], the single explicit
//! context object; there is no global state.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod articles;
pub mod bmi;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod query;
pub mod session;
pub mod store;
pub mod sync;

pub use articles::{ArticleService, ConnectivityCheck};
pub use bmi::{BmiAssessment, BmiCategory};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{Article, BmiRecord, NamedRecord, RemoteConfig, SyncBackup};
pub use query::SortKey;
pub use session::Session;
pub use store::RecordStore;
pub use sync::SyncService;
