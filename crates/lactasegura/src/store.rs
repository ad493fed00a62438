//! JSON-file record stores.
//!
//! Each entity type persists to a single JSON-array file. Reads are lenient:
//! a missing, unreadable, or unparsable file behaves as an empty store (the
//! failure is logged, never propagated). Every mutation rewrites the whole
//! file through a temp-file-then-rename sequence so a crash mid-write cannot
//! truncate the store.
//!
//! There is no locking between read and write; callers serialize access to a
//! given store file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A record type carrying a store-assigned string id.
pub trait Keyed {
    /// The record's id. Empty until the store assigns one.
    fn id(&self) -> &str;

    /// Called by the store when inserting the record.
    fn assign_id(&mut self, id: String);
}

/// Append a suffix to a file name, keeping the original extension.
/// `lactasegura_records.json` + `seq` → `lactasegura_records.json.seq`.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Read a JSON array file, treating every failure as an empty store.
pub(crate) fn read_array<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        return Vec::new();
    }
    match fs::read_to_string(path) {
        Ok(body) => match serde_json::from_str(&body) {
            Ok(records) => records,
            Err(err) => {
                warn!("unparsable store file {}: {err}", path.display());
                Vec::new()
            }
        },
        Err(err) => {
            warn!("unreadable store file {}: {err}", path.display());
            Vec::new()
        }
    }
}

/// Atomically write a value as pretty-printed UTF-8 JSON.
///
/// The value is written to a `.tmp` sibling first and renamed over the
/// target, so readers never observe a partially written file. Non-ASCII
/// text is preserved as-is (`serde_json` does not escape it).
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let body = serde_json::to_string_pretty(value)?;
    let tmp = sibling(path, "tmp");

    fs::write(&tmp, body).map_err(|source| Error::StoreWrite {
        path: path.to_path_buf(),
        source,
    })?;
    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::StoreWrite {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// Atomically write a slice of records as a JSON array file.
pub(crate) fn write_array<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    write_json(path, records)
}

/// A JSON-array-file-backed collection of one entity type.
///
/// The on-disk file is the sole source of truth when present; the in-memory
/// mirror is rewritten to disk after every mutation.
#[derive(Debug)]
pub struct RecordStore<T> {
    /// Path to the store file.
    path: PathBuf,
    /// Path to the id-counter sidecar (`<file>.seq`).
    seq_path: PathBuf,
    /// In-memory mirror of the file contents.
    records: Vec<T>,
}

impl<T: Serialize + DeserializeOwned + Clone> RecordStore<T> {
    /// Open a store backed by the given file.
    ///
    /// A missing or corrupt file opens as an empty store.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let seq_path = sibling(&path, "seq");
        let records = read_array(&path);
        debug!("opened store {} ({} records)", path.display(), records.len());
        Self {
            path,
            seq_path,
            records,
        }
    }

    /// Get the path to the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Number of records in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Re-read the store file, discarding the in-memory mirror.
    ///
    /// Used after another component has rewritten the file wholesale
    /// (e.g. a backup restore).
    pub fn reload(&mut self) {
        self.records = read_array(&self.path);
    }

    /// Append a record as-is and rewrite the file.
    ///
    /// Used by append-only stores whose records carry no id.
    ///
    /// # Errors
    ///
    /// Returns an error if the file rewrite fails; the in-memory mirror is
    /// left unchanged in that case.
    pub fn append(&mut self, item: T) -> Result<T> {
        self.records.push(item.clone());
        if let Err(err) = write_array(&self.path, &self.records) {
            self.records.pop();
            return Err(err);
        }
        Ok(item)
    }

    /// Replace the entire contents of the store and rewrite the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file rewrite fails.
    pub fn replace_all(&mut self, records: Vec<T>) -> Result<()> {
        write_array(&self.path, &records)?;
        self.records = records;
        Ok(())
    }
}

impl<T: Serialize + DeserializeOwned + Clone + Keyed> RecordStore<T> {
    /// Insert a record, assigning it the next id.
    ///
    /// Ids come from a monotonically increasing counter persisted in a
    /// sibling `.seq` file and reconciled with the highest numeric id present
    /// in the store, so an id is never reissued after a deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if the store file rewrite fails. A failure writing
    /// the counter sidecar is logged and ignored: the record is already on
    /// disk at that point, and the counter is recomputed from the highest
    /// id on file whenever the sidecar is missing or behind.
    pub fn insert(&mut self, mut item: T) -> Result<T> {
        let next = self.next_id();
        item.assign_id(next.to_string());

        self.records.push(item.clone());
        if let Err(err) = write_array(&self.path, &self.records) {
            self.records.pop();
            return Err(err);
        }
        if let Err(err) = write_json(&self.seq_path, &next) {
            warn!("failed writing id counter {}: {err}", self.seq_path.display());
        }

        Ok(item)
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Delete all records matching the id and rewrite the file.
    ///
    /// Returns `true` if anything was deleted; a nonexistent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the file rewrite fails.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        if self.records.len() == before {
            return Ok(false);
        }
        write_array(&self.path, &self.records)?;
        Ok(true)
    }

    /// Mutate the first record matching the id in place and rewrite the file.
    ///
    /// Returns `true` if a record was edited, `false` if the id was not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file rewrite fails.
    pub fn edit(&mut self, id: &str, f: impl FnOnce(&mut T)) -> Result<bool> {
        let Some(record) = self.records.iter_mut().find(|r| r.id() == id) else {
            return Ok(false);
        };
        f(record);
        write_array(&self.path, &self.records)?;
        Ok(true)
    }

    /// Compute the next id: one past the last issued id or the highest
    /// numeric id on file, whichever is greater.
    fn next_id(&self) -> u64 {
        let last_issued: u64 = if self.seq_path.exists() {
            fs::read_to_string(&self.seq_path)
                .ok()
                .and_then(|body| body.trim().parse().ok())
                .unwrap_or(0)
        } else {
            0
        };
        let max_on_file = self
            .records
            .iter()
            .filter_map(|r| r.id().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        last_issued.max(max_on_file) + 1
    }
}
