//! JSON file record repository.
//!
//! # Responsibility
//! - Read and write the record collection as one JSON array file.
//!
//! # Invariants
//! - A missing file loads as an empty collection.
//! - Writes go to a uniquely named temp file in the same directory and are
//!   renamed into place, so readers never observe a partial file.

use crate::model::record::{PersistedRecord, Record};
use crate::repo::record_repo::{decode_records, RecordRepository, RepoError, RepoResult};
use log::{error, info};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Record repository backed by a JSON array file.
#[derive(Debug, Clone)]
pub struct JsonFileRecordRepository {
    path: PathBuf,
}

impl JsonFileRecordRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> RepoError {
        RepoError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_entries(&self) -> RepoResult<Vec<PersistedRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.io_error(err)),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| RepoError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_atomically(&self, content: &str) -> RepoResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|err| self.io_error(err))?;

        let tmp_path = dir.join(format!(".records-{}.tmp", Uuid::new_v4()));
        if let Err(err) = fs::write(&tmp_path, content) {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.io_error(err));
        }
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.io_error(err));
        }
        Ok(())
    }
}

impl RecordRepository for JsonFileRecordRepository {
    fn load(&self) -> RepoResult<Vec<Record>> {
        let started_at = Instant::now();
        let result = self.read_entries().and_then(decode_records);
        match &result {
            Ok(records) => info!(
                "event=records_load module=repo status=ok count={} duration_ms={}",
                records.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=records_load module=repo status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn save(&self, records: &[Record]) -> RepoResult<()> {
        let started_at = Instant::now();
        let content = serde_json::to_string_pretty(records).map_err(|source| RepoError::Parse {
            path: self.path.clone(),
            source,
        })?;
        let result = self.write_atomically(&content);
        match &result {
            Ok(()) => info!(
                "event=records_save module=repo status=ok count={} duration_ms={}",
                records.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=records_save module=repo status=error count={} duration_ms={} error={}",
                records.len(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}
