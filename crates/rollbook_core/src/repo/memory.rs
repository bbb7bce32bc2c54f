//! In-memory record repository.
//!
//! Clones share one backing collection, so a test can keep a handle and
//! inspect what the store persisted.

use crate::model::record::Record;
use crate::repo::record_repo::{RecordRepository, RepoError, RepoResult};
use std::io::{Error as IoError, ErrorKind};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<Record>,
    simulate_write_error: bool,
    save_count: usize,
}

/// Shared in-memory record repository.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `records`.
    pub fn with_records(records: Vec<Record>) -> Self {
        let repo = Self::new();
        repo.lock().records = records;
        repo
    }

    /// Makes subsequent `save` calls fail with an I/O error.
    pub fn set_simulate_write_error(&self, enabled: bool) {
        self.lock().simulate_write_error = enabled;
    }

    /// Snapshot of the persisted collection.
    pub fn records(&self) -> Vec<Record> {
        self.lock().records.clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.lock().save_count
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordRepository for MemoryRecordRepository {
    fn load(&self) -> RepoResult<Vec<Record>> {
        Ok(self.lock().records.clone())
    }

    fn save(&self, records: &[Record]) -> RepoResult<()> {
        let mut state = self.lock();
        if state.simulate_write_error {
            return Err(RepoError::Io {
                path: PathBuf::from("<memory>"),
                source: IoError::new(ErrorKind::Other, "simulated write error"),
            });
        }
        state.records = records.to_vec();
        state.save_count += 1;
        Ok(())
    }
}
