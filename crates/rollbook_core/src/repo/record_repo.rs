//! Record repository contract and shared decoding rules.
//!
//! # Responsibility
//! - Provide the load/save interface used by `RecordStore`.
//! - Turn persisted entries into validated records with unique ids.
//!
//! # Invariants
//! - Entries without an `id` get ids above the largest persisted id, in file
//!   order.
//! - Duplicate ids are rejected as invalid data.

use crate::model::record::{PersistedRecord, Record, RecordId};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure for record load/save operations.
#[derive(Debug)]
pub enum RepoError {
    /// File system read/write failure.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Persisted content is not valid JSON for the record layout.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Persisted content parsed but violates record invariants.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "record file I/O failed at `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "record file `{}` is malformed: {source}", path.display())
            }
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidData(_) => None,
        }
    }
}

/// Load/save gateway for the full record collection.
pub trait RecordRepository {
    /// Reads every persisted record, in persisted order.
    fn load(&self) -> RepoResult<Vec<Record>>;
    /// Replaces the persisted collection with `records`.
    fn save(&self, records: &[Record]) -> RepoResult<()>;
}

/// Validates persisted entries and assigns ids to entries that lack one.
pub fn decode_records(entries: Vec<PersistedRecord>) -> RepoResult<Vec<Record>> {
    let mut next_id: RecordId = entries
        .iter()
        .filter_map(|entry| entry.id)
        .max()
        .unwrap_or(0)
        + 1;
    let mut seen = HashSet::with_capacity(entries.len());
    let mut records = Vec::with_capacity(entries.len());

    for (position, entry) in entries.into_iter().enumerate() {
        let (id, fields) = entry.into_parts();
        let id = match id {
            Some(id) => id,
            None => {
                let assigned = next_id;
                next_id += 1;
                assigned
            }
        };
        if !seen.insert(id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate record id {id} at position {position}"
            )));
        }
        let record = Record::new(id, fields).map_err(|err| {
            RepoError::InvalidData(format!("record at position {position}: {err}"))
        })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::{decode_records, RepoError};
    use crate::model::record::PersistedRecord;

    fn entry(id: Option<u64>, last: &str, first: &str) -> PersistedRecord {
        PersistedRecord {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..PersistedRecord::default()
        }
    }

    #[test]
    fn missing_ids_are_assigned_after_the_largest_id() {
        let records = decode_records(vec![
            entry(None, "Ivanov", "Ivan"),
            entry(Some(7), "Petrov", "Petr"),
            entry(None, "Sidorov", "Sidor"),
        ])
        .unwrap();
        let ids: Vec<u64> = records.iter().map(|record| record.id()).collect();
        assert_eq!(ids, vec![8, 7, 9]);
    }

    #[test]
    fn duplicate_ids_are_invalid_data() {
        let err = decode_records(vec![
            entry(Some(1), "Ivanov", "Ivan"),
            entry(Some(1), "Petrov", "Petr"),
        ])
        .unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(message) if message.contains("duplicate")));
    }

    #[test]
    fn invalid_entries_report_their_position() {
        let err = decode_records(vec![
            entry(Some(1), "Ivanov", "Ivan"),
            entry(Some(2), "petrov", "Petr"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("position 1"));
    }
}
