//! Core domain logic for Rollbook.
//! This crate is the single source of truth for record invariants and the
//! derived table view.

pub mod config;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{ConfigError, RollbookConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::record::{
    Contact, ContactKind, Record, RecordFields, RecordId, RecordValidationError,
};
pub use query::filter::{FieldClause, FilterSpec, PresenceState};
pub use query::page::{PageSpec, DEFAULT_PAGE_SIZE};
pub use query::sort::{SortColumn, SortDirection, SortSpec};
pub use repo::json_file::JsonFileRecordRepository;
pub use repo::memory::MemoryRecordRepository;
pub use repo::record_repo::{RecordRepository, RepoError, RepoResult};
pub use service::observer::{ObserverList, StoreEvent, StoreObserver};
pub use service::projection::{ProjectionRow, ViewProjection, COLUMN_HEADERS};
pub use service::record_store::{Page, RecordStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
