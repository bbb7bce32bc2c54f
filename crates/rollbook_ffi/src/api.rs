//! FFI use-case API for the desktop record table.
//!
//! # Responsibility
//! - Expose the record store to Dart via FRB as synchronous calls.
//! - Translate store results into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One process-wide store, guarded by a single mutex; every call is
//!   serialized.
//! - Events emitted during a call are returned in that call's response.

use rollbook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, FieldClause,
    FilterSpec, JsonFileRecordRepository, PresenceState, RecordFields, RecordId,
    RecordRepository, RecordStore, SortColumn, StoreError, StoreEvent, StoreObserver,
    ViewProjection, DEFAULT_PAGE_SIZE,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

const DATA_FILE_NAME: &str = "rollbook_students.json";
static DATA_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: OnceLock<Mutex<Option<Session<JsonFileRecordRepository>>>> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
/// - Idempotent for identical arguments; reconfiguration returns an error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Editable record fields sent from the record dialog.
///
/// Blank optional values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbookRecordInput {
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    pub git: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub messaging_handle: Option<String>,
}

/// One field clause of the filter panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbookFieldFilter {
    /// `present|yes`, `absent|no`; anything else means no constraint.
    pub state: String,
    pub text: Option<String>,
}

/// Filter panel contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbookFilterInput {
    pub name: Option<String>,
    pub git: Option<RollbookFieldFilter>,
    pub email: Option<RollbookFieldFilter>,
    pub phone: Option<RollbookFieldFilter>,
    pub messaging: Option<RollbookFieldFilter>,
    pub contact: Option<RollbookFieldFilter>,
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbookRow {
    pub row_number: u32,
    pub record_id: u64,
    pub display_name: String,
    pub git: String,
    pub contact: String,
}

/// Table page envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbookPageResponse {
    pub ok: bool,
    pub message: String,
    pub headers: Vec<String>,
    pub rows: Vec<RollbookRow>,
    pub page_number: u32,
    pub total_pages: u32,
    pub total_count: u32,
    pub sort_column: String,
    pub sort_direction: String,
    pub filter_active: bool,
    /// Store events emitted by this call, in order.
    pub events: Vec<String>,
}

impl RollbookPageResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            headers: Vec::new(),
            rows: Vec::new(),
            page_number: 1,
            total_pages: 1,
            total_count: 0,
            sort_column: String::new(),
            sort_direction: String::new(),
            filter_active: false,
            events: Vec::new(),
        }
    }

    fn from_projection(projection: ViewProjection, events: Vec<String>) -> Self {
        Self {
            ok: true,
            message: projection_message(&projection),
            headers: projection.headers,
            rows: projection
                .rows
                .into_iter()
                .map(|row| RollbookRow {
                    row_number: saturating_u32(row.row_number),
                    record_id: row.id,
                    display_name: row.display_name,
                    git: row.git,
                    contact: row.contact,
                })
                .collect(),
            page_number: saturating_u32(projection.page_number),
            total_pages: saturating_u32(projection.total_pages),
            total_count: saturating_u32(projection.total_count),
            sort_column: projection.sort.column.as_str().to_string(),
            sort_direction: projection.sort.direction.as_str().to_string(),
            filter_active: projection.filter_active,
            events,
        }
    }
}

/// Mutation envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbookActionResponse {
    pub ok: bool,
    /// Affected record id for single-record actions.
    pub record_id: Option<u64>,
    pub message: String,
    /// Field to highlight when validation failed.
    pub invalid_field: Option<String>,
    pub events: Vec<String>,
}

impl RollbookActionResponse {
    fn success(message: impl Into<String>, record_id: Option<u64>, events: Vec<String>) -> Self {
        Self {
            ok: true,
            record_id,
            message: message.into(),
            invalid_field: None,
            events,
        }
    }

    fn failure(message: impl Into<String>, events: Vec<String>) -> Self {
        Self {
            ok: false,
            record_id: None,
            message: message.into(),
            invalid_field: None,
            events,
        }
    }

    /// `record_id` is kept only for errors where the change was still
    /// applied in memory.
    fn from_store_error(
        action: &str,
        err: StoreError,
        record_id: Option<u64>,
        events: Vec<String>,
    ) -> Self {
        let (invalid_field, record_id) = match &err {
            StoreError::Validation(inner) => (Some(inner.field().to_string()), None),
            StoreError::NotFound(_) => (None, None),
            StoreError::Persistence(_) | StoreError::SaveBlocked(_) => (None, record_id),
        };
        Self {
            ok: false,
            record_id,
            message: format!("{action} failed: {err}"),
            invalid_field,
            events,
        }
    }
}

/// Opens (or reopens) the record store.
///
/// `data_path` falls back to `ROLLBOOK_DATA_PATH`, then to a file in the
/// system temp directory. A file that cannot be loaded opens as empty and
/// is left untouched; later mutations report that they were not saved.
///
/// # FFI contract
/// - Sync call, file-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn rollbook_open(data_path: Option<String>, page_size: Option<u32>) -> RollbookActionResponse {
    let path = data_path
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(resolve_data_path);
    let page_size = page_size
        .filter(|size| *size > 0)
        .map_or(DEFAULT_PAGE_SIZE, |size| size as usize);

    let session = Session::open(JsonFileRecordRepository::new(&path), page_size);
    let count = session.store.len();
    let load_error = session.store.load_error().map(str::to_string);
    *lock_session() = Some(session);
    match load_error {
        Some(reason) => {
            warn!("event=ffi_open module=ffi status=error fallback=empty");
            RollbookActionResponse::failure(
                format!("open failed: {reason}; starting empty, the file is left as is"),
                Vec::new(),
            )
        }
        None => {
            info!("event=ffi_open module=ffi status=ok count={count} page_size={page_size}");
            RollbookActionResponse::success(format!("Opened {count} record(s)."), None, Vec::new())
        }
    }
}

/// Returns the current table page.
#[flutter_rust_bridge::frb(sync)]
pub fn rollbook_page() -> RollbookPageResponse {
    with_session(|session| session.page())
}

/// Adds a record from dialog input.
#[flutter_rust_bridge::frb(sync)]
pub fn rollbook_add(input: RollbookRecordInput) -> RollbookActionResponse {
    with_session(|session| session.add(input))
}

/// Replaces the fields of record `record_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn rollbook_update(record_id: u64, input: RollbookRecordInput) -> RollbookActionResponse {
    with_session(|session| session.update(record_id, input))
}

/// Deletes the listed records.
#[flutter_rust_bridge::frb(sync)]
pub fn rollbook_delete(record_ids: Vec<u64>) -> RollbookActionResponse {
    with_session(|session| session.delete(&record_ids))
}

/// Applies the filter panel and returns page 1.
#[flutter_rust_bridge::frb(sync)]
pub fn rollbook_set_filter(filter: RollbookFilterInput) -> RollbookPageResponse {
    page_call(|session| {
        session.store.set_filter(to_filter_spec(filter));
        Ok(())
    })
}

/// Clears every filter clause and returns page 1.
#[flutter_rust_bridge::frb(sync)]
pub fn rollbook_reset_filter() -> RollbookPageResponse {
    page_call(|session| {
        session.store.reset_filter();
        Ok(())
    })
}

/// Header click on `column` (`id|name|git|contact`).
#[flutter_rust_bridge::frb(sync)]
pub fn rollbook_toggle_sort(column: String) -> RollbookPageResponse {
    page_call(|session| {
        let column = SortColumn::from_label(&column)
            .ok_or_else(|| format!("unknown sort column `{}`", column.trim()))?;
        session.store.set_sort(column);
        Ok(())
    })
}

/// Moves to `page_number`, clamped into range.
#[flutter_rust_bridge::frb(sync)]
pub fn rollbook_go_to_page(page_number: u32) -> RollbookPageResponse {
    page_call(|session| {
        session.store.set_page(page_number as usize);
        Ok(())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn rollbook_next_page() -> RollbookPageResponse {
    page_call(|session| {
        session.store.next_page();
        Ok(())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn rollbook_prev_page() -> RollbookPageResponse {
    page_call(|session| {
        session.store.prev_page();
        Ok(())
    })
}

/// Maps selected row positions on the current page to record ids.
///
/// Out-of-range positions are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn rollbook_ids_for_rows(rows: Vec<u32>) -> Vec<u64> {
    let rows: Vec<usize> = rows.into_iter().map(|row| row as usize).collect();
    with_session(|session| session.store.projection().ids_for_rows(&rows))
}

/// Collects event names emitted while one FFI call runs.
#[derive(Default)]
struct EventTap {
    names: Mutex<Vec<String>>,
}

impl EventTap {
    fn drain(&self) -> Vec<String> {
        let mut names = self
            .names
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *names)
    }
}

impl StoreObserver for EventTap {
    fn on_store_event(&self, event: &StoreEvent) {
        self.names
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.name().to_string());
    }
}

struct Session<R: RecordRepository> {
    store: RecordStore<R>,
    tap: Arc<EventTap>,
}

impl<R: RecordRepository> Session<R> {
    fn open(repo: R, page_size: usize) -> Self {
        let mut store = RecordStore::open(repo, page_size);
        let tap = Arc::new(EventTap::default());
        store.subscribe(tap.clone());
        Self { store, tap }
    }

    fn page(&self) -> RollbookPageResponse {
        RollbookPageResponse::from_projection(self.store.projection(), self.tap.drain())
    }

    fn add(&mut self, input: RollbookRecordInput) -> RollbookActionResponse {
        match self.store.add(to_record_fields(input)) {
            Ok(record) => RollbookActionResponse::success(
                "Record added.",
                Some(record.id()),
                self.tap.drain(),
            ),
            Err(err) => RollbookActionResponse::from_store_error(
                "add",
                err,
                Some(self.store.last_assigned_id()),
                self.tap.drain(),
            ),
        }
    }

    fn update(&mut self, record_id: RecordId, input: RollbookRecordInput) -> RollbookActionResponse {
        match self.store.update(record_id, to_record_fields(input)) {
            Ok(record) => RollbookActionResponse::success(
                "Record updated.",
                Some(record.id()),
                self.tap.drain(),
            ),
            Err(err) => {
                RollbookActionResponse::from_store_error(
                    "update",
                    err,
                    Some(record_id),
                    self.tap.drain(),
                )
            }
        }
    }

    fn delete(&mut self, record_ids: &[RecordId]) -> RollbookActionResponse {
        if record_ids.is_empty() {
            return RollbookActionResponse::failure("delete failed: no records selected", Vec::new());
        }
        match self.store.delete_many(record_ids) {
            Ok(removed) => RollbookActionResponse::success(
                format!("Deleted {removed} record(s)."),
                None,
                self.tap.drain(),
            ),
            Err(err) => {
                RollbookActionResponse::from_store_error("delete", err, None, self.tap.drain())
            }
        }
    }
}

fn lock_session() -> MutexGuard<'static, Option<Session<JsonFileRecordRepository>>> {
    SESSION
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_session<T>(f: impl FnOnce(&mut Session<JsonFileRecordRepository>) -> T) -> T {
    let mut guard = lock_session();
    let session = guard.get_or_insert_with(|| {
        Session::open(
            JsonFileRecordRepository::new(resolve_data_path()),
            DEFAULT_PAGE_SIZE,
        )
    });
    f(session)
}

fn page_call(
    f: impl FnOnce(&mut Session<JsonFileRecordRepository>) -> Result<(), String>,
) -> RollbookPageResponse {
    with_session(|session| match f(session) {
        Ok(()) => session.page(),
        Err(message) => RollbookPageResponse::failure(message),
    })
}

fn resolve_data_path() -> PathBuf {
    DATA_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("ROLLBOOK_DATA_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DATA_FILE_NAME)
        })
        .clone()
}

fn to_record_fields(input: RollbookRecordInput) -> RecordFields {
    RecordFields {
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        patronymic: input.patronymic,
        git: input.git,
        email: input.email,
        phone: input.phone,
        messaging_handle: input.messaging_handle,
    }
}

fn to_filter_spec(input: RollbookFilterInput) -> FilterSpec {
    let clause = |filter: Option<RollbookFieldFilter>| {
        filter.map(|filter| FieldClause {
            state: PresenceState::from_label(&filter.state),
            text: filter.text,
        })
    };
    FilterSpec {
        name: input.name,
        git: clause(input.git),
        email: clause(input.email),
        phone: clause(input.phone),
        messaging: clause(input.messaging),
        contact: clause(input.contact),
    }
}

fn projection_message(projection: &ViewProjection) -> String {
    if projection.total_count == 0 {
        "No records.".to_string()
    } else {
        projection.page_label()
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
