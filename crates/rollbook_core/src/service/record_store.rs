//! Authoritative in-memory record store.
//!
//! # Responsibility
//! - Own the record collection and the current filter/sort/page state.
//! - Maintain the derived filtered+sorted view and serve pages from it.
//! - Persist mutations through a `RecordRepository` and notify observers.
//!
//! # Invariants
//! - The derived view is rebuilt only when the collection, filter or sort
//!   changed since it was last built; page requests reuse it.
//! - `page_number` always lies in `[1, total_pages]` for the current view.
//! - Validation failures and unknown ids leave state untouched and emit no
//!   events.
//! - Mutations commit in memory before persisting. A failed save keeps the
//!   change, marks the store dirty and still notifies observers.
//! - A store opened over an unreadable repository never overwrites it
//!   implicitly; only an explicit `save()` or a successful `reload()` lifts
//!   that block.
//! - Record ids are never reused within one store instance.

use crate::model::record::{Record, RecordFields, RecordId, RecordValidationError};
use crate::query::filter::FilterSpec;
use crate::query::page::PageSpec;
use crate::query::sort::{sort_indices, SortColumn, SortSpec};
use crate::repo::record_repo::{RecordRepository, RepoError};
use crate::service::observer::{ObserverList, StoreEvent, StoreObserver};
use crate::service::projection::ViewProjection;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Record store operation failure.
#[derive(Debug)]
pub enum StoreError {
    /// Input fields failed validation; nothing changed.
    Validation(RecordValidationError),
    /// No record has the requested id; nothing changed.
    NotFound(RecordId),
    /// The in-memory change was applied but could not be saved.
    Persistence(RepoError),
    /// The in-memory change was applied but not saved, because the store
    /// started empty after its repository failed to load.
    SaveBlocked(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Persistence(err) => write!(f, "change kept but not saved: {err}"),
            Self::SaveBlocked(reason) => write!(
                f,
                "change kept but not saved: stored records could not be loaded ({reason})"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) | Self::SaveBlocked(_) => None,
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<RecordValidationError> for StoreError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

/// One page of the derived view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub rows: Vec<Record>,
    /// Number of records passing the current filter.
    pub total_count: usize,
    pub page_number: usize,
    pub total_pages: usize,
}

#[derive(Debug, Default)]
struct DerivedView {
    /// Positions into the record collection, filtered and sorted.
    indices: Vec<usize>,
    /// `(source_version, query_version)` the indices were built for.
    built_for: Option<(u64, u64)>,
}

/// Record store over a persistence gateway.
pub struct RecordStore<R: RecordRepository> {
    repo: R,
    records: Vec<Record>,
    filter: FilterSpec,
    sort: SortSpec,
    page: PageSpec,
    view: DerivedView,
    source_version: u64,
    query_version: u64,
    view_rebuilds: u64,
    observers: ObserverList,
    dirty: bool,
    id_high_water: RecordId,
    /// Set when `open` fell back to an empty collection.
    load_error: Option<String>,
}

impl<R: RecordRepository> RecordStore<R> {
    /// Opens a store, starting empty when the repository cannot be loaded.
    ///
    /// After such a fallback, mutations stay in memory and report
    /// `StoreError::SaveBlocked` until `save()` or `reload()` succeeds.
    pub fn open(repo: R, page_size: usize) -> Self {
        match repo.load() {
            Ok(records) => Self::with_records(repo, records, page_size),
            Err(err) => {
                warn!(
                    "event=store_open module=store status=error fallback=empty error={}",
                    err
                );
                let mut store = Self::with_records(repo, Vec::new(), page_size);
                store.load_error = Some(err.to_string());
                store
            }
        }
    }

    /// Opens a store, propagating repository load failures.
    pub fn try_open(repo: R, page_size: usize) -> StoreResult<Self> {
        let records = repo.load()?;
        Ok(Self::with_records(repo, records, page_size))
    }

    fn with_records(repo: R, records: Vec<Record>, page_size: usize) -> Self {
        let id_high_water = max_id(&records);
        let mut store = Self {
            repo,
            records,
            filter: FilterSpec::default(),
            sort: SortSpec::default(),
            page: PageSpec::new(page_size),
            view: DerivedView::default(),
            source_version: 0,
            query_version: 0,
            view_rebuilds: 0,
            observers: ObserverList::new(),
            dirty: false,
            id_high_water,
            load_error: None,
        };
        store.refresh_view();
        info!(
            "event=store_open module=store status=ok count={} page_size={}",
            store.records.len(),
            store.page.page_size()
        );
        store
    }

    /// Registers an observer. Returns `false` when it was already registered.
    pub fn subscribe(&mut self, observer: Arc<dyn StoreObserver>) -> bool {
        self.observers.subscribe(observer)
    }

    /// Removes an observer. Returns `false` when it was not registered.
    pub fn unsubscribe(&mut self, observer: &Arc<dyn StoreObserver>) -> bool {
        self.observers.unsubscribe(observer)
    }

    /// Validates `fields`, assigns a fresh id and appends the record.
    pub fn add(&mut self, fields: RecordFields) -> StoreResult<Record> {
        let started_at = Instant::now();
        let id = self.id_high_water + 1;
        let record = Record::new(id, fields).map_err(|err| rejected("record_add", err))?;

        self.id_high_water = id;
        self.records.push(record.clone());
        self.source_changed();
        let persisted = self.persist();
        self.observers.notify(&StoreEvent::RecordAdded { id });
        log_mutation("record_add", id, started_at, &persisted);
        persisted.map(|()| record)
    }

    /// Replaces the fields of record `id`, keeping its id.
    pub fn update(&mut self, id: RecordId, fields: RecordFields) -> StoreResult<Record> {
        let started_at = Instant::now();
        let index = self.index_of(id).ok_or_else(|| not_found("record_update", id))?;
        let updated = self.records[index]
            .with_fields(fields)
            .map_err(|err| rejected("record_update", err))?;

        self.records[index] = updated.clone();
        self.source_changed();
        let persisted = self.persist();
        self.observers.notify(&StoreEvent::RecordUpdated { id });
        log_mutation("record_update", id, started_at, &persisted);
        persisted.map(|()| updated)
    }

    /// Removes record `id`. Returns `Ok(false)` when no such record exists.
    pub fn delete(&mut self, id: RecordId) -> StoreResult<bool> {
        let started_at = Instant::now();
        let Some(index) = self.index_of(id) else {
            debug!("event=record_delete module=store status=skipped id={id} reason=not_found");
            return Ok(false);
        };

        self.records.remove(index);
        self.source_changed();
        let persisted = self.persist();
        self.observers.notify(&StoreEvent::RecordDeleted { id });
        log_mutation("record_delete", id, started_at, &persisted);
        persisted.map(|()| true)
    }

    /// Removes every listed record in one pass. Returns how many were removed.
    pub fn delete_many(&mut self, ids: &[RecordId]) -> StoreResult<usize> {
        let started_at = Instant::now();
        let targets: HashSet<RecordId> = ids.iter().copied().collect();
        let before = self.records.len();
        self.records.retain(|record| !targets.contains(&record.id()));
        let removed = before - self.records.len();
        if removed == 0 {
            debug!(
                "event=record_delete_many module=store status=skipped requested={}",
                ids.len()
            );
            return Ok(0);
        }

        self.source_changed();
        let persisted = self.persist();
        self.observers.notify(&StoreEvent::StateChanged);
        match &persisted {
            Ok(()) => info!(
                "event=record_delete_many module=store status=ok requested={} removed={} duration_ms={}",
                ids.len(),
                removed,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=record_delete_many module=store status=error removed={} duration_ms={} error={}",
                removed,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        persisted.map(|()| removed)
    }

    /// Replaces the filter and returns to page 1.
    pub fn set_filter(&mut self, spec: FilterSpec) {
        if spec != self.filter {
            self.filter = spec;
            self.query_version += 1;
        }
        self.page.reset();
        self.refresh_view();
        debug!(
            "event=filters_update module=store status=ok active={} matched={}",
            self.filter.is_active(),
            self.view.indices.len()
        );
        self.observers.notify(&StoreEvent::FiltersUpdated);
    }

    /// Clears every filter clause.
    pub fn reset_filter(&mut self) {
        self.set_filter(FilterSpec::default());
    }

    /// Header-click sort: the active column flips direction, another column
    /// starts ascending. Returns the resulting sort.
    pub fn set_sort(&mut self, column: SortColumn) -> SortSpec {
        let spec = self.sort.toggled(column);
        self.set_sort_spec(spec);
        spec
    }

    /// Applies an explicit sort and returns to page 1.
    pub fn set_sort_spec(&mut self, spec: SortSpec) {
        if spec != self.sort {
            self.sort = spec;
            self.query_version += 1;
        }
        self.page.reset();
        self.refresh_view();
        debug!(
            "event=sort_update module=store status=ok column={} direction={}",
            spec.column.as_str(),
            spec.direction.as_str()
        );
        self.observers.notify(&StoreEvent::SortUpdated(spec));
    }

    /// Moves to `page_number`, clamped into range. Returns the resulting page.
    pub fn set_page(&mut self, page_number: usize) -> usize {
        self.page.go_to(page_number, self.view.indices.len());
        let page_number = self.page.page_number();
        self.observers.notify(&StoreEvent::PageUpdated { page_number });
        page_number
    }

    pub fn next_page(&mut self) -> bool {
        self.step_page(self.page.page_number().saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        self.step_page(self.page.page_number().saturating_sub(1))
    }

    pub fn first_page(&mut self) -> bool {
        self.step_page(1)
    }

    pub fn last_page(&mut self) -> bool {
        self.step_page(self.total_pages())
    }

    /// Current page, served from the cached derived view.
    pub fn get_page(&self) -> Page {
        let total_count = self.view.indices.len();
        let rows = self.view.indices[self.page.range(total_count)]
            .iter()
            .map(|index| self.records[*index].clone())
            .collect();
        Page {
            rows,
            total_count,
            page_number: self.page.page_number(),
            total_pages: self.page.total_pages(total_count),
        }
    }

    /// Display-ready snapshot of the current page.
    pub fn projection(&self) -> ViewProjection {
        ViewProjection::new(
            &self.get_page(),
            self.page.page_size(),
            self.sort,
            self.filter.is_active(),
        )
    }

    pub fn get(&self, id: RecordId) -> Option<Record> {
        self.index_of(id).map(|index| self.records[index].clone())
    }

    /// Copy of the full collection in insertion order.
    pub fn all_records(&self) -> Vec<Record> {
        self.records.clone()
    }

    /// Re-reads the collection from the repository.
    ///
    /// On failure the current state is kept and the error is returned.
    pub fn reload(&mut self) -> StoreResult<()> {
        let started_at = Instant::now();
        let records = self.repo.load()?;
        self.id_high_water = self.id_high_water.max(max_id(&records));
        self.records = records;
        self.dirty = false;
        self.load_error = None;
        self.source_changed();
        self.observers.notify(&StoreEvent::StateChanged);
        info!(
            "event=store_reload module=store status=ok count={} duration_ms={}",
            self.records.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Persists the current collection, clearing the dirty flag on success.
    ///
    /// This also overwrites a repository that failed to load at `open`.
    pub fn save(&mut self) -> StoreResult<()> {
        let saved = self.write_records();
        if saved.is_ok() && self.load_error.take().is_some() {
            warn!(
                "event=store_save module=store status=ok replaced_unreadable=true count={}",
                self.records.len()
            );
        }
        saved
    }

    /// Whether in-memory changes are not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Why `open` fell back to an empty collection, while that still blocks
    /// implicit saves.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Highest id ever assigned or loaded by this store.
    pub fn last_assigned_id(&self) -> RecordId {
        self.id_high_water
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    pub fn page_spec(&self) -> PageSpec {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.page.total_pages(self.view.indices.len())
    }

    /// Number of records passing the current filter.
    pub fn filtered_count(&self) -> usize {
        self.view.indices.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// How many times the derived view was rebuilt.
    pub fn view_rebuilds(&self) -> u64 {
        self.view_rebuilds
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn index_of(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    fn step_page(&mut self, page_number: usize) -> bool {
        let changed = self.page.go_to(page_number, self.view.indices.len());
        if changed {
            self.observers.notify(&StoreEvent::PageUpdated {
                page_number: self.page.page_number(),
            });
        }
        changed
    }

    fn source_changed(&mut self) {
        self.source_version += 1;
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        let key = (self.source_version, self.query_version);
        if self.view.built_for != Some(key) {
            let mut indices: Vec<usize> = (0..self.records.len())
                .filter(|index| self.filter.matches(&self.records[*index]))
                .collect();
            sort_indices(&mut indices, &self.records, self.sort);
            self.view = DerivedView {
                indices,
                built_for: Some(key),
            };
            self.view_rebuilds += 1;
        }
        self.page.clamp_to(self.view.indices.len());
    }

    fn persist(&mut self) -> StoreResult<()> {
        if let Some(reason) = &self.load_error {
            self.dirty = true;
            return Err(StoreError::SaveBlocked(reason.clone()));
        }
        self.write_records()
    }

    fn write_records(&mut self) -> StoreResult<()> {
        match self.repo.save(&self.records) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                self.dirty = true;
                Err(StoreError::Persistence(err))
            }
        }
    }
}

fn max_id(records: &[Record]) -> RecordId {
    records.iter().map(Record::id).max().unwrap_or(0)
}

fn rejected(event: &str, err: RecordValidationError) -> StoreError {
    warn!(
        "event={} module=store status=rejected field={}",
        event,
        err.field()
    );
    StoreError::Validation(err)
}

fn not_found(event: &str, id: RecordId) -> StoreError {
    warn!("event={event} module=store status=not_found id={id}");
    StoreError::NotFound(id)
}

fn log_mutation(event: &str, id: RecordId, started_at: Instant, result: &StoreResult<()>) {
    match result {
        Ok(()) => info!(
            "event={} module=store status=ok id={} duration_ms={}",
            event,
            id,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={} module=store status=error id={} duration_ms={} error={}",
            event,
            id,
            started_at.elapsed().as_millis(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::RecordStore;
    use crate::model::record::RecordFields;
    use crate::repo::memory::MemoryRecordRepository;

    #[test]
    fn page_requests_reuse_the_derived_view() {
        let mut store = RecordStore::open(MemoryRecordRepository::new(), 2);
        for last in ["Ivanov", "Petrov", "Sidorov"] {
            store.add(RecordFields::new(last, "Ivan")).unwrap();
        }
        let rebuilds = store.view_rebuilds();

        store.get_page();
        store.next_page();
        store.get_page();
        store.set_page(1);

        assert_eq!(store.view_rebuilds(), rebuilds);
    }

    #[test]
    fn ids_are_not_reused_after_deleting_the_newest_record() {
        let mut store = RecordStore::open(MemoryRecordRepository::new(), 20);
        store.add(RecordFields::new("Ivanov", "Ivan")).unwrap();
        let second = store.add(RecordFields::new("Petrov", "Petr")).unwrap();
        store.delete(second.id()).unwrap();

        let third = store.add(RecordFields::new("Sidorov", "Sidor")).unwrap();

        assert_eq!(third.id(), 3);
    }

    #[test]
    fn deleting_shrinks_page_into_range() {
        let mut store = RecordStore::open(MemoryRecordRepository::new(), 1);
        store.add(RecordFields::new("Ivanov", "Ivan")).unwrap();
        let last = store.add(RecordFields::new("Petrov", "Petr")).unwrap();
        store.last_page();
        assert_eq!(store.page_spec().page_number(), 2);

        store.delete(last.id()).unwrap();

        assert_eq!(store.page_spec().page_number(), 1);
        assert_eq!(store.get_page().rows.len(), 1);
    }
}
