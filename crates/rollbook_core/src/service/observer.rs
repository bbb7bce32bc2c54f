//! Store change notifications.
//!
//! # Responsibility
//! - Define the event vocabulary emitted by `RecordStore`.
//! - Keep registered observers in registration order.
//!
//! # Invariants
//! - Registering the same observer twice has no additional effect.
//! - Removing an observer that is not registered is a no-op.
//! - Observer identity is the `Arc` allocation, not value equality.

use crate::model::record::RecordId;
use crate::query::sort::SortSpec;
use std::fmt;
use std::sync::Arc;

/// Change emitted after the store finished updating state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    RecordAdded { id: RecordId },
    RecordUpdated { id: RecordId },
    RecordDeleted { id: RecordId },
    FiltersUpdated,
    SortUpdated(SortSpec),
    PageUpdated { page_number: usize },
    /// Bulk change: several records removed or the collection reloaded.
    StateChanged,
}

impl StoreEvent {
    /// Stable event name exposed to UI layers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RecordAdded { .. } => "record_added",
            Self::RecordUpdated { .. } => "record_updated",
            Self::RecordDeleted { .. } => "record_deleted",
            Self::FiltersUpdated => "filters_updated",
            Self::SortUpdated(_) => "sort_updated",
            Self::PageUpdated { .. } => "page_updated",
            Self::StateChanged => "state_changed",
        }
    }
}

/// Receiver of store change events.
pub trait StoreObserver: Send + Sync {
    fn on_store_event(&self, event: &StoreEvent);
}

/// Ordered observer registry owned by one store.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Arc<dyn StoreObserver>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer`. Returns `false` when it was already registered.
    pub fn subscribe(&mut self, observer: Arc<dyn StoreObserver>) -> bool {
        if self.position(&observer).is_some() {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Removes `observer`. Returns `false` when it was not registered.
    pub fn unsubscribe(&mut self, observer: &Arc<dyn StoreObserver>) -> bool {
        match self.position(observer) {
            Some(index) => {
                self.observers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Delivers `event` to every observer in registration order.
    pub fn notify(&self, event: &StoreEvent) {
        for observer in &self.observers {
            observer.on_store_event(event);
        }
    }

    fn position(&self, observer: &Arc<dyn StoreObserver>) -> Option<usize> {
        let target = Arc::as_ptr(observer) as *const ();
        self.observers
            .iter()
            .position(|candidate| Arc::as_ptr(candidate) as *const () == target)
    }
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ObserverList, StoreEvent, StoreObserver};
    use std::sync::{Arc, Mutex};

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl StoreObserver for Recorder {
        fn on_store_event(&self, event: &StoreEvent) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.label, event.name()));
        }
    }

    #[test]
    fn notify_follows_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut list = ObserverList::new();
        list.subscribe(Arc::new(Recorder {
            label: "a",
            log: log.clone(),
        }));
        list.subscribe(Arc::new(Recorder {
            label: "b",
            log: log.clone(),
        }));

        list.notify(&StoreEvent::FiltersUpdated);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:filters_updated", "b:filters_updated"]
        );
    }

    #[test]
    fn subscribe_and_unsubscribe_are_idempotent() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let observer: Arc<dyn StoreObserver> = Arc::new(Recorder { label: "a", log });
        let mut list = ObserverList::new();

        assert!(list.subscribe(observer.clone()));
        assert!(!list.subscribe(observer.clone()));
        assert_eq!(list.len(), 1);

        assert!(list.unsubscribe(&observer));
        assert!(!list.unsubscribe(&observer));
        assert!(list.is_empty());
    }
}
