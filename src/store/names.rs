//! The shared, observable list of name records.
//!
//! One `NamesStore` is created at application start and handed by `Arc` to
//! every configuration screen. The backing sequence is only reachable through
//! the store's own operations; every mutation bumps the revision and then
//! notifies listeners with the complete, fully-applied sequence.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, error, trace, warn};

use crate::error::StoreError;
use crate::record::{NameRecord, RecordField, RecordId};

use super::listener::{ListenerId, StoreChange, StoreListener};
use super::snapshot::NamesSnapshot;

#[derive(Debug, Default)]
struct StoreState {
    records: Vec<NameRecord>,
    revision: u64,
}

type ListenerEntry = (ListenerId, Arc<dyn StoreListener>);

/// Ordered collection of name records with change notification.
#[derive(Default)]
pub struct NamesStore {
    state: RwLock<StoreState>,
    listeners: RwLock<Vec<ListenerEntry>>,
}

impl std::fmt::Debug for NamesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("NamesStore")
            .field("records", &state.records)
            .field("revision", &state.revision)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

// The store never leaves a half-applied mutation behind, so a poisoned lock
// still guards a consistent sequence.
fn recover<G>(context: &'static str, err: PoisonError<G>) -> G {
    warn!(context, "recovering poisoned names store lock");
    err.into_inner()
}

impl NamesStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`, in order.
    #[must_use]
    pub fn with_records(records: Vec<NameRecord>) -> Self {
        Self {
            state: RwLock::new(StoreState { records, revision: 0 }),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Restores a store from a persisted snapshot, keeping its revision.
    #[must_use]
    pub fn from_snapshot(snapshot: NamesSnapshot) -> Self {
        debug!(
            revision = snapshot.revision,
            records = snapshot.records.len(),
            "restoring names store from snapshot"
        );
        Self {
            state: RwLock::new(StoreState {
                records: snapshot.records,
                revision: snapshot.revision,
            }),
            listeners: RwLock::new(Vec::new()),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(|e| recover("state.read", e))
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(|e| recover("state.write", e))
    }

    /// Appends `record` at the end of the sequence and returns its index.
    pub fn append(&self, record: NameRecord) -> usize {
        let (change, records) = {
            let mut state = self.write_state();
            let index = state.records.len();
            let id = record.id;
            state.records.push(record);
            state.revision += 1;
            debug!(index, %id, revision = state.revision, "appended name record");
            (StoreChange::Appended { index, id }, state.records.clone())
        };
        self.notify(&change, &records);
        change.index()
    }

    /// Removes the record at `index`; later records shift down by one.
    ///
    /// Callers must re-validate `index` against the current length before
    /// calling. A stale index is an invariant violation: debug builds panic,
    /// release builds log it and leave the sequence untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` if `index` is not a current
    /// position (release builds only).
    pub fn remove_at(&self, index: usize) -> Result<NameRecord, StoreError> {
        let outcome = {
            let mut state = self.write_state();
            let len = state.records.len();
            if index < len {
                let removed = state.records.remove(index);
                state.revision += 1;
                debug!(index, id = %removed.id, revision = state.revision, "removed name record");
                let change = StoreChange::Removed { index, id: removed.id };
                Ok((removed, change, state.records.clone()))
            } else {
                Err(StoreError::IndexOutOfRange { index, len })
            }
        };

        match outcome {
            Ok((removed, change, records)) => {
                self.notify(&change, &records);
                Ok(removed)
            }
            Err(err) => {
                error!(%err, "remove_at called with a stale index");
                if cfg!(debug_assertions) {
                    panic!("remove_at called with a stale index: {err}");
                }
                Err(err)
            }
        }
    }

    /// Overwrites one field of the record at `index`.
    ///
    /// Never changes length or order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::IndexOutOfRange` if the row no longer exists,
    /// which happens when an edit races a structural change from another
    /// screen.
    pub fn update_field(&self, index: usize, field: RecordField, value: impl Into<String>) -> Result<(), StoreError> {
        let (change, records) = {
            let mut state = self.write_state();
            let len = state.records.len();
            let record = state
                .records
                .get_mut(index)
                .ok_or(StoreError::IndexOutOfRange { index, len })?;
            record.set_field(field, value);
            let id = record.id;
            state.revision += 1;
            trace!(index, %id, ?field, revision = state.revision, "updated name record field");
            (StoreChange::FieldUpdated { index, id, field }, state.records.clone())
        };
        self.notify(&change, &records);
        Ok(())
    }

    /// Full current sequence, in display order.
    #[must_use]
    pub fn records(&self) -> Vec<NameRecord> {
        self.read_state().records.clone()
    }

    /// Record at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<NameRecord> {
        self.read_state().records.get(index).cloned()
    }

    /// Current position of the record with `id`.
    #[must_use]
    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.read_state().records.iter().position(|r| r.id == id)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_state().records.len()
    }

    /// True if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_state().records.is_empty()
    }

    /// Count of mutations applied since creation (or since the restored
    /// snapshot's revision).
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.read_state().revision
    }

    /// Replacement rules for the matching engine, in precedence order.
    #[must_use]
    pub fn rules(&self) -> Vec<(String, String)> {
        self.snapshot().rules()
    }

    /// Consistent copy of the sequence for a persistence collaborator.
    #[must_use]
    pub fn snapshot(&self) -> NamesSnapshot {
        let state = self.read_state();
        NamesSnapshot {
            revision: state.revision,
            taken_at: Utc::now(),
            records: state.records.clone(),
        }
    }

    /// Registers a listener invoked after every mutation.
    pub fn subscribe(&self, listener: Arc<dyn StoreListener>) -> ListenerId {
        let id = ListenerId::new();
        self.listeners
            .write()
            .unwrap_or_else(|e| recover("listeners.write", e))
            .push((id, listener));
        debug!(%id, "store listener subscribed");
        id
    }

    /// Removes a listener. Returns false if `id` was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| recover("listeners.write", e));
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        let removed = listeners.len() != before;
        if removed {
            debug!(%id, "store listener unsubscribed");
        }
        removed
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().unwrap_or_else(|e| recover("listeners.read", e)).len()
    }

    fn notify(&self, change: &StoreChange, records: &[NameRecord]) {
        // Clone the table so listeners can (un)subscribe from inside a callback.
        let listeners: Vec<Arc<dyn StoreListener>> = self
            .listeners
            .read()
            .unwrap_or_else(|e| recover("listeners.read", e))
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        trace!(listeners = listeners.len(), ?change, "dispatching store change");
        for listener in listeners {
            listener.on_change(change, records);
        }
    }
}
