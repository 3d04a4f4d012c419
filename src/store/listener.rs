//! Change notification types for `NamesStore`.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{NameRecord, RecordField, RecordId};

/// Unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Create a new random listener id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The mutation that was just applied.
///
/// Listeners always receive the full sequence alongside this; the change is a
/// hint, never a substitute for reading the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreChange {
    /// A record was pushed at the end.
    Appended {
        /// New last position.
        index: usize,
        /// Id of the appended record.
        id: RecordId,
    },
    /// A record was removed; later records shifted down by one.
    Removed {
        /// Position the record held before removal.
        index: usize,
        /// Id of the removed record.
        id: RecordId,
    },
    /// One field of a record was rewritten in place.
    FieldUpdated {
        /// Position of the edited record.
        index: usize,
        /// Id of the edited record.
        id: RecordId,
        /// Which field changed.
        field: RecordField,
    },
}

impl StoreChange {
    /// Position the mutation applied to.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Appended { index, .. } | Self::Removed { index, .. } | Self::FieldUpdated { index, .. } => *index,
        }
    }

    /// True if the mutation changed the length of the sequence.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        !matches!(self, Self::FieldUpdated { .. })
    }
}

/// Observer of store mutations.
///
/// Called synchronously, after the mutation is fully applied and outside the
/// store's lock, so implementations may read the store again.
pub trait StoreListener: Send + Sync {
    /// Handle one applied mutation.
    fn on_change(&self, change: &StoreChange, records: &[NameRecord]);
}

impl<F> StoreListener for F
where
    F: Fn(&StoreChange, &[NameRecord]) + Send + Sync,
{
    fn on_change(&self, change: &StoreChange, records: &[NameRecord]) {
        self(change, records);
    }
}
