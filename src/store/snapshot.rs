//! Serializable point-in-time copy of the name list.
//!
//! Persistence lives outside this crate. A persistence listener takes a
//! snapshot after any mutation and writes it wherever the host keeps settings;
//! on the next launch the host restores the store with
//! `NamesStore::from_snapshot`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::NameRecord;

/// Snapshot of a `NamesStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamesSnapshot {
    /// Store revision the snapshot was taken at.
    pub revision: u64,
    /// Wall-clock capture time.
    pub taken_at: DateTime<Utc>,
    /// Records in display order.
    pub records: Vec<NameRecord>,
}

impl NamesSnapshot {
    /// Replacement rules in precedence order.
    ///
    /// Rules with an empty dead name are included; consumers treat them as
    /// matching nothing.
    #[must_use]
    pub fn rules(&self) -> Vec<(String, String)> {
        self.records
            .iter()
            .map(|r| (r.dead_name.clone(), r.current_name.clone()))
            .collect()
    }

    /// Number of rules that can actually match text.
    #[must_use]
    pub fn active_rule_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_noop_rule()).count()
    }
}
