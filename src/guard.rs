//! Cool-down guard for positional row removal.
//!
//! Removing a row is animated. If the sequence were mutated immediately, every
//! later row would shift up by one while its on-screen representation had not
//! caught up, and an edit landing in that window could hit the wrong record.
//! The guard defers the structural removal by a fixed cool-down and, while it
//! is pending, tells the presentation layer to stop resolving rows by position.
//!
//! ```text
//!   Idle --arm(i)--> Suspended{i} --cool-down elapses, removeAt(i)--> Idle
//!                    Suspended --arm(j)--> Suspended (ignored)
//! ```

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::RecordId;

/// A removal captured at arm time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRemoval {
    /// Row position the gesture targeted.
    pub index: usize,
    /// Identity of the record that was at `index` when armed.
    pub record_id: RecordId,
    /// When the structural removal is due.
    pub fires_at: Instant,
}

/// Guard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    /// Rows may be addressed by position.
    #[default]
    Idle,
    /// A removal is in flight; positional interaction is suspended.
    Suspended(PendingRemoval),
}

/// Result of a removal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ArmOutcome {
    /// The guard moved to `Suspended`; the removal will commit after the cool-down.
    Armed,
    /// Another removal is already pending; the request was dropped.
    Ignored,
}

impl ArmOutcome {
    /// True if the request will lead to a removal.
    #[must_use]
    pub const fn is_armed(self) -> bool {
        matches!(self, Self::Armed)
    }
}

/// Two-state removal guard.
#[derive(Debug, Default)]
pub struct RemovalGuard {
    state: GuardState,
}

impl RemovalGuard {
    /// Create an idle guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GuardState {
        self.state
    }

    /// True while a removal is pending.
    #[must_use]
    pub const fn is_suspended(&self) -> bool {
        matches!(self.state, GuardState::Suspended(_))
    }

    /// The pending removal, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<PendingRemoval> {
        match self.state {
            GuardState::Idle => None,
            GuardState::Suspended(p) => Some(p),
        }
    }

    /// Request removal of the row at `index`, currently holding `record_id`.
    ///
    /// From `Idle` this suspends positional interaction until
    /// `now + cooldown`. While already suspended the request is ignored: the
    /// index it carries may already be stale.
    pub fn arm(&mut self, index: usize, record_id: RecordId, now: Instant, cooldown: Duration) -> ArmOutcome {
        if let GuardState::Suspended(pending) = self.state {
            debug!(
                index,
                pending_index = pending.index,
                "removal requested while another is pending; ignoring"
            );
            return ArmOutcome::Ignored;
        }

        let fires_at = now + cooldown;
        self.state = GuardState::Suspended(PendingRemoval {
            index,
            record_id,
            fires_at,
        });
        #[allow(clippy::cast_possible_truncation)]
        let cooldown_ms = cooldown.as_millis().min(u128::from(u64::MAX)) as u64;
        debug!(index, %record_id, cooldown_ms, "removal guard armed");
        ArmOutcome::Armed
    }

    /// Return to `Idle`, handing back the removal that was pending.
    pub fn disarm(&mut self) -> Option<PendingRemoval> {
        let pending = self.pending();
        self.state = GuardState::Idle;
        if let Some(p) = pending {
            debug!(index = p.index, record_id = %p.record_id, "removal guard disarmed");
        }
        pending
    }
}
