//! Idempotency gate for externally delivered add requests.
//!
//! The host may deliver the same add notification more than once for a single
//! click. Each notification carries a one-time `AddToken`; only the first
//! delivery of a token is allowed to append a row.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, trace};

use crate::signal::AddToken;

/// Remembers every add token that has already produced a row.
///
/// Entries are never pruned. Tokens are minted once per user gesture, so the
/// set grows with user activity rather than with delivery volume.
#[derive(Debug, Default)]
pub struct AddRequestDeduplicator {
    seen: Mutex<HashSet<AddToken>>,
}

impl AddRequestDeduplicator {
    /// Creates an empty gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time `token` is offered, false ever after.
    pub fn try_add(&self, token: AddToken) -> bool {
        let accepted = self
            .seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token);
        if accepted {
            debug!(%token, "add request accepted");
        } else {
            trace!(%token, "duplicate add request ignored");
        }
        accepted
    }

    /// True if `token` has already been accepted.
    #[must_use]
    pub fn has_seen(&self, token: AddToken) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&token)
    }

    /// Number of distinct tokens accepted so far.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
