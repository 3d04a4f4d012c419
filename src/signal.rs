//! In-process delivery of "add a row" notifications.
//!
//! Toolbar buttons and menu commands live outside the configuration screen.
//! They post an `AddSignal` carrying a fresh `AddToken`; every open screen
//! holds a subscription and drains it on its own context. Delivery is
//! at-least-once from the screen's point of view, so the token is what makes
//! it idempotent.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// One-time identifier accompanying an add request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddToken(Uuid);

impl AddToken {
    /// Mint a new random token.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, e.g. one received from the host.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for AddToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AddToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request to append one blank row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSignal {
    /// Token identifying the logical user action.
    pub token: AddToken,
}

impl AddSignal {
    /// Signal for a brand-new user action.
    #[must_use]
    pub fn fresh() -> Self {
        Self { token: AddToken::new() }
    }
}

/// Unique identifier for a signal subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalSubscriptionId(Uuid);

impl SignalSubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Broadcasts add signals to every live subscription.
///
/// Posting never blocks: a subscriber whose queue is full loses the signal
/// (counted in `dropped_signals`), and subscribers whose receiving end is gone
/// are pruned on the next post.
#[derive(Debug, Default)]
pub struct AddSignalCenter {
    subs: Mutex<HashMap<SignalSubscriptionId, Sender<AddSignal>>>,
    dropped_signals: AtomicU64,
}

impl AddSignalCenter {
    /// Create a centre with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a subscription with a bounded queue of `capacity` signals.
    pub fn subscribe(&self, capacity: usize) -> AddSignalSubscription {
        let id = SignalSubscriptionId::new();
        let (tx, rx) = bounded::<AddSignal>(capacity.max(1));
        self.subs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);
        debug!(?id, capacity, "add-signal subscription opened");
        AddSignalSubscription { id, rx }
    }

    /// Deliver `signal` to every subscriber. Returns how many received it.
    pub fn post(&self, signal: AddSignal) -> usize {
        let mut subs = self.subs.lock().unwrap_or_else(PoisonError::into_inner);
        let mut delivered = 0;
        subs.retain(|id, tx| match tx.try_send(signal) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                self.dropped_signals.fetch_add(1, Ordering::Relaxed);
                warn!(?id, token = %signal.token, "add-signal queue full, dropping signal");
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(?id, "pruning closed add-signal subscription");
                false
            }
        });
        delivered
    }

    /// Number of live subscriptions (as of the last post).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Signals lost to full subscriber queues.
    #[must_use]
    pub fn dropped_signals(&self) -> u64 {
        self.dropped_signals.load(Ordering::Relaxed)
    }
}

/// Receiving end of an add-signal subscription.
///
/// Dropping it closes the queue; the centre forgets it on the next post.
#[derive(Debug)]
pub struct AddSignalSubscription {
    id: SignalSubscriptionId,
    rx: Receiver<AddSignal>,
}

impl AddSignalSubscription {
    /// The id backing this subscription.
    #[must_use]
    pub const fn id(&self) -> SignalSubscriptionId {
        self.id
    }

    /// Take the next pending signal without blocking.
    #[must_use]
    pub fn try_next(&self) -> Option<AddSignal> {
        match self.rx.try_recv() {
            Ok(signal) => Some(signal),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Take every pending signal without blocking, in delivery order.
    #[must_use]
    pub fn drain(&self) -> Vec<AddSignal> {
        self.rx.try_iter().collect()
    }
}
