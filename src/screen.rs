//! Presentation model for the configuration screen.
//!
//! The screen renders one row per record, writes field edits straight through
//! to the shared store and routes the two mutation paths that need protection:
//! externally signalled adds go through the deduplicator, row removal goes
//! through the removal guard and a deferred task on this screen's scheduler.
//! The host drives it from its UI context: gestures call the methods below,
//! and `tick` is called whenever `next_wakeup` has passed.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ScreenConfig;
use crate::dedup::AddRequestDeduplicator;
use crate::error::InteractionError;
use crate::guard::{ArmOutcome, GuardState, RemovalGuard};
use crate::record::{NameRecord, RecordField, RecordId};
use crate::scheduler::{Clock, Scheduler};
use crate::signal::{AddSignal, AddSignalCenter, AddSignalSubscription};
use crate::store::{ListenerId, NamesStore, StoreChange};

/// Deferred work owned by a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenTask {
    /// Commit the removal captured when the guard was armed.
    CommitRemoval {
        /// Row position at arm time.
        index: usize,
        /// Record that occupied it.
        record_id: RecordId,
    },
}

/// One editable input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    /// Which field the input is bound to.
    pub field: RecordField,
    /// Placeholder label.
    pub label: &'static str,
    /// Current content.
    pub value: String,
    /// Whether the input hides its content.
    pub obscured: bool,
}

impl FieldView {
    fn bind(record: &NameRecord, field: RecordField) -> Self {
        Self {
            field,
            label: field.label(),
            value: record.field(field).to_string(),
            obscured: field.is_obscured(),
        }
    }
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    /// Position in the store at render time.
    pub index: usize,
    /// Record identity.
    pub id: RecordId,
    /// Obscured dead-name input.
    pub dead_name: FieldView,
    /// Plain current-name input.
    pub current_name: FieldView,
}

/// Main area of the screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum ScreenBody {
    /// Neutral surface shown while a removal is pending.
    Placeholder,
    /// Editable rows in store order.
    Rows(Vec<RowView>),
}

/// Everything the host needs to draw the screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenView {
    /// Rows, or the placeholder during a removal cool-down.
    pub body: ScreenBody,
    /// Help text under the rows.
    pub footer: String,
    /// Show a "Done" control that dismisses the screen.
    pub show_done_control: bool,
}

impl ScreenView {
    /// Rows, or an empty slice while the placeholder is shown.
    #[must_use]
    pub fn rows(&self) -> &[RowView] {
        match &self.body {
            ScreenBody::Placeholder => &[],
            ScreenBody::Rows(rows) => rows,
        }
    }

    /// True while a removal is pending.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self.body, ScreenBody::Placeholder)
    }
}

type DismissFn = Box<dyn FnMut() + Send>;

/// A configuration screen bound to the shared store.
pub struct ConfigurationScreen {
    store: Arc<NamesStore>,
    dedup: Arc<AddRequestDeduplicator>,
    signals: AddSignalSubscription,
    clock: Arc<dyn Clock>,
    config: ScreenConfig,
    guard: RemovalGuard,
    scheduler: Scheduler<ScreenTask>,
    render_generation: Arc<AtomicU64>,
    listener_id: ListenerId,
    on_dismiss: Option<DismissFn>,
}

impl fmt::Debug for ConfigurationScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationScreen")
            .field("guard", &self.guard)
            .field("pending_tasks", &self.scheduler.len())
            .field("render_generation", &self.render_generation())
            .field("listener_id", &self.listener_id)
            .finish_non_exhaustive()
    }
}

impl ConfigurationScreen {
    /// Open a screen on `store`, fed by `signals`.
    ///
    /// Every screen fed by the same signal centre must share the same
    /// deduplicator, otherwise one add request would append one row per open
    /// screen.
    pub fn new(
        store: Arc<NamesStore>,
        dedup: Arc<AddRequestDeduplicator>,
        signals: &AddSignalCenter,
        config: ScreenConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let render_generation = Arc::new(AtomicU64::new(0));
        let generation = Arc::clone(&render_generation);
        let listener_id = store.subscribe(Arc::new(move |_: &StoreChange, _: &[NameRecord]| {
            generation.fetch_add(1, Ordering::Relaxed);
        }));
        let subscription = signals.subscribe(config.signal_capacity());

        debug!(%listener_id, records = store.len(), "configuration screen opened");

        Self {
            store,
            dedup,
            signals: subscription,
            clock,
            config,
            guard: RemovalGuard::new(),
            scheduler: Scheduler::new(),
            render_generation,
            listener_id,
            on_dismiss: None,
        }
    }

    /// Install the host's dismiss callback.
    #[must_use]
    pub fn with_dismiss(mut self, on_dismiss: impl FnMut() + Send + 'static) -> Self {
        self.on_dismiss = Some(Box::new(on_dismiss));
        self
    }

    /// The shared store.
    #[must_use]
    pub fn store(&self) -> &Arc<NamesStore> {
        &self.store
    }

    /// Current removal guard state.
    #[must_use]
    pub const fn guard_state(&self) -> GuardState {
        self.guard.state()
    }

    /// True while a removal is pending and rows are not addressable.
    #[must_use]
    pub const fn is_suspended(&self) -> bool {
        self.guard.is_suspended()
    }

    /// Bumped on every store mutation and guard transition; a host redraws
    /// when it changes.
    #[must_use]
    pub fn render_generation(&self) -> u64 {
        self.render_generation.load(Ordering::Relaxed)
    }

    fn invalidate(&self) {
        self.render_generation.fetch_add(1, Ordering::Relaxed);
    }

    /// Build the current view.
    #[must_use]
    pub fn render(&self) -> ScreenView {
        let body = if self.guard.is_suspended() {
            ScreenBody::Placeholder
        } else {
            // One snapshot per render, so every row index is valid for the
            // rows it is drawn with.
            let rows = self
                .store
                .records()
                .iter()
                .enumerate()
                .map(|(index, record)| RowView {
                    index,
                    id: record.id,
                    dead_name: FieldView::bind(record, RecordField::DeadName),
                    current_name: FieldView::bind(record, RecordField::CurrentName),
                })
                .collect();
            ScreenBody::Rows(rows)
        };

        ScreenView {
            body,
            footer: self.config.footer.clone(),
            show_done_control: self.config.host.window_close_affordance,
        }
    }

    /// Direct "add row" gesture. Always appends; not deduplicated.
    pub fn add_row(&mut self) -> usize {
        self.store.append(NameRecord::blank())
    }

    /// Apply one externally delivered add signal. Returns true if a row was
    /// appended.
    pub fn handle_add_signal(&mut self, signal: AddSignal) -> bool {
        if !self.dedup.try_add(signal.token) {
            return false;
        }
        self.store.append(NameRecord::blank());
        true
    }

    /// Drain pending add signals. Returns the number of rows appended.
    pub fn pump_signals(&mut self) -> usize {
        let signals = self.signals.drain();
        signals
            .into_iter()
            .filter(|signal| self.handle_add_signal(*signal))
            .count()
    }

    /// Write one field of the row at `index`.
    ///
    /// # Errors
    ///
    /// `InteractionError::RemovalPending` while a removal is in flight, or
    /// `InteractionError::Store` if the row no longer exists.
    pub fn edit(&mut self, index: usize, field: RecordField, value: impl Into<String>) -> Result<(), InteractionError> {
        if self.guard.is_suspended() {
            return Err(InteractionError::RemovalPending);
        }
        self.store.update_field(index, field, value)?;
        Ok(())
    }

    /// Remove gesture on the row at `index`.
    ///
    /// The row disappears behind the placeholder immediately; the store is
    /// mutated once the cool-down elapses and `tick` runs. Requests made while
    /// another removal is pending are ignored.
    ///
    /// # Errors
    ///
    /// `InteractionError::RowNotFound` if `index` is not a current row.
    pub fn request_removal(&mut self, index: usize) -> Result<ArmOutcome, InteractionError> {
        // While suspended, `index` may already be stale; don't resolve it.
        if self.guard.is_suspended() {
            debug!(index, "removal requested during cool-down; ignoring");
            return Ok(ArmOutcome::Ignored);
        }

        let record = self.store.get(index).ok_or(InteractionError::RowNotFound { index })?;
        let now = self.clock.now();
        let outcome = self.guard.arm(index, record.id, now, self.config.removal_cooldown());
        if outcome.is_armed() {
            self.scheduler.schedule_after(
                now,
                self.config.removal_cooldown(),
                ScreenTask::CommitRemoval {
                    index,
                    record_id: record.id,
                },
            );
            self.invalidate();
        }
        Ok(outcome)
    }

    /// When the next deferred task is due.
    #[must_use]
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.scheduler.next_fire_time()
    }

    /// Run every task that is due. Returns how many ran.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mut ran = 0;
        while let Some(task) = self.scheduler.pop_due(now) {
            self.run(task);
            ran += 1;
        }
        ran
    }

    fn run(&mut self, task: ScreenTask) {
        match task {
            ScreenTask::CommitRemoval { index, record_id } => {
                self.commit_removal(index, record_id);
                self.guard.disarm();
                self.invalidate();
            }
        }
    }

    fn commit_removal(&self, index: usize, record_id: RecordId) {
        // Another screen may have moved or removed the record since arming.
        let target = match self.store.get(index) {
            Some(record) if record.id == record_id => Some(index),
            _ => self.store.position_of(record_id),
        };

        let Some(target) = target else {
            warn!(index, %record_id, "record vanished before deferred removal; skipping");
            return;
        };
        if target != index {
            debug!(index, target, %record_id, "record moved during cool-down; removing at new position");
        }

        if let Err(err) = self.store.remove_at(target) {
            warn!(%err, %record_id, "deferred removal lost a race");
        }
    }

    /// "Done" gesture. Edits are already live, so this only hands control back
    /// to the host.
    pub fn dismiss(&mut self) -> bool {
        match self.on_dismiss.as_mut() {
            Some(on_dismiss) => {
                debug!("configuration screen dismissed");
                on_dismiss();
                true
            }
            None => false,
        }
    }
}

impl Drop for ConfigurationScreen {
    fn drop(&mut self) {
        // An armed removal is not cancellable; closing the screen ends the
        // animation early, so commit now.
        for task in self.scheduler.drain() {
            debug!(?task, "committing deferred task on screen close");
            self.run(task);
        }
        self.store.unsubscribe(self.listener_id);
    }
}
