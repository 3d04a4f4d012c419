//! Application-lifetime wiring.
//!
//! `EraserApp` is created once at start-up and owns the pieces every screen
//! shares: the name store, the add-request deduplicator and the add-signal
//! centre. Screens are opened from it instead of reaching for globals.

use std::sync::Arc;

use tracing::info;

use crate::config::ScreenConfig;
use crate::dedup::AddRequestDeduplicator;
use crate::scheduler::{Clock, SystemClock};
use crate::screen::ConfigurationScreen;
use crate::signal::{AddSignal, AddSignalCenter};
use crate::store::{NamesSnapshot, NamesStore};

/// Shared state for the lifetime of the host application.
#[derive(Debug, Clone)]
pub struct EraserApp {
    store: Arc<NamesStore>,
    dedup: Arc<AddRequestDeduplicator>,
    signals: Arc<AddSignalCenter>,
    config: ScreenConfig,
    clock: Arc<dyn Clock>,
}

impl EraserApp {
    /// Start with an empty store on the system clock.
    #[must_use]
    pub fn new(config: ScreenConfig) -> Self {
        Self::with_parts(Arc::new(NamesStore::new()), config, Arc::new(SystemClock))
    }

    /// Start from a store restored by the persistence layer.
    #[must_use]
    pub fn restore(snapshot: NamesSnapshot, config: ScreenConfig) -> Self {
        Self::with_parts(Arc::new(NamesStore::from_snapshot(snapshot)), config, Arc::new(SystemClock))
    }

    /// Assemble from explicit parts.
    #[must_use]
    pub fn with_parts(store: Arc<NamesStore>, config: ScreenConfig, clock: Arc<dyn Clock>) -> Self {
        info!(records = store.len(), "names store ready");
        Self {
            store,
            dedup: Arc::new(AddRequestDeduplicator::new()),
            signals: Arc::new(AddSignalCenter::new()),
            config,
            clock,
        }
    }

    /// The shared store.
    #[must_use]
    pub fn store(&self) -> &Arc<NamesStore> {
        &self.store
    }

    /// The centre add requests are posted to.
    #[must_use]
    pub fn signals(&self) -> &Arc<AddSignalCenter> {
        &self.signals
    }

    /// Post an add request for a new user action. Returns the signal so the
    /// host can re-deliver it if its own notification layer requires.
    pub fn request_add(&self) -> AddSignal {
        let signal = AddSignal::fresh();
        self.signals.post(signal);
        signal
    }

    /// Open a configuration screen bound to the shared state.
    #[must_use]
    pub fn open_screen(&self) -> ConfigurationScreen {
        ConfigurationScreen::new(
            Arc::clone(&self.store),
            Arc::clone(&self.dedup),
            &self.signals,
            self.config.clone(),
            Arc::clone(&self.clock),
        )
    }

    /// Final snapshot for the persistence layer at shutdown.
    #[must_use]
    pub fn shutdown(self) -> NamesSnapshot {
        let snapshot = self.store.snapshot();
        info!(revision = snapshot.revision, records = snapshot.records.len(), "names store shut down");
        snapshot
    }
}
