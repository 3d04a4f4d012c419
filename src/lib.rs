//! # deadname-config
//!
//! List model and mutation-safety protocol behind the Deadname Eraser
//! configuration screen. The user keeps an ordered list of
//! (deadname, chosen name) pairs; an external substitution engine reads the
//! list and rewrites rendered content.
//!
//! ## Core Concepts
//!
//! - **NameRecord**: one deadname/current-name pair with a stable id
//! - **NamesStore**: the shared, observable, ordered list of records
//! - **AddRequestDeduplicator**: makes repeated add notifications idempotent
//! - **RemovalGuard**: suspends positional row interaction while a removal is
//!   animating off-screen
//! - **ConfigurationScreen**: presentation model wiring gestures to the above
//!
//! ## Usage
//!
//! ```rust
//! use deadname_config::{EraserApp, RecordField, ScreenConfig};
//!
//! let app = EraserApp::new(ScreenConfig::default());
//! let mut screen = app.open_screen();
//!
//! // A toolbar button posts an add request; the screen drains it.
//! app.request_add();
//! screen.pump_signals();
//!
//! screen.edit(0, RecordField::DeadName, "Tom")?;
//! screen.edit(0, RecordField::CurrentName, "Alice")?;
//! assert_eq!(app.store().rules(), vec![("Tom".to_string(), "Alice".to_string())]);
//! # Ok::<(), deadname_config::InteractionError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data model
pub mod error;
pub mod record;
pub mod store;

// Mutation protocol
pub mod dedup;
pub mod guard;
pub mod scheduler;
pub mod signal;

// Presentation and wiring
pub mod app;
pub mod config;
pub mod screen;

// Re-export primary types at crate root for convenience
pub use app::EraserApp;
pub use config::{HostCapabilities, ScreenConfig};
pub use dedup::AddRequestDeduplicator;
pub use error::{ConfigError, EraserError, EraserResult, InteractionError, StoreError};
pub use guard::{ArmOutcome, GuardState, PendingRemoval, RemovalGuard};
pub use record::{NameRecord, RecordField, RecordId};
pub use scheduler::{Clock, ManualClock, Scheduler, SystemClock};
pub use screen::{ConfigurationScreen, FieldView, RowView, ScreenBody, ScreenTask, ScreenView};
pub use signal::{AddSignal, AddSignalCenter, AddSignalSubscription, AddToken, SignalSubscriptionId};
pub use store::{ListenerId, NamesSnapshot, NamesStore, StoreChange, StoreListener};
