//! Shared, observable name list.
//!
//! `NamesStore` is the single source of truth for the configured name pairs.
//! Presentation code and persistence both observe it through `StoreListener`.

mod listener;
mod names;
mod snapshot;

pub use listener::{ListenerId, StoreChange, StoreListener};
pub use names::NamesStore;
pub use snapshot::NamesSnapshot;
