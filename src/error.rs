//! Error types for the configuration model.
//!
//! All errors are strongly typed using thiserror so callers can match on the
//! specific condition. Nothing in this crate performs I/O, so every error here
//! is either a stale index coming from the presentation layer or a rejected
//! configuration value.

use thiserror::Error;

/// Errors raised by `NamesStore` mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Row index {index} is out of range (store holds {len} records)")]
    IndexOutOfRange {
        index: usize,
        len: usize,
    },
}

/// Errors raised when a user gesture cannot be applied to the screen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("Row interaction rejected: a removal is pending")]
    RemovalPending,

    #[error("Row {index} does not exist")]
    RowNotFound {
        index: usize,
    },

    #[error("Store rejected the edit: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised while loading a `ScreenConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to parse screen config: {message}")]
    Parse {
        message: String,
    },

    #[error("Removal cool-down of {millis}ms is outside the accepted range")]
    InvalidCooldown {
        millis: u64,
    },
}

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum EraserError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Interaction error: {0}")]
    Interaction(#[from] InteractionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl EraserError {
    /// Returns true if this is a store error.
    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Returns true if this is an interaction error.
    #[must_use]
    pub const fn is_interaction(&self) -> bool {
        matches!(self, Self::Interaction(_))
    }

    /// Returns true if this is a config error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if retrying the same gesture later may succeed.
    ///
    /// Only a pending removal clears by itself once the cool-down elapses.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Interaction(InteractionError::RemovalPending))
    }
}

/// Result type alias for crate operations.
pub type EraserResult<T> = Result<T, EraserError>;
