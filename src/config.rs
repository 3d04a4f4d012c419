//! Configuration for a configuration screen.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest accepted removal cool-down.
pub const MAX_REMOVAL_COOLDOWN_MS: u64 = 10_000;

/// Help text shown under the rows.
pub const DEFAULT_FOOTER: &str = "Type every variant of your deadname so the extension can replace it \
(Case insensitive). You can add your firstname and lastname together or you can just write your \
firstname but that may replace the name of someone else.";

/// Affordances the hosting platform provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostCapabilities {
    /// The host can close the window the screen lives in, so the screen shows
    /// its own "Done" control.
    pub window_close_affordance: bool,
}

/// Settings for one configuration screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Delay between a remove gesture and the structural removal.
    pub removal_cooldown_ms: u64,
    /// Per-screen add-signal queue capacity.
    pub signal_queue_capacity: usize,
    /// Affordances of the hosting platform.
    pub host: HostCapabilities,
    /// Help text shown under the rows.
    pub footer: String,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            removal_cooldown_ms: 200,
            signal_queue_capacity: 64,
            host: HostCapabilities::default(),
            footer: DEFAULT_FOOTER.to_string(),
        }
    }
}

impl ScreenConfig {
    /// Parse and validate a JSON config. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and
    /// `ConfigError::InvalidCooldown` for a cool-down of zero or above
    /// `MAX_REMOVAL_COOLDOWN_MS`.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidCooldown` if the cool-down is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.removal_cooldown_ms == 0 || self.removal_cooldown_ms > MAX_REMOVAL_COOLDOWN_MS {
            return Err(ConfigError::InvalidCooldown {
                millis: self.removal_cooldown_ms,
            });
        }
        Ok(())
    }

    /// Removal cool-down as a `Duration`.
    #[must_use]
    pub const fn removal_cooldown(&self) -> Duration {
        Duration::from_millis(self.removal_cooldown_ms)
    }

    /// Signal queue capacity, at least one.
    #[must_use]
    pub fn signal_capacity(&self) -> usize {
        self.signal_queue_capacity.max(1)
    }
}
