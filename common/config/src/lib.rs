// Licensed under the Apache-2.0 license

//! eFUSE driver configuration.
//!
//! The configuration describes where the controller lives, whether the
//! programming path is allowed at all, how long the driver waits for the macro
//! to report ready, and which clock gate (if any) has to be opened for shadow
//! reads. It is normally loaded from a TOML file:
//!
//! ```toml
//! base_address = 0x03050000
//! programming_enabled = false
//! ready_poll_limit = 100000
//!
//! [clock]
//! register = 0x03002000
//! bit = 3
//! ```

use efuse_registers::{offsets, EFUSE_BASE, EFUSE_WINDOW_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_READY_POLL_LIMIT: u32 = 100_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// A clock-enable bit in a clock controller register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClockGateConfig {
    /// Physical address of the clock-enable register
    pub register: u64,
    /// Bit index of the eFUSE clock in that register
    pub bit: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EfuseConfig {
    /// Physical base address of the controller window
    pub base_address: u64,
    /// Size of the controller window in bytes
    pub window_size: usize,
    /// Allow word writes to reach the programming path.
    ///
    /// Blowing fuses cannot be undone, so this is off unless explicitly
    /// enabled.
    pub programming_enabled: bool,
    /// Number of status polls before a command is considered hung
    pub ready_poll_limit: u32,
    /// Clock gate wrapped around shadow reads and writes. `None` means the
    /// eFUSE clock is always running.
    pub clock: Option<ClockGateConfig>,
}

impl Default for EfuseConfig {
    fn default() -> Self {
        Self {
            base_address: EFUSE_BASE,
            window_size: EFUSE_WINDOW_SIZE,
            programming_enabled: false,
            ready_poll_limit: DEFAULT_READY_POLL_LIMIT,
            clock: None,
        }
    }
}

impl EfuseConfig {
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        let config: EfuseConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Same configuration with the programming path switched on.
    pub fn with_programming_enabled(mut self, enabled: bool) -> Self {
        self.programming_enabled = enabled;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.window_size < offsets::SHADOW_END {
            return Err(ConfigError::Invalid(
                "window_size does not cover the shadow registers",
            ));
        }
        if self.base_address % 4 != 0 {
            return Err(ConfigError::Invalid("base_address must be word aligned"));
        }
        if self.ready_poll_limit == 0 {
            return Err(ConfigError::Invalid("ready_poll_limit must be non-zero"));
        }
        if let Some(clock) = self.clock {
            if clock.bit >= 32 {
                return Err(ConfigError::Invalid("clock.bit must be below 32"));
            }
            if clock.register % 4 != 0 {
                return Err(ConfigError::Invalid("clock.register must be word aligned"));
            }
        }
        Ok(())
    }
}
