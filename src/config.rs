//! Commissioning configuration parameters
//!
//! All tunable parameters for joining, parent recovery and poll-rate
//! throttling.  Defaults match the shipped firmware; values can be
//! overridden through [`ConfigPort`](crate::app::ports::ConfigPort).

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::commissioning::ModeFlags;

/// Rejoin backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Delay before the first rejoin attempt (seconds)
    pub initial_delay_secs: u32,
    /// Growth factor numerator (delay = delay * num / den)
    pub growth_numerator: u32,
    /// Growth factor denominator
    pub growth_denominator: u32,
    /// Ceiling delay, also used forever once the budget is spent (seconds)
    pub max_delay_secs: u32,
    /// Number of growing attempts before pinning to the ceiling
    pub max_attempts: u8,
}

impl BackoffConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.initial_delay_secs))
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.max_delay_secs))
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: 10,
            growth_numerator: 12,
            growth_denominator: 10,
            max_delay_secs: 1800, // 30 min
            max_attempts: 20,
        }
    }
}

/// Radio poll-rate behaviour of a sleepy end device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerConfig {
    /// Time after a successful join before the poll rate is lowered (ms)
    pub poll_throttle_delay_ms: u32,
    /// Poll interval used while idle; 0 stops automatic polling (ms)
    pub relaxed_poll_interval_ms: u32,
    /// Poll interval used right after user interaction (ms)
    pub responsive_poll_interval_ms: u32,
    /// When false the poll rate is never touched
    pub power_saving: bool,
}

impl PowerConfig {
    pub fn poll_throttle_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.poll_throttle_delay_ms))
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            poll_throttle_delay_ms: 10_000,
            relaxed_poll_interval_ms: 0,
            responsive_poll_interval_ms: 1,
            power_saving: true,
        }
    }
}

/// Settings pushed to the network stack before commissioning starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioConfig {
    /// Transmit power (dBm)
    pub tx_power_dbm: i8,
    /// Request a fresh trust-centre link key after joining.  Must stay
    /// false to join through routers of a coordinator built without
    /// legacy TC support.
    pub request_new_tc_link_key: bool,
    /// Commissioning modes requested at startup
    pub start_modes: ModeFlags,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            tx_power_dbm: 4,
            request_new_tc_link_key: false,
            start_modes: ModeFlags::NETWORK_STEERING.union(ModeFlags::FINDING_BINDING),
        }
    }
}

/// Complete commissioning configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommissioningConfig {
    pub backoff: BackoffConfig,
    pub power: PowerConfig,
    pub radio: RadioConfig,
}

impl CommissioningConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.backoff;
        if b.initial_delay_secs == 0 {
            return Err(ConfigError::ValidationFailed("backoff.initial_delay_secs must be > 0"));
        }
        if b.max_delay_secs < b.initial_delay_secs {
            return Err(ConfigError::ValidationFailed(
                "backoff.max_delay_secs must be >= initial_delay_secs",
            ));
        }
        if b.growth_denominator == 0 {
            return Err(ConfigError::ValidationFailed("backoff.growth_denominator must be > 0"));
        }
        if b.growth_numerator < b.growth_denominator {
            return Err(ConfigError::ValidationFailed("backoff growth factor must be >= 1"));
        }
        if b.growth_numerator > b.growth_denominator
            && u64::from(b.initial_delay_secs) * u64::from(b.growth_numerator)
                / u64::from(b.growth_denominator)
                == u64::from(b.initial_delay_secs)
        {
            return Err(ConfigError::ValidationFailed(
                "backoff.initial_delay_secs too small to grow in whole seconds",
            ));
        }
        if b.max_attempts == 0 {
            return Err(ConfigError::ValidationFailed("backoff.max_attempts must be > 0"));
        }
        if self.power.poll_throttle_delay_ms == 0 {
            return Err(ConfigError::ValidationFailed("power.poll_throttle_delay_ms must be > 0"));
        }
        if self.radio.start_modes.is_empty() {
            return Err(ConfigError::ValidationFailed("radio.start_modes must not be empty"));
        }
        Ok(())
    }
}
