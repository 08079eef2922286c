//! Attach-time configuration for the watchdog.

use serde::{Deserialize, Serialize};

use crate::error::{WdtError, WdtResult};
use crate::timeout::TickRate;

/// Timeout used when nothing else is configured, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u32 = 60;

/// Smallest timeout the subsystem may request, in seconds.
pub const MIN_TIMEOUT_SECS: u32 = 1;

/// Watchdog configuration.
///
/// The maximum timeout is not configurable: it follows from the tick rate
/// and counter width (see [`TickRate::max_timeout`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Timeout programmed at attach, in seconds.
    ///
    /// Default: 60s.
    pub default_timeout_secs: u32,

    /// Minimum timeout, in seconds.
    ///
    /// Default: 1s.
    pub min_timeout_secs: u32,

    /// Init-time timeout override (module parameter or device-tree
    /// `timeout-sec`).
    ///
    /// Used instead of `default_timeout_secs` when it lies within
    /// `[min_timeout_secs, max_timeout]`; ignored otherwise.
    pub timeout_override_secs: Option<u32>,

    /// Once started, the watchdog may not be stopped by the subsystem.
    ///
    /// Published as metadata only.
    pub nowayout: bool,

    /// Stop the watchdog from the reboot hook.
    pub stop_on_reboot: bool,

    /// Stop the watchdog when the device is removed.
    pub stop_on_unregister: bool,
}

impl WatchdogConfig {
    /// Create a configuration with the given default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `default_timeout_secs` is outside
    /// `[MIN_TIMEOUT_SECS, max_timeout]`.
    pub fn new(default_timeout_secs: u32) -> WdtResult<Self> {
        let config = Self {
            default_timeout_secs,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> WatchdogConfigBuilder {
        WatchdogConfigBuilder::default()
    }

    /// Validate the configuration against the BL808 tick rate.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> WdtResult<()> {
        self.validate_for(&TickRate::BL808)
    }

    /// Validate the configuration against a tick rate.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate_for(&self, rate: &TickRate) -> WdtResult<()> {
        let max_timeout = rate.max_timeout();
        if self.min_timeout_secs == 0 {
            return Err(WdtError::invalid_configuration(
                "min_timeout_secs must be at least 1",
            ));
        }
        if self.min_timeout_secs > max_timeout {
            return Err(WdtError::invalid_configuration(format!(
                "min_timeout_secs {} exceeds max_timeout {max_timeout}",
                self.min_timeout_secs
            )));
        }
        if !(self.min_timeout_secs..=max_timeout).contains(&self.default_timeout_secs) {
            return Err(WdtError::invalid_configuration(format!(
                "default_timeout_secs {} must be between {} and {max_timeout}",
                self.default_timeout_secs, self.min_timeout_secs
            )));
        }
        Ok(())
    }

    /// Resolve the timeout to program at attach.
    ///
    /// Returns the override when it is in range, else the default, and
    /// whether an override was rejected.
    #[must_use]
    pub fn initial_timeout(&self, rate: &TickRate) -> (u32, Option<u32>) {
        match self.timeout_override_secs {
            Some(secs) if (self.min_timeout_secs..=rate.max_timeout()).contains(&secs) => {
                (secs, None)
            }
            Some(secs) => (self.default_timeout_secs, Some(secs)),
            None => (self.default_timeout_secs, None),
        }
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: DEFAULT_TIMEOUT_SECS,
            min_timeout_secs: MIN_TIMEOUT_SECS,
            timeout_override_secs: None,
            nowayout: false,
            stop_on_reboot: true,
            stop_on_unregister: true,
        }
    }
}

/// Builder for `WatchdogConfig`.
#[derive(Debug, Default)]
pub struct WatchdogConfigBuilder {
    config: WatchdogConfig,
}

impl WatchdogConfigBuilder {
    /// Set the default timeout in seconds.
    #[must_use]
    pub fn default_timeout_secs(mut self, secs: u32) -> Self {
        self.config.default_timeout_secs = secs;
        self
    }

    /// Set the minimum timeout in seconds.
    #[must_use]
    pub fn min_timeout_secs(mut self, secs: u32) -> Self {
        self.config.min_timeout_secs = secs;
        self
    }

    /// Set the init-time timeout override.
    #[must_use]
    pub fn timeout_override_secs(mut self, secs: Option<u32>) -> Self {
        self.config.timeout_override_secs = secs;
        self
    }

    /// Set the nowayout policy flag.
    #[must_use]
    pub fn nowayout(mut self, nowayout: bool) -> Self {
        self.config.nowayout = nowayout;
        self
    }

    /// Stop the watchdog on reboot.
    #[must_use]
    pub fn stop_on_reboot(mut self, stop: bool) -> Self {
        self.config.stop_on_reboot = stop;
        self
    }

    /// Stop the watchdog on device removal.
    #[must_use]
    pub fn stop_on_unregister(mut self, stop: bool) -> Self {
        self.config.stop_on_unregister = stop;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> WdtResult<WatchdogConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WatchdogConfig::default();
        assert_eq!(config.default_timeout_secs, 60);
        assert_eq!(config.min_timeout_secs, 1);
        assert!(config.stop_on_reboot);
        assert!(config.stop_on_unregister);
        assert!(!config.nowayout);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(WatchdogConfig::new(0).is_err());
        assert!(WatchdogConfig::new(16384).is_err());
        assert!(WatchdogConfig::new(16383).is_ok());
        assert!(WatchdogConfig::new(60).is_ok());
    }

    #[test]
    fn test_config_builder() {
        let result = WatchdogConfig::builder()
            .default_timeout_secs(120)
            .min_timeout_secs(2)
            .nowayout(true)
            .stop_on_reboot(false)
            .build();
        assert!(result.is_ok());
        if let Ok(config) = result {
            assert_eq!(config.default_timeout_secs, 120);
            assert_eq!(config.min_timeout_secs, 2);
            assert!(config.nowayout);
            assert!(!config.stop_on_reboot);
        }

        let result = WatchdogConfig::builder().min_timeout_secs(0).build();
        assert!(matches!(result, Err(WdtError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_initial_timeout() {
        let rate = TickRate::BL808;
        let config = WatchdogConfig::default();
        assert_eq!(config.initial_timeout(&rate), (60, None));

        let config = WatchdogConfig {
            timeout_override_secs: Some(30),
            ..WatchdogConfig::default()
        };
        assert_eq!(config.initial_timeout(&rate), (30, None));

        let config = WatchdogConfig {
            timeout_override_secs: Some(20_000),
            ..WatchdogConfig::default()
        };
        assert_eq!(config.initial_timeout(&rate), (60, Some(20_000)));
    }
}
