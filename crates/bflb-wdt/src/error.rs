//! Error types for watchdog attach and configuration.
//!
//! Operational calls (`start`, `stop`, `ping`, `set_timeout`,
//! `get_timeleft`) cannot fail once the device is attached, so the only
//! errors live on the attach path and in configuration validation.

use thiserror::Error;

/// Errors that can occur while attaching or configuring the watchdog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WdtError {
    /// The platform device has no memory resource to map.
    #[error("{device}: no memory resource for watchdog registers")]
    NoMemoryResource {
        /// Parent device name.
        device: String,
    },

    /// The register region could not be mapped.
    #[error("{device}: failed to map watchdog registers: {reason}")]
    MapFailed {
        /// Parent device name.
        device: String,
        /// Reason reported by the discovery layer.
        reason: String,
    },

    /// The device does not match any entry of the driver's match table.
    #[error("{device}: not compatible with bflb_wdt (compatible: {compatible:?})")]
    IncompatibleDevice {
        /// Parent device name.
        device: String,
        /// Compatible strings advertised by the device.
        compatible: Vec<String>,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl WdtError {
    /// Create a no memory resource error.
    #[must_use]
    pub fn no_memory_resource(device: impl Into<String>) -> Self {
        Self::NoMemoryResource {
            device: device.into(),
        }
    }

    /// Create a map failed error.
    #[must_use]
    pub fn map_failed(device: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MapFailed {
            device: device.into(),
            reason: reason.into(),
        }
    }

    /// Create an incompatible device error.
    #[must_use]
    pub fn incompatible_device(device: impl Into<String>, compatible: &[&str]) -> Self {
        Self::IncompatibleDevice {
            device: device.into(),
            compatible: compatible.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

/// A specialized `Result` type for watchdog attach and configuration.
pub type WdtResult<T> = std::result::Result<T, WdtError>;
