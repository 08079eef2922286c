//! Prelude for bflb-wdt.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use bflb_wdt::prelude::*;
//!
//! let wdt = BflbWatchdog::new(SimRegisters::new(), "wdt0", WatchdogConfig::default())
//!     .expect("valid config");
//! wdt.start();
//! wdt.ping();
//! ```

pub use crate::config::{WatchdogConfig, WatchdogConfigBuilder};
pub use crate::controller::{BFLB_WDT_INFO, BflbWatchdog};
pub use crate::device::{PlatformDevice, probe, remove, shutdown};
pub use crate::error::{WdtError, WdtResult};
pub use crate::registers::{MmioRegisters, RegisterAccess};
pub use crate::sim::SimRegisters;
pub use crate::state::{WatchdogMetrics, WatchdogStatus};
pub use crate::timeout::{Clamp, TickRate, TimeoutUpdate};
pub use crate::watchdog::{WatchdogInfo, WatchdogOps, WatchdogOptions};
