//! # bflb-wdt
//!
//! Controller for the Bouffalo Lab BL808 hardware watchdog timer.
//!
//! Once armed, the watchdog resets the host unless it is pinged within the
//! configured timeout. This crate gets the register protocol right:
//! - `registers` - register map, two-key unlock, `RegisterAccess` seam
//! - `timeout` - seconds/ticks conversion bounded by the 16-bit counter
//! - `controller` - one-shot hardware init and the operational state machine
//! - `device` - probe/remove/shutdown glue for the discovery layer
//! - `sim` - in-memory register block for running without hardware
//!
//! ## Guarantees
//!
//! - **Unlock before every protected write**: protected writes go through
//!   a single-use `WriteWindow`, so none can skip or share an unlock
//! - **No silent overflow**: a timeout beyond what the counter represents is
//!   clamped to `max_timeout` with a warning, never wrapped
//! - **Serialized sequences**: unlock-then-write runs under one mutex
//! - **Infallible operations** once attached
//!
//! ## State Machine
//!
//! ```text
//!            start()
//!  ┌──────────┐ ─────► ┌───────┐
//!  │ Disabled │        │ Armed │   ping(), set_timeout(): either state
//!  └──────────┘ ◄───── └───────┘
//!            stop()
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bflb_wdt::prelude::*;
//!
//! let wdt = BflbWatchdog::new(SimRegisters::new(), "wdt0", WatchdogConfig::default())
//!     .expect("valid config");
//! assert_eq!(wdt.registers().compare_ticks(), 240);
//!
//! wdt.start();
//! wdt.ping();
//! assert!(wdt.is_running());
//!
//! let update = wdt.set_timeout(70_000);
//! assert_eq!(update.applied, 16383);
//! assert_eq!(wdt.get_timeleft(), wdt.max_timeout());
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod prelude;
pub mod registers;
pub mod sim;
pub mod state;
pub mod timeout;
pub mod watchdog;

pub use config::WatchdogConfig;
pub use controller::{BFLB_WDT_INFO, BflbWatchdog};
pub use device::{PlatformDevice, probe, remove, shutdown};
pub use error::{WdtError, WdtResult};
pub use registers::{MmioRegisters, RegisterAccess};
pub use sim::SimRegisters;
pub use state::{WatchdogMetrics, WatchdogState, WatchdogStatus};
pub use timeout::{Clamp, TickRate, TimeoutUpdate};
pub use watchdog::{WatchdogInfo, WatchdogOps, WatchdogOptions};
