//! Glue between device discovery and the watchdog controller.
//!
//! Discovery (device-tree matching, resource mapping) is external. It hands
//! the driver a [`PlatformDevice`]; [`probe`] turns that into a ready
//! [`BflbWatchdog`] or fails the attach. [`remove`] and [`shutdown`] are the
//! detach and reboot hooks.

use tracing::{debug, info, warn};

use crate::config::WatchdogConfig;
use crate::controller::BflbWatchdog;
use crate::error::{WdtError, WdtResult};
use crate::registers::RegisterAccess;
use crate::watchdog::WatchdogOps;

/// Driver name registered with the platform bus.
pub const DRIVER_NAME: &str = "bflb_wdt";

/// Device-tree compatible strings this driver binds to.
pub const OF_MATCH_TABLE: &[&str] = &["bflb,bflb808-wdt"];

/// A device offered to the driver by the discovery layer.
pub trait PlatformDevice {
    /// Register handle produced by mapping the device's memory resource.
    type Registers: RegisterAccess + Send + Sync;

    /// Device name used in diagnostics.
    fn name(&self) -> &str;

    /// Compatible strings from the device description.
    fn compatible(&self) -> &[&str];

    /// Map the first memory resource.
    ///
    /// # Errors
    ///
    /// Returns [`WdtError::NoMemoryResource`] or [`WdtError::MapFailed`]
    /// when the region cannot be mapped.
    fn map_registers(&mut self) -> WdtResult<Self::Registers>;
}

/// Whether a device matches [`OF_MATCH_TABLE`].
#[must_use]
pub fn is_compatible(compatible: &[&str]) -> bool {
    compatible.iter().any(|c| OF_MATCH_TABLE.contains(c))
}

/// Attach the watchdog on `pdev`.
///
/// Checks compatibility, validates `config`, maps the registers and runs
/// the one-shot hardware initialization. The returned controller is
/// disabled and ready to publish to the watchdog subsystem.
///
/// # Errors
///
/// Returns an error if the device is not compatible, the configuration is
/// invalid, or the registers cannot be mapped. No controller exists in
/// that case and the hardware is untouched.
pub fn probe<P: PlatformDevice>(
    pdev: &mut P,
    config: WatchdogConfig,
) -> WdtResult<BflbWatchdog<P::Registers>> {
    debug!(device = pdev.name(), "probe started");

    if !is_compatible(pdev.compatible()) {
        return Err(WdtError::incompatible_device(pdev.name(), pdev.compatible()));
    }
    // Checked before mapping so a bad config never touches the device.
    config.validate()?;

    let regs = pdev.map_registers()?;
    let wdt = BflbWatchdog::new(regs, pdev.name(), config)?;

    info!(
        device = pdev.name(),
        identity = wdt.info().identity,
        timeout = wdt.timeout(),
        min_timeout = wdt.min_timeout(),
        max_timeout = wdt.max_timeout(),
        nowayout = wdt.nowayout(),
        "probe completed"
    );
    Ok(wdt)
}

/// Detach the watchdog.
///
/// Stops a running watchdog when `stop_on_unregister` is set, unless it is
/// `nowayout`, then hands back the register handle for unmapping.
pub fn remove<R: RegisterAccess + Send + Sync>(wdt: BflbWatchdog<R>) -> R {
    if wdt.config().stop_on_unregister && wdt.is_running() {
        if wdt.nowayout() {
            warn!(
                device = wdt.device_name(),
                "nowayout set, leaving watchdog running on remove"
            );
        } else {
            wdt.stop();
        }
    }
    info!(device = wdt.device_name(), "removed");
    wdt.into_registers()
}

/// Reboot hook. Stops a running watchdog when `stop_on_reboot` is set,
/// regardless of `nowayout`.
pub fn shutdown<R: RegisterAccess + Send + Sync>(wdt: &BflbWatchdog<R>) {
    if wdt.config().stop_on_reboot && wdt.is_running() {
        wdt.stop();
    }
}
