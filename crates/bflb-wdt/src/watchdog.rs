//! The operational contract exposed to the watchdog subsystem.
//!
//! The subsystem (device node, keepalive daemon, "no way out" policy) is
//! external. It drives a watchdog only through [`WatchdogOps`] and the
//! metadata in [`WatchdogInfo`].

use bitflags::bitflags;

use crate::state::WatchdogStatus;
use crate::timeout::TimeoutUpdate;

bitflags! {
    /// Capability flags advertised to the subsystem.
    ///
    /// Bit values match the Linux watchdog UAPI `WDIOF_*` options.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WatchdogOptions: u32 {
        /// The timeout can be changed at runtime.
        const SETTIMEOUT = 0x0080;
        /// Closing the device stops the watchdog only after a magic write.
        const MAGICCLOSE = 0x0100;
        /// Pings restart the countdown.
        const KEEPALIVEPING = 0x8000;
    }
}

/// Identity and capabilities of a watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogInfo {
    /// Identity string reported to user space.
    pub identity: &'static str,
    /// Supported options.
    pub options: WatchdogOptions,
    /// Firmware version, zero when not applicable.
    pub firmware_version: u32,
}

/// Operations the subsystem invokes on a watchdog.
///
/// Every operation is synchronous, bounded to a handful of register
/// accesses, and safe from either state. None of them can fail once the
/// device is attached.
///
/// Methods take `&self`: a keepalive source and a control path may call
/// concurrently, so implementations serialize internally.
pub trait WatchdogOps: Send + Sync {
    /// Identity and capabilities.
    fn info(&self) -> &WatchdogInfo;

    /// Arm the watchdog. A no-op when already armed.
    fn start(&self);

    /// Disarm the watchdog. A no-op when already disabled.
    fn stop(&self);

    /// Restart the elapsed-tick counter. Valid in either state.
    fn ping(&self);

    /// Change the timeout, clamping to the supported range.
    ///
    /// The armed or disabled state is preserved.
    fn set_timeout(&self, seconds: u32) -> TimeoutUpdate;

    /// Seconds until the watchdog fires, as reported by the hardware.
    fn get_timeleft(&self) -> u32;

    /// Currently configured timeout in seconds.
    fn timeout(&self) -> u32;

    /// Minimum timeout in seconds.
    fn min_timeout(&self) -> u32;

    /// Maximum timeout in seconds.
    fn max_timeout(&self) -> u32;

    /// Current operational status.
    fn status(&self) -> WatchdogStatus;

    /// Whether the watchdog is armed.
    fn is_running(&self) -> bool {
        self.status() == WatchdogStatus::Armed
    }
}
