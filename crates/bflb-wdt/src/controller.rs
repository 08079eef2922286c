//! BL808 watchdog controller.
//!
//! [`BflbWatchdog`] owns the register handle for one attached watchdog. It
//! programs the clock source and divider once at construction, then serves
//! start/stop/ping/set-timeout/get-timeleft through [`WatchdogOps`].
//!
//! # Locking
//!
//! Every unlock-then-write sequence runs under one mutex, which also guards
//! the configured timeout. The initialization sequence holds it from the
//! first unlock to the compare write. `get_timeleft` only reads the
//! unprotected counter and does not take it.

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::WatchdogConfig;
use crate::error::WdtResult;
use crate::registers::{
    CLOCK_SOURCE_1K, CLOCK_SOURCE_MASK, COUNTER_RESET, DIVIDER_MASK, MODE_ENABLE,
    MODE_RESET_ON_TIMEOUT, REG_CLOCK_SOURCE, REG_COMPARE, REG_COUNTER, REG_COUNTER_RESET,
    REG_DIVIDER, REG_MODE, RegisterAccess, unlock,
};
use crate::state::{WatchdogMetrics, WatchdogState, WatchdogStatus};
use crate::timeout::{Clamp, TickRate, TimeoutUpdate};
use crate::watchdog::{WatchdogInfo, WatchdogOptions, WatchdogOps};

/// Identity and capabilities of the BL808 watchdog.
pub const BFLB_WDT_INFO: WatchdogInfo = WatchdogInfo {
    identity: "bflb_wdt",
    options: WatchdogOptions::SETTIMEOUT
        .union(WatchdogOptions::KEEPALIVEPING)
        .union(WatchdogOptions::MAGICCLOSE),
    firmware_version: 0,
};

const RATE: TickRate = TickRate::BL808;

/// State guarded by the register lock.
#[derive(Debug)]
struct IoState {
    timeout_secs: u32,
}

/// Controller for one attached BL808 watchdog.
#[derive(Debug)]
pub struct BflbWatchdog<R: RegisterAccess> {
    regs: R,
    device: String,
    config: WatchdogConfig,
    io: Mutex<IoState>,
    state: WatchdogState,
}

impl<R: RegisterAccess> BflbWatchdog<R> {
    /// Take ownership of a mapped register block and initialize the hardware.
    ///
    /// On return the watchdog is configured to reset the host on timeout,
    /// ticks at [`TickRate::BL808`], has the initial timeout programmed, and
    /// is disabled.
    ///
    /// # Arguments
    ///
    /// * `regs` - Register handle from the discovery layer.
    /// * `device` - Parent device name, attached to every log event.
    /// * `config` - Attach-time configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid; the hardware is
    /// not touched in that case.
    pub fn new(regs: R, device: impl Into<String>, config: WatchdogConfig) -> WdtResult<Self> {
        config.validate_for(&RATE)?;
        let device = device.into();

        let (timeout_secs, rejected) = config.initial_timeout(&RATE);
        if let Some(requested) = rejected {
            warn!(
                device = device.as_str(),
                requested,
                default = config.default_timeout_secs,
                "timeout override out of range, using default"
            );
        }

        let wdt = Self {
            regs,
            device,
            config,
            io: Mutex::new(IoState { timeout_secs }),
            state: WatchdogState::new(),
        };
        wdt.init_hardware();
        Ok(wdt)
    }

    /// One-shot hardware setup. Leaves the watchdog disabled.
    fn init_hardware(&self) {
        let mut io = self.io.lock();

        // Reset on expiry, but stay off until started.
        unlock(&self.regs).modify32(REG_MODE, MODE_ENABLE, MODE_RESET_ON_TIMEOUT);

        self.regs
            .modify32(REG_CLOCK_SOURCE, CLOCK_SOURCE_MASK, CLOCK_SOURCE_1K);

        // Divide by 256: 1024 Hz becomes 4 ticks per second.
        self.regs
            .modify32(REG_DIVIDER, DIVIDER_MASK, RATE.divider_field());

        let timeout_secs = io.timeout_secs;
        self.program_timeout(&mut io, timeout_secs);

        debug!(
            device = self.device.as_str(),
            timeout = timeout_secs,
            ticks_per_second = RATE.ticks_per_second(),
            "watchdog hardware initialized"
        );
    }

    /// Write the compare register. Only reachable with the lock held.
    fn program_timeout(&self, io: &mut IoState, seconds: u32) {
        unlock(&self.regs).write16(REG_COMPARE, RATE.compare_ticks(seconds));
        io.timeout_secs = seconds;
    }

    /// Parent device name.
    #[must_use]
    pub fn device_name(&self) -> &str {
        &self.device
    }

    /// Attach-time configuration.
    #[must_use]
    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    /// Tick rate the hardware was programmed with.
    #[must_use]
    pub fn tick_rate(&self) -> TickRate {
        RATE
    }

    /// Whether the subsystem must refuse to stop this watchdog once started.
    #[must_use]
    pub fn nowayout(&self) -> bool {
        self.config.nowayout
    }

    /// Snapshot of the operation counters.
    #[must_use]
    pub fn metrics(&self) -> WatchdogMetrics {
        self.state.metrics()
    }

    /// The register handle, for diagnostics.
    #[must_use]
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Give back the register handle so the caller can unmap it.
    #[must_use]
    pub fn into_registers(self) -> R {
        self.regs
    }
}

impl<R: RegisterAccess + Send + Sync> WatchdogOps for BflbWatchdog<R> {
    fn info(&self) -> &WatchdogInfo {
        &BFLB_WDT_INFO
    }

    fn start(&self) {
        let _io = self.io.lock();
        unlock(&self.regs).modify32(REG_MODE, 0, MODE_ENABLE);
        let previous = self.state.arm();
        info!(
            device = self.device.as_str(),
            previous = previous.as_str(),
            "watchdog started"
        );
    }

    fn stop(&self) {
        let _io = self.io.lock();
        unlock(&self.regs).modify32(REG_MODE, MODE_ENABLE, 0);
        let previous = self.state.disarm();
        info!(
            device = self.device.as_str(),
            previous = previous.as_str(),
            "watchdog stopped"
        );
    }

    fn ping(&self) {
        let _io = self.io.lock();
        unlock(&self.regs).modify32(REG_COUNTER_RESET, 0, COUNTER_RESET);
        self.state.record_ping();
        debug!(device = self.device.as_str(), "watchdog ping");
    }

    fn set_timeout(&self, seconds: u32) -> TimeoutUpdate {
        let update = RATE.bound(seconds, self.config.min_timeout_secs);
        match update.clamp {
            Some(Clamp::ToMax) => warn!(
                device = self.device.as_str(),
                requested = seconds,
                max_timeout = RATE.max_timeout(),
                "timeout at or above max_timeout, using max_timeout"
            ),
            Some(Clamp::ToMin) => warn!(
                device = self.device.as_str(),
                requested = seconds,
                min_timeout = self.config.min_timeout_secs,
                "timeout below min_timeout, using min_timeout"
            ),
            None => {}
        }

        {
            let mut io = self.io.lock();
            self.program_timeout(&mut io, update.applied);
        }
        self.state.record_timeout_update(update.was_clamped());

        debug!(
            device = self.device.as_str(),
            timeout = update.applied,
            ticks_per_second = RATE.ticks_per_second(),
            "watchdog timeout set"
        );
        update
    }

    // Measured against max_timeout, not the configured timeout; user space
    // already depends on this value.
    fn get_timeleft(&self) -> u32 {
        let ticks = u32::from(self.regs.read16(REG_COUNTER));
        let elapsed = RATE.ticks_to_seconds(ticks);
        let remaining = RATE.max_timeout().saturating_sub(elapsed);
        debug!(
            device = self.device.as_str(),
            remaining,
            elapsed_ticks = ticks,
            elapsed_secs = elapsed,
            "watchdog time left"
        );
        remaining
    }

    fn timeout(&self) -> u32 {
        self.io.lock().timeout_secs
    }

    fn min_timeout(&self) -> u32 {
        self.config.min_timeout_secs
    }

    fn max_timeout(&self) -> u32 {
        RATE.max_timeout()
    }

    fn status(&self) -> WatchdogStatus {
        self.state.status()
    }
}
