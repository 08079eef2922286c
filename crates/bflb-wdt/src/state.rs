//! Watchdog operational state and counters.
//!
//! The controller mutates state only while holding its register lock; the
//! atomics let status and metrics be read from any context without it.

use portable_atomic::{AtomicU32, AtomicU64, Ordering};

/// Watchdog operational status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum WatchdogStatus {
    /// The peripheral will not reset the host, whatever the ping activity.
    #[default]
    Disabled = 0,
    /// Failing to ping within the timeout resets the host.
    Armed = 1,
}

impl WatchdogStatus {
    /// Convert from raw u32 value.
    #[must_use]
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Disabled),
            1 => Some(Self::Armed),
            _ => None,
        }
    }

    /// Convert to raw u32 value.
    #[must_use]
    pub fn to_raw(self) -> u32 {
        self as u32
    }

    /// Get the status as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::Armed => "Armed",
        }
    }
}

impl core::fmt::Display for WatchdogStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Atomic status plus operation counters.
///
/// Every transition is total: arming an armed watchdog or disarming a
/// disabled one leaves the status unchanged and is not an error.
#[derive(Debug)]
pub struct WatchdogState {
    status: AtomicU32,
    start_count: AtomicU64,
    stop_count: AtomicU64,
    ping_count: AtomicU64,
    timeout_updates: AtomicU64,
    clamped_requests: AtomicU64,
}

impl WatchdogState {
    /// Create a new state in the Disabled status.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: AtomicU32::new(WatchdogStatus::Disabled.to_raw()),
            start_count: AtomicU64::new(0),
            stop_count: AtomicU64::new(0),
            ping_count: AtomicU64::new(0),
            timeout_updates: AtomicU64::new(0),
            clamped_requests: AtomicU64::new(0),
        }
    }

    /// Get the current status.
    #[must_use]
    pub fn status(&self) -> WatchdogStatus {
        let raw = self.status.load(Ordering::Acquire);
        WatchdogStatus::from_raw(raw).unwrap_or(WatchdogStatus::Disabled)
    }

    /// Record a start. Returns the previous status.
    pub fn arm(&self) -> WatchdogStatus {
        self.start_count.fetch_add(1, Ordering::Relaxed);
        self.swap(WatchdogStatus::Armed)
    }

    /// Record a stop. Returns the previous status.
    pub fn disarm(&self) -> WatchdogStatus {
        self.stop_count.fetch_add(1, Ordering::Relaxed);
        self.swap(WatchdogStatus::Disabled)
    }

    /// Record a ping.
    pub fn record_ping(&self) {
        self.ping_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a timeout update.
    pub fn record_timeout_update(&self, clamped: bool) {
        self.timeout_updates.fetch_add(1, Ordering::Relaxed);
        if clamped {
            self.clamped_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Snapshot the counters.
    #[must_use]
    pub fn metrics(&self) -> WatchdogMetrics {
        WatchdogMetrics {
            start_count: self.start_count.load(Ordering::Acquire),
            stop_count: self.stop_count.load(Ordering::Acquire),
            ping_count: self.ping_count.load(Ordering::Acquire),
            timeout_updates: self.timeout_updates.load(Ordering::Acquire),
            clamped_requests: self.clamped_requests.load(Ordering::Acquire),
        }
    }

    fn swap(&self, to: WatchdogStatus) -> WatchdogStatus {
        let previous = self.status.swap(to.to_raw(), Ordering::AcqRel);
        WatchdogStatus::from_raw(previous).unwrap_or(WatchdogStatus::Disabled)
    }
}

impl Default for WatchdogState {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of watchdog operation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchdogMetrics {
    /// Number of `start` calls.
    pub start_count: u64,
    /// Number of `stop` calls.
    pub stop_count: u64,
    /// Number of `ping` calls.
    pub ping_count: u64,
    /// Number of `set_timeout` calls.
    pub timeout_updates: u64,
    /// Number of `set_timeout` calls that were clamped.
    pub clamped_requests: u64,
}
