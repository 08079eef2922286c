//! Conversion between timeout seconds and hardware ticks.
//!
//! The tick rate comes from the clock-source and divider programming done
//! at attach time. The largest timeout is bounded by the width of the
//! counter: a timeout the counter cannot represent would never fire.

use core::num::NonZeroU32;

use crate::registers::{COMPARE_MASK, DIVIDER_MASK, DIVIDER_SHIFT};

/// Internal rate of the 1 kHz-class watchdog clock source.
pub const INTERNAL_TICK_HZ: u32 = 1024;

/// Divider programmed at attach time (field value `0xFF`).
pub const TICK_DIVIDER: u32 = 256;

/// Largest value of the 16-bit elapsed-tick counter.
pub const COUNTER_MAX_TICKS: u32 = 0xFFFF;

/// Tick rate and counter width of a watchdog instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRate {
    internal_hz: u32,
    divider: u32,
    counter_max: u32,
    ticks_per_second: NonZeroU32,
}

impl TickRate {
    /// The BL808 configuration: 1024 Hz / 256 = 4 ticks per second.
    pub const BL808: Self = Self::new(INTERNAL_TICK_HZ, TICK_DIVIDER, COUNTER_MAX_TICKS);

    /// Build a tick rate.
    ///
    /// # Panics
    ///
    /// Panics if `divider` is zero, if it is larger than the 8-bit divider
    /// field allows, or if the resulting rate is below one tick per second.
    /// Used in const context, so these are compile-time errors.
    #[must_use]
    #[expect(clippy::panic, reason = "const constructor, misuse fails const evaluation")]
    pub const fn new(internal_hz: u32, divider: u32, counter_max: u32) -> Self {
        assert!(divider >= 1 && divider <= 256, "divider must be 1..=256");
        let Some(ticks_per_second) = NonZeroU32::new(internal_hz / divider) else {
            panic!("tick rate must be at least one tick per second");
        };
        Self {
            internal_hz,
            divider,
            counter_max,
            ticks_per_second,
        }
    }

    /// Internal clock rate in Hz.
    #[must_use]
    pub const fn internal_hz(&self) -> u32 {
        self.internal_hz
    }

    /// Clock divider.
    #[must_use]
    pub const fn divider(&self) -> u32 {
        self.divider
    }

    /// Largest representable tick count.
    #[must_use]
    pub const fn counter_max(&self) -> u32 {
        self.counter_max
    }

    /// Ticks per second after division.
    #[must_use]
    pub const fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second.get()
    }

    /// Largest timeout in whole seconds the counter can represent.
    #[must_use]
    pub const fn max_timeout(&self) -> u32 {
        self.counter_max / self.ticks_per_second.get()
    }

    /// Value of the divider field in the divider register.
    #[must_use]
    pub const fn divider_field(&self) -> u32 {
        ((self.divider - 1) << DIVIDER_SHIFT) & DIVIDER_MASK
    }

    /// Convert seconds to ticks. Saturates rather than wrapping.
    #[must_use]
    pub fn seconds_to_ticks(&self, seconds: u32) -> u32 {
        seconds.saturating_mul(self.ticks_per_second.get())
    }

    /// Convert ticks to whole seconds, truncating.
    #[must_use]
    pub fn ticks_to_seconds(&self, ticks: u32) -> u32 {
        ticks / self.ticks_per_second
    }

    /// Tick count for the 16-bit compare register.
    ///
    /// `seconds` must already be bounded by [`Self::max_timeout`]; larger
    /// values are pinned to the field maximum rather than truncated.
    #[must_use]
    pub fn compare_ticks(&self, seconds: u32) -> u16 {
        let ticks = self.seconds_to_ticks(seconds).min(COMPARE_MASK);
        u16::try_from(ticks).unwrap_or(u16::MAX)
    }

    /// Bound a requested timeout to `[min_timeout, max_timeout]`.
    ///
    /// A request at or above `max_timeout` is reported as [`Clamp::ToMax`]
    /// even when it equals the maximum, so callers warn on the counter's
    /// full range being used.
    #[must_use]
    pub fn bound(&self, requested: u32, min_timeout: u32) -> TimeoutUpdate {
        let max_timeout = self.max_timeout();
        let (applied, clamp) = if requested >= max_timeout {
            (max_timeout, Some(Clamp::ToMax))
        } else if requested < min_timeout {
            (min_timeout, Some(Clamp::ToMin))
        } else {
            (requested, None)
        };
        TimeoutUpdate {
            requested,
            applied,
            clamp,
        }
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self::BL808
    }
}

/// Which bound a timeout request was pulled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clamp {
    /// Request reached or exceeded the counter's capacity.
    ToMax,
    /// Request was below the minimum timeout.
    ToMin,
}

/// Result of a timeout update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct TimeoutUpdate {
    /// Seconds the caller asked for.
    pub requested: u32,
    /// Seconds actually programmed.
    pub applied: u32,
    /// Set when the request hit a bound.
    pub clamp: Option<Clamp>,
}

impl TimeoutUpdate {
    /// Whether the request was adjusted.
    #[must_use]
    pub fn was_clamped(&self) -> bool {
        self.clamp.is_some()
    }
}
