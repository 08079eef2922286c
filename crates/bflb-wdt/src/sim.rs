//! In-memory stand-in for the watchdog register block.
//!
//! [`SimRegisters`] implements [`RegisterAccess`] over a word map, models
//! the two-key write protection, and logs every access so tests can check
//! ordering. It never resets anything; it exists to run the controller
//! without hardware.
//!
//! # Example
//!
//! ```rust
//! use bflb_wdt::prelude::*;
//!
//! let wdt = BflbWatchdog::new(SimRegisters::new(), "sim", WatchdogConfig::default())
//!     .expect("valid config");
//! wdt.start();
//! wdt.registers().advance_ticks(8);
//! assert_eq!(wdt.get_timeleft(), wdt.max_timeout() - 2);
//! assert!(wdt.registers().protected_writes_unlocked());
//! ```

use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::registers::{
    COMPARE_MASK, COUNTER_RESET, KEY1, KEY2, MODE_ENABLE, MODE_RESET_ON_TIMEOUT, REG_COMPARE,
    REG_COUNTER, REG_COUNTER_RESET, REG_KEY1, REG_KEY2, REG_MODE, RegisterAccess, is_protected,
};
use crate::timeout::COUNTER_MAX_TICKS;

/// Direction of a logged register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Register read.
    Read,
    /// Register write.
    Write,
}

/// Width of a logged register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessWidth {
    /// 16-bit access.
    Half,
    /// 32-bit access.
    Word,
}

/// One logged register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    /// Read or write.
    pub kind: AccessKind,
    /// Access width.
    pub width: AccessWidth,
    /// Register offset.
    pub offset: usize,
    /// Value read or written.
    pub value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Protection {
    #[default]
    Locked,
    FirstKey,
    Open,
}

#[derive(Debug, Default)]
struct SimState {
    words: BTreeMap<usize, u32>,
    log: Vec<Access>,
    protection: Protection,
    rejected: Vec<usize>,
}

impl SimState {
    fn word(&self, offset: usize) -> u32 {
        self.words.get(&offset).copied().unwrap_or(0)
    }

    fn write(&mut self, width: AccessWidth, offset: usize, value: u32) {
        self.log.push(Access {
            kind: AccessKind::Write,
            width,
            offset,
            value,
        });

        match offset {
            REG_KEY1 => {
                self.protection = if value == u32::from(KEY1) {
                    Protection::FirstKey
                } else {
                    Protection::Locked
                };
                self.store(width, offset, value);
                return;
            }
            REG_KEY2 => {
                self.protection =
                    if value == u32::from(KEY2) && self.protection == Protection::FirstKey {
                        Protection::Open
                    } else {
                        Protection::Locked
                    };
                self.store(width, offset, value);
                return;
            }
            _ => {}
        }

        // Any other write closes the window.
        let open = core::mem::take(&mut self.protection) == Protection::Open;
        if is_protected(offset) && !open {
            self.rejected.push(offset);
            return;
        }

        match offset {
            REG_COUNTER => {}
            REG_COUNTER_RESET => {
                if value & COUNTER_RESET != 0 {
                    self.words.insert(REG_COUNTER, 0);
                }
                self.words.insert(offset, value & !COUNTER_RESET);
            }
            _ => self.store(width, offset, value),
        }
    }

    fn store(&mut self, width: AccessWidth, offset: usize, value: u32) {
        let stored = match width {
            AccessWidth::Half => (self.word(offset) & !0xFFFF) | (value & 0xFFFF),
            AccessWidth::Word => value,
        };
        self.words.insert(offset, stored);
    }
}

/// In-memory watchdog register block.
#[derive(Debug, Default)]
pub struct SimRegisters {
    state: Mutex<SimState>,
}

impl SimRegisters {
    /// Create a register block with every register at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a register, as if it held a reset value. Not logged.
    #[must_use]
    pub fn with_value(self, offset: usize, value: u32) -> Self {
        self.state.lock().words.insert(offset, value);
        self
    }

    /// Current raw register value. Not logged.
    #[must_use]
    pub fn value(&self, offset: usize) -> u32 {
        self.state.lock().word(offset)
    }

    /// Let `ticks` watchdog ticks elapse. The counter only runs while
    /// enabled and saturates at the 16-bit maximum.
    pub fn advance_ticks(&self, ticks: u32) {
        let mut state = self.state.lock();
        if state.word(REG_MODE) & MODE_ENABLE == 0 {
            return;
        }
        let counter = state
            .word(REG_COUNTER)
            .saturating_add(ticks)
            .min(COUNTER_MAX_TICKS);
        state.words.insert(REG_COUNTER, counter);
    }

    /// Elapsed-tick counter.
    #[must_use]
    pub fn counter(&self) -> u32 {
        self.value(REG_COUNTER)
    }

    /// Tick count in the compare register.
    #[must_use]
    pub fn compare_ticks(&self) -> u32 {
        self.value(REG_COMPARE) & COMPARE_MASK
    }

    /// Whether the enable bit is set.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.value(REG_MODE) & MODE_ENABLE != 0
    }

    /// Whether an armed, reset-mode watchdog has reached its compare value.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        let mode = self.value(REG_MODE);
        mode & MODE_ENABLE != 0
            && mode & MODE_RESET_ON_TIMEOUT != 0
            && self.counter() >= self.compare_ticks()
    }

    /// Every access since creation or the last [`Self::clear_log`].
    #[must_use]
    pub fn accesses(&self) -> Vec<Access> {
        self.state.lock().log.clone()
    }

    /// Writes only, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<Access> {
        self.state
            .lock()
            .log
            .iter()
            .filter(|a| a.kind == AccessKind::Write)
            .copied()
            .collect()
    }

    /// Forget logged accesses.
    pub fn clear_log(&self) {
        self.state.lock().log.clear();
    }

    /// Offsets of protected writes the block ignored for lack of an unlock.
    #[must_use]
    pub fn rejected_writes(&self) -> Vec<usize> {
        self.state.lock().rejected.clone()
    }

    /// Whether every protected write in the log directly follows the
    /// two-key sequence, with no other write in between.
    #[must_use]
    pub fn protected_writes_unlocked(&self) -> bool {
        let writes = self.writes();
        writes.iter().enumerate().all(|(i, access)| {
            if !is_protected(access.offset) {
                return true;
            }
            let key1 = i.checked_sub(2).and_then(|k| writes.get(k));
            let key2 = i.checked_sub(1).and_then(|k| writes.get(k));
            matches!(
                (key1, key2),
                (Some(k1), Some(k2))
                    if k1.offset == REG_KEY1
                        && k1.value == u32::from(KEY1)
                        && k2.offset == REG_KEY2
                        && k2.value == u32::from(KEY2)
            )
        })
    }

    fn read(&self, width: AccessWidth, offset: usize) -> u32 {
        let mut state = self.state.lock();
        let word = state.word(offset);
        let value = match width {
            AccessWidth::Half => word & 0xFFFF,
            AccessWidth::Word => word,
        };
        state.log.push(Access {
            kind: AccessKind::Read,
            width,
            offset,
            value,
        });
        value
    }
}

impl RegisterAccess for SimRegisters {
    fn read16(&self, offset: usize) -> u16 {
        u16::try_from(self.read(AccessWidth::Half, offset)).unwrap_or(u16::MAX)
    }

    fn write16(&self, offset: usize, value: u16) {
        self.state
            .lock()
            .write(AccessWidth::Half, offset, u32::from(value));
    }

    fn read32(&self, offset: usize) -> u32 {
        self.read(AccessWidth::Word, offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        self.state.lock().write(AccessWidth::Word, offset, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{REG_CLOCK_SOURCE, unlock};

    #[test]
    fn test_protected_write_needs_unlock() {
        let regs = SimRegisters::new();
        regs.write32(REG_MODE, MODE_ENABLE);
        assert!(!regs.is_enabled());
        assert_eq!(regs.rejected_writes(), vec![REG_MODE]);

        unlock(&regs).write32(REG_MODE, MODE_ENABLE);
        assert!(regs.is_enabled());
    }

    #[test]
    fn test_window_closes_after_one_write() {
        let regs = SimRegisters::new();
        regs.write16(REG_KEY1, KEY1);
        regs.write16(REG_KEY2, KEY2);
        regs.write32(REG_CLOCK_SOURCE, 0x200);
        regs.write32(REG_MODE, MODE_ENABLE);
        assert!(!regs.is_enabled());
        assert!(!regs.protected_writes_unlocked());
    }

    #[test]
    fn test_keys_out_of_order_do_not_unlock() {
        let regs = SimRegisters::new();
        regs.write16(REG_KEY2, KEY2);
        regs.write16(REG_KEY1, KEY1);
        regs.write32(REG_MODE, MODE_ENABLE);
        assert!(!regs.is_enabled());
    }

    #[test]
    fn test_counter_reset() {
        let regs = SimRegisters::new();
        unlock(&regs).write32(REG_MODE, MODE_ENABLE);
        regs.advance_ticks(100);
        assert_eq!(regs.counter(), 100);

        unlock(&regs).modify32(REG_COUNTER_RESET, 0, COUNTER_RESET);
        assert_eq!(regs.counter(), 0);
        assert_eq!(regs.value(REG_COUNTER_RESET), 0);
    }

    #[test]
    fn test_counter_only_runs_when_enabled() {
        let regs = SimRegisters::new();
        regs.advance_ticks(100);
        assert_eq!(regs.counter(), 0);
    }

    #[test]
    fn test_counter_saturates() {
        let regs = SimRegisters::new();
        unlock(&regs).write32(REG_MODE, MODE_ENABLE);
        regs.advance_ticks(u32::MAX);
        assert_eq!(regs.counter(), COUNTER_MAX_TICKS);
        assert_eq!(regs.read16(REG_COUNTER), u16::MAX);
    }

    #[test]
    fn test_half_write_keeps_upper_bits() {
        let regs = SimRegisters::new().with_value(REG_COMPARE, 0xABCD_0000);
        unlock(&regs).write16(REG_COMPARE, 240);
        assert_eq!(regs.value(REG_COMPARE), 0xABCD_00F0);
        assert_eq!(regs.compare_ticks(), 240);
    }
}
