//! Register map and ordered access to the watchdog register block.
//!
//! The watchdog shares the BL808 timer block. Offsets below are relative to
//! the block base; values are bit-exact.
//!
//! # Write protection
//!
//! Mode/enable, timeout compare, and counter reset are write-protected.
//! Each protected write needs the two-key unlock sequence immediately
//! before it. [`unlock`] returns a [`WriteWindow`] that is consumed by
//! exactly one write, so a second protected write cannot reuse a window.

use core::ptr::NonNull;

/// Physical base of the timer/watchdog block on the BL808.
pub const BL808_WDT_BASE: usize = 0x2000_A500;

/// Size of the register region the driver touches.
pub const REGION_SIZE: usize = 0xC0;

/// Timer clock control (TCCR). Holds the watchdog clock-source field.
pub const REG_CLOCK_SOURCE: usize = 0x00;
/// Watchdog clock-source field in [`REG_CLOCK_SOURCE`].
pub const CLOCK_SOURCE_MASK: u32 = 0xF00;
/// Selects the 1 kHz-class clock source.
pub const CLOCK_SOURCE_1K: u32 = 0x200;

/// Watchdog mode/enable (WMER).
pub const REG_MODE: usize = 0x64;
/// Watchdog enabled.
pub const MODE_ENABLE: u32 = 0x1;
/// Reset the host on timeout instead of raising an interrupt.
pub const MODE_RESET_ON_TIMEOUT: u32 = 0x2;

/// Timeout compare (WMR).
pub const REG_COMPARE: usize = 0x68;
/// Tick-count field in [`REG_COMPARE`].
pub const COMPARE_MASK: u32 = 0xFFFF;

/// Elapsed-tick counter (WVR), 16 bits wide.
pub const REG_COUNTER: usize = 0x6C;

/// Counter reset (WCR).
pub const REG_COUNTER_RESET: usize = 0x98;
/// Restart the elapsed-tick counter from zero.
pub const COUNTER_RESET: u32 = 0x1;

/// First access key (WFAR).
pub const REG_KEY1: usize = 0x9C;
/// Value for [`REG_KEY1`].
pub const KEY1: u16 = 0xBABA;

/// Second access key (WSAR).
pub const REG_KEY2: usize = 0xA0;
/// Value for [`REG_KEY2`].
pub const KEY2: u16 = 0xEB10;

/// Timer clock divider (TCDR). Holds the watchdog divider field.
pub const REG_DIVIDER: usize = 0xBC;
/// Watchdog divider field in [`REG_DIVIDER`].
pub const DIVIDER_MASK: u32 = 0xFF00_0000;
/// Bit position of the watchdog divider field.
pub const DIVIDER_SHIFT: u32 = 24;

/// Registers whose writes need an unlock immediately before them.
pub const PROTECTED_REGISTERS: [usize; 3] = [REG_MODE, REG_COMPARE, REG_COUNTER_RESET];

/// Returns true if writes to `offset` are write-protected.
#[must_use]
pub fn is_protected(offset: usize) -> bool {
    PROTECTED_REGISTERS.contains(&offset)
}

/// Ordered access to a memory-mapped register region.
///
/// Accesses must reach the device in program order with no caching. Methods
/// take `&self`: the region is a device, not Rust-owned memory, and the
/// controller serializes mutating sequences itself.
pub trait RegisterAccess {
    /// Read a 16-bit register.
    fn read16(&self, offset: usize) -> u16;

    /// Write a 16-bit register.
    fn write16(&self, offset: usize, value: u16);

    /// Read a 32-bit register.
    fn read32(&self, offset: usize) -> u32;

    /// Write a 32-bit register.
    fn write32(&self, offset: usize, value: u32);

    /// Read-modify-write a 32-bit register: clear `clear`, then set `set`.
    ///
    /// Returns the value written.
    fn modify32(&self, offset: usize, clear: u32, set: u32) -> u32 {
        let value = (self.read32(offset) & !clear) | set;
        self.write32(offset, value);
        value
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    fn read16(&self, offset: usize) -> u16 {
        (**self).read16(offset)
    }

    fn write16(&self, offset: usize, value: u16) {
        (**self).write16(offset, value);
    }

    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value);
    }
}

/// A single-use write-protect window opened by [`unlock`].
///
/// Consumed by exactly one protected write.
#[must_use = "an unlock window is wasted unless a protected write follows"]
#[derive(Debug)]
pub struct WriteWindow<'a, R: RegisterAccess + ?Sized> {
    regs: &'a R,
}

impl<R: RegisterAccess + ?Sized> WriteWindow<'_, R> {
    /// Protected 16-bit write.
    pub fn write16(self, offset: usize, value: u16) {
        self.regs.write16(offset, value);
    }

    /// Protected 32-bit write.
    pub fn write32(self, offset: usize, value: u32) {
        self.regs.write32(offset, value);
    }

    /// Protected 32-bit read-modify-write. Returns the value written.
    pub fn modify32(self, offset: usize, clear: u32, set: u32) -> u32 {
        self.regs.modify32(offset, clear, set)
    }
}

/// Write both access keys, in order, opening a write-protect window.
pub fn unlock<R: RegisterAccess + ?Sized>(regs: &R) -> WriteWindow<'_, R> {
    regs.write16(REG_KEY1, KEY1);
    regs.write16(REG_KEY2, KEY2);
    WriteWindow { regs }
}

/// Volatile access to a mapped register region.
///
/// The discovery layer maps the region and hands over the base pointer;
/// dropping the handle does not unmap it.
#[derive(Debug)]
pub struct MmioRegisters {
    base: NonNull<u8>,
    len: usize,
}

#[expect(unsafe_code, reason = "constructing an MMIO handle from a raw mapping")]
impl MmioRegisters {
    /// Wrap a mapped register region.
    ///
    /// # Safety
    ///
    /// `base` must point to a device mapping of at least `len` bytes that
    /// stays mapped for the lifetime of the returned value, is suitably
    /// aligned for 32-bit access, and is not accessed through any other
    /// handle while this one exists.
    #[must_use]
    pub unsafe fn new(base: NonNull<u8>, len: usize) -> Self {
        Self { base, len }
    }
}

impl MmioRegisters {
    /// Base address of the mapping.
    #[must_use]
    pub fn base(&self) -> NonNull<u8> {
        self.base
    }

    /// Length of the mapping in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn ptr<T>(&self, offset: usize) -> *mut T {
        debug_assert!(
            offset
                .checked_add(core::mem::size_of::<T>())
                .is_some_and(|end| end <= self.len),
            "register offset {offset:#x} outside mapped region"
        );
        debug_assert!(offset % core::mem::align_of::<T>() == 0);
        self.base.as_ptr().wrapping_add(offset).cast::<T>()
    }
}

#[expect(unsafe_code, reason = "volatile MMIO access")]
impl RegisterAccess for MmioRegisters {
    fn read16(&self, offset: usize) -> u16 {
        // SAFETY: `new` guarantees the mapping covers `offset` and is aligned.
        unsafe { self.ptr::<u16>(offset).read_volatile() }
    }

    fn write16(&self, offset: usize, value: u16) {
        // SAFETY: `new` guarantees the mapping covers `offset` and is aligned.
        unsafe { self.ptr::<u16>(offset).write_volatile(value) }
    }

    fn read32(&self, offset: usize) -> u32 {
        // SAFETY: `new` guarantees the mapping covers `offset` and is aligned.
        unsafe { self.ptr::<u32>(offset).read_volatile() }
    }

    fn write32(&self, offset: usize, value: u32) {
        // SAFETY: `new` guarantees the mapping covers `offset` and is aligned.
        unsafe { self.ptr::<u32>(offset).write_volatile(value) }
    }
}

// SAFETY: the handle is exclusive to its owner (see `new`) and every access
// is a single volatile load or store; the controller serializes sequences.
#[expect(unsafe_code, reason = "MMIO handle is moved between contexts")]
unsafe impl Send for MmioRegisters {}

// SAFETY: as above; concurrent readers only issue independent volatile loads.
#[expect(unsafe_code, reason = "MMIO handle is shared between contexts")]
unsafe impl Sync for MmioRegisters {}
