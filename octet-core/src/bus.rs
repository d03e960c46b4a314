//! Register access seam
//!
//! Everything above this module touches hardware only through
//! [`RegisterBus`]: single-byte reads and writes at data-space addresses.
//! The AVR backend implements it with volatile memory accesses; [`SimBus`]
//! implements it with a host-side register file for tests and simulation.

use portable_atomic::{AtomicU8, Ordering};

/// Address in the 8-bit MCU data space (I/O registers start at 0x20)
pub type Address = u16;

/// Byte-wide register access
pub trait RegisterBus {
    /// Read the register at `addr`
    fn read(&self, addr: Address) -> u8;

    /// Write `value` to the register at `addr`
    fn write(&self, addr: Address, value: u8);

    /// Read-modify-write: OR `mask` into the register
    ///
    /// Not atomic with respect to interrupts touching the same register.
    #[inline(always)]
    fn set_bits(&self, addr: Address, mask: u8) {
        let value = self.read(addr);
        self.write(addr, value | mask);
    }

    /// Read-modify-write: clear `mask` in the register
    ///
    /// Not atomic with respect to interrupts touching the same register.
    #[inline(always)]
    fn clear_bits(&self, addr: Address, mask: u8) {
        let value = self.read(addr);
        self.write(addr, value & !mask);
    }

    /// True if any bit of `mask` is set in the register
    #[inline(always)]
    fn test_bits(&self, addr: Address, mask: u8) -> bool {
        self.read(addr) & mask != 0
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &B {
    #[inline(always)]
    fn read(&self, addr: Address) -> u8 {
        (**self).read(addr)
    }

    #[inline(always)]
    fn write(&self, addr: Address, value: u8) {
        (**self).write(addr, value)
    }
}

/// Size of the simulated data space (covers extended I/O up to 0x1FF)
pub const SIM_SPACE: usize = 0x200;

/// Host-side register file
///
/// Every register is a plain byte: writes are stored, reads return the
/// last value written. Hardware side effects (a byte arriving, a data
/// register emptying) are produced by the test driving the interrupt
/// handlers. Backed by atomics so a second thread can play the interrupt
/// role.
pub struct SimBus {
    regs: [AtomicU8; SIM_SPACE],
}

impl SimBus {
    /// Register file with every register cleared
    pub fn new() -> Self {
        Self {
            regs: core::array::from_fn(|_| AtomicU8::new(0)),
        }
    }

    /// Clear every register
    pub fn reset(&self) {
        for reg in self.regs.iter() {
            reg.store(0, Ordering::SeqCst);
        }
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for SimBus {
    fn read(&self, addr: Address) -> u8 {
        self.regs[addr as usize].load(Ordering::SeqCst)
    }

    fn write(&self, addr: Address, value: u8) {
        self.regs[addr as usize].store(value, Ordering::SeqCst)
    }
}
