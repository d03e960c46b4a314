//! Memory-mapped register bus
//!
//! Every megaAVR register is reachable through the data address space, so
//! a register access is a single volatile load or store.

use octet_core::bus::{Address, RegisterBus};

/// Volatile access to the data address space
#[derive(Debug, Clone, Copy)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Create the bus
    ///
    /// # Safety
    ///
    /// The bus dereferences whatever address it is given. Callers must
    /// only use it with register addresses from a [`Chip`] table matching
    /// the part the program runs on.
    ///
    /// [`Chip`]: octet_core::Chip
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for Mmio {
    #[inline(always)]
    fn read(&self, addr: Address) -> u8 {
        // SAFETY: addresses come from the chip table per `Mmio::new`
        unsafe { core::ptr::read_volatile(addr as usize as *const u8) }
    }

    #[inline(always)]
    fn write(&self, addr: Address, value: u8) {
        // SAFETY: addresses come from the chip table per `Mmio::new`
        unsafe { core::ptr::write_volatile(addr as usize as *mut u8, value) }
    }
}
