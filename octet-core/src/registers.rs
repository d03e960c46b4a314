//! Register address table
//!
//! Constant lookup from a logical port index to the three registers that
//! control it. Indices come only from [`Pin`](crate::gpio::Pin) values,
//! which are only ever generated for ports present on the chip.

use core::marker::PhantomData;

use crate::bus::Address;
use crate::chip::{Chip, PortId};

/// Offset of the direction (DDRx) register below the output register
pub const DIRECTION_OFFSET: Address = 1;

/// Offset of the input (PINx) register below the output register
pub const INPUT_OFFSET: Address = 2;

/// The three registers of one port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortRegisters {
    /// PORTx: output drive / pull-up enable
    pub output: Address,
    /// DDRx: data direction, 1 = output
    pub direction: Address,
    /// PINx: sampled input level
    pub input: Address,
}

impl PortRegisters {
    pub const fn from_output(output: Address) -> Self {
        Self {
            output,
            direction: output - DIRECTION_OFFSET,
            input: output - INPUT_OFFSET,
        }
    }
}

/// Port register table for chip `C`
pub struct RegisterTable<C: Chip> {
    _chip: PhantomData<fn() -> C>,
}

impl<C: Chip> RegisterTable<C> {
    /// Number of ports present
    pub const PORT_COUNT: usize = C::PORTS.len();

    /// Registers of the port at logical index `port`
    ///
    /// Panics if `port` is not below [`Self::PORT_COUNT`]; in a const
    /// context that is a compile error.
    #[inline(always)]
    pub const fn port(port: usize) -> PortRegisters {
        PortRegisters::from_output(C::PORTS[port].output)
    }

    /// Logical index of a port letter, `None` if the chip lacks it
    pub const fn index_of(id: PortId) -> Option<usize> {
        let mut i = 0;
        while i < C::PORTS.len() {
            if C::PORTS[i].id as u8 == id as u8 {
                return Some(i);
            }
            i += 1;
        }
        None
    }

    /// Port letter at logical index `port`
    pub const fn id_of(port: usize) -> PortId {
        C::PORTS[port].id
    }
}
