//! Per-chip configuration table
//!
//! The engine never branches on chip identity. Instead each supported part
//! is described by a type implementing [`Chip`], whose associated constants
//! name the addresses and bit positions of every register role the engine
//! uses. Backends select one of these at build time.

use crate::bus::Address;

/// Physical GPIO port letter
///
/// There is no port I on any part of the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PortId {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    J,
    K,
    L,
}

impl PortId {
    /// Port letter as printed on the datasheet
    pub const fn letter(self) -> char {
        match self {
            PortId::A => 'A',
            PortId::B => 'B',
            PortId::C => 'C',
            PortId::D => 'D',
            PortId::E => 'E',
            PortId::F => 'F',
            PortId::G => 'G',
            PortId::H => 'H',
            PortId::J => 'J',
            PortId::K => 'K',
            PortId::L => 'L',
        }
    }
}

/// One physical port present on the chip
///
/// Only the output register is stored: the direction and input registers
/// sit one and two bytes below it on every part of the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortBank {
    pub id: PortId,
    /// Address of the PORTx register
    pub output: Address,
}

impl PortBank {
    pub const fn new(id: PortId, output: Address) -> Self {
        Self { id, output }
    }
}

/// Bit positions in the USART control registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UsartBits {
    /// Receive-complete interrupt enable (control B)
    pub rxcie: u8,
    /// Data-register-empty interrupt enable (control B)
    pub udrie: u8,
    /// Receiver enable (control B)
    pub rxen: u8,
    /// Transmitter enable (control B)
    pub txen: u8,
    /// Parity mode, high bit (control C)
    pub upm1: u8,
    /// Parity mode, low bit (control C)
    pub upm0: u8,
    /// Stop bit select (control C)
    pub usbs: u8,
    /// Character size, high bit (control C)
    pub ucsz1: u8,
    /// Character size, low bit (control C)
    pub ucsz0: u8,
}

impl UsartBits {
    /// Layout shared by every megaAVR USART
    pub const MEGA: Self = Self {
        rxcie: 7,
        udrie: 5,
        rxen: 4,
        txen: 3,
        upm1: 5,
        upm0: 4,
        usbs: 3,
        ucsz1: 2,
        ucsz0: 1,
    };
}

/// USART register roles and interrupt vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UsartRegisters {
    pub baud_high: Address,
    pub baud_low: Address,
    pub control_a: Address,
    pub control_b: Address,
    pub control_c: Address,
    pub data: Address,
    pub bits: UsartBits,
    /// Mask OR-ed into every control C write
    ///
    /// Parts where UBRRH and UCSRC share an address need URSEL set to
    /// reach UCSRC; everything else uses 0.
    pub control_c_select: u8,
    /// Receive-complete vector number
    pub rx_vector: u8,
    /// Data-register-empty vector number
    pub udre_vector: u8,
}

/// A supported microcontroller
pub trait Chip: 'static {
    /// Part name, for diagnostics
    const NAME: &'static str;

    /// Ports physically present, in pin-ordinal order
    const PORTS: &'static [PortBank];

    /// The (single) serial peripheral
    const USART: UsartRegisters;
}
