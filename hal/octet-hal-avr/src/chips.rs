//! Register tables of the supported parts
//!
//! Addresses are data-space addresses (I/O address + 0x20). Parts sharing
//! a register map share a table: the 48/88/168 use [`Atmega328p`] and the
//! 164P/324P/1284P use [`Atmega644p`].

use octet_core::bus::Address;
use octet_core::chip::{Chip, PortBank, PortId, UsartBits, UsartRegisters};

/// URSEL: selects UCSRC over UBRRH at their shared address
const URSEL: u8 = 1 << 7;

/// Older parts: one USART, UBRRH and UCSRC share 0x40
const fn classic_usart(rx_vector: u8, udre_vector: u8) -> UsartRegisters {
    UsartRegisters {
        baud_high: 0x40,
        baud_low: 0x29,
        control_a: 0x2B,
        control_b: 0x2A,
        control_c: 0x40,
        data: 0x2C,
        bits: UsartBits::MEGA,
        control_c_select: URSEL,
        rx_vector,
        udre_vector,
    }
}

/// Newer parts: USART0 in extended I/O
const fn usart0(rx_vector: u8, udre_vector: u8) -> UsartRegisters {
    UsartRegisters {
        baud_high: 0xC5,
        baud_low: 0xC4,
        control_a: 0xC0,
        control_b: 0xC1,
        control_c: 0xC2,
        data: 0xC6,
        bits: UsartBits::MEGA,
        control_c_select: 0,
        rx_vector,
        udre_vector,
    }
}

const fn port(id: PortId, output: Address) -> PortBank {
    PortBank::new(id, output)
}

/// ATmega8
pub struct Atmega8;

impl Chip for Atmega8 {
    const NAME: &'static str = "ATmega8";
    const PORTS: &'static [PortBank] = &[
        port(PortId::B, 0x38),
        port(PortId::C, 0x35),
        port(PortId::D, 0x32),
    ];
    const USART: UsartRegisters = classic_usart(11, 12);
}

/// ATmega16
pub struct Atmega16;

impl Chip for Atmega16 {
    const NAME: &'static str = "ATmega16";
    const PORTS: &'static [PortBank] = &[
        port(PortId::A, 0x3B),
        port(PortId::B, 0x38),
        port(PortId::C, 0x35),
        port(PortId::D, 0x32),
    ];
    const USART: UsartRegisters = classic_usart(11, 12);
}

/// ATmega32
pub struct Atmega32;

impl Chip for Atmega32 {
    const NAME: &'static str = "ATmega32";
    const PORTS: &'static [PortBank] = Atmega16::PORTS;
    const USART: UsartRegisters = classic_usart(13, 14);
}

/// ATmega8515
pub struct Atmega8515;

impl Chip for Atmega8515 {
    const NAME: &'static str = "ATmega8515";
    const PORTS: &'static [PortBank] = &[
        port(PortId::A, 0x3B),
        port(PortId::B, 0x38),
        port(PortId::C, 0x35),
        port(PortId::D, 0x32),
        port(PortId::E, 0x27),
    ];
    const USART: UsartRegisters = classic_usart(9, 10);
}

/// ATmega328P, also ATmega48/88/168
pub struct Atmega328p;

impl Chip for Atmega328p {
    const NAME: &'static str = "ATmega328P";
    const PORTS: &'static [PortBank] = &[
        port(PortId::B, 0x25),
        port(PortId::C, 0x28),
        port(PortId::D, 0x2B),
    ];
    const USART: UsartRegisters = usart0(18, 19);
}

/// ATmega644P, also ATmega164P/324P/1284P
pub struct Atmega644p;

impl Chip for Atmega644p {
    const NAME: &'static str = "ATmega644P";
    const PORTS: &'static [PortBank] = &[
        port(PortId::A, 0x22),
        port(PortId::B, 0x25),
        port(PortId::C, 0x28),
        port(PortId::D, 0x2B),
    ];
    const USART: UsartRegisters = usart0(20, 21);
}

/// ATmega2560
pub struct Atmega2560;

impl Chip for Atmega2560 {
    const NAME: &'static str = "ATmega2560";
    const PORTS: &'static [PortBank] = &[
        port(PortId::A, 0x22),
        port(PortId::B, 0x25),
        port(PortId::C, 0x28),
        port(PortId::D, 0x2B),
        port(PortId::E, 0x2E),
        port(PortId::F, 0x31),
        port(PortId::G, 0x34),
        port(PortId::H, 0x102),
        port(PortId::J, 0x105),
        port(PortId::K, 0x108),
        port(PortId::L, 0x10B),
    ];
    const USART: UsartRegisters = usart0(25, 26);
}
