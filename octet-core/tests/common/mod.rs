//! Shared chip layout for the integration tests

#![allow(dead_code)]

use octet_core::chip::{Chip, PortBank, PortId, UsartBits, UsartRegisters};

#[cfg(feature = "critical-section")]
use critical_section as _;

pub const CLOCK_HZ: u32 = 16_000_000;

pub const UCSRB: u16 = 0xC1;
pub const UDR: u16 = 0xC6;
pub const UDRIE: u8 = 1 << 5;

/// ATmega644P-shaped part: four ports, USART0 in extended I/O
pub struct Mega;

impl Chip for Mega {
    const NAME: &'static str = "mega-test";
    const PORTS: &'static [PortBank] = &[
        PortBank::new(PortId::A, 0x22),
        PortBank::new(PortId::B, 0x25),
        PortBank::new(PortId::C, 0x28),
        PortBank::new(PortId::D, 0x2B),
    ];
    const USART: UsartRegisters = UsartRegisters {
        baud_high: 0xC5,
        baud_low: 0xC4,
        control_a: 0xC0,
        control_b: UCSRB,
        control_c: 0xC2,
        data: UDR,
        bits: UsartBits::MEGA,
        control_c_select: 0,
        rx_vector: 20,
        udre_vector: 21,
    };
}
