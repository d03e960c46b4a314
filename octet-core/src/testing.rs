//! Chip layouts used by the unit tests

use crate::chip::{Chip, PortBank, PortId, UsartBits, UsartRegisters};

// Host implementation for portable-atomic's critical-section fallback
#[cfg(feature = "critical-section")]
use critical_section as _;

/// Three ports, USART0 in extended I/O (ATmega328P-shaped)
pub struct TestChip;

impl Chip for TestChip {
    const NAME: &'static str = "test-328";
    const PORTS: &'static [PortBank] = &[
        PortBank::new(PortId::B, 0x25),
        PortBank::new(PortId::C, 0x28),
        PortBank::new(PortId::D, 0x2B),
    ];
    const USART: UsartRegisters = UsartRegisters {
        baud_high: 0xC5,
        baud_low: 0xC4,
        control_a: 0xC0,
        control_b: 0xC1,
        control_c: 0xC2,
        data: 0xC6,
        bits: UsartBits::MEGA,
        control_c_select: 0,
        rx_vector: 18,
        udre_vector: 19,
    };
}

/// Sparse ports reaching into extended I/O, shared UBRRH/UCSRC address
pub struct WideChip;

impl Chip for WideChip {
    const NAME: &'static str = "test-wide";
    const PORTS: &'static [PortBank] = &[
        PortBank::new(PortId::A, 0x22),
        PortBank::new(PortId::B, 0x25),
        PortBank::new(PortId::H, 0x102),
        PortBank::new(PortId::L, 0x10B),
    ];
    const USART: UsartRegisters = UsartRegisters {
        baud_high: 0x40,
        baud_low: 0x29,
        control_a: 0x2B,
        control_b: 0x2A,
        control_c: 0x40,
        data: 0x2C,
        bits: UsartBits::MEGA,
        control_c_select: 0x80,
        rx_vector: 11,
        udre_vector: 12,
    };
}
