//! Octet Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits that the Octet
//! engine (`octet-core`) implements and that application code programs
//! against. Chip specifics live below the engine, so the same application
//! code runs on any supported 8-bit part.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application firmware                   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  octet-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  octet-core (pins, ring buffers, UART)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  octet-hal-avr (chip tables, MMIO)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`], [`gpio::DirectionalPin`] - Digital I/O
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{DirectionalPin, InputPin, OutputPin, PinDirection};
pub use uart::{UartConfig, UartRx, UartTx};
