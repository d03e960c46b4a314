//! megaAVR backend for the Octet HAL
//!
//! This crate binds `octet-core` to real hardware. It supplies the
//! register tables of the supported parts, a volatile memory-mapped
//! register bus and, once a chip feature is selected, the process-wide
//! serial port together with its interrupt vectors.
//!
//! # Features
//!
//! Select exactly one chip for firmware builds:
//!
//! - `atmega8`, `atmega16`, `atmega32`, `atmega8515`
//! - `atmega48`, `atmega88`, `atmega168`, `atmega328p`
//! - `atmega164p`, `atmega324p`, `atmega644p`, `atmega1284p`
//! - `atmega2560`
//!
//! Without a chip feature only the tables and [`Mmio`] are built, which
//! is what host tests use.
//!
//! - `defmt` - Enable debug formatting support
//!
//! # Configuration
//!
//! The CPU clock is read from `OCTET_F_CPU` at build time (default
//! 16 MHz) and exposed as [`CLOCK_HZ`].
//!
//! # Usage
//!
//! ```ignore
//! #![no_std]
//! #![no_main]
//! #![feature(abi_avr_interrupt)]
//!
//! use core::fmt::Write;
//! use octet_hal_avr::{fixed_pin, serial, UartConfig};
//!
//! octet_hal_avr::bind_serial_interrupts!();
//!
//! #[no_mangle]
//! pub extern "C" fn main() -> ! {
//!     let (mut tx, mut rx) = serial::init(&UartConfig::new(9600)).unwrap();
//!     let led = fixed_pin!(B, 5);
//!     led.output();
//!     // interrupts must be enabled globally here
//!     loop {
//!         let byte = rx.read();
//!         led.toggle();
//!         writeln!(tx, "got {}", byte).ok();
//!     }
//! }
//! ```

#![no_std]
#![warn(unsafe_op_in_unsafe_fn)]

pub mod chips;
pub mod mmio;

#[cfg(feature = "_target")]
pub mod gpio;
#[cfg(feature = "_target")]
pub mod serial;

pub use mmio::Mmio;

#[cfg(feature = "_target")]
pub use gpio::{gpio, Pin, GPIO};

// Re-export shared types for firmware crates
pub use octet_core::{PortId, SerialError, Stream, UartConfig};

include!(concat!(env!("OUT_DIR"), "/clock.rs"));

/// Number of chip features enabled
const SELECTED_CHIPS: usize = cfg!(feature = "atmega8") as usize
    + cfg!(feature = "atmega16") as usize
    + cfg!(feature = "atmega32") as usize
    + cfg!(feature = "atmega8515") as usize
    + cfg!(feature = "atmega48") as usize
    + cfg!(feature = "atmega88") as usize
    + cfg!(feature = "atmega168") as usize
    + cfg!(feature = "atmega328p") as usize
    + cfg!(feature = "atmega164p") as usize
    + cfg!(feature = "atmega324p") as usize
    + cfg!(feature = "atmega644p") as usize
    + cfg!(feature = "atmega1284p") as usize
    + cfg!(feature = "atmega2560") as usize;

const _: () = assert!(SELECTED_CHIPS <= 1, "enable at most one chip feature");

#[cfg(all(
    feature = "_target",
    not(any(
        feature = "atmega8",
        feature = "atmega16",
        feature = "atmega32",
        feature = "atmega8515",
        feature = "atmega48",
        feature = "atmega88",
        feature = "atmega168",
        feature = "atmega328p",
        feature = "atmega164p",
        feature = "atmega324p",
        feature = "atmega644p",
        feature = "atmega1284p",
        feature = "atmega2560"
    ))
))]
compile_error!("`_target` is internal: enable a chip feature such as `atmega328p` instead");

/// The chip selected by the enabled feature
#[cfg(feature = "atmega8")]
pub type Target = chips::Atmega8;
#[cfg(feature = "atmega16")]
pub type Target = chips::Atmega16;
#[cfg(feature = "atmega32")]
pub type Target = chips::Atmega32;
#[cfg(feature = "atmega8515")]
pub type Target = chips::Atmega8515;
#[cfg(any(
    feature = "atmega48",
    feature = "atmega88",
    feature = "atmega168",
    feature = "atmega328p"
))]
pub type Target = chips::Atmega328p;
#[cfg(any(
    feature = "atmega164p",
    feature = "atmega324p",
    feature = "atmega644p",
    feature = "atmega1284p"
))]
pub type Target = chips::Atmega644p;
#[cfg(feature = "atmega2560")]
pub type Target = chips::Atmega2560;
