//! Board-agnostic engine of the Octet 8-bit HAL
//!
//! This crate contains everything that does not depend on how registers
//! are physically reached:
//!
//! - Register access seam and a host-side register file ([`bus`])
//! - Per-chip configuration table ([`chip`]) and port register lookup
//!   ([`registers`])
//! - Logical-pin GPIO with run-time and compile-time pin forms ([`gpio`])
//! - Lock-free single-producer/single-consumer ring buffer ([`queue`])
//! - Buffered, interrupt-driven UART transport ([`serial`])
//!
//! Concurrency model: one mainline context plus non-nesting interrupt
//! handlers. No heap, no threads, no locks.

#![no_std]
#![warn(unsafe_op_in_unsafe_fn)]

pub mod bus;
pub mod chip;
pub mod gpio;
pub mod queue;
pub mod registers;
pub mod serial;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience
pub use bus::{Address, RegisterBus, SimBus};
pub use chip::{Chip, PortBank, PortId, UsartBits, UsartRegisters};
pub use gpio::{FixedPin, Gpio, GpioPin, Pin};
pub use queue::{QueueError, RingBuffer};
pub use registers::{PortRegisters, RegisterTable};
pub use serial::{SerialError, SerialPort, SerialRx, SerialTx, Stream};

pub use octet_hal::uart::UartConfig;
