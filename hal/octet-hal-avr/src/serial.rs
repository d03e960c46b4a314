//! The process-wide serial port
//!
//! One buffered port per program. [`init`] hands out the mainline
//! transmit and receive handles exactly once; the two interrupt vectors
//! are bound with [`bind_serial_interrupts!`](crate::bind_serial_interrupts).

use octet_core::chip::Chip;
use octet_core::queue::DEFAULT_CAPACITY;
use octet_core::serial::{SerialPort, SerialRx, SerialTx};

use crate::{Mmio, SerialError, Stream, Target, UartConfig, CLOCK_HZ};

/// Bytes buffered per direction
pub const BUFFER_CAPACITY: usize = DEFAULT_CAPACITY;

pub type Serial = SerialPort<Target, Mmio, BUFFER_CAPACITY>;
pub type Tx = SerialTx<'static, Target, Mmio, BUFFER_CAPACITY>;
pub type Rx = SerialRx<'static, Target, Mmio, BUFFER_CAPACITY>;

// SAFETY: Target is the chip this firmware is built for
pub static SERIAL: Serial = SerialPort::new(unsafe { Mmio::new() }, CLOCK_HZ);

/// Configure the USART and take the mainline handles
///
/// Interrupts must be enabled globally afterwards for any byte to move.
pub fn init(config: &UartConfig) -> Result<(Tx, Rx), SerialError> {
    SERIAL.init(config)
}

/// Bytes currently queued in one direction
pub fn size(stream: Stream) -> usize {
    SERIAL.size(stream)
}

/// Receive-complete vector body
///
/// # Safety
///
/// Only the receive-complete vector may call this.
#[doc(hidden)]
#[inline(always)]
pub unsafe fn on_receive_complete() {
    // SAFETY: forwarded from the caller
    unsafe { SERIAL.on_receive_complete() }
}

/// Data-register-empty vector body
///
/// # Safety
///
/// Only the data-register-empty vector may call this.
#[doc(hidden)]
#[inline(always)]
pub unsafe fn on_transmit_ready() {
    // SAFETY: forwarded from the caller
    unsafe { SERIAL.on_transmit_ready() }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __bind_serial {
    ($rx:literal, $udre:literal) => {
        #[doc(hidden)]
        #[export_name = $rx]
        pub unsafe extern "avr-interrupt" fn __octet_usart_rx() {
            unsafe { $crate::serial::on_receive_complete() }
        }

        #[doc(hidden)]
        #[export_name = $udre]
        pub unsafe extern "avr-interrupt" fn __octet_usart_udre() {
            unsafe { $crate::serial::on_transmit_ready() }
        }
    };
}

/// Install the serial interrupt handlers for the selected chip
///
/// Invoke once at the top level of the firmware crate, which needs
/// `#![feature(abi_avr_interrupt)]`.
#[cfg(any(feature = "atmega8", feature = "atmega16"))]
#[macro_export]
macro_rules! bind_serial_interrupts {
    () => {
        $crate::__bind_serial!("__vector_11", "__vector_12");
    };
}

/// Install the serial interrupt handlers for the selected chip
#[cfg(feature = "atmega32")]
#[macro_export]
macro_rules! bind_serial_interrupts {
    () => {
        $crate::__bind_serial!("__vector_13", "__vector_14");
    };
}

/// Install the serial interrupt handlers for the selected chip
#[cfg(feature = "atmega8515")]
#[macro_export]
macro_rules! bind_serial_interrupts {
    () => {
        $crate::__bind_serial!("__vector_9", "__vector_10");
    };
}

/// Install the serial interrupt handlers for the selected chip
#[cfg(any(
    feature = "atmega48",
    feature = "atmega88",
    feature = "atmega168",
    feature = "atmega328p"
))]
#[macro_export]
macro_rules! bind_serial_interrupts {
    () => {
        $crate::__bind_serial!("__vector_18", "__vector_19");
    };
}

/// Install the serial interrupt handlers for the selected chip
#[cfg(any(
    feature = "atmega164p",
    feature = "atmega324p",
    feature = "atmega644p",
    feature = "atmega1284p"
))]
#[macro_export]
macro_rules! bind_serial_interrupts {
    () => {
        $crate::__bind_serial!("__vector_20", "__vector_21");
    };
}

/// Install the serial interrupt handlers for the selected chip
#[cfg(feature = "atmega2560")]
#[macro_export]
macro_rules! bind_serial_interrupts {
    () => {
        $crate::__bind_serial!("__vector_25", "__vector_26");
    };
}

#[cfg(any(feature = "atmega8", feature = "atmega16"))]
const BOUND_VECTORS: (u8, u8) = (11, 12);
#[cfg(feature = "atmega32")]
const BOUND_VECTORS: (u8, u8) = (13, 14);
#[cfg(feature = "atmega8515")]
const BOUND_VECTORS: (u8, u8) = (9, 10);
#[cfg(any(
    feature = "atmega48",
    feature = "atmega88",
    feature = "atmega168",
    feature = "atmega328p"
))]
const BOUND_VECTORS: (u8, u8) = (18, 19);
#[cfg(any(
    feature = "atmega164p",
    feature = "atmega324p",
    feature = "atmega644p",
    feature = "atmega1284p"
))]
const BOUND_VECTORS: (u8, u8) = (20, 21);
#[cfg(feature = "atmega2560")]
const BOUND_VECTORS: (u8, u8) = (25, 26);

// The vector names in `bind_serial_interrupts!` must match the chip table
const _: () = assert!(
    BOUND_VECTORS.0 == <Target as Chip>::USART.rx_vector
        && BOUND_VECTORS.1 == <Target as Chip>::USART.udre_vector,
    "serial vectors out of sync with the chip table"
);

// Host run: nothing here may reach `Mmio`, so the port is never initialised
#[cfg(all(test, feature = "atmega328p"))]
mod tests {
    use super::*;
    use crate::chips::Atmega328p;

    #[test]
    fn test_singleton_starts_idle() {
        assert!(!SERIAL.is_initialized());
        assert_eq!(size(Stream::Output), 0);
        assert_eq!(size(Stream::Input), 0);
        assert_eq!(SERIAL.capacity(), BUFFER_CAPACITY);
        assert_eq!(SERIAL.clock_hz(), CLOCK_HZ);
    }

    #[test]
    fn test_bound_vectors_match_table() {
        assert_eq!(BOUND_VECTORS, (18, 19));
        assert_eq!(
            (Atmega328p::USART.rx_vector, Atmega328p::USART.udre_vector),
            BOUND_VECTORS
        );
    }

    #[test]
    fn test_one_chip_selected() {
        assert_eq!(crate::SELECTED_CHIPS, 1);
        assert_eq!(<crate::Target as Chip>::NAME, "ATmega328P");
    }
}
