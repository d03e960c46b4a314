//! Buffered, interrupt-driven serial transport
//!
//! [`SerialPort`] owns one [`RingBuffer`] per direction and the USART
//! registers of chip `C`. Roles are fixed for the life of the port:
//!
//! | Buffer   | Producer                         | Consumer                         |
//! |----------|----------------------------------|----------------------------------|
//! | transmit | [`SerialTx`] (mainline)          | [`SerialPort::on_transmit_ready`] |
//! | receive  | [`SerialPort::on_receive_complete`] | [`SerialRx`] (mainline)       |
//!
//! `init` hands out the two mainline stream handles exactly once. The
//! interrupt entry points are `unsafe` because only the vector binding
//! can promise they run from their own vector and nowhere else.
//!
//! Flow control is the data-register-empty interrupt enable: every
//! successful `write` arms it, and the transmit handler disarms it when it
//! finds nothing left to send, so an idle transmitter never storms.
//!
//! A byte that arrives while the receive buffer is full is dropped. There
//! is no counter and no notification. `write` and `read` spin without a
//! timeout; calling them with interrupts globally disabled deadlocks.

use core::convert::Infallible;
use core::fmt;
use core::marker::PhantomData;

use heapless::Vec;
use octet_hal::uart::{DataBits, Parity, StopBits, UartConfig, UartRx, UartTx};
use portable_atomic::{AtomicBool, Ordering};

use crate::bus::RegisterBus;
use crate::chip::{Chip, UsartBits, UsartRegisters};
use crate::queue::{QueueError, RingBuffer, DEFAULT_CAPACITY};

/// Largest value the 12-bit baud rate register holds
pub const MAX_DIVISOR: u16 = 0x0FFF;

/// Which of the two buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stream {
    /// Transmit buffer, fed by [`SerialTx`]
    Output,
    /// Receive buffer, drained by [`SerialRx`]
    Input,
}

/// Error from serial setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// `init` already ran; the stream handles exist
    AlreadyInitialized,
    /// Baud rate is zero or its divisor does not fit the baud register
    InvalidBaudRate,
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "serial port already initialized"),
            Self::InvalidBaudRate => write!(f, "baud rate not reachable from this clock"),
        }
    }
}

/// Baud register value for asynchronous normal mode: `clock / 16 / baud - 1`
pub const fn baud_divisor(clock_hz: u32, baud: u32) -> Result<u16, SerialError> {
    if baud == 0 {
        return Err(SerialError::InvalidBaudRate);
    }
    let ticks = clock_hz / 16 / baud;
    if ticks == 0 || ticks - 1 > MAX_DIVISOR as u32 {
        return Err(SerialError::InvalidBaudRate);
    }
    Ok((ticks - 1) as u16)
}

/// Control C value selecting the frame format
pub const fn frame_format(bits: &UsartBits, select: u8, config: &UartConfig) -> u8 {
    let size = match config.data_bits {
        DataBits::Five => 0,
        DataBits::Six => 1 << bits.ucsz0,
        DataBits::Seven => 1 << bits.ucsz1,
        DataBits::Eight => (1 << bits.ucsz1) | (1 << bits.ucsz0),
    };
    let parity = match config.parity {
        Parity::None => 0,
        Parity::Even => 1 << bits.upm1,
        Parity::Odd => (1 << bits.upm1) | (1 << bits.upm0),
    };
    let stop = match config.stop_bits {
        StopBits::One => 0,
        StopBits::Two => 1 << bits.usbs,
    };
    select | size | parity | stop
}

/// The serial transport
///
/// One per USART. Backends keep it in a `static`: it is a singleton
/// because there is one peripheral, not because the pattern generalises.
pub struct SerialPort<C: Chip, B: RegisterBus, const N: usize = DEFAULT_CAPACITY> {
    bus: B,
    clock_hz: u32,
    tx: RingBuffer<u8, N>,
    rx: RingBuffer<u8, N>,
    initialized: AtomicBool,
    _chip: PhantomData<fn() -> C>,
}

impl<C: Chip, B: RegisterBus, const N: usize> SerialPort<C, B, N> {
    const USART: UsartRegisters = C::USART;
    const UDRIE: u8 = 1 << C::USART.bits.udrie;

    /// Unconfigured port; `clock_hz` is the peripheral clock
    pub const fn new(bus: B, clock_hz: u32) -> Self {
        Self {
            bus,
            clock_hz,
            tx: RingBuffer::new(),
            rx: RingBuffer::new(),
            initialized: AtomicBool::new(false),
            _chip: PhantomData,
        }
    }

    /// Program the USART and hand out the output and input streams
    ///
    /// Sets the baud divisor, enables the receiver, the transmitter and the
    /// receive-complete interrupt, and selects the frame format. The
    /// transmit interrupt stays off until the first `write`.
    ///
    /// Runs once. A second call leaves the live hardware alone and returns
    /// [`SerialError::AlreadyInitialized`].
    pub fn init(
        &self,
        config: &UartConfig,
    ) -> Result<(SerialTx<'_, C, B, N>, SerialRx<'_, C, B, N>), SerialError> {
        let divisor = baud_divisor(self.clock_hz, config.baudrate)?;

        if self.initialized.swap(true, Ordering::AcqRel) {
            #[cfg(feature = "defmt")]
            defmt::warn!("{=str}: serial init called twice", C::NAME);
            return Err(SerialError::AlreadyInitialized);
        }

        let usart = Self::USART;
        let bits = usart.bits;

        self.bus.write(usart.baud_high, (divisor >> 8) as u8);
        self.bus.write(usart.baud_low, divisor as u8);

        self.bus.write(
            usart.control_b,
            (1 << bits.rxcie) | (1 << bits.rxen) | (1 << bits.txen),
        );

        self.bus.write(
            usart.control_c,
            frame_format(&bits, usart.control_c_select, config),
        );

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "{=str}: serial {=u32} baud, divisor {=u16}",
            C::NAME,
            config.baudrate,
            divisor
        );

        Ok((SerialTx { port: self }, SerialRx { port: self }))
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Occupancy of one buffer, without blocking
    pub fn size(&self, stream: Stream) -> usize {
        match stream {
            Stream::Output => self.tx.size(),
            Stream::Input => self.rx.size(),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Receive-complete interrupt body
    ///
    /// Reads the data register once and queues the byte, dropping it if the
    /// receive buffer is full.
    ///
    /// # Safety
    ///
    /// Must only be called from the receive-complete vector (or, on the
    /// host, from the one context simulating it). It is the receive
    /// buffer's only producer.
    pub unsafe fn on_receive_complete(&self) {
        let byte = self.bus.read(Self::USART.data);
        // SAFETY: sole producer of the receive buffer per the contract above
        let _ = unsafe { self.rx.enqueue(byte) };
    }

    /// Data-register-empty interrupt body
    ///
    /// Sends the next queued byte, or disarms this interrupt when there is
    /// none so it stops firing until the next `write`.
    ///
    /// # Safety
    ///
    /// Must only be called from the data-register-empty vector (or, on the
    /// host, from the one context simulating it). It is the transmit
    /// buffer's only consumer.
    pub unsafe fn on_transmit_ready(&self) {
        // SAFETY: sole consumer of the transmit buffer per the contract above
        match unsafe { self.tx.dequeue() } {
            Ok(byte) => self.bus.write(Self::USART.data, byte),
            Err(_) => self.bus.clear_bits(Self::USART.control_b, Self::UDRIE),
        }
    }

    /// True while the transmit interrupt is armed
    pub fn transmit_armed(&self) -> bool {
        self.bus.test_bits(Self::USART.control_b, Self::UDRIE)
    }

    fn arm_transmit(&self) {
        self.bus.set_bits(Self::USART.control_b, Self::UDRIE);
    }
}

/// Output stream: mainline producer of the transmit buffer
pub struct SerialTx<'a, C: Chip, B: RegisterBus, const N: usize = DEFAULT_CAPACITY> {
    port: &'a SerialPort<C, B, N>,
}

impl<C: Chip, B: RegisterBus, const N: usize> SerialTx<'_, C, B, N> {
    /// Queue one byte, spinning while the transmit buffer is full
    ///
    /// A line feed is preceded by a carriage return. After the byte is
    /// queued the transmit interrupt is (re-)armed so an idle transmitter
    /// starts draining.
    pub fn write(&mut self, byte: u8) {
        if byte == b'\n' {
            self.write(b'\r');
        }

        // SAFETY: `init` creates one `SerialTx` per port, and `&mut self`
        // keeps it to one caller: this is the sole producer.
        while unsafe { self.port.tx.enqueue(byte) }.is_err() {
            core::hint::spin_loop();
        }

        self.port.arm_transmit();
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write(byte);
        }
    }

    /// Spin until the interrupt handler has taken every queued byte
    ///
    /// The last byte may still be shifting out of the hardware.
    pub fn flush(&mut self) {
        while !self.port.tx.is_empty() {
            core::hint::spin_loop();
        }
    }

    /// Bytes waiting in the transmit buffer
    pub fn size(&self) -> usize {
        self.port.tx.size()
    }
}

impl<C: Chip, B: RegisterBus, const N: usize> fmt::Write for SerialTx<'_, C, B, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}

impl<C: Chip, B: RegisterBus, const N: usize> embedded_io::ErrorType for SerialTx<'_, C, B, N> {
    type Error = Infallible;
}

impl<C: Chip, B: RegisterBus, const N: usize> embedded_io::Write for SerialTx<'_, C, B, N> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
        self.write_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        SerialTx::flush(self);
        Ok(())
    }
}

impl<C: Chip, B: RegisterBus, const N: usize> embedded_io::WriteReady for SerialTx<'_, C, B, N> {
    fn write_ready(&mut self) -> Result<bool, Infallible> {
        Ok(!self.port.tx.is_full())
    }
}

impl<C: Chip, B: RegisterBus, const N: usize> UartTx for SerialTx<'_, C, B, N> {
    type Error = Infallible;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Infallible> {
        self.write_bytes(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        SerialTx::flush(self);
        Ok(())
    }
}

/// Input stream: mainline consumer of the receive buffer
pub struct SerialRx<'a, C: Chip, B: RegisterBus, const N: usize = DEFAULT_CAPACITY> {
    port: &'a SerialPort<C, B, N>,
}

impl<C: Chip, B: RegisterBus, const N: usize> SerialRx<'_, C, B, N> {
    /// Next received byte, spinning until one arrives
    pub fn read(&mut self) -> u8 {
        loop {
            if let Ok(byte) = self.try_read() {
                return byte;
            }
            core::hint::spin_loop();
        }
    }

    /// Next received byte, or [`QueueError::Empty`] without waiting
    pub fn try_read(&mut self) -> Result<u8, QueueError> {
        // SAFETY: `init` creates one `SerialRx` per port, and `&mut self`
        // keeps it to one caller: this is the sole consumer.
        unsafe { self.port.rx.dequeue() }
    }

    /// Read a line into `line`, replacing its contents
    ///
    /// Carriage returns are discarded and the terminating line feed is not
    /// stored. Returns `true` once the line feed is seen, `false` if `line`
    /// filled up first (the rest of the line stays queued).
    pub fn read_line<const L: usize>(&mut self, line: &mut Vec<u8, L>) -> bool {
        line.clear();
        while !line.is_full() {
            match self.read() {
                b'\n' => return true,
                b'\r' => {}
                byte => {
                    let _ = line.push(byte);
                }
            }
        }
        false
    }

    /// Bytes waiting in the receive buffer
    pub fn size(&self) -> usize {
        self.port.rx.size()
    }
}

impl<C: Chip, B: RegisterBus, const N: usize> embedded_io::ErrorType for SerialRx<'_, C, B, N> {
    type Error = Infallible;
}

impl<C: Chip, B: RegisterBus, const N: usize> embedded_io::Read for SerialRx<'_, C, B, N> {
    /// Blocks for the first byte, then takes whatever else is queued
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        let Some((first, rest)) = buf.split_first_mut() else {
            return Ok(0);
        };
        *first = SerialRx::read(self);

        let mut count = 1;
        for slot in rest.iter_mut() {
            match self.try_read() {
                Ok(byte) => *slot = byte,
                Err(_) => break,
            }
            count += 1;
        }
        Ok(count)
    }
}

impl<C: Chip, B: RegisterBus, const N: usize> embedded_io::ReadReady for SerialRx<'_, C, B, N> {
    fn read_ready(&mut self) -> Result<bool, Infallible> {
        Ok(!self.port.rx.is_empty())
    }
}

impl<C: Chip, B: RegisterBus, const N: usize> UartRx for SerialRx<'_, C, B, N> {
    type Error = Infallible;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        for slot in buf.iter_mut() {
            *slot = SerialRx::read(self);
        }
        Ok(buf.len())
    }
}
