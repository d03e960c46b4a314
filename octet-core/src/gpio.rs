//! Logical-pin GPIO
//!
//! A [`Pin`] is an ordinal: eight consecutive values per port, contiguous
//! across the ports present on the chip. Port index is `ordinal / 8`, bit
//! index is `ordinal % 8`, and the bit mask is `1 << bit`.
//!
//! Two call shapes share that arithmetic:
//!
//! - [`Gpio`] methods and [`GpioPin`] take a run-time [`Pin`]
//! - [`FixedPin`] carries the ordinal as a const generic, so the register
//!   address and mask are constants and each operation reduces to a single
//!   read-modify-write of a known register
//!
//! Output and direction changes are read-modify-write and not atomic with
//! respect to interrupts. Code sharing a port between mainline and an
//! interrupt handler must serialize access itself.
//!
//! There is no "no pin" sentinel ordinal: an optional pin is
//! `Option<Pin<C>>`, and [`Pin::COUNT`] is the first ordinal past the end
//! for code that needs a numeric bound.

use core::convert::Infallible;
use core::fmt;
use core::marker::PhantomData;

use embedded_hal::digital as eh;
use octet_hal::gpio::{DirectionalPin, InputPin, OutputPin, PinDirection};

use crate::bus::RegisterBus;
use crate::chip::{Chip, PortId};
use crate::registers::{PortRegisters, RegisterTable};

/// Number of pins per port
pub const PINS_PER_PORT: u8 = 8;

/// Port index, bit index and mask of a pin ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinLocation {
    pub port: usize,
    pub bit: u8,
    pub mask: u8,
}

/// Resolve a pin ordinal to its port and bit
///
/// The only place the ordinal layout is defined.
#[inline(always)]
pub const fn locate(ordinal: u8) -> PinLocation {
    let bit = ordinal % PINS_PER_PORT;
    PinLocation {
        port: (ordinal / PINS_PER_PORT) as usize,
        bit,
        mask: 1 << bit,
    }
}

/// Logical GPIO line of chip `C`
pub struct Pin<C: Chip> {
    ordinal: u8,
    _chip: PhantomData<fn() -> C>,
}

impl<C: Chip> Pin<C> {
    /// Number of pins on the chip, one past the last valid ordinal
    pub const COUNT: u8 = (C::PORTS.len() as u8) * PINS_PER_PORT;

    /// Pin `bit` of port `port`
    ///
    /// Panics if the chip has no such port or `bit` is not below 8. Used
    /// in a const item that panic is a compile error, which is how pins on
    /// absent ports are kept out of the firmware image.
    pub const fn new(port: PortId, bit: u8) -> Self {
        assert!(bit < PINS_PER_PORT, "pin bit out of range");
        match RegisterTable::<C>::index_of(port) {
            Some(index) => Self {
                ordinal: index as u8 * PINS_PER_PORT + bit,
                _chip: PhantomData,
            },
            None => panic!("port not present on this chip"),
        }
    }

    /// Pin with the given ordinal, `None` past the end
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        if ordinal < Self::COUNT {
            Some(Self {
                ordinal,
                _chip: PhantomData,
            })
        } else {
            None
        }
    }

    pub const fn ordinal(self) -> u8 {
        self.ordinal
    }

    pub const fn location(self) -> PinLocation {
        locate(self.ordinal)
    }

    /// Port letter this pin belongs to
    pub const fn port_id(self) -> PortId {
        RegisterTable::<C>::id_of(self.location().port)
    }

    /// Registers of this pin's port
    pub const fn registers(self) -> PortRegisters {
        RegisterTable::<C>::port(self.location().port)
    }

    /// Every pin of the chip in ordinal order
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).filter_map(Self::from_ordinal)
    }
}

impl<C: Chip> Clone for Pin<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Chip> Copy for Pin<C> {}

impl<C: Chip> PartialEq for Pin<C> {
    fn eq(&self, other: &Self) -> bool {
        self.ordinal == other.ordinal
    }
}

impl<C: Chip> Eq for Pin<C> {}

impl<C: Chip> fmt::Debug for Pin<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}{}", self.port_id().letter(), self.location().bit)
    }
}

#[cfg(feature = "defmt")]
impl<C: Chip> defmt::Format for Pin<C> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "P{=char}{=u8}", self.port_id().letter(), self.location().bit)
    }
}

/// Register bit of one line, the unit every operation acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line {
    regs: PortRegisters,
    mask: u8,
}

impl Line {
    #[inline(always)]
    const fn of<C: Chip>(ordinal: u8) -> Self {
        let loc = locate(ordinal);
        Self {
            regs: RegisterTable::<C>::port(loc.port),
            mask: loc.mask,
        }
    }

    #[inline(always)]
    fn get<B: RegisterBus>(self, bus: &B) -> bool {
        bus.test_bits(self.regs.input, self.mask)
    }

    #[inline(always)]
    fn high<B: RegisterBus>(self, bus: &B) {
        bus.set_bits(self.regs.output, self.mask)
    }

    #[inline(always)]
    fn low<B: RegisterBus>(self, bus: &B) {
        bus.clear_bits(self.regs.output, self.mask)
    }

    #[inline(always)]
    fn set<B: RegisterBus>(self, bus: &B, high: bool) {
        if high {
            self.high(bus)
        } else {
            self.low(bus)
        }
    }

    #[inline(always)]
    fn is_set_high<B: RegisterBus>(self, bus: &B) -> bool {
        bus.test_bits(self.regs.output, self.mask)
    }

    #[inline(always)]
    fn toggle<B: RegisterBus>(self, bus: &B) {
        if self.is_set_high(bus) {
            self.low(bus)
        } else {
            self.high(bus)
        }
    }

    #[inline(always)]
    fn input<B: RegisterBus>(self, bus: &B) {
        bus.clear_bits(self.regs.direction, self.mask)
    }

    #[inline(always)]
    fn output<B: RegisterBus>(self, bus: &B) {
        bus.set_bits(self.regs.direction, self.mask)
    }

    #[inline(always)]
    fn direction<B: RegisterBus>(self, bus: &B) -> PinDirection {
        if bus.test_bits(self.regs.direction, self.mask) {
            PinDirection::Output
        } else {
            PinDirection::Input
        }
    }
}

/// GPIO controller for chip `C` on register bus `B`
pub struct Gpio<C: Chip, B: RegisterBus> {
    bus: B,
    _chip: PhantomData<fn() -> C>,
}

impl<C: Chip, B: RegisterBus> Gpio<C, B> {
    pub const fn new(bus: B) -> Self {
        Self {
            bus,
            _chip: PhantomData,
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Sample the input register; true iff the pin reads high
    pub fn get(&self, pin: Pin<C>) -> bool {
        Line::of::<C>(pin.ordinal).get(&self.bus)
    }

    /// Drive the output register bit high
    pub fn high(&self, pin: Pin<C>) {
        Line::of::<C>(pin.ordinal).high(&self.bus)
    }

    /// Drive the output register bit low
    pub fn low(&self, pin: Pin<C>) {
        Line::of::<C>(pin.ordinal).low(&self.bus)
    }

    /// Clear the direction bit
    pub fn input(&self, pin: Pin<C>) {
        Line::of::<C>(pin.ordinal).input(&self.bus)
    }

    /// Set the direction bit
    pub fn output(&self, pin: Pin<C>) {
        Line::of::<C>(pin.ordinal).output(&self.bus)
    }

    /// High if `high`, low otherwise
    pub fn set(&self, pin: Pin<C>, high: bool) {
        Line::of::<C>(pin.ordinal).set(&self.bus, high)
    }

    /// Invert the current output register bit
    pub fn toggle(&self, pin: Pin<C>) {
        Line::of::<C>(pin.ordinal).toggle(&self.bus)
    }

    /// Current output register bit
    pub fn is_set_high(&self, pin: Pin<C>) -> bool {
        Line::of::<C>(pin.ordinal).is_set_high(&self.bus)
    }

    pub fn direction(&self, pin: Pin<C>) -> PinDirection {
        Line::of::<C>(pin.ordinal).direction(&self.bus)
    }

    /// Handle for a run-time selected pin
    pub fn pin(&self, pin: Pin<C>) -> GpioPin<'_, C, B> {
        GpioPin {
            bus: &self.bus,
            line: Line::of::<C>(pin.ordinal),
            pin,
        }
    }

    /// Handle for a pin fixed at compile time
    ///
    /// An ordinal the chip does not have fails to compile.
    pub fn fixed<const N: u8>(&self) -> FixedPin<'_, C, B, N> {
        let () = FixedPin::<C, B, N>::CHECK;
        FixedPin {
            bus: &self.bus,
            _chip: PhantomData,
        }
    }
}

/// Run-time selected pin bound to a bus
pub struct GpioPin<'a, C: Chip, B: RegisterBus> {
    bus: &'a B,
    line: Line,
    pin: Pin<C>,
}

impl<C: Chip, B: RegisterBus> GpioPin<'_, C, B> {
    pub fn id(&self) -> Pin<C> {
        self.pin
    }

    pub fn get(&self) -> bool {
        self.line.get(self.bus)
    }

    pub fn high(&self) {
        self.line.high(self.bus)
    }

    pub fn low(&self) {
        self.line.low(self.bus)
    }

    pub fn set(&self, high: bool) {
        self.line.set(self.bus, high)
    }

    pub fn toggle(&self) {
        self.line.toggle(self.bus)
    }

    pub fn input(&self) {
        self.line.input(self.bus)
    }

    pub fn output(&self) {
        self.line.output(self.bus)
    }

    fn driven_high(&self) -> bool {
        self.line.is_set_high(self.bus)
    }

    fn dir(&self) -> PinDirection {
        self.line.direction(self.bus)
    }
}

/// Compile-time selected pin bound to a bus
///
/// Register address and mask are associated constants, so with a
/// zero-sized memory-mapped bus every operation compiles to a single
/// bit operation on a fixed register.
pub struct FixedPin<'a, C: Chip, B: RegisterBus, const N: u8> {
    bus: &'a B,
    _chip: PhantomData<fn() -> C>,
}

impl<C: Chip, B: RegisterBus, const N: u8> FixedPin<'_, C, B, N> {
    const CHECK: () = assert!(N < Pin::<C>::COUNT, "pin ordinal not present on this chip");
    const LINE: Line = Line::of::<C>(N);

    pub const PIN: Pin<C> = Pin {
        ordinal: N,
        _chip: PhantomData,
    };

    pub fn id(&self) -> Pin<C> {
        Self::PIN
    }

    pub fn get(&self) -> bool {
        Self::LINE.get(self.bus)
    }

    pub fn high(&self) {
        Self::LINE.high(self.bus)
    }

    pub fn low(&self) {
        Self::LINE.low(self.bus)
    }

    pub fn set(&self, high: bool) {
        Self::LINE.set(self.bus, high)
    }

    pub fn toggle(&self) {
        Self::LINE.toggle(self.bus)
    }

    pub fn input(&self) {
        Self::LINE.input(self.bus)
    }

    pub fn output(&self) {
        Self::LINE.output(self.bus)
    }

    fn driven_high(&self) -> bool {
        Self::LINE.is_set_high(self.bus)
    }

    fn dir(&self) -> PinDirection {
        Self::LINE.direction(self.bus)
    }
}

// Both handle types expose the same inherent operations; wire them to the
// HAL traits and to embedded-hal in one place.
macro_rules! impl_pin_traits {
    ($ty:ty, [$($generics:tt)*]) => {
        impl<$($generics)*> OutputPin for $ty {
            fn set_high(&mut self) {
                self.high()
            }

            fn set_low(&mut self) {
                self.low()
            }

            fn toggle(&mut self) {
                <$ty>::toggle(self)
            }

            fn is_set_high(&self) -> bool {
                self.driven_high()
            }
        }

        impl<$($generics)*> InputPin for $ty {
            fn is_high(&self) -> bool {
                self.get()
            }
        }

        impl<$($generics)*> DirectionalPin for $ty {
            fn make_input(&mut self) {
                self.input()
            }

            fn make_output(&mut self) {
                self.output()
            }

            fn direction(&self) -> PinDirection {
                self.dir()
            }
        }

        impl<$($generics)*> eh::ErrorType for $ty {
            type Error = Infallible;
        }

        impl<$($generics)*> eh::OutputPin for $ty {
            fn set_low(&mut self) -> Result<(), Infallible> {
                self.low();
                Ok(())
            }

            fn set_high(&mut self) -> Result<(), Infallible> {
                self.high();
                Ok(())
            }
        }

        impl<$($generics)*> eh::StatefulOutputPin for $ty {
            fn is_set_high(&mut self) -> Result<bool, Infallible> {
                Ok(self.driven_high())
            }

            fn is_set_low(&mut self) -> Result<bool, Infallible> {
                Ok(!self.driven_high())
            }

            fn toggle(&mut self) -> Result<(), Infallible> {
                <$ty>::toggle(self);
                Ok(())
            }
        }

        impl<$($generics)*> eh::InputPin for $ty {
            fn is_high(&mut self) -> Result<bool, Infallible> {
                Ok(self.get())
            }

            fn is_low(&mut self) -> Result<bool, Infallible> {
                Ok(!self.get())
            }
        }
    };
}

impl_pin_traits!(GpioPin<'_, C, B>, [C: Chip, B: RegisterBus]);
impl_pin_traits!(FixedPin<'_, C, B, N>, [C: Chip, B: RegisterBus, const N: u8]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::SimBus;
    use crate::testing::{TestChip, WideChip};

    type P = Pin<TestChip>;

    #[test]
    fn test_locate() {
        assert_eq!(
            locate(0),
            PinLocation {
                port: 0,
                bit: 0,
                mask: 0x01
            }
        );
        assert_eq!(
            locate(13),
            PinLocation {
                port: 1,
                bit: 5,
                mask: 0x20
            }
        );
        assert_eq!(
            locate(23),
            PinLocation {
                port: 2,
                bit: 7,
                mask: 0x80
            }
        );
    }

    #[test]
    fn test_pin_ordinals_are_contiguous_across_present_ports() {
        assert_eq!(P::new(PortId::B, 0).ordinal(), 0);
        assert_eq!(P::new(PortId::C, 0).ordinal(), 8);
        assert_eq!(P::new(PortId::D, 7).ordinal(), 23);
        assert_eq!(P::COUNT, 24);

        // A and B exist, H follows B directly
        assert_eq!(Pin::<WideChip>::new(PortId::H, 1).ordinal(), 17);
        assert_eq!(Pin::<WideChip>::COUNT, 32);
    }

    #[test]
    fn test_from_ordinal_bounds() {
        assert!(P::from_ordinal(23).is_some());
        assert!(P::from_ordinal(P::COUNT).is_none());
        assert!(P::from_ordinal(u8::MAX).is_none());
        assert_eq!(P::all().count(), 24);
    }

    #[test]
    #[should_panic(expected = "port not present")]
    fn test_absent_port_rejected() {
        let _ = P::new(PortId::A, 0);
    }

    #[test]
    #[should_panic(expected = "bit out of range")]
    fn test_bit_out_of_range_rejected() {
        let _ = P::new(PortId::B, 8);
    }

    #[test]
    fn test_pin_debug_names_port_and_bit() {
        extern crate std;
        use std::format;

        assert_eq!(format!("{:?}", P::new(PortId::C, 3)), "PC3");
        assert_eq!(format!("{:?}", Pin::<WideChip>::new(PortId::L, 7)), "PL7");
    }

    #[test]
    fn test_high_low_touch_only_output_bit() {
        let bus = SimBus::new();
        let gpio = Gpio::<TestChip, _>::new(&bus);
        let pin = P::new(PortId::B, 5);

        gpio.high(pin);
        assert_eq!(bus.read(0x25), 0x20);
        assert_eq!(bus.read(0x24), 0);

        bus.write(0x25, 0xFF);
        gpio.low(pin);
        assert_eq!(bus.read(0x25), 0xDF);
    }

    #[test]
    fn test_get_reads_input_register() {
        let bus = SimBus::new();
        let gpio = Gpio::<TestChip, _>::new(&bus);
        let pin = P::new(PortId::D, 2);

        assert!(!gpio.get(pin));
        bus.write(0x29, 0x04);
        assert!(gpio.get(pin));

        // Output register does not affect the sampled level
        bus.write(0x29, 0x00);
        gpio.high(pin);
        assert!(!gpio.get(pin));
    }

    #[test]
    fn test_direction_bits() {
        let bus = SimBus::new();
        let gpio = Gpio::<TestChip, _>::new(&bus);
        let pin = P::new(PortId::C, 1);

        gpio.output(pin);
        assert_eq!(bus.read(0x27), 0x02);
        assert_eq!(gpio.direction(pin), PinDirection::Output);

        gpio.input(pin);
        assert_eq!(bus.read(0x27), 0x00);
        assert_eq!(gpio.direction(pin), PinDirection::Input);
    }

    #[test]
    fn test_set_dispatch_and_toggle() {
        let bus = SimBus::new();
        let gpio = Gpio::<TestChip, _>::new(&bus);
        let pin = P::new(PortId::B, 0);

        gpio.set(pin, true);
        assert!(gpio.is_set_high(pin));
        gpio.set(pin, false);
        assert!(!gpio.is_set_high(pin));

        gpio.toggle(pin);
        assert!(gpio.is_set_high(pin));
        gpio.toggle(pin);
        assert!(!gpio.is_set_high(pin));
    }

    #[test]
    fn test_extended_io_port() {
        let bus = SimBus::new();
        let gpio = Gpio::<WideChip, _>::new(&bus);
        let pin = Pin::<WideChip>::new(PortId::L, 3);

        gpio.output(pin);
        gpio.high(pin);
        assert_eq!(bus.read(0x10A), 0x08);
        assert_eq!(bus.read(0x10B), 0x08);
    }

    #[test]
    fn test_fixed_and_runtime_pins_agree() {
        let fixed_bus = SimBus::new();
        let runtime_bus = SimBus::new();
        let fixed_gpio = Gpio::<TestChip, _>::new(&fixed_bus);
        let runtime_gpio = Gpio::<TestChip, _>::new(&runtime_bus);

        let fixed = fixed_gpio.fixed::<13>();
        let runtime = runtime_gpio.pin(P::new(PortId::C, 5));
        assert_eq!(fixed.id(), runtime.id());

        fixed.output();
        runtime.output();
        fixed.high();
        runtime.high();
        fixed.toggle();
        runtime.toggle();
        fixed.set(true);
        runtime.set(true);

        for addr in 0x23..=0x2B {
            assert_eq!(fixed_bus.read(addr), runtime_bus.read(addr));
        }
    }

    #[test]
    fn test_hal_traits() {
        let bus = SimBus::new();
        let gpio = Gpio::<TestChip, _>::new(&bus);
        let mut pin = gpio.fixed::<2>();

        DirectionalPin::set_direction(&mut pin, PinDirection::Output);
        OutputPin::set_state(&mut pin, true);
        assert_eq!(bus.read(0x24), 0x04);
        assert!(OutputPin::is_set_high(&pin));

        bus.write(0x23, 0x04);
        assert!(InputPin::is_high(&pin));
    }

    #[test]
    fn test_handles_are_io_pins() {
        use octet_hal::gpio::IoPin;

        fn release<P: IoPin>(pin: &mut P) {
            pin.set_low();
            pin.make_input();
        }

        let bus = SimBus::new();
        let gpio = Gpio::<TestChip, _>::new(&bus);
        bus.write(0x25, 0xFF);
        bus.write(0x24, 0xFF);

        release(&mut gpio.pin(P::new(PortId::B, 1)));
        release(&mut gpio.fixed::<7>());
        assert_eq!(bus.read(0x25), 0x7D);
        assert_eq!(bus.read(0x24), 0x7D);
    }

    #[test]
    fn test_embedded_hal_traits() {
        let bus = SimBus::new();
        let gpio = Gpio::<TestChip, _>::new(&bus);
        let mut pin = gpio.pin(P::new(PortId::D, 7));

        eh::OutputPin::set_high(&mut pin).unwrap();
        assert!(eh::StatefulOutputPin::is_set_high(&mut pin).unwrap());
        eh::StatefulOutputPin::toggle(&mut pin).unwrap();
        assert!(eh::StatefulOutputPin::is_set_low(&mut pin).unwrap());

        bus.write(0x29, 0x80);
        assert!(eh::InputPin::is_high(&mut pin).unwrap());
    }
}
