//! GPIO for the selected chip

use octet_core::gpio::Gpio;

use crate::{Mmio, Target};

/// Logical pin of the selected chip
pub type Pin = octet_core::gpio::Pin<Target>;

/// Run-time pin handle on the hardware bus
pub type GpioPin = octet_core::gpio::GpioPin<'static, Target, Mmio>;

/// Compile-time pin handle on the hardware bus
pub type FixedPin<const N: u8> = octet_core::gpio::FixedPin<'static, Target, Mmio, N>;

/// Port registers of the selected chip
// SAFETY: Target is the chip this firmware is built for
pub static GPIO: Gpio<Target, Mmio> = Gpio::new(unsafe { Mmio::new() });

/// Shorthand for [`GPIO`]
pub fn gpio() -> &'static Gpio<Target, Mmio> {
    &GPIO
}

/// Name a pin by port letter and bit, checked at compile time
///
/// ```ignore
/// const LED: Pin = pin!(B, 5);
/// ```
#[macro_export]
macro_rules! pin {
    ($port:ident, $bit:expr) => {{
        const PIN: $crate::Pin = $crate::Pin::new($crate::PortId::$port, $bit);
        PIN
    }};
}

/// Compile-time pin handle by port letter and bit
///
/// Register addresses and the bit mask are folded into constants, so
/// every operation compiles to a single read-modify-write.
///
/// ```ignore
/// let led = fixed_pin!(B, 5);
/// led.output();
/// led.toggle();
/// ```
#[macro_export]
macro_rules! fixed_pin {
    ($port:ident, $bit:expr) => {
        $crate::GPIO.fixed::<{ $crate::Pin::new($crate::PortId::$port, $bit).ordinal() }>()
    };
}

#[cfg(all(test, feature = "atmega328p"))]
mod tests {
    use super::*;
    use crate::PortId;

    #[test]
    fn test_pin_macro() {
        const LED: Pin = crate::pin!(B, 5);
        assert_eq!(LED.ordinal(), 5);
        assert_eq!(LED.port_id(), PortId::B);
        assert_eq!(crate::pin!(D, 2).ordinal(), 18);
    }

    #[test]
    fn test_fixed_pin_macro_names_same_pin() {
        // Building the handle touches no register
        let led: FixedPin<5> = crate::fixed_pin!(B, 5);
        assert_eq!(led.id(), crate::pin!(B, 5));
        assert_eq!(led.id().registers().output, 0x25);
    }

    #[test]
    fn test_gpio_accessor_is_the_static() {
        assert!(core::ptr::eq(gpio(), &GPIO));
    }
}
