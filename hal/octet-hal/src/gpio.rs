//! GPIO pin abstractions
//!
//! Traits for digital input and output pins. The engine implements them
//! for both run-time selected pins and pins fixed at compile time.

/// Digital output pin
///
/// Drives the output (PORT) register bit of the pin.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Toggle the pin state
    fn toggle(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
///
/// Samples the input (PIN) register bit of the pin.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Data direction of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinDirection {
    Input,
    Output,
}

/// Pin whose data direction can be switched at run time
pub trait DirectionalPin {
    /// Clear the direction bit (input)
    fn make_input(&mut self);

    /// Set the direction bit (output)
    fn make_output(&mut self);

    /// Current data direction
    fn direction(&self) -> PinDirection;

    /// Apply a direction
    fn set_direction(&mut self, direction: PinDirection) {
        match direction {
            PinDirection::Input => self.make_input(),
            PinDirection::Output => self.make_output(),
        }
    }
}

/// Pin that can be used for both input and output
pub trait IoPin: OutputPin + InputPin + DirectionalPin {}

// Blanket implementation for types that implement all three traits
impl<T: OutputPin + InputPin + DirectionalPin> IoPin for T {}
