//! GPIO pin abstractions
//!
//! Digital inputs feed the push-button sourcer; digital outputs are
//! driven by the bit-angle-modulation interrupt.

/// Logic level of a digital pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    /// Returns true for [`Level::High`]
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    /// Level as a single bit (0 or 1)
    pub fn as_bit(self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Digital input pin
///
/// Takes `&mut self` because some port expanders need a bus transaction
/// to sample a pin.
pub trait InputPin {
    /// Sample the current pin level
    fn read(&mut self) -> Level;
}

/// Digital output pin
pub trait OutputPin {
    /// Drive the pin to the given level
    fn write(&mut self, level: Level);

    /// Drive the pin high (logic 1)
    fn set_high(&mut self) {
        self.write(Level::High);
    }

    /// Drive the pin low (logic 0)
    fn set_low(&mut self) {
        self.write(Level::Low);
    }
}

impl<T: InputPin + ?Sized> InputPin for &mut T {
    fn read(&mut self) -> Level {
        (**self).read()
    }
}

impl<T: OutputPin + ?Sized> OutputPin for &mut T {
    fn write(&mut self, level: Level) {
        (**self).write(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_bool() {
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(Level::from(false), Level::Low);
        assert_eq!(Level::High.as_bit(), 1);
        assert_eq!(Level::Low.as_bit(), 0);
    }
}
