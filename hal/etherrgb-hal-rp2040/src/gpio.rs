//! GPIO wrappers
//!
//! Adapts embassy-rp pins to the EtheRGB `InputPin`/`OutputPin` traits.

use embassy_rp::gpio::{Input, Output};
use etherrgb_hal::{InputPin, Level, OutputPin};

/// Push-button or switch input
pub struct RpInput<'d>(Input<'d>);

impl<'d> RpInput<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self(pin)
    }
}

impl InputPin for RpInput<'_> {
    fn read(&mut self) -> Level {
        Level::from(self.0.is_high())
    }
}

/// Push-pull output driving one dimmer channel
pub struct RpOutput<'d>(Output<'d>);

impl<'d> RpOutput<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self(pin)
    }
}

impl OutputPin for RpOutput<'_> {
    fn write(&mut self, level: Level) {
        match level {
            Level::High => self.0.set_high(),
            Level::Low => self.0.set_low(),
        }
    }
}
