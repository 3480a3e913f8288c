//! PWM slice used as the BAM compare timer
//!
//! The slice runs free with no pins attached. Its wrap interrupt is the
//! compare-match event: every wrap the firmware fires the next bit plane
//! and reprograms `top`, so a plane stays on screen for a time
//! proportional to its weight.
//!
//! `top` is double-buffered and latches at the next wrap. The value
//! written in a wrap handler sets the length of the period after the one
//! already running, hence [`CompareTimer::BUFFERED`].

use embassy_rp::pac;
use embassy_rp::pwm::{Config, Pwm};
use etherrgb_hal::CompareTimer;
use fixed::traits::ToFixed;

pub struct BamTimer<'d> {
    pwm: Pwm<'d>,
    config: Config,
    slice: usize,
    ticks_per_count: u16,
}

impl<'d> BamTimer<'d> {
    /// Wrap a free-running slice
    ///
    /// Each compare count lasts `ticks_per_count` cycles of the divided
    /// clock (`divider` in 1..=255).
    pub fn new(pwm: Pwm<'d>, slice: usize, divider: u8, ticks_per_count: u16) -> Self {
        let mut config = Config::default();
        config.divider = divider.max(1).to_fixed();
        config.top = ticks_per_count.max(1) - 1;
        config.enable = true;

        let mut timer = Self {
            pwm,
            config,
            slice,
            ticks_per_count: ticks_per_count.max(1),
        };
        timer.pwm.set_config(&timer.config);
        timer
    }

    /// Unmask this slice's wrap interrupt in the PWM block
    pub fn enable_interrupt(&mut self) {
        pac::PWM.inte().modify(|w| w.0 |= 1 << self.slice);
    }

    /// Acknowledge a pending wrap interrupt
    pub fn clear_interrupt(&mut self) {
        self.pwm.clear_wrapped();
    }
}

impl CompareTimer for BamTimer<'_> {
    const BUFFERED: bool = true;

    fn set_compare(&mut self, value: u8) {
        let counts = value as u16 + 1;
        self.config.top = counts.saturating_mul(self.ticks_per_count).saturating_sub(1);
        self.pwm.set_config(&self.config);
    }
}
