//! Compare-match timer abstraction
//!
//! Bit-angle modulation reprograms the compare value on every match
//! event, so the next interrupt fires after a period proportional to the
//! weight of the bit plane being displayed.

/// Timer with a reprogrammable 8-bit compare value
pub trait CompareTimer {
    /// True if a new compare value only takes effect one match event
    /// late
    ///
    /// Timers with a double-buffered period register (RP2040 PWM `TOP`)
    /// latch the value at the next wrap, so the period after the current
    /// one is what `set_compare` controls. Callers must then program the
    /// weight one plane ahead.
    const BUFFERED: bool = false;

    /// Set the compare value for the next match event
    ///
    /// Called from interrupt context; must not block.
    fn set_compare(&mut self, value: u8);
}

impl<T: CompareTimer + ?Sized> CompareTimer for &mut T {
    const BUFFERED: bool = T::BUFFERED;

    fn set_compare(&mut self, value: u8) {
        (**self).set_compare(value)
    }
}
