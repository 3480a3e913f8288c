//! Fade ramp state per channel

/// Fade parameters of one channel
///
/// Only the main loop touches this; the displayed level lives in
/// [`ChannelLevels`](super::ChannelLevels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FadeState {
    /// Level the channel ramps toward
    pub target: u8,
    /// Accumulator increment per poll, 0 disables fading
    pub speed: u8,
    /// Saturating accumulator, a step is taken when it reaches 255
    pub accumulator: u8,
}

impl FadeState {
    pub const fn new() -> Self {
        Self {
            target: 0,
            speed: 0,
            accumulator: 0,
        }
    }

    /// Advance the accumulator by one poll
    ///
    /// Returns true when the channel should step one unit toward the
    /// target; the accumulator is reset in that case.
    pub fn advance(&mut self) -> bool {
        self.accumulator = self.accumulator.saturating_add(self.speed);
        if self.accumulator == u8::MAX {
            self.accumulator = 0;
            true
        } else {
            false
        }
    }
}
