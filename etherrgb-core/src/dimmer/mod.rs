//! RGB dimmer
//!
//! Two halves share the per-channel output level:
//!
//! - [`Dimmer`] runs in the main loop: immediate sets, fade targets and
//!   the fade ramp.
//! - [`BamGenerator`] runs in the compare-match interrupt and turns the
//!   levels into bit-angle-modulated pin states.
//!
//! [`ChannelLevels`] is the shared state between them.

mod bam;
mod channels;
mod fade;

pub use bam::{BamGenerator, BAM_THRESHOLDS};
pub use channels::ChannelLevels;
pub use fade::FadeState;

/// Dimmer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DimmerError {
    /// Channel index at or beyond the channel count
    ChannelOutOfRange,
}

/// Snapshot of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelState {
    pub current: u8,
    pub target: u8,
    pub fade_speed: u8,
    pub fade_accumulator: u8,
}

/// Main-loop side of the dimmer
pub struct Dimmer<'a, const N: usize> {
    levels: &'a ChannelLevels<N>,
    fades: [FadeState; N],
}

impl<'a, const N: usize> Dimmer<'a, N> {
    /// Create a dimmer over shared levels; all channels start off
    pub fn new(levels: &'a ChannelLevels<N>) -> Self {
        levels.clear();
        Self {
            levels,
            fades: [FadeState::new(); N],
        }
    }

    /// Number of channels
    pub const fn channel_count(&self) -> usize {
        N
    }

    /// Shared levels read by the BAM interrupt
    pub fn levels(&self) -> &'a ChannelLevels<N> {
        self.levels
    }

    /// State of one channel
    pub fn channel(&self, channel: usize) -> Option<ChannelState> {
        let fade = self.fades.get(channel)?;
        Some(ChannelState {
            current: self.levels.get(channel)?,
            target: fade.target,
            fade_speed: fade.speed,
            fade_accumulator: fade.accumulator,
        })
    }

    /// Set a channel immediately, cancelling any fade in progress
    pub fn set_channel_value(&mut self, channel: usize, value: u8) -> Result<(), DimmerError> {
        let fade = self
            .fades
            .get_mut(channel)
            .ok_or(DimmerError::ChannelOutOfRange)?;
        self.levels.set(channel, value)?;
        fade.target = value;
        Ok(())
    }

    /// Set the level a channel fades toward
    pub fn set_fade_target(&mut self, channel: usize, target: u8) -> Result<(), DimmerError> {
        let fade = self
            .fades
            .get_mut(channel)
            .ok_or(DimmerError::ChannelOutOfRange)?;
        fade.target = target;
        Ok(())
    }

    /// Set the fade rate of a channel, 0 stops fading
    pub fn set_fade_speed(&mut self, channel: usize, speed: u8) -> Result<(), DimmerError> {
        let fade = self
            .fades
            .get_mut(channel)
            .ok_or(DimmerError::ChannelOutOfRange)?;
        fade.speed = speed;
        Ok(())
    }

    /// Turn all channels off and stop all fades
    pub fn reset(&mut self) {
        self.levels.clear();
        self.fades = [FadeState::new(); N];
    }

    /// Run one fade step on every channel
    pub fn poll(&mut self) {
        for (channel, fade) in self.fades.iter_mut().enumerate() {
            let Some(current) = self.levels.get(channel) else {
                continue;
            };
            if current == fade.target {
                continue;
            }
            if fade.advance() {
                // Index is in range by construction
                let _ = self.levels.step_toward(channel, fade.target);
            }
        }
    }
}
