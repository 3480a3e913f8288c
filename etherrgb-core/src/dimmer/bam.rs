//! Bit-angle-modulation output generator
//!
//! Runs from the compare-match interrupt. Each firing displays one bit
//! plane of every channel and programs the timer for that plane's
//! weight, so eight interrupts give 8-bit brightness. With a buffered
//! timer the weight written is the next plane's, since it only governs
//! the period after the one just started.

use etherrgb_hal::{CompareTimer, Level, OutputPin};

use super::ChannelLevels;

/// Compare thresholds per bit plane (`2^(i+1) - 1`)
pub const BAM_THRESHOLDS: [u8; 8] = [0x01, 0x03, 0x07, 0x0F, 0x1F, 0x3F, 0x7F, 0xFF];

/// Bit-plane sequencer
#[derive(Debug, Clone, Default)]
pub struct BamGenerator {
    plane: u8,
}

impl BamGenerator {
    pub const fn new() -> Self {
        Self { plane: 0 }
    }

    /// Bit plane the next firing will display
    pub fn plane(&self) -> u8 {
        self.plane
    }

    /// Load the first plane's weight into a buffered timer
    ///
    /// Call once before the first match event; a no-op for timers that
    /// apply compare values immediately.
    pub fn prime<T: CompareTimer>(&self, timer: &mut T) {
        if T::BUFFERED {
            timer.set_compare(BAM_THRESHOLDS[self.plane as usize]);
        }
    }

    /// Handle one compare-match event
    ///
    /// Drives output `i` to bit `plane` of channel `i`. Outputs beyond
    /// the channel count are left untouched.
    pub fn fire<P, T, const N: usize>(
        &mut self,
        levels: &ChannelLevels<N>,
        outputs: &mut [P],
        timer: &mut T,
    ) where
        P: OutputPin,
        T: CompareTimer,
    {
        let snapshot = levels.snapshot();
        let plane = self.plane;

        for (pin, value) in outputs.iter_mut().zip(snapshot.iter()) {
            pin.write(Level::from((value >> plane) & 1 == 1));
        }

        let next = (plane + 1) % 8;
        let weight = if T::BUFFERED { next } else { plane };
        timer.set_compare(BAM_THRESHOLDS[weight as usize]);
        self.plane = next;
    }
}
