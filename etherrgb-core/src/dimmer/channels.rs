//! Channel output levels shared with the BAM interrupt

use core::cell::Cell;

use critical_section::Mutex;

use super::DimmerError;

/// Displayed level of every channel
///
/// Lives in a `static` so both the main loop and the compare-match
/// interrupt can reach it. All access goes through a critical section;
/// a level is never observed half written.
pub struct ChannelLevels<const N: usize> {
    levels: Mutex<Cell<[u8; N]>>,
}

impl<const N: usize> Default for ChannelLevels<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ChannelLevels<N> {
    pub const fn new() -> Self {
        Self {
            levels: Mutex::new(Cell::new([0; N])),
        }
    }

    /// Number of channels
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Current level of one channel
    pub fn get(&self, channel: usize) -> Option<u8> {
        if channel >= N {
            return None;
        }
        Some(critical_section::with(|cs| {
            self.levels.borrow(cs).get()[channel]
        }))
    }

    /// Consistent copy of all levels
    pub fn snapshot(&self) -> [u8; N] {
        critical_section::with(|cs| self.levels.borrow(cs).get())
    }

    /// Overwrite one channel
    pub fn set(&self, channel: usize, value: u8) -> Result<(), DimmerError> {
        if channel >= N {
            return Err(DimmerError::ChannelOutOfRange);
        }
        critical_section::with(|cs| {
            let cell = self.levels.borrow(cs);
            let mut levels = cell.get();
            levels[channel] = value;
            cell.set(levels);
        });
        Ok(())
    }

    /// Move one channel a single unit toward `target`
    ///
    /// Returns the new level.
    pub fn step_toward(&self, channel: usize, target: u8) -> Result<u8, DimmerError> {
        if channel >= N {
            return Err(DimmerError::ChannelOutOfRange);
        }
        Ok(critical_section::with(|cs| {
            let cell = self.levels.borrow(cs);
            let mut levels = cell.get();
            let current = levels[channel];
            levels[channel] = match current.cmp(&target) {
                core::cmp::Ordering::Less => current + 1,
                core::cmp::Ordering::Greater => current - 1,
                core::cmp::Ordering::Equal => current,
            };
            cell.set(levels);
            levels[channel]
        }))
    }

    /// Turn every channel off
    pub fn clear(&self) {
        critical_section::with(|cs| self.levels.borrow(cs).set([0; N]));
    }
}
