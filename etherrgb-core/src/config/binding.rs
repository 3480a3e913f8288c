//! Digital-input binding configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use etherrgb_protocol::command::INVALID_COMMAND;
use etherrgb_protocol::{has_command, required_length, Command, FrameError, Source, MAX_DATA_LEN};

/// Condition under which an input pin fires its command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Trigger {
    /// Never fires
    #[default]
    None,
    /// Low to high transition
    Rising,
    /// High to low transition
    Falling,
    /// Any transition
    Change,
    /// Every sample while high
    High,
    /// Every sample while low
    Low,
}

impl Trigger {
    /// Evaluate the trigger for a previous and current sample
    pub fn fires(self, previous: bool, current: bool) -> bool {
        match self {
            Trigger::None => false,
            Trigger::Rising => !previous && current,
            Trigger::Falling => previous && !current,
            Trigger::Change => previous != current,
            Trigger::High => current,
            Trigger::Low => !current,
        }
    }
}

/// Trigger mode plus the fixed command an input pin sends
///
/// The payload is stored as a fixed array so bindings can be built in
/// `const` context by generated configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BindingConfig {
    pub trigger: Trigger,
    /// Command code sent when the trigger fires
    pub code: u8,
    /// Payload bytes, only the first `data_len` are used
    pub data: [u8; MAX_DATA_LEN],
    pub data_len: u8,
}

impl BindingConfig {
    /// An unused slot
    pub const fn unused() -> Self {
        Self {
            trigger: Trigger::None,
            code: INVALID_COMMAND,
            data: [0; MAX_DATA_LEN],
            data_len: 0,
        }
    }

    /// True if this slot has no command assigned
    pub fn is_unused(&self) -> bool {
        self.trigger == Trigger::None || self.code == INVALID_COMMAND
    }

    /// Payload slice
    pub fn payload(&self) -> &[u8] {
        let len = (self.data_len as usize).min(MAX_DATA_LEN);
        &self.data[..len]
    }

    /// Build the command this binding sends
    ///
    /// Fails unless `code` is known and `data_len` matches its required
    /// payload length.
    pub fn to_command(&self) -> Result<Command, FrameError> {
        if !has_command(self.code) {
            return Err(FrameError::UnknownCommand);
        }
        if self.data_len != required_length(self.code) {
            return Err(FrameError::LengthMismatch);
        }
        Command::new(self.code, self.payload(), Source::DigitalInput)
    }
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self::unused()
    }
}
