//! Framers turning raw transport bytes into validated commands
//!
//! - [`SerialFramer`]: byte-at-a-time state machine for a stream link.
//!   A bad byte drops the partial packet and the framer resynchronizes
//!   on the next start byte.
//! - [`parse_datagram`]: whole-buffer validation for a transport where
//!   one read is one packet. A bad packet cannot be resynchronized, so
//!   the caller is expected to drop the session.

use heapless::Vec;

use crate::command::{has_command, required_length, Command, Source, INVALID_COMMAND};
use crate::frame::{checksum, FrameError, MAX_DATA_LEN, MIN_PACKET_LEN, START_BYTE};

/// Idle polls before a half-received serial packet is discarded
pub const DEFAULT_TIMEOUT_POLLS: u16 = u16::MAX;

/// Serial framer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramerState {
    /// Waiting for START byte
    Idle,
    /// Got START, waiting for CODE
    GotStart,
    /// Reading payload bytes
    ReadingData,
    /// Payload complete, waiting for CHECKSUM
    GotData,
}

/// Byte-at-a-time packet parser for the serial link
#[derive(Debug, Clone)]
pub struct SerialFramer {
    state: FramerState,
    code: u8,
    buffer: Vec<u8, MAX_DATA_LEN>,
    idle_polls: u16,
    timeout_polls: u16,
}

impl Default for SerialFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialFramer {
    /// Create a framer with the default idle timeout
    pub const fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT_POLLS)
    }

    /// Create a framer that gives up on a partial packet after
    /// `timeout_polls` consecutive polls without a byte
    pub const fn with_timeout(timeout_polls: u16) -> Self {
        Self {
            state: FramerState::Idle,
            code: INVALID_COMMAND,
            buffer: Vec::new(),
            idle_polls: 0,
            timeout_polls,
        }
    }

    /// Current state
    pub fn state(&self) -> FramerState {
        self.state
    }

    /// True when no packet is in progress
    pub fn is_idle(&self) -> bool {
        self.state == FramerState::Idle
    }

    /// Drop any partial packet and return to [`FramerState::Idle`]
    pub fn reset(&mut self) {
        self.state = FramerState::Idle;
        self.code = INVALID_COMMAND;
        self.buffer.clear();
        self.idle_polls = 0;
    }

    /// Advance the framer by one poll
    ///
    /// `byte` is the next byte from the link, or `None` if nothing was
    /// available this poll.
    pub fn poll(&mut self, byte: Option<u8>) -> Result<Option<Command>, FrameError> {
        match byte {
            Some(byte) => self.feed(byte),
            None => self.idle().map(|()| None),
        }
    }

    /// Count one poll without input
    ///
    /// Returns `Err(Timeout)` when the threshold is reached with a packet
    /// in progress; the framer has already been reset when that happens.
    pub fn idle(&mut self) -> Result<(), FrameError> {
        self.idle_polls = self.idle_polls.wrapping_add(1);
        if self.idle_polls == self.timeout_polls && !self.is_idle() {
            self.reset();
            return Err(FrameError::Timeout);
        }
        Ok(())
    }

    /// Feed a single byte to the framer
    ///
    /// Returns `Ok(Some(command))` when a complete valid packet is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on a protocol
    /// error (the framer is reset before returning).
    pub fn feed(&mut self, byte: u8) -> Result<Option<Command>, FrameError> {
        self.idle_polls = 0;

        match self.state {
            FramerState::Idle => {
                if byte != START_BYTE {
                    self.reset();
                    return Err(FrameError::InvalidStart);
                }
                self.state = FramerState::GotStart;
                Ok(None)
            }
            FramerState::GotStart => {
                if !has_command(byte) {
                    self.reset();
                    return Err(FrameError::UnknownCommand);
                }
                self.code = byte;
                self.buffer.clear();
                self.state = if required_length(byte) > 0 {
                    FramerState::ReadingData
                } else {
                    FramerState::GotData
                };
                Ok(None)
            }
            FramerState::ReadingData => {
                if self.buffer.push(byte).is_err() {
                    self.reset();
                    return Err(FrameError::PayloadTooLarge);
                }
                if self.buffer.len() == required_length(self.code) as usize {
                    self.state = FramerState::GotData;
                }
                Ok(None)
            }
            FramerState::GotData => {
                if byte != checksum(START_BYTE, self.code, &self.buffer) {
                    self.reset();
                    return Err(FrameError::InvalidChecksum);
                }

                let command = Command {
                    code: self.code,
                    data: self.buffer.clone(),
                    source: Source::Serial,
                };
                self.reset();
                Ok(Some(command))
            }
        }
    }

    /// Feed multiple bytes to the framer
    ///
    /// Returns the first complete packet found, if any.
    /// Remaining bytes after a complete packet are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Command>, FrameError> {
        for &byte in bytes {
            if let Some(command) = self.feed(byte)? {
                return Ok(Some(command));
            }
        }
        Ok(None)
    }
}

/// Validate one transport read as a complete packet
///
/// Checks, in order: minimum length, start byte, known code, payload not
/// longer than the code requires, checksum. A payload shorter than
/// required is accepted here; handlers reject it.
pub fn parse_datagram(bytes: &[u8]) -> Result<Command, FrameError> {
    if bytes.len() < MIN_PACKET_LEN {
        return Err(FrameError::TooShort);
    }
    if bytes[0] != START_BYTE {
        return Err(FrameError::InvalidStart);
    }

    let code = bytes[1];
    if !has_command(code) {
        return Err(FrameError::UnknownCommand);
    }

    let data_len = bytes.len() - MIN_PACKET_LEN;
    if data_len > required_length(code) as usize {
        return Err(FrameError::LengthMismatch);
    }

    let data = &bytes[2..2 + data_len];
    if bytes[2 + data_len] != checksum(START_BYTE, code, data) {
        return Err(FrameError::InvalidChecksum);
    }

    Command::new(code, data, Source::Network)
}
