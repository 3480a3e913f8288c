//! Command descriptor table and the inbound command type
//!
//! The table is the single source of truth for which codes exist and how
//! many payload bytes each one carries. Framers consult it while parsing;
//! the core's dispatcher maps the same codes to handlers.

use heapless::Vec;

use crate::frame::{checksum, FrameError, Packet, MAX_DATA_LEN, MAX_PACKET_LEN, START_BYTE};

/// Placeholder code of an empty command slot
pub const INVALID_COMMAND: u8 = 0x00;

/// Known command codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CommandCode {
    /// Liveness check, answers OK
    Test = b't',
    /// `[channel, value]` set a channel immediately
    SetChannel = 0x01,
    /// `[channel, target, speed]` fade a channel toward a target
    FadeChannel = 0x02,
    /// `[start, r, g, b]` set three consecutive channels
    SetGroup = 0x03,
    /// `[ip0, ip1, ip2, ip3]` persist a new static address
    SetStaticIp = 0xF0,
    /// Reboot the device, never answers
    Reboot = 0xFE,
}

/// Descriptor table: (code, required payload length)
const DESCRIPTORS: [(CommandCode, u8); 6] = [
    (CommandCode::Test, 0),
    (CommandCode::SetChannel, 2),
    (CommandCode::FadeChannel, 3),
    (CommandCode::SetGroup, 4),
    (CommandCode::SetStaticIp, 4),
    (CommandCode::Reboot, 0),
];

impl CommandCode {
    /// All codes in table order
    pub const ALL: [CommandCode; 6] = [
        CommandCode::Test,
        CommandCode::SetChannel,
        CommandCode::FadeChannel,
        CommandCode::SetGroup,
        CommandCode::SetStaticIp,
        CommandCode::Reboot,
    ];

    /// Look up a code byte in the descriptor table
    pub fn from_byte(byte: u8) -> Option<Self> {
        DESCRIPTORS
            .iter()
            .find(|(code, _)| *code as u8 == byte)
            .map(|(code, _)| *code)
    }

    /// Wire value of this code
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Payload length this code requires
    pub fn required_length(self) -> u8 {
        DESCRIPTORS
            .iter()
            .find(|(code, _)| *code == self)
            .map(|(_, len)| *len)
            .unwrap_or(0)
    }
}

/// Check whether a code byte is in the descriptor table
pub fn has_command(code: u8) -> bool {
    CommandCode::from_byte(code).is_some()
}

/// Required payload length of a code byte, 0 if the code is unknown
pub fn required_length(code: u8) -> u8 {
    CommandCode::from_byte(code).map_or(0, CommandCode::required_length)
}

/// Transport a command arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Source {
    /// Slot is empty
    #[default]
    None,
    Serial,
    Network,
    DigitalInput,
}

/// A validated inbound command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    pub code: u8,
    pub data: Vec<u8, MAX_DATA_LEN>,
    pub source: Source,
}

impl Default for Command {
    fn default() -> Self {
        Self::empty()
    }
}

impl Command {
    /// An empty command slot
    pub const fn empty() -> Self {
        Self {
            code: INVALID_COMMAND,
            data: Vec::new(),
            source: Source::None,
        }
    }

    /// Build a command with a payload
    pub fn new(code: u8, data: &[u8], source: Source) -> Result<Self, FrameError> {
        let packet = Packet::new(code, data)?;
        Ok(Self::from_packet(packet, source))
    }

    /// Tag a parsed packet with its source
    pub fn from_packet(packet: Packet, source: Source) -> Self {
        Self {
            code: packet.code,
            data: packet.data,
            source,
        }
    }

    /// True if no sourcer has filled this slot
    pub fn is_empty(&self) -> bool {
        self.source == Source::None
    }

    /// Return the slot to its empty state
    pub fn clear(&mut self) {
        self.code = INVALID_COMMAND;
        self.data.clear();
        self.source = Source::None;
    }

    /// Known code of this command, if any
    pub fn command_code(&self) -> Option<CommandCode> {
        CommandCode::from_byte(self.code)
    }

    /// Checksum of this command as it would appear on the wire
    pub fn checksum(&self) -> u8 {
        checksum(START_BYTE, self.code, &self.data)
    }

    /// Encode this command as a wire frame
    pub fn encode_to_vec(&self) -> Vec<u8, MAX_PACKET_LEN> {
        Packet {
            code: self.code,
            data: self.data.clone(),
        }
        .encode_to_vec()
    }
}
