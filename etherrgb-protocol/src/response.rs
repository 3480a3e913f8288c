//! Response packets
//!
//! Only one kind of response exists: code 0x01 carrying a big-endian
//! 16-bit status word.

use crate::frame::Packet;

/// Code byte of every response packet
pub const RESPONSE_CODE: u8 = 0x01;

/// Status word carried by a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Status {
    Ok = 0x0000,
    Error = 0x0001,
}

impl Status {
    /// Status for a boolean handler outcome
    pub fn from_success(success: bool) -> Self {
        if success {
            Status::Ok
        } else {
            Status::Error
        }
    }

    /// Status word as sent on the wire
    pub fn to_bytes(self) -> [u8; 2] {
        (self as u16).to_be_bytes()
    }

    /// Parse a status word, if it is a known value
    pub fn from_bytes(bytes: [u8; 2]) -> Option<Self> {
        match u16::from_be_bytes(bytes) {
            0x0000 => Some(Status::Ok),
            0x0001 => Some(Status::Error),
            _ => None,
        }
    }
}

impl Packet {
    /// Build a status response packet
    pub fn status(status: Status) -> Self {
        let mut packet = Packet::empty(RESPONSE_CODE);
        // Two bytes always fit in the payload
        let _ = packet.data.extend_from_slice(&status.to_bytes());
        packet
    }

    /// Status carried by this packet, if it is a response
    pub fn response_status(&self) -> Option<Status> {
        if self.code != RESPONSE_CODE || self.data.len() != 2 {
            return None;
        }
        Status::from_bytes([self.data[0], self.data[1]])
    }
}
