//! Frame encoding and checksum for the EtheRGB protocol.
//!
//! Frame format:
//! - START (1 byte): 0x41 ('A') synchronization byte
//! - CODE (1 byte): command or response identifier
//! - DATA (0-8 bytes): code-specific payload, length fixed per code
//! - CHECKSUM (1 byte): sum of the even parity bits of START, CODE and DATA

use heapless::Vec;

/// Frame synchronization byte
pub const START_BYTE: u8 = b'A';

/// Maximum payload size in bytes
pub const MAX_DATA_LEN: usize = 8;

/// Smallest complete frame (START + CODE + CHECKSUM)
pub const MIN_PACKET_LEN: usize = 3;

/// Maximum complete frame size (START + CODE + MAX_DATA + CHECKSUM)
pub const MAX_PACKET_LEN: usize = MIN_PACKET_LEN + MAX_DATA_LEN;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// First byte was not [`START_BYTE`]
    InvalidStart,
    /// Code byte is not in the command table
    UnknownCommand,
    /// Payload is longer than the code allows
    LengthMismatch,
    /// Fewer bytes than the minimum frame
    TooShort,
    /// Checksum mismatch
    InvalidChecksum,
    /// Peer stopped sending mid-packet
    Timeout,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
}

/// Even parity bit of a byte: 1 if the byte has an odd number of set bits
#[inline]
pub const fn even_parity(byte: u8) -> u8 {
    (byte.count_ones() & 1) as u8
}

/// Calculate the checksum for a frame
///
/// Sums (wrapping) the parity bits of `start`, `code` and every payload
/// byte. This only catches accidental corruption on a short link.
pub fn checksum(start: u8, code: u8, data: &[u8]) -> u8 {
    data.iter()
        .fold(even_parity(start).wrapping_add(even_parity(code)), |acc, &b| {
            acc.wrapping_add(even_parity(b))
        })
}

/// A code plus payload, as carried inside one frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    /// Command or response identifier
    pub code: u8,
    /// Payload data
    pub data: Vec<u8, MAX_DATA_LEN>,
}

impl Packet {
    /// Create a new packet with the given code and payload
    pub fn new(code: u8, data: &[u8]) -> Result<Self, FrameError> {
        let mut vec = Vec::new();
        vec.extend_from_slice(data)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { code, data: vec })
    }

    /// Create a packet with no payload
    pub const fn empty(code: u8) -> Self {
        Self {
            code,
            data: Vec::new(),
        }
    }

    /// True if the packet carries no payload
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drop the payload, keeping the code
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Checksum of this packet as it would appear on the wire
    pub fn checksum(&self) -> u8 {
        checksum(START_BYTE, self.code, &self.data)
    }

    /// Number of bytes [`encode`](Self::encode) will produce
    pub fn encoded_len(&self) -> usize {
        MIN_PACKET_LEN + self.data.len()
    }

    /// Encode this packet into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let len = self.encoded_len();
        if buffer.len() < len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = START_BYTE;
        buffer[1] = self.code;
        buffer[2..2 + self.data.len()].copy_from_slice(&self.data);
        buffer[len - 1] = self.checksum();

        Ok(len)
    }

    /// Encode this packet into a heapless Vec
    pub fn encode_to_vec(&self) -> Vec<u8, MAX_PACKET_LEN> {
        let mut buffer = [0u8; MAX_PACKET_LEN];
        // data is bounded by MAX_DATA_LEN so the buffer always fits
        let len = self.encode(&mut buffer).unwrap_or(0);
        let mut vec = Vec::new();
        let _ = vec.extend_from_slice(&buffer[..len]);
        vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_parity() {
        assert_eq!(even_parity(0x00), 0);
        assert_eq!(even_parity(0x01), 1);
        assert_eq!(even_parity(0x41), 0); // 'A' has two bits set
        assert_eq!(even_parity(0x74), 0); // 't' has four bits set
        assert_eq!(even_parity(0xF0), 0);
        assert_eq!(even_parity(0xFE), 1);
    }

    #[test]
    fn test_checksum_of_test_command_is_zero() {
        assert_eq!(checksum(START_BYTE, b't', &[]), 0);
    }

    #[test]
    fn test_checksum_counts_payload_parity() {
        // 0x01 -> 1, 0x03 -> 0, 0x07 -> 1
        assert_eq!(checksum(START_BYTE, 0x01, &[0x01, 0x03, 0x07]), 3);
    }

    #[test]
    fn test_checksum_counts_every_byte() {
        let data = [0x01u8; MAX_DATA_LEN];
        // Every input byte contributes one, so this is just a count
        assert_eq!(checksum(0x01, 0x01, &data), 10);
    }

    #[test]
    fn test_packet_encode_empty_payload() {
        let packet = Packet::empty(b't');
        let mut buffer = [0u8; 8];
        let len = packet.encode(&mut buffer).unwrap();

        assert_eq!(len, 3);
        assert_eq!(&buffer[..3], &[0x41, 0x74, 0x00]);
    }

    #[test]
    fn test_packet_encode_with_payload() {
        let packet = Packet::new(0x01, &[0x00, 0x01]).unwrap();
        let encoded = packet.encode_to_vec();

        assert_eq!(encoded.as_slice(), &[0x41, 0x01, 0x00, 0x01, 0x02]);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let packet = Packet::new(0x03, &[0, 1, 2, 3]).unwrap();
        let mut buffer = [0u8; 6];
        assert_eq!(packet.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_payload_too_large() {
        let large_payload = [0u8; MAX_DATA_LEN + 1];
        assert_eq!(
            Packet::new(0x01, &large_payload),
            Err(FrameError::PayloadTooLarge)
        );
    }
}
