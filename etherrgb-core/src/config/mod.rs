//! Configuration types and compile-time limits
//!
//! Board-agnostic configuration structures. The firmware fills them from
//! a build-time validated `device.toml`.

pub mod binding;
pub mod device;

pub use binding::*;
pub use device::*;

/// Number of dimmer channels
pub const MAX_CHANNELS: usize = 8;

/// Number of digital-input binding slots
pub const MAX_INPUT_BINDINGS: usize = 4;

/// Idle polls before a half-received serial packet is dropped
pub const SERIAL_TIMEOUT_POLLS: u16 = u16::MAX;

/// Idle polls before an active network session is closed
pub const NETWORK_TIMEOUT_POLLS: u16 = u16::MAX;

/// Capacity of the serial receive ring buffer
pub const SERIAL_RING_CAPACITY: usize = 64;

/// TCP port the server socket listens on
pub const DEFAULT_SERVER_PORT: u16 = 1234;

/// Address used while the persistent store is erased
pub const DEFAULT_STATIC_IP: [u8; 4] = [192, 168, 178, 42];

pub const DEFAULT_SUBNET: [u8; 4] = [255, 255, 255, 0];

pub const DEFAULT_GATEWAY: [u8; 4] = [0, 0, 0, 0];

pub const DEFAULT_MAC: [u8; 6] = [0x00, 0x08, 0xDC, 0x00, 0x00, 0x01];

/// Non-volatile store offset of the 4-byte static address
pub const STATIC_IP_NV_ADDR: u16 = 0x0000;
