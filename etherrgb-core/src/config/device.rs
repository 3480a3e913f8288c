//! Device-level network and timing configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    DEFAULT_GATEWAY, DEFAULT_MAC, DEFAULT_SERVER_PORT, DEFAULT_STATIC_IP, DEFAULT_SUBNET,
    NETWORK_TIMEOUT_POLLS, SERIAL_TIMEOUT_POLLS,
};

/// Network identity and protocol timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// TCP port of the command server
    pub server_port: u16,
    /// Fallback address when none is stored
    pub default_ip: [u8; 4],
    pub subnet: [u8; 4],
    pub gateway: [u8; 4],
    pub mac: [u8; 6],
    /// Idle polls before a partial serial packet is dropped
    pub serial_timeout_polls: u16,
    /// Idle polls before an active network session is closed
    pub network_timeout_polls: u16,
}

impl DeviceConfig {
    pub const fn new() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            default_ip: DEFAULT_STATIC_IP,
            subnet: DEFAULT_SUBNET,
            gateway: DEFAULT_GATEWAY,
            mac: DEFAULT_MAC,
            serial_timeout_polls: SERIAL_TIMEOUT_POLLS,
            network_timeout_polls: NETWORK_TIMEOUT_POLLS,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new()
    }
}
