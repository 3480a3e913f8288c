//! EtheRGB Hardware Abstraction Layer
//!
//! This crate defines the collaborator traits the protocol engine and the
//! dimmer are written against. Chip-specific crates (RP2040, the W5100
//! network driver, host mocks) implement them, so the same core logic
//! runs on the target and in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  etherrgb-core (arbitrator, dimmer)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  etherrgb-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ etherrgb-hal- │       │  etherrgb-    │
//! │    rp2040     │       │  drivers      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::InputPin`], [`gpio::OutputPin`] - Digital I/O
//! - [`socket::Transport`] - Connection-oriented network socket
//! - [`uart::UartTx`] - Serial transmit path
//! - [`nvstore::NonVolatileStore`] - Power-cycle persistent bytes
//! - [`timer::CompareTimer`] - Compare-match timer driving BAM
//! - [`system::Reboot`], [`system::Watchdog`] - Supervisor hooks

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod nvstore;
pub mod socket;
pub mod system;
pub mod timer;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, Level, OutputPin};
pub use nvstore::{NonVolatileStore, NvError};
pub use socket::{SocketState, Transport};
pub use system::{Reboot, Watchdog};
pub use timer::CompareTimer;
pub use uart::UartTx;
