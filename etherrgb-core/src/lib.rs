//! Board-agnostic core logic for the EtheRGB dimmer firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Serial receive ring buffer
//! - Command sourcers (digital inputs, serial link, network socket)
//! - Source arbitration over a single shared mailbox
//! - Command dispatch and handlers
//! - Dimmer fade ramp and bit-angle-modulation output
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod log;

pub mod arbiter;
pub mod command;
pub mod config;
pub mod dimmer;
pub mod mailbox;
pub mod ring;
pub mod service;
pub mod source;

pub use arbiter::{Arbiter, ArbiterState};
pub use command::{CommandProcessor, Dispatch};
pub use dimmer::{BamGenerator, ChannelLevels, Dimmer, DimmerError};
pub use mailbox::Mailbox;
pub use ring::{RingBuffer, SharedRingBuffer};
pub use service::{load_static_ip, EtheRgb};
pub use source::{BindingError, InputSource, NetworkSource, SerialSource, Sourcer};
