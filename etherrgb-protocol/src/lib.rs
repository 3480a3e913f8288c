//! EtheRGB Wire Protocol
//!
//! This crate defines the binary packet format shared by every transport
//! of the EtheRGB dimmer (serial link, TCP socket, digital inputs), the
//! command descriptor table, and the two framers that turn raw transport
//! bytes into validated [`Command`]s.
//!
//! # Protocol Overview
//!
//! All packets use the same frame:
//! ```text
//! ┌───────────┬──────┬──────────────┬──────────┐
//! │ START 'A' │ CODE │ DATA         │ CHECKSUM │
//! │ 1B        │ 1B   │ 0-8B         │ 1B       │
//! └───────────┴──────┴──────────────┴──────────┘
//! ```
//!
//! The DATA length is not transmitted; it is fixed per CODE by the
//! descriptor table in [`command`]. The checksum is the sum of the even
//! parity bits of START, CODE and each DATA byte.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod frame;
pub mod parser;
pub mod response;

pub use command::{has_command, required_length, Command, CommandCode, Source};
pub use frame::{
    checksum, even_parity, FrameError, Packet, MAX_DATA_LEN, MAX_PACKET_LEN, MIN_PACKET_LEN,
    START_BYTE,
};
pub use parser::{parse_datagram, SerialFramer};
pub use response::{Status, RESPONSE_CODE};
