//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in etherrgb-hal that only depend on `embedded-hal` bus traits, so they
//! work on any chip with an SPI master:
//!
//! - Network: WIZnet W5100 hardwired TCP/IP socket

#![no_std]
#![deny(unsafe_code)]

pub mod network;
