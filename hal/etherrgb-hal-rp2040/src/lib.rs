//! RP2040 implementations of the EtheRGB HAL traits
//!
//! - GPIO wrappers for button inputs and BAM outputs
//! - Flash-backed byte store for the persisted static address
//! - Watchdog-based reboot
//! - PWM slice wrap used as the BAM compare timer
//! - Blocking UART transmit plus interrupt-driven receive helpers

#![no_std]

pub mod flash;
pub mod gpio;
pub mod pwm;
pub mod uart;
pub mod watchdog;

pub use flash::FlashNvStore;
pub use gpio::{RpInput, RpOutput};
pub use pwm::BamTimer;
pub use uart::RpUartTx;
pub use watchdog::{RpWatchdog, WatchdogReboot};
