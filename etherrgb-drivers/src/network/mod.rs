//! Network interface drivers

pub mod w5100;

pub use w5100::{W5100Error, W5100};
