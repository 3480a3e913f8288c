//! Non-volatile storage abstractions
//!
//! The dimmer persists exactly one value across power cycles: its static
//! network address. Storage is byte-addressed like a small EEPROM; each
//! `write_byte` costs one erase/write cycle on the underlying medium, so
//! callers only write bytes that actually change.

/// Errors from non-volatile storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NvError {
    /// Address range lies outside the store
    OutOfRange,
    /// Underlying medium rejected the read
    Read,
    /// Underlying medium rejected the write
    Write,
}

/// Byte-addressed persistent storage
pub trait NonVolatileStore {
    /// Read `buffer.len()` bytes starting at `addr`
    fn read_block(&mut self, addr: u16, buffer: &mut [u8]) -> Result<(), NvError>;

    /// Write a single byte at `addr`
    ///
    /// Blocks until the medium has committed the byte.
    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), NvError>;
}

impl<T: NonVolatileStore + ?Sized> NonVolatileStore for &mut T {
    fn read_block(&mut self, addr: u16, buffer: &mut [u8]) -> Result<(), NvError> {
        (**self).read_block(addr, buffer)
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), NvError> {
        (**self).write_byte(addr, value)
    }
}
