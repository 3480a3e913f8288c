//! Flash-backed byte store
//!
//! Emulates a small EEPROM in the last 4 KiB sector of flash. Reads go
//! straight to flash; each byte write is a read-modify-erase-write of
//! the backing page, so callers should only write bytes that change.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use etherrgb_hal::{NonVolatileStore, NvError};

/// Total flash on the board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Offset of the store sector from the start of flash
pub const STORE_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

/// Bytes addressable through the store
pub const STORE_SIZE: usize = 256;

pub struct FlashNvStore<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
}

impl<'d> FlashNvStore<'d> {
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
        }
    }
}

fn check_range(addr: u16, len: usize) -> Result<u32, NvError> {
    let end = addr as usize + len;
    if end > STORE_SIZE {
        return Err(NvError::OutOfRange);
    }
    Ok(STORE_OFFSET + addr as u32)
}

impl NonVolatileStore for FlashNvStore<'_> {
    fn read_block(&mut self, addr: u16, buffer: &mut [u8]) -> Result<(), NvError> {
        let offset = check_range(addr, buffer.len())?;
        self.flash
            .blocking_read(offset, buffer)
            .map_err(|_| NvError::Read)
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), NvError> {
        check_range(addr, 1)?;

        let mut page = [0u8; STORE_SIZE];
        self.flash
            .blocking_read(STORE_OFFSET, &mut page)
            .map_err(|_| NvError::Read)?;
        if page[addr as usize] == value {
            return Ok(());
        }
        page[addr as usize] = value;

        self.flash
            .blocking_erase(STORE_OFFSET, STORE_OFFSET + ERASE_SIZE as u32)
            .map_err(|_| NvError::Write)?;
        self.flash
            .blocking_write(STORE_OFFSET, &page)
            .map_err(|_| NvError::Write)
    }
}
