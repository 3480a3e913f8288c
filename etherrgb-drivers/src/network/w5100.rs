//! WIZnet W5100 hardwired TCP/IP controller (SPI mode)
//!
//! The W5100 runs the TCP state machine itself; the host only programs
//! socket registers and copies bytes in and out of the chip's socket
//! buffers.
//!
//! # SPI Protocol
//!
//! Every access is one 4-byte frame with chip select held low:
//! - Opcode: 0xF0 write, 0x0F read
//! - Address high byte, address low byte
//! - Data byte (dummy byte on read; the chip answers in the same slot)
//!
//! # Memory Map
//!
//! - Common registers at 0x0000
//! - Socket `n` registers at 0x0400 + n * 0x100
//! - TX buffers at 0x4000, RX buffers at 0x6000, 2 KiB per socket

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use etherrgb_hal::{SocketState, Transport};

/// W5100 register addresses
pub mod reg {
    /// Mode register
    pub const MR: u16 = 0x0000;
    /// Gateway address (4 bytes)
    pub const GAR: u16 = 0x0001;
    /// Subnet mask (4 bytes)
    pub const SUBR: u16 = 0x0005;
    /// Source hardware address (6 bytes)
    pub const SHAR: u16 = 0x0009;
    /// Source IP address (4 bytes)
    pub const SIPR: u16 = 0x000F;
    /// Interrupt mask
    pub const IMR: u16 = 0x0016;
    /// RX memory size per socket
    pub const RMSR: u16 = 0x001A;
    /// TX memory size per socket
    pub const TMSR: u16 = 0x001B;

    /// Base of socket 0 registers
    pub const SOCKET_BASE: u16 = 0x0400;
    /// Register block size per socket
    pub const SOCKET_STRIDE: u16 = 0x0100;

    /// Socket mode
    pub const SN_MR: u16 = 0x00;
    /// Socket command
    pub const SN_CR: u16 = 0x01;
    /// Socket interrupt
    pub const SN_IR: u16 = 0x02;
    /// Socket status
    pub const SN_SR: u16 = 0x03;
    /// Source port (2 bytes)
    pub const SN_PORT: u16 = 0x04;
    /// TX free size (2 bytes)
    pub const SN_TX_FSR: u16 = 0x20;
    /// TX read pointer (2 bytes)
    pub const SN_TX_RD: u16 = 0x22;
    /// TX write pointer (2 bytes)
    pub const SN_TX_WR: u16 = 0x24;
    /// RX received size (2 bytes)
    pub const SN_RX_RSR: u16 = 0x26;
    /// RX read pointer (2 bytes)
    pub const SN_RX_RD: u16 = 0x28;

    pub const TX_BASE: u16 = 0x4000;
    pub const RX_BASE: u16 = 0x6000;
}

/// Socket commands (Sn_CR)
pub mod cmd {
    pub const OPEN: u8 = 0x01;
    pub const LISTEN: u8 = 0x02;
    pub const CONNECT: u8 = 0x04;
    pub const DISCON: u8 = 0x08;
    pub const CLOSE: u8 = 0x10;
    pub const SEND: u8 = 0x20;
    pub const RECV: u8 = 0x40;
}

/// Socket status values (Sn_SR)
pub mod status {
    pub const CLOSED: u8 = 0x00;
    pub const INIT: u8 = 0x13;
    pub const LISTEN: u8 = 0x14;
    pub const ESTABLISHED: u8 = 0x17;
    pub const FIN_WAIT: u8 = 0x18;
    pub const CLOSING: u8 = 0x1A;
    pub const TIME_WAIT: u8 = 0x1B;
    pub const CLOSE_WAIT: u8 = 0x1C;
    pub const LAST_ACK: u8 = 0x1D;
}

const OP_WRITE: u8 = 0xF0;
const OP_READ: u8 = 0x0F;

/// Software reset bit in MR
const MR_RST: u8 = 0x80;
/// TCP protocol in Sn_MR
const SN_MR_TCP: u8 = 0x01;
/// 2 KiB for each of the four sockets
const MEMORY_2K_EACH: u8 = 0x55;
/// Enable socket 0-3 interrupts
const IMR_SOCKETS: u8 = 0x0F;

/// Socket buffer size and wrap mask
const BUFFER_SIZE: u16 = 0x0800;
const BUFFER_MASK: u16 = BUFFER_SIZE - 1;

/// Register polls before a command or state change is considered hung
const MAX_POLLS: u16 = 1000;

/// Number of hardware sockets
pub const SOCKET_COUNT: u8 = 4;

/// Errors from the W5100 driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum W5100Error<S, P> {
    /// SPI bus error
    Spi(S),
    /// Chip-select pin error
    Pin(P),
    /// Chip did not reach the expected state in time
    Timeout,
    /// [`W5100::init`] has not been called
    NotInitialised,
}

/// One socket of a W5100
pub struct W5100<SPI, CS> {
    spi: SPI,
    cs: CS,
    socket: u8,
    initialised: bool,
}

type Result<T, SPI, CS> = core::result::Result<
    T,
    W5100Error<<SPI as embedded_hal::spi::ErrorType>::Error, <CS as embedded_hal::digital::ErrorType>::Error>,
>;

impl<SPI, CS> W5100<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Create a driver for socket `socket` (wrapped into 0..4)
    pub fn new(spi: SPI, cs: CS, socket: u8) -> Self {
        Self {
            spi,
            cs,
            socket: socket % SOCKET_COUNT,
            initialised: false,
        }
    }

    /// Release the bus and chip-select pin
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    /// Reset the chip and configure socket memory
    pub fn init(&mut self) -> Result<(), SPI, CS> {
        self.cs.set_high().map_err(W5100Error::Pin)?;
        self.write_reg(reg::MR, MR_RST)?;

        // RST self-clears once the reset completes
        let mut polls = 0;
        while self.read_reg(reg::MR)? & MR_RST != 0 {
            polls += 1;
            if polls >= MAX_POLLS {
                return Err(W5100Error::Timeout);
            }
        }

        self.write_reg(reg::IMR, IMR_SOCKETS)?;
        self.write_reg(reg::RMSR, MEMORY_2K_EACH)?;
        self.write_reg(reg::TMSR, MEMORY_2K_EACH)?;
        self.initialised = true;
        Ok(())
    }

    /// Program MAC, gateway, subnet and local address
    pub fn set_network(
        &mut self,
        mac: &[u8; 6],
        gateway: &[u8; 4],
        subnet: &[u8; 4],
        ip: &[u8; 4],
    ) -> Result<(), SPI, CS> {
        self.ensure_initialised()?;
        self.write_block(reg::SHAR, mac)?;
        self.write_block(reg::GAR, gateway)?;
        self.write_block(reg::SUBR, subnet)?;
        self.write_block(reg::SIPR, ip)
    }

    /// Read back the programmed local address
    pub fn local_ip(&mut self) -> Result<[u8; 4], SPI, CS> {
        let mut ip = [0u8; 4];
        for (i, byte) in ip.iter_mut().enumerate() {
            *byte = self.read_reg(reg::SIPR + i as u16)?;
        }
        Ok(ip)
    }

    fn ensure_initialised(&self) -> Result<(), SPI, CS> {
        if self.initialised {
            Ok(())
        } else {
            Err(W5100Error::NotInitialised)
        }
    }

    fn frame(&mut self, opcode: u8, addr: u16, data: u8) -> Result<u8, SPI, CS> {
        let [hi, lo] = addr.to_be_bytes();
        let mut rx = [0u8; 4];

        self.cs.set_low().map_err(W5100Error::Pin)?;
        let result = self
            .spi
            .transfer(&mut rx, &[opcode, hi, lo, data])
            .and_then(|()| self.spi.flush());
        self.cs.set_high().map_err(W5100Error::Pin)?;

        result.map_err(W5100Error::Spi)?;
        Ok(rx[3])
    }

    fn write_reg(&mut self, addr: u16, value: u8) -> Result<(), SPI, CS> {
        self.frame(OP_WRITE, addr, value).map(|_| ())
    }

    fn read_reg(&mut self, addr: u16) -> Result<u8, SPI, CS> {
        self.frame(OP_READ, addr, 0xFF)
    }

    fn write_block(&mut self, addr: u16, data: &[u8]) -> Result<(), SPI, CS> {
        for (i, &byte) in data.iter().enumerate() {
            self.write_reg(addr + i as u16, byte)?;
        }
        Ok(())
    }

    fn read_word(&mut self, addr: u16) -> Result<u16, SPI, CS> {
        let hi = self.read_reg(addr)?;
        let lo = self.read_reg(addr + 1)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn write_word(&mut self, addr: u16, value: u16) -> Result<(), SPI, CS> {
        let [hi, lo] = value.to_be_bytes();
        self.write_reg(addr, hi)?;
        self.write_reg(addr + 1, lo)
    }

    fn socket_reg(&self, offset: u16) -> u16 {
        reg::SOCKET_BASE + self.socket as u16 * reg::SOCKET_STRIDE + offset
    }

    fn tx_base(&self) -> u16 {
        reg::TX_BASE + self.socket as u16 * BUFFER_SIZE
    }

    fn rx_base(&self) -> u16 {
        reg::RX_BASE + self.socket as u16 * BUFFER_SIZE
    }

    fn status(&mut self) -> Result<u8, SPI, CS> {
        self.read_reg(self.socket_reg(reg::SN_SR))
    }

    /// Issue a socket command and wait for the chip to accept it
    fn command(&mut self, command: u8) -> Result<(), SPI, CS> {
        self.ensure_initialised()?;
        let cr = self.socket_reg(reg::SN_CR);
        self.write_reg(cr, command)?;
        for _ in 0..MAX_POLLS {
            if self.read_reg(cr)? == 0 {
                return Ok(());
            }
        }
        Err(W5100Error::Timeout)
    }

    /// Wait for the socket to report `expected`
    fn wait_status(&mut self, expected: u8) -> Result<(), SPI, CS> {
        for _ in 0..MAX_POLLS {
            if self.status()? == expected {
                return Ok(());
            }
        }
        Err(W5100Error::Timeout)
    }
}

fn socket_state(sr: u8) -> SocketState {
    match sr {
        status::CLOSED => SocketState::Closed,
        status::INIT => SocketState::Init,
        status::LISTEN => SocketState::Listening,
        status::ESTABLISHED => SocketState::Established,
        status::CLOSE_WAIT => SocketState::Closing,
        other => SocketState::Other(other),
    }
}

impl<SPI, CS> Transport for W5100<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    type Error = W5100Error<SPI::Error, CS::Error>;

    fn open(&mut self, port: u16) -> core::result::Result<(), Self::Error> {
        self.ensure_initialised()?;
        if self.status()? != status::CLOSED {
            self.command(cmd::CLOSE)?;
        }

        self.write_reg(self.socket_reg(reg::SN_MR), SN_MR_TCP)?;
        self.write_word(self.socket_reg(reg::SN_PORT), port)?;
        self.command(cmd::OPEN)?;

        if let Err(e) = self.wait_status(status::INIT) {
            self.command(cmd::CLOSE)?;
            return Err(e);
        }
        Ok(())
    }

    fn listen(&mut self) -> core::result::Result<(), Self::Error> {
        self.command(cmd::LISTEN)?;
        self.wait_status(status::LISTEN)
    }

    fn disconnect(&mut self) -> core::result::Result<(), Self::Error> {
        self.command(cmd::DISCON)
    }

    fn close(&mut self) -> core::result::Result<(), Self::Error> {
        self.command(cmd::CLOSE)
    }

    fn state(&mut self) -> core::result::Result<SocketState, Self::Error> {
        self.ensure_initialised()?;
        Ok(socket_state(self.status()?))
    }

    fn available(&mut self) -> core::result::Result<usize, Self::Error> {
        self.ensure_initialised()?;
        Ok(self.read_word(self.socket_reg(reg::SN_RX_RSR))? as usize)
    }

    fn read(&mut self, buf: &mut [u8]) -> core::result::Result<usize, Self::Error> {
        let available = self.available()?;
        let count = available.min(buf.len());
        if count == 0 {
            return Ok(0);
        }

        let rd = self.read_word(self.socket_reg(reg::SN_RX_RD))?;
        let base = self.rx_base();
        for (i, byte) in buf[..count].iter_mut().enumerate() {
            let offset = rd.wrapping_add(i as u16) & BUFFER_MASK;
            *byte = self.read_reg(base + offset)?;
        }

        self.write_word(self.socket_reg(reg::SN_RX_RD), rd.wrapping_add(count as u16))?;
        self.command(cmd::RECV)?;
        Ok(count)
    }

    fn write(&mut self, data: &[u8]) -> core::result::Result<usize, Self::Error> {
        self.ensure_initialised()?;
        if data.is_empty() {
            return Ok(0);
        }

        let free = self.read_word(self.socket_reg(reg::SN_TX_FSR))? as usize;
        let count = free.min(data.len());
        if count == 0 {
            return Ok(0);
        }

        let wr = self.read_word(self.socket_reg(reg::SN_TX_WR))?;
        let base = self.tx_base();
        for (i, &byte) in data[..count].iter().enumerate() {
            let offset = wr.wrapping_add(i as u16) & BUFFER_MASK;
            self.write_reg(base + offset, byte)?;
        }

        self.write_word(self.socket_reg(reg::SN_TX_WR), wr.wrapping_add(count as u16))?;
        self.command(cmd::SEND)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::boxed::Box;
    use std::vec::Vec;

    use core::convert::Infallible;

    use super::*;

    /// Register-level W5100 model behind a mock SPI bus
    struct MockChip {
        memory: Box<[u8; 0x8000]>,
        writes: Vec<(u16, u8)>,
        /// Ignore socket commands, to exercise timeouts
        stuck: bool,
    }

    impl MockChip {
        fn new() -> Self {
            let mut memory = Box::new([0u8; 0x8000]);
            for n in 0..SOCKET_COUNT as u16 {
                let base = reg::SOCKET_BASE + n * reg::SOCKET_STRIDE;
                memory[(base + reg::SN_TX_FSR) as usize] = 0x08;
            }
            Self {
                memory,
                writes: Vec::new(),
                stuck: false,
            }
        }

        fn sock(&self, offset: u16) -> usize {
            (reg::SOCKET_BASE + offset) as usize
        }

        fn set_word(&mut self, addr: usize, value: u16) {
            let [hi, lo] = value.to_be_bytes();
            self.memory[addr] = hi;
            self.memory[addr + 1] = lo;
        }

        fn word(&self, addr: usize) -> u16 {
            u16::from_be_bytes([self.memory[addr], self.memory[addr + 1]])
        }

        /// Queue received bytes for socket 0 at its current RX write position
        fn receive(&mut self, data: &[u8]) {
            let rd = self.word(self.sock(reg::SN_RX_RD));
            for (i, &b) in data.iter().enumerate() {
                let offset = rd.wrapping_add(i as u16) & BUFFER_MASK;
                self.memory[(reg::RX_BASE + offset) as usize] = b;
            }
            let rsr = self.sock(reg::SN_RX_RSR);
            self.set_word(rsr, data.len() as u16);
        }

        fn apply_command(&mut self, addr: u16, command: u8) {
            if self.stuck {
                return;
            }
            let base = addr - reg::SN_CR;
            let sr = (base + reg::SN_SR) as usize;
            match command {
                cmd::OPEN => self.memory[sr] = status::INIT,
                cmd::LISTEN => self.memory[sr] = status::LISTEN,
                cmd::CLOSE | cmd::DISCON => self.memory[sr] = status::CLOSED,
                cmd::RECV => {
                    let rsr = (base + reg::SN_RX_RSR) as usize;
                    self.set_word(rsr, 0);
                }
                _ => {}
            }
            self.memory[addr as usize] = 0;
        }

        fn is_command_reg(addr: u16) -> bool {
            (reg::SOCKET_BASE..reg::TX_BASE).contains(&addr)
                && (addr - reg::SOCKET_BASE) % reg::SOCKET_STRIDE == reg::SN_CR
        }
    }

    impl embedded_hal::spi::ErrorType for MockChip {
        type Error = Infallible;
    }

    impl SpiBus for MockChip {
        fn read(&mut self, _words: &mut [u8]) -> core::result::Result<(), Infallible> {
            Ok(())
        }

        fn write(&mut self, _words: &[u8]) -> core::result::Result<(), Infallible> {
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> core::result::Result<(), Infallible> {
            let addr = u16::from_be_bytes([write[1], write[2]]);
            match write[0] {
                OP_WRITE => {
                    self.writes.push((addr, write[3]));
                    if addr == reg::MR {
                        // Reset completes immediately
                        self.memory[addr as usize] = write[3] & !MR_RST;
                    } else {
                        self.memory[addr as usize] = write[3];
                    }
                    if Self::is_command_reg(addr) {
                        self.apply_command(addr, write[3]);
                    }
                    read.copy_from_slice(&[0, 1, 2, 3]);
                }
                OP_READ => {
                    read.copy_from_slice(&[0, 1, 2, self.memory[addr as usize]]);
                }
                _ => {}
            }
            Ok(())
        }

        fn transfer_in_place(&mut self, _words: &mut [u8]) -> core::result::Result<(), Infallible> {
            Ok(())
        }

        fn flush(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }
    }

    struct MockCs;

    impl embedded_hal::digital::ErrorType for MockCs {
        type Error = Infallible;
    }

    impl OutputPin for MockCs {
        fn set_low(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }
    }

    fn ready_chip() -> W5100<MockChip, MockCs> {
        let mut chip = W5100::new(MockChip::new(), MockCs, 0);
        chip.init().unwrap();
        chip
    }

    #[test]
    fn test_init_configures_memory() {
        let chip = ready_chip();
        let (spi, _) = chip.release();
        assert_eq!(spi.memory[reg::RMSR as usize], 0x55);
        assert_eq!(spi.memory[reg::TMSR as usize], 0x55);
        assert_eq!(spi.writes[0], (reg::MR, MR_RST));
    }

    #[test]
    fn test_requires_init() {
        let mut chip = W5100::new(MockChip::new(), MockCs, 0);
        assert_eq!(chip.open(1234), Err(W5100Error::NotInitialised));
        assert_eq!(chip.state(), Err(W5100Error::NotInitialised));
    }

    #[test]
    fn test_set_network() {
        let mut chip = ready_chip();
        chip.set_network(
            &[0x00, 0x08, 0xDC, 0x00, 0x00, 0x01],
            &[0, 0, 0, 0],
            &[255, 255, 255, 0],
            &[192, 168, 178, 42],
        )
        .unwrap();
        assert_eq!(chip.local_ip().unwrap(), [192, 168, 178, 42]);

        let (spi, _) = chip.release();
        assert_eq!(&spi.memory[0x09..0x0F], &[0x00, 0x08, 0xDC, 0x00, 0x00, 0x01]);
        assert_eq!(&spi.memory[0x05..0x09], &[255, 255, 255, 0]);
    }

    #[test]
    fn test_open_and_listen() {
        let mut chip = ready_chip();
        assert_eq!(chip.state(), Ok(SocketState::Closed));
        chip.open(1234).unwrap();
        assert_eq!(chip.state(), Ok(SocketState::Init));
        chip.listen().unwrap();
        assert!(chip.is_listening().unwrap());

        let (spi, _) = chip.release();
        assert_eq!(spi.memory[0x0400], SN_MR_TCP);
        assert_eq!(spi.word(0x0404), 1234);
    }

    #[test]
    fn test_close() {
        let mut chip = ready_chip();
        chip.open(80).unwrap();
        chip.close().unwrap();
        assert!(chip.is_closed().unwrap());
    }

    #[test]
    fn test_state_mapping() {
        assert_eq!(socket_state(status::ESTABLISHED), SocketState::Established);
        assert_eq!(socket_state(status::CLOSE_WAIT), SocketState::Closing);
        assert_eq!(socket_state(status::FIN_WAIT), SocketState::Other(0x18));
    }

    #[test]
    fn test_read_wraps_rx_buffer() {
        let mut chip = ready_chip();
        let rd = chip.spi.sock(reg::SN_RX_RD);
        chip.spi.set_word(rd, 0x07FE);
        chip.spi.receive(&[0x41, b't', 0x00]);

        assert_eq!(chip.available(), Ok(3));
        let mut buf = [0u8; 11];
        assert_eq!(chip.read(&mut buf), Ok(3));
        assert_eq!(&buf[..3], &[0x41, b't', 0x00]);

        let (spi, _) = chip.release();
        assert_eq!(spi.memory[(reg::RX_BASE + 0x7FE) as usize], 0x41);
        assert_eq!(spi.memory[reg::RX_BASE as usize], 0x00);
        assert_eq!(spi.word(spi.sock(reg::SN_RX_RD)), 0x0801);
        assert!(spi.writes.contains(&(0x0401, cmd::RECV)));
    }

    #[test]
    fn test_read_limited_by_buffer() {
        let mut chip = ready_chip();
        chip.spi.receive(&[1, 2, 3, 4, 5]);

        let mut buf = [0u8; 2];
        assert_eq!(chip.read(&mut buf), Ok(2));
        assert_eq!(buf, [1, 2]);
    }

    #[test]
    fn test_write_sends() {
        let mut chip = ready_chip();
        assert_eq!(chip.write(&[0x41, 0x01, 0x00, 0x00, 0x01]), Ok(5));

        let (spi, _) = chip.release();
        assert_eq!(
            &spi.memory[reg::TX_BASE as usize..reg::TX_BASE as usize + 5],
            &[0x41, 0x01, 0x00, 0x00, 0x01]
        );
        assert_eq!(spi.word(spi.sock(reg::SN_TX_WR)), 5);
        assert!(spi.writes.contains(&(0x0401, cmd::SEND)));
    }

    #[test]
    fn test_write_empty() {
        let mut chip = ready_chip();
        assert_eq!(chip.write(&[]), Ok(0));
    }

    #[test]
    fn test_command_timeout() {
        let mut chip = ready_chip();
        chip.spi.stuck = true;
        assert_eq!(chip.close(), Err(W5100Error::Timeout));
    }

    #[test]
    fn test_socket_register_offsets() {
        let chip = W5100::new(MockChip::new(), MockCs, 2);
        assert_eq!(chip.socket_reg(reg::SN_SR), 0x0603);
        assert_eq!(chip.tx_base(), 0x5000);
        assert_eq!(chip.rx_base(), 0x7000);
    }
}
