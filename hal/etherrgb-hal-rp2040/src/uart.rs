//! UART0 command link
//!
//! Transmit goes through embassy's blocking driver. Receive bypasses it:
//! the firmware owns `UART0_IRQ` and drains the RX FIFO straight into the
//! core's ring buffer, one byte per call.

use embassy_rp::pac;
use embassy_rp::uart::{Blocking, Error, UartTx};

/// Blocking transmitter
pub struct RpUartTx<'d>(UartTx<'d, Blocking>);

impl<'d> RpUartTx<'d> {
    pub fn new(tx: UartTx<'d, Blocking>) -> Self {
        Self(tx)
    }
}

impl etherrgb_hal::UartTx for RpUartTx<'_> {
    type Error = Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Error> {
        self.0.blocking_write(data)
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.0.blocking_flush()
    }
}

/// Unmask the UART0 receive and receive-timeout interrupts
///
/// The NVIC line still has to be enabled by the caller.
pub fn enable_rx_interrupt() {
    pac::UART0.uartimsc().modify(|w| {
        w.set_rxim(true);
        w.set_rtim(true);
    });
}

/// Pop one byte from the UART0 RX FIFO
///
/// Bytes flagged with a framing, parity, break or overrun error are
/// discarded.
pub fn read_rx_byte() -> Option<u8> {
    loop {
        if pac::UART0.uartfr().read().rxfe() {
            return None;
        }
        let dr = pac::UART0.uartdr().read();
        if !(dr.fe() || dr.pe() || dr.be() || dr.oe()) {
            return Some(dr.data());
        }
    }
}
