//! Serial link sourcer

use etherrgb_hal::UartTx;
use etherrgb_protocol::{Command, FrameError, Packet, SerialFramer};

use super::Sourcer;
use crate::ring::SharedRingBuffer;

/// Drains the receive ring one byte per poll through a [`SerialFramer`]
pub struct SerialSource<'a, T, const N: usize> {
    rx: &'a SharedRingBuffer<N>,
    tx: T,
    framer: SerialFramer,
}

impl<'a, T: UartTx, const N: usize> SerialSource<'a, T, N> {
    pub fn new(rx: &'a SharedRingBuffer<N>, tx: T, timeout_polls: u16) -> Self {
        Self {
            rx,
            tx,
            framer: SerialFramer::with_timeout(timeout_polls),
        }
    }

    /// Drop any partial packet
    pub fn reset(&mut self) {
        self.framer.reset();
    }

    pub fn framer(&self) -> &SerialFramer {
        &self.framer
    }

    pub fn tx_mut(&mut self) -> &mut T {
        &mut self.tx
    }
}

impl<T: UartTx, const N: usize> Sourcer for SerialSource<'_, T, N> {
    fn poll(&mut self, inbox: &mut Command) -> bool {
        match self.framer.poll(self.rx.try_pop()) {
            Ok(Some(command)) => {
                trace!("serial: command {=u8:#x}", command.code);
                *inbox = command;
                true
            }
            Ok(None) => false,
            Err(FrameError::Timeout) => {
                warn!("serial: connection timed out");
                false
            }
            Err(e) => {
                warn!("serial: protocol error {}", e);
                false
            }
        }
    }

    fn respond(&mut self, response: &Packet) {
        let bytes = response.encode_to_vec();
        if self.tx.write_blocking(&bytes).is_err() {
            error!("serial: failed to send response");
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use etherrgb_protocol::{Source, Status};

    use super::*;

    #[derive(Default)]
    struct MockUart {
        sent: Vec<u8>,
    }

    impl UartTx for MockUart {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            self.sent.extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    #[test]
    fn test_one_byte_per_poll() {
        let ring = SharedRingBuffer::<16>::new();
        for b in [0x41, b't', 0x00] {
            ring.push(b);
        }
        let mut source = SerialSource::new(&ring, MockUart::default(), u16::MAX);
        let mut inbox = Command::empty();

        assert!(!source.poll(&mut inbox));
        assert!(!source.poll(&mut inbox));
        assert!(inbox.is_empty());
        assert!(source.poll(&mut inbox));
        assert_eq!(inbox.code, b't');
        assert_eq!(inbox.source, Source::Serial);
        assert_eq!(ring.available(), 0);
    }

    #[test]
    fn test_bad_byte_leaves_inbox_empty() {
        let ring = SharedRingBuffer::<16>::new();
        ring.push(b'x');
        let mut source = SerialSource::new(&ring, MockUart::default(), u16::MAX);
        let mut inbox = Command::empty();

        assert!(!source.poll(&mut inbox));
        assert!(inbox.is_empty());
        assert!(source.framer().is_idle());
    }

    #[test]
    fn test_timeout_resets_framer() {
        let ring = SharedRingBuffer::<16>::new();
        ring.push(0x41);
        let mut source = SerialSource::new(&ring, MockUart::default(), 4);
        let mut inbox = Command::empty();

        source.poll(&mut inbox);
        assert!(!source.framer().is_idle());
        for _ in 0..4 {
            source.poll(&mut inbox);
        }
        assert!(source.framer().is_idle());
    }

    #[test]
    fn test_respond_writes_frame() {
        let ring = SharedRingBuffer::<4>::new();
        let mut source = SerialSource::new(&ring, MockUart::default(), u16::MAX);
        source.respond(&Packet::status(Status::Ok));
        assert_eq!(source.tx_mut().sent, [0x41, 0x01, 0x00, 0x00, 0x01]);
    }
}
