//! Network socket sourcer
//!
//! Each poll first keeps the server socket alive (re-open when closed,
//! disconnect when the peer half-closed), then treats one read as one
//! complete packet. A bad packet drops the session since the stream
//! cannot be resynchronized byte by byte.

use etherrgb_hal::Transport;
use etherrgb_protocol::{parse_datagram, Command, Packet, MAX_PACKET_LEN};

use super::Sourcer;

pub struct NetworkSource<T> {
    transport: T,
    port: u16,
    idle_polls: u16,
    timeout_polls: u16,
}

impl<T: Transport> NetworkSource<T> {
    pub fn new(transport: T, port: u16, timeout_polls: u16) -> Self {
        Self {
            transport,
            port,
            idle_polls: 0,
            timeout_polls,
        }
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Reset the idle counter
    pub fn reset(&mut self) {
        self.idle_polls = 0;
    }

    /// Close the socket and reset; it is re-opened on the next poll
    pub fn close(&mut self) {
        if self.transport.close().is_err() {
            error!("network: close failed");
        }
        info!("network: socket closed");
        self.reset();
    }

    /// Re-open a closed socket and finish half-closed sessions
    fn maintain(&mut self) -> Result<(), T::Error> {
        if self.transport.is_closed()? {
            info!("network: socket closed, reopening on port {=u16}", self.port);
            self.transport.open(self.port)?;
            self.transport.listen()?;
        } else if self.transport.is_closing()? {
            info!("network: peer closing, disconnecting");
            self.transport.disconnect()?;
        }
        Ok(())
    }

    /// Count one poll without data and drop a stalled session
    ///
    /// The count only runs while a peer is connected, so a session that
    /// opens after a long listen gets the full timeout.
    fn idle(&mut self) -> Result<(), T::Error> {
        if self.transport.is_listening()? {
            self.idle_polls = 0;
            return Ok(());
        }
        self.idle_polls = self.idle_polls.wrapping_add(1);
        if self.idle_polls == self.timeout_polls {
            warn!("network: connection timed out");
            self.close();
        }
        Ok(())
    }

    fn receive(&mut self, inbox: &mut Command) -> Result<bool, T::Error> {
        self.maintain()?;

        if self.transport.available()? == 0 {
            self.idle()?;
            return Ok(false);
        }

        self.idle_polls = 0;
        let mut buffer = [0u8; MAX_PACKET_LEN];
        let len = self.transport.read(&mut buffer)?;

        match parse_datagram(&buffer[..len]) {
            Ok(command) => {
                trace!("network: command {=u8:#x}", command.code);
                *inbox = command;
                self.reset();
                Ok(true)
            }
            Err(e) => {
                warn!("network: protocol error {}", e);
                self.close();
                Ok(false)
            }
        }
    }
}

impl<T: Transport> Sourcer for NetworkSource<T> {
    fn poll(&mut self, inbox: &mut Command) -> bool {
        match self.receive(inbox) {
            Ok(complete) => complete,
            Err(_) => {
                // Retried on the next poll
                error!("network: transport error");
                false
            }
        }
    }

    fn respond(&mut self, response: &Packet) {
        let bytes = response.encode_to_vec();
        match self.transport.write(&bytes) {
            Ok(n) if n == bytes.len() => {}
            Ok(_) => warn!("network: response truncated"),
            Err(_) => error!("network: failed to send response"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::collections::VecDeque;
    use std::vec;
    use std::vec::Vec;

    use etherrgb_hal::SocketState;
    use etherrgb_protocol::{Source, Status};

    use super::*;

    struct MockSocket {
        state: SocketState,
        reads: VecDeque<Vec<u8>>,
        sent: Vec<u8>,
        opened_on: Option<u16>,
        closes: usize,
        disconnects: usize,
        fail: bool,
    }

    impl MockSocket {
        fn established() -> Self {
            Self {
                state: SocketState::Established,
                reads: VecDeque::new(),
                sent: Vec::new(),
                opened_on: None,
                closes: 0,
                disconnects: 0,
                fail: false,
            }
        }
    }

    impl Transport for MockSocket {
        type Error = ();

        fn open(&mut self, port: u16) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.opened_on = Some(port);
            self.state = SocketState::Init;
            Ok(())
        }

        fn listen(&mut self) -> Result<(), ()> {
            self.state = SocketState::Listening;
            Ok(())
        }

        fn disconnect(&mut self) -> Result<(), ()> {
            self.disconnects += 1;
            self.state = SocketState::Closed;
            Ok(())
        }

        fn close(&mut self) -> Result<(), ()> {
            self.closes += 1;
            self.state = SocketState::Closed;
            Ok(())
        }

        fn state(&mut self) -> Result<SocketState, ()> {
            Ok(self.state)
        }

        fn available(&mut self) -> Result<usize, ()> {
            Ok(self.reads.front().map_or(0, Vec::len))
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            let data = self.reads.pop_front().unwrap_or_default();
            let n = data.len().min(buf.len());
            buf[..n].copy_from_slice(&data[..n]);
            Ok(n)
        }

        fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
            self.sent.extend_from_slice(data);
            Ok(data.len())
        }
    }

    #[test]
    fn test_valid_packet() {
        let mut socket = MockSocket::established();
        socket.reads.push_back(vec![0x41, 0x01, 0x00, 0xFF, 0x01]);
        let mut source = NetworkSource::new(socket, 1234, u16::MAX);
        let mut inbox = Command::empty();

        assert!(source.poll(&mut inbox));
        assert_eq!(inbox.code, 0x01);
        assert_eq!(inbox.data.as_slice(), &[0x00, 0xFF]);
        assert_eq!(inbox.source, Source::Network);
        assert_eq!(source.transport_mut().closes, 0);
    }

    #[test]
    fn test_bad_checksum_closes_session() {
        let mut socket = MockSocket::established();
        socket.reads.push_back(vec![0x41, b't', 0x03]);
        let mut source = NetworkSource::new(socket, 1234, u16::MAX);
        let mut inbox = Command::empty();

        assert!(!source.poll(&mut inbox));
        assert!(inbox.is_empty());
        assert_eq!(source.transport_mut().closes, 1);
    }

    #[test]
    fn test_too_short_closes_session() {
        let mut socket = MockSocket::established();
        socket.reads.push_back(vec![0x41]);
        let mut source = NetworkSource::new(socket, 1234, u16::MAX);
        let mut inbox = Command::empty();

        assert!(!source.poll(&mut inbox));
        assert_eq!(source.transport_mut().closes, 1);
    }

    #[test]
    fn test_closed_socket_reopened() {
        let mut socket = MockSocket::established();
        socket.state = SocketState::Closed;
        let mut source = NetworkSource::new(socket, 4321, u16::MAX);
        let mut inbox = Command::empty();

        assert!(!source.poll(&mut inbox));
        assert_eq!(source.transport_mut().opened_on, Some(4321));
        assert_eq!(source.transport_mut().state, SocketState::Listening);
    }

    #[test]
    fn test_closing_socket_disconnected() {
        let mut socket = MockSocket::established();
        socket.state = SocketState::Closing;
        let mut source = NetworkSource::new(socket, 1234, u16::MAX);
        let mut inbox = Command::empty();

        source.poll(&mut inbox);
        assert_eq!(source.transport_mut().disconnects, 1);
    }

    #[test]
    fn test_open_failure_retried() {
        let mut socket = MockSocket::established();
        socket.state = SocketState::Closed;
        socket.fail = true;
        let mut source = NetworkSource::new(socket, 1234, u16::MAX);
        let mut inbox = Command::empty();

        assert!(!source.poll(&mut inbox));
        source.transport_mut().fail = false;
        assert!(!source.poll(&mut inbox));
        assert_eq!(source.transport_mut().state, SocketState::Listening);
    }

    #[test]
    fn test_timeout_closes_active_session() {
        let socket = MockSocket::established();
        let mut source = NetworkSource::new(socket, 1234, 3);
        let mut inbox = Command::empty();

        for _ in 0..3 {
            source.poll(&mut inbox);
        }
        assert_eq!(source.transport_mut().closes, 1);
    }

    #[test]
    fn test_timeout_ignored_while_listening() {
        let mut socket = MockSocket::established();
        socket.state = SocketState::Listening;
        let mut source = NetworkSource::new(socket, 1234, 3);
        let mut inbox = Command::empty();

        for _ in 0..10 {
            source.poll(&mut inbox);
        }
        assert_eq!(source.transport_mut().closes, 0);
    }

    #[test]
    fn test_timeout_starts_when_peer_connects() {
        let mut socket = MockSocket::established();
        socket.state = SocketState::Listening;
        let mut source = NetworkSource::new(socket, 1234, 100);
        let mut inbox = Command::empty();

        for _ in 0..99 {
            source.poll(&mut inbox);
        }
        source.transport_mut().state = SocketState::Established;
        source.poll(&mut inbox);
        assert_eq!(source.transport_mut().closes, 0);

        for _ in 0..98 {
            source.poll(&mut inbox);
        }
        assert_eq!(source.transport_mut().closes, 0);
        source.poll(&mut inbox);
        assert_eq!(source.transport_mut().closes, 1);
    }

    #[test]
    fn test_respond_writes_frame() {
        let socket = MockSocket::established();
        let mut source = NetworkSource::new(socket, 1234, u16::MAX);
        source.respond(&Packet::status(Status::Error));
        assert_eq!(source.transport_mut().sent, [0x41, 0x01, 0x00, 0x01, 0x02]);
    }
}
