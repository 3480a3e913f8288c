//! Network socket abstractions
//!
//! A [`Transport`] is one server socket on a network interface chip.
//! The chip runs the TCP state machine; the firmware only opens the
//! socket, puts it into listen mode, and moves bytes in and out.

/// Connection state reported by the network chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SocketState {
    /// Socket is closed and must be re-opened
    Closed,
    /// Socket is opened but not yet listening
    Init,
    /// Waiting for a peer to connect
    Listening,
    /// Peer connected, data can flow
    Established,
    /// Peer has half-closed the connection
    Closing,
    /// Any transient state handled by the chip (SYN, FIN, ...)
    Other(u8),
}

/// Connection-oriented byte transport
///
/// All operations are non-blocking from the caller's point of view:
/// `read`/`write` move whatever the chip can accept right now.
pub trait Transport {
    /// Error type for bus or chip failures
    type Error;

    /// Open the socket in TCP mode bound to `port`
    fn open(&mut self, port: u16) -> Result<(), Self::Error>;

    /// Put an opened socket into listen (server) mode
    fn listen(&mut self) -> Result<(), Self::Error>;

    /// Gracefully disconnect an established or half-closed session
    fn disconnect(&mut self) -> Result<(), Self::Error>;

    /// Close the socket immediately
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Query the current connection state
    fn state(&mut self) -> Result<SocketState, Self::Error>;

    /// Number of received bytes waiting to be read
    fn available(&mut self) -> Result<usize, Self::Error>;

    /// Read up to `buf.len()` bytes, returning the count read
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Queue `data` for transmission, returning the count accepted
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Check if the socket is closed
    fn is_closed(&mut self) -> Result<bool, Self::Error> {
        Ok(self.state()? == SocketState::Closed)
    }

    /// Check if the socket is waiting for a peer
    fn is_listening(&mut self) -> Result<bool, Self::Error> {
        Ok(self.state()? == SocketState::Listening)
    }

    /// Check if the peer has half-closed the session
    fn is_closing(&mut self) -> Result<bool, Self::Error> {
        Ok(self.state()? == SocketState::Closing)
    }
}
