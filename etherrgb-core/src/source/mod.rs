//! Command sourcers
//!
//! A sourcer fills the shared inbox from one transport and, where the
//! transport can talk back, sends the response to the command it
//! produced.

mod input;
mod network;
mod serial;

pub use input::{Binding, BindingError, InputSource};
pub use network::NetworkSource;
pub use serial::SerialSource;

use etherrgb_protocol::{Command, Packet};

/// One transport feeding the arbiter
pub trait Sourcer {
    /// Make one non-blocking attempt to fill `inbox`
    ///
    /// Returns true if a complete command was placed in the inbox.
    fn poll(&mut self, inbox: &mut Command) -> bool;

    /// Send a response to the last command this sourcer produced
    fn respond(&mut self, response: &Packet);
}

impl<T: Sourcer + ?Sized> Sourcer for &mut T {
    fn poll(&mut self, inbox: &mut Command) -> bool {
        (**self).poll(inbox)
    }

    fn respond(&mut self, response: &Packet) {
        (**self).respond(response)
    }
}
