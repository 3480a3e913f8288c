//! Command dispatch
//!
//! [`CommandProcessor`] owns everything command handlers act on: the
//! dimmer, the persistent store, and the reboot primitive. Dispatch is a
//! linear scan over a code-keyed handler table.

mod handlers;

use etherrgb_hal::{NonVolatileStore, Reboot};
use etherrgb_protocol::{Command, CommandCode, Packet};

use crate::dimmer::Dimmer;

/// Executes a command and fills in its response
pub trait Dispatch {
    /// Run the handler for `inbox`
    ///
    /// Returns true if `outbox` holds a response that must be sent.
    /// Unknown codes are a no-op returning false.
    fn dispatch(&mut self, inbox: &Command, outbox: &mut Packet) -> bool;
}

type Handler<P> = fn(&mut P, &Command, &mut Packet) -> bool;

/// Handler context and dispatch table
pub struct CommandProcessor<'a, S, R, const N: usize> {
    dimmer: Dimmer<'a, N>,
    store: S,
    reboot: R,
    /// Set once the static address was written this boot
    ip_latched: bool,
}

impl<'a, S, R, const N: usize> CommandProcessor<'a, S, R, N>
where
    S: NonVolatileStore,
    R: Reboot,
{
    const HANDLERS: [(CommandCode, Handler<Self>); 6] = [
        (CommandCode::Test, Self::handle_test),
        (CommandCode::SetChannel, Self::handle_set_channel),
        (CommandCode::FadeChannel, Self::handle_fade_channel),
        (CommandCode::SetGroup, Self::handle_set_group),
        (CommandCode::SetStaticIp, Self::handle_set_static_ip),
        (CommandCode::Reboot, Self::handle_reboot),
    ];

    pub fn new(dimmer: Dimmer<'a, N>, store: S, reboot: R) -> Self {
        Self {
            dimmer,
            store,
            reboot,
            ip_latched: false,
        }
    }

    pub fn dimmer(&self) -> &Dimmer<'a, N> {
        &self.dimmer
    }

    pub fn dimmer_mut(&mut self) -> &mut Dimmer<'a, N> {
        &mut self.dimmer
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// True once a static address write succeeded this boot
    pub fn ip_latched(&self) -> bool {
        self.ip_latched
    }
}

impl<S, R, const N: usize> Dispatch for CommandProcessor<'_, S, R, N>
where
    S: NonVolatileStore,
    R: Reboot,
{
    fn dispatch(&mut self, inbox: &Command, outbox: &mut Packet) -> bool {
        let handler = Self::HANDLERS
            .iter()
            .find(|(code, _)| code.to_byte() == inbox.code)
            .map(|(_, handler)| *handler);

        match handler {
            Some(handler) => handler(self, inbox, outbox),
            None => {
                warn!("dispatch: unknown command code {=u8:#x}", inbox.code);
                false
            }
        }
    }
}
