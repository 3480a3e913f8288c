//! Source arbitration
//!
//! The arbiter owns the mailbox and the three sourcers. While idle it
//! polls one sourcer per call in round-robin order; once a command is in
//! the inbox it dispatches it, routes the response back to the
//! originating transport, and clears the mailbox. No sourcer is polled
//! while a command is in flight, so at most one command exists at a time.

use etherrgb_protocol::Source;

use crate::command::Dispatch;
use crate::mailbox::Mailbox;
use crate::source::Sourcer;

/// Arbiter states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArbiterState {
    /// Polling sourcers for the next command
    Idle,
    /// A command is in the inbox
    Processing,
}

/// Sourcer selected on an idle poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Turn {
    Input,
    Serial,
    Network,
}

impl Turn {
    fn next(self) -> Self {
        match self {
            Turn::Input => Turn::Serial,
            Turn::Serial => Turn::Network,
            Turn::Network => Turn::Input,
        }
    }
}

pub struct Arbiter<I, S, N, D> {
    state: ArbiterState,
    turn: Turn,
    mailbox: Mailbox,
    input: I,
    serial: S,
    network: N,
    dispatcher: D,
}

impl<I, S, N, D> Arbiter<I, S, N, D>
where
    I: Sourcer,
    S: Sourcer,
    N: Sourcer,
    D: Dispatch,
{
    pub fn new(input: I, serial: S, network: N, dispatcher: D) -> Self {
        Self {
            state: ArbiterState::Idle,
            turn: Turn::Input,
            mailbox: Mailbox::new(),
            input,
            serial,
            network,
            dispatcher,
        }
    }

    pub fn state(&self) -> ArbiterState {
        self.state
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }

    /// Run one arbitration step
    pub fn poll(&mut self) {
        match self.state {
            ArbiterState::Idle => self.poll_sources(),
            ArbiterState::Processing => self.process(),
        }
    }

    fn poll_sources(&mut self) {
        let turn = self.turn;
        self.turn = turn.next();

        let inbox = &mut self.mailbox.inbox;
        let complete = match turn {
            Turn::Input => self.input.poll(inbox),
            Turn::Serial => self.serial.poll(inbox),
            Turn::Network => self.network.poll(inbox),
        };

        if complete && !self.mailbox.is_empty() {
            self.state = ArbiterState::Processing;
        }
    }

    fn process(&mut self) {
        if self.mailbox.is_empty() {
            panic!("arbiter: processing with an empty inbox");
        }

        let Mailbox { inbox, outbox } = &mut self.mailbox;
        if self.dispatcher.dispatch(inbox, outbox) {
            match inbox.source {
                Source::Serial => self.serial.respond(outbox),
                Source::Network => self.network.respond(outbox),
                Source::DigitalInput => self.input.respond(outbox),
                Source::None => {}
            }
        }

        self.mailbox.clear();
        self.state = ArbiterState::Idle;
    }
}
