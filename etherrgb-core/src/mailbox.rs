//! Single-slot command/response handoff
//!
//! One inbox holds the command currently being processed, one outbox
//! holds the response to it. The arbiter owns the mailbox and lends it
//! to exactly one sourcer or the dispatcher at a time.

use etherrgb_protocol::{Command, Packet, Status, RESPONSE_CODE};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mailbox {
    pub inbox: Command,
    pub outbox: Packet,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            inbox: Command::empty(),
            outbox: Packet::empty(RESPONSE_CODE),
        }
    }

    /// True when no sourcer has filled the inbox
    pub fn is_empty(&self) -> bool {
        self.inbox.is_empty()
    }

    /// Write a status response into the outbox
    pub fn respond(&mut self, status: Status) {
        self.outbox = Packet::status(status);
    }

    /// Empty both slots for the next cycle
    pub fn clear(&mut self) {
        self.inbox.clear();
        self.outbox.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etherrgb_protocol::Source;

    #[test]
    fn test_clear_empties_both_slots() {
        let mut mailbox = Mailbox::new();
        mailbox.inbox = Command::new(b't', &[], Source::Network).unwrap();
        mailbox.respond(Status::Ok);
        assert!(!mailbox.is_empty());
        assert_eq!(mailbox.outbox.data.len(), 2);

        mailbox.clear();
        assert!(mailbox.is_empty());
        assert!(mailbox.outbox.is_empty());
    }
}
