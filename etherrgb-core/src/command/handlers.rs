//! Command handlers
//!
//! Every handler except reboot writes a status response and returns
//! true. Validation failures answer `Status::Error` without touching
//! any state.

use etherrgb_hal::{NonVolatileStore, Reboot};
use etherrgb_protocol::{Command, Packet, Status};

use super::CommandProcessor;
use crate::config::STATIC_IP_NV_ADDR;

/// First `L` payload bytes, or `None` if the command carries fewer
fn payload<const L: usize>(command: &Command) -> Option<[u8; L]> {
    command.data.get(..L)?.try_into().ok()
}

fn respond(outbox: &mut Packet, status: Status) -> bool {
    *outbox = Packet::status(status);
    true
}

impl<S, R, const N: usize> CommandProcessor<'_, S, R, N>
where
    S: NonVolatileStore,
    R: Reboot,
{
    /// `'t'`: liveness check
    pub(super) fn handle_test(&mut self, _command: &Command, outbox: &mut Packet) -> bool {
        debug!("test command received");
        respond(outbox, Status::Ok)
    }

    /// `0x01 [channel, value]`
    pub(super) fn handle_set_channel(&mut self, command: &Command, outbox: &mut Packet) -> bool {
        let Some([channel, value]) = payload::<2>(command) else {
            warn!("set channel: short payload");
            return respond(outbox, Status::Error);
        };

        match self.dimmer.set_channel_value(channel as usize, value) {
            Ok(()) => respond(outbox, Status::Ok),
            Err(_) => {
                warn!("set channel: channel {=u8} out of range", channel);
                respond(outbox, Status::Error)
            }
        }
    }

    /// `0x02 [channel, target, speed]`
    pub(super) fn handle_fade_channel(&mut self, command: &Command, outbox: &mut Packet) -> bool {
        let Some([channel, target, speed]) = payload::<3>(command) else {
            warn!("fade channel: short payload");
            return respond(outbox, Status::Error);
        };

        let channel = channel as usize;
        let result = self
            .dimmer
            .set_fade_speed(channel, speed)
            .and_then(|()| self.dimmer.set_fade_target(channel, target));

        match result {
            Ok(()) => respond(outbox, Status::Ok),
            Err(_) => {
                warn!("fade channel: channel {=usize} out of range", channel);
                respond(outbox, Status::Error)
            }
        }
    }

    /// `0x03 [start, r, g, b]`: three consecutive channels
    pub(super) fn handle_set_group(&mut self, command: &Command, outbox: &mut Packet) -> bool {
        let Some([start, r, g, b]) = payload::<4>(command) else {
            warn!("set group: short payload");
            return respond(outbox, Status::Error);
        };

        let start = start as usize;
        if N < 3 || start > N - 3 {
            warn!("set group: start {=usize} out of range", start);
            return respond(outbox, Status::Error);
        }

        for (offset, value) in [r, g, b].into_iter().enumerate() {
            if self.dimmer.set_channel_value(start + offset, value).is_err() {
                return respond(outbox, Status::Error);
            }
        }
        respond(outbox, Status::Ok)
    }

    /// `0xF0 [ip0..ip3]`: persist the static address, once per boot
    ///
    /// Only bytes that differ from the stored value are written. The
    /// latch closes on the first byte actually written, and from then on
    /// the answer is OK even if a later byte fails to store.
    pub(super) fn handle_set_static_ip(&mut self, command: &Command, outbox: &mut Packet) -> bool {
        if self.ip_latched {
            warn!("set ip: already written this boot");
            return respond(outbox, Status::Error);
        }

        let Some(requested) = payload::<4>(command) else {
            warn!("set ip: short payload");
            return respond(outbox, Status::Error);
        };

        let mut stored = [0u8; 4];
        if let Err(e) = self.store.read_block(STATIC_IP_NV_ADDR, &mut stored) {
            error!("set ip: store read failed: {}", e);
            return respond(outbox, Status::Error);
        }

        let mut written = false;
        for (offset, (old, new)) in stored.iter().zip(requested.iter()).enumerate() {
            if old == new {
                continue;
            }
            match self.store.write_byte(STATIC_IP_NV_ADDR + offset as u16, *new) {
                Ok(()) => {
                    written = true;
                    self.ip_latched = true;
                }
                Err(e) => {
                    error!("set ip: store write failed: {}", e);
                    if !written {
                        return respond(outbox, Status::Error);
                    }
                    break;
                }
            }
        }

        if written {
            info!(
                "static ip set to {}.{}.{}.{}, active after reboot",
                requested[0], requested[1], requested[2], requested[3]
            );
        } else {
            warn!("set ip: address unchanged, nothing written");
        }
        respond(outbox, Status::from_success(written))
    }

    /// `0xFE`: reboot, never answers
    pub(super) fn handle_reboot(&mut self, _command: &Command, _outbox: &mut Packet) -> bool {
        info!("reboot requested");
        self.reboot.reboot()
    }
}
