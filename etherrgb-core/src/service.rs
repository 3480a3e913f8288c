//! Top-level EtheRGB service
//!
//! Ties the arbiter to the dimmer's fade ramp and provides the boot-time
//! helpers the firmware runs before entering its poll loop.

use etherrgb_hal::{NonVolatileStore, Reboot};

use crate::arbiter::Arbiter;
use crate::command::CommandProcessor;
use crate::config::STATIC_IP_NV_ADDR;
use crate::source::Sourcer;

/// Static address to use at boot
///
/// Reads the persisted address; an erased store (all `0xFF`) or a failed
/// read falls back to `default_ip`.
pub fn load_static_ip<S: NonVolatileStore>(store: &mut S, default_ip: [u8; 4]) -> [u8; 4] {
    let mut ip = [0u8; 4];
    match store.read_block(STATIC_IP_NV_ADDR, &mut ip) {
        Ok(()) if ip != [0xFF; 4] => ip,
        Ok(()) => {
            info!("no static ip stored, using default");
            default_ip
        }
        Err(e) => {
            error!("static ip read failed: {}", e);
            default_ip
        }
    }
}

/// Arbiter wired to the command processor
pub struct EtheRgb<'a, I, Se, Ne, St, R, const N: usize> {
    arbiter: Arbiter<I, Se, Ne, CommandProcessor<'a, St, R, N>>,
}

impl<'a, I, Se, Ne, St, R, const N: usize> EtheRgb<'a, I, Se, Ne, St, R, N>
where
    I: Sourcer,
    Se: Sourcer,
    Ne: Sourcer,
    St: NonVolatileStore,
    R: Reboot,
{
    pub fn new(input: I, serial: Se, network: Ne, processor: CommandProcessor<'a, St, R, N>) -> Self {
        Self {
            arbiter: Arbiter::new(input, serial, network, processor),
        }
    }

    pub fn arbiter(&self) -> &Arbiter<I, Se, Ne, CommandProcessor<'a, St, R, N>> {
        &self.arbiter
    }

    pub fn arbiter_mut(&mut self) -> &mut Arbiter<I, Se, Ne, CommandProcessor<'a, St, R, N>> {
        &mut self.arbiter
    }

    /// One main-loop iteration: an arbitration step, then a fade step
    pub fn poll(&mut self) {
        self.arbiter.poll();
        self.arbiter.dispatcher_mut().dimmer_mut().poll();
    }
}
