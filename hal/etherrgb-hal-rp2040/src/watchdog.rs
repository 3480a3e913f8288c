//! Watchdog-based supervisor

use embassy_rp::peripherals::WATCHDOG;
use embassy_rp::watchdog::Watchdog as RpWatchdogDriver;
use embassy_rp::Peri;
use embassy_time::Duration;
use etherrgb_hal::{Reboot, Watchdog};

/// Watchdog timeout; the main loop must feed faster than this
pub const WATCHDOG_TIMEOUT: Duration = Duration::from_millis(500);

/// Running hardware watchdog, fed from the main loop
pub struct RpWatchdog {
    watchdog: RpWatchdogDriver,
}

impl RpWatchdog {
    /// Start the watchdog with [`WATCHDOG_TIMEOUT`]
    pub fn start(peripheral: Peri<'static, WATCHDOG>) -> Self {
        let mut watchdog = RpWatchdogDriver::new(peripheral);
        watchdog.pause_on_debug(true);
        watchdog.start(WATCHDOG_TIMEOUT);
        Self { watchdog }
    }
}

impl Watchdog for RpWatchdog {
    fn feed(&mut self) {
        self.watchdog.feed();
    }
}

/// Reboot through the running watchdog
///
/// Masks interrupts and spins; the main loop never feeds again, so the
/// watchdog resets the chip within [`WATCHDOG_TIMEOUT`].
pub struct WatchdogReboot;

impl Reboot for WatchdogReboot {
    fn reboot(&mut self) -> ! {
        cortex_m::interrupt::disable();
        loop {
            cortex_m::asm::nop();
        }
    }
}
