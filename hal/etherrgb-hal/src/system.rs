//! System supervisor hooks

/// Graceful reboot primitive
///
/// Never returns: the device halts forward progress until an external
/// supervisor (typically the watchdog) resets it.
pub trait Reboot {
    fn reboot(&mut self) -> !;
}

/// Hardware watchdog
pub trait Watchdog {
    /// Restart the watchdog countdown
    fn feed(&mut self);
}
