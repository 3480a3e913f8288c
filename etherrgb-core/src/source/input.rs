//! Digital-input sourcer
//!
//! Up to [`MAX_INPUT_BINDINGS`] pins, each bound to a fixed command.
//! One binding is sampled per poll in round-robin order, so a pin's
//! edge detection updates once every `MAX_INPUT_BINDINGS` polls.

use etherrgb_hal::InputPin;
use etherrgb_protocol::{has_command, required_length, Command, FrameError, Packet, Source};

use super::Sourcer;
use crate::config::{BindingConfig, Trigger, MAX_INPUT_BINDINGS};

/// Errors from binding setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindingError {
    /// Slot index beyond [`MAX_INPUT_BINDINGS`]
    IndexOutOfRange,
    /// Command payload does not fit a packet
    PayloadTooLarge,
    /// Code is not in the descriptor table
    UnknownCommand,
    /// Payload length differs from the code's required length
    LengthMismatch,
}

impl From<FrameError> for BindingError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::UnknownCommand => BindingError::UnknownCommand,
            FrameError::LengthMismatch => BindingError::LengthMismatch,
            _ => BindingError::PayloadTooLarge,
        }
    }
}

/// Check a bound command against the descriptor table
fn validate(command: &Command) -> Result<(), BindingError> {
    if !has_command(command.code) {
        return Err(BindingError::UnknownCommand);
    }
    if command.data.len() != required_length(command.code) as usize {
        return Err(BindingError::LengthMismatch);
    }
    Ok(())
}

/// A pin bound to a command
pub struct Binding<P> {
    pin: P,
    trigger: Trigger,
    command: Command,
    /// Sample history, bit 0 is the latest sample
    history: u8,
}

impl<P: InputPin> Binding<P> {
    pub fn new(pin: P, trigger: Trigger, command: Command) -> Self {
        Self {
            pin,
            trigger,
            command: Command {
                source: Source::DigitalInput,
                ..command
            },
            history: 0,
        }
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Take a sample and evaluate the trigger
    fn sample(&mut self) -> bool {
        let current = self.pin.read().as_bit();
        self.history = (self.history << 1) | current;
        let previous = (self.history >> 1) & 1;
        self.trigger.fires(previous == 1, current == 1)
    }
}

pub struct InputSource<P> {
    bindings: [Option<Binding<P>>; MAX_INPUT_BINDINGS],
    index: usize,
}

impl<P: InputPin> Default for InputSource<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: InputPin> InputSource<P> {
    /// Create a sourcer with every slot unused
    pub fn new() -> Self {
        Self {
            bindings: core::array::from_fn(|_| None),
            index: 0,
        }
    }

    /// Bind `pin` in slot `index`
    ///
    /// The command must be a known code carrying exactly its required
    /// payload; the slot is left unchanged otherwise.
    pub fn set_binding(
        &mut self,
        index: usize,
        pin: P,
        trigger: Trigger,
        command: Command,
    ) -> Result<(), BindingError> {
        let slot = self
            .bindings
            .get_mut(index)
            .ok_or(BindingError::IndexOutOfRange)?;
        validate(&command)?;
        *slot = Some(Binding::new(pin, trigger, command));
        Ok(())
    }

    /// Bind `pin` in slot `index` from a configuration entry
    pub fn configure(
        &mut self,
        index: usize,
        pin: P,
        config: &BindingConfig,
    ) -> Result<(), BindingError> {
        let command = config.to_command()?;
        self.set_binding(index, pin, config.trigger, command)
    }

    /// Binding in slot `index`, `None` if unused
    pub fn binding(&self, index: usize) -> Result<Option<&Binding<P>>, BindingError> {
        self.bindings
            .get(index)
            .map(Option::as_ref)
            .ok_or(BindingError::IndexOutOfRange)
    }

    /// Restart the round-robin at slot 0
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

impl<P: InputPin> Sourcer for InputSource<P> {
    fn poll(&mut self, inbox: &mut Command) -> bool {
        let slot = &mut self.bindings[self.index];
        self.index = (self.index + 1) % MAX_INPUT_BINDINGS;

        let Some(binding) = slot else {
            return false;
        };
        if !binding.sample() {
            return false;
        }

        trace!("input: binding fired, command {=u8:#x}", binding.command.code);
        *inbox = binding.command.clone();
        true
    }

    fn respond(&mut self, _response: &Packet) {
        debug!("input: response dropped");
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::cell::Cell;
    use std::rc::Rc;

    use etherrgb_hal::Level;

    use super::*;

    /// Pin whose level is shared with the test body
    #[derive(Clone)]
    struct MockPin(Rc<Cell<Level>>);

    impl InputPin for MockPin {
        fn read(&mut self) -> Level {
            self.0.get()
        }
    }

    fn mock_pin() -> (MockPin, Rc<Cell<Level>>) {
        let level = Rc::new(Cell::new(Level::Low));
        (MockPin(level.clone()), level)
    }

    fn test_command() -> Command {
        Command::new(0x01, &[0, 255], Source::None).unwrap()
    }

    /// Poll a full round so slot 0 is sampled once
    fn poll_round(source: &mut InputSource<MockPin>, inbox: &mut Command) -> bool {
        let mut fired = false;
        for _ in 0..MAX_INPUT_BINDINGS {
            fired |= source.poll(inbox);
        }
        fired
    }

    #[test]
    fn test_rising_edge() {
        let (pin, level) = mock_pin();
        let mut source = InputSource::new();
        source
            .set_binding(0, pin, Trigger::Rising, test_command())
            .unwrap();
        let mut inbox = Command::empty();

        assert!(!poll_round(&mut source, &mut inbox));
        level.set(Level::High);
        assert!(poll_round(&mut source, &mut inbox));
        assert_eq!(inbox.code, 0x01);
        assert_eq!(inbox.source, Source::DigitalInput);

        inbox.clear();
        assert!(!poll_round(&mut source, &mut inbox));
        assert!(inbox.is_empty());
    }

    #[test]
    fn test_falling_edge() {
        let (pin, level) = mock_pin();
        level.set(Level::High);
        let mut source = InputSource::new();
        source
            .set_binding(0, pin, Trigger::Falling, test_command())
            .unwrap();
        let mut inbox = Command::empty();

        poll_round(&mut source, &mut inbox);
        inbox.clear();
        level.set(Level::Low);
        assert!(poll_round(&mut source, &mut inbox));
    }

    #[test]
    fn test_level_low_fires_every_sample() {
        let (pin, _level) = mock_pin();
        let mut source = InputSource::new();
        source.set_binding(0, pin, Trigger::Low, test_command()).unwrap();
        let mut inbox = Command::empty();

        assert!(poll_round(&mut source, &mut inbox));
        assert!(poll_round(&mut source, &mut inbox));
    }

    #[test]
    fn test_one_binding_per_poll() {
        let (pin_a, _) = mock_pin();
        let (pin_b, _) = mock_pin();
        let mut source = InputSource::new();
        source.set_binding(0, pin_a, Trigger::Low, test_command()).unwrap();
        source.set_binding(2, pin_b, Trigger::Low, test_command()).unwrap();
        let mut inbox = Command::empty();

        // Slots 0, 1 (unused), 2, 3 (unused)
        assert!(source.poll(&mut inbox));
        assert!(!source.poll(&mut inbox));
        assert!(source.poll(&mut inbox));
        assert!(!source.poll(&mut inbox));
    }

    #[test]
    fn test_trigger_none_never_fires() {
        let (pin, level) = mock_pin();
        let mut source = InputSource::new();
        source.set_binding(0, pin, Trigger::None, test_command()).unwrap();
        let mut inbox = Command::empty();

        for l in [Level::High, Level::Low, Level::High] {
            level.set(l);
            assert!(!poll_round(&mut source, &mut inbox));
        }
    }

    #[test]
    fn test_binding_bounds() {
        let (pin, _) = mock_pin();
        let mut source = InputSource::new();
        assert_eq!(
            source.set_binding(MAX_INPUT_BINDINGS, pin, Trigger::Rising, test_command()),
            Err(BindingError::IndexOutOfRange)
        );
        assert!(source.binding(MAX_INPUT_BINDINGS).is_err());
        assert!(source.binding(0).unwrap().is_none());
    }

    #[test]
    fn test_configure_from_binding_config() {
        let (pin, _) = mock_pin();
        let mut source = InputSource::new();
        let config = BindingConfig {
            trigger: Trigger::Change,
            code: 0x03,
            data: [0, 1, 2, 3, 0, 0, 0, 0],
            data_len: 4,
        };
        source.configure(1, pin, &config).unwrap();

        let binding = source.binding(1).unwrap().unwrap();
        assert_eq!(binding.trigger(), Trigger::Change);
        assert_eq!(binding.command().data.as_slice(), &[0, 1, 2, 3]);
        assert_eq!(binding.command().source, Source::DigitalInput);
    }
    #[test]
    fn test_binding_rejects_wrong_length() {
        let (pin, _) = mock_pin();
        let mut source = InputSource::new();
        let command = Command::new(0x01, &[1, 2, 3, 4, 5], Source::None).unwrap();
        assert_eq!(
            source.set_binding(0, pin, Trigger::Low, command),
            Err(BindingError::LengthMismatch)
        );
        assert!(source.binding(0).unwrap().is_none());

        let mut inbox = Command::empty();
        assert!(!poll_round(&mut source, &mut inbox));
        assert!(inbox.is_empty());
    }

    #[test]
    fn test_binding_rejects_unknown_code() {
        let (pin, _) = mock_pin();
        let mut source = InputSource::new();
        let command = Command::new(0x55, &[], Source::None).unwrap();
        assert_eq!(
            source.set_binding(0, pin, Trigger::Low, command),
            Err(BindingError::UnknownCommand)
        );
        assert!(source.binding(0).unwrap().is_none());
    }

    #[test]
    fn test_configure_rejects_short_payload() {
        let (pin, _) = mock_pin();
        let mut source = InputSource::new();
        let config = BindingConfig {
            trigger: Trigger::Rising,
            code: 0x02,
            data: [0, 128, 0, 0, 0, 0, 0, 0],
            data_len: 2,
        };
        assert_eq!(source.configure(0, pin, &config), Err(BindingError::LengthMismatch));
    }
}
