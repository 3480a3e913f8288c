//! EtheRGB - RGB Dimmer Firmware
//!
//! Main firmware binary for RP2040-based dimmer boards. Commands arrive
//! over UART0, a W5100 TCP socket, or push buttons; one main loop polls
//! them in turn and drives three bit-angle-modulated outputs.
//!
//! Interrupts:
//! - `UART0_IRQ` moves received bytes into the serial ring buffer
//! - `PWM_IRQ_WRAP` displays the next BAM bit plane

#![no_std]
#![no_main]

use core::cell::RefCell;

use critical_section::Mutex;
use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::pwm::Pwm;
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{Config as UartConfig, Uart};
use {defmt_rtt as _, panic_probe as _};

use etherrgb_core::config::{
    BindingConfig, DeviceConfig, Trigger, MAX_CHANNELS, SERIAL_RING_CAPACITY,
};
use etherrgb_core::{
    load_static_ip, BamGenerator, ChannelLevels, CommandProcessor, Dimmer, EtheRgb, InputSource,
    NetworkSource, SerialSource, SharedRingBuffer,
};
use etherrgb_drivers::network::W5100;
use etherrgb_hal::Watchdog;
use etherrgb_hal_rp2040::uart as rp_uart;
use etherrgb_hal_rp2040::{
    BamTimer, FlashNvStore, RpInput, RpOutput, RpUartTx, RpWatchdog, WatchdogReboot,
};

/// Settings from device.toml
mod device_config {
    use super::{BindingConfig, DeviceConfig, Trigger};

    include!(concat!(env!("OUT_DIR"), "/device_config.rs"));
}

/// Serial command link speed
const UART_BAUD: u32 = 1_000_000;

/// W5100 SPI clock
const SPI_FREQUENCY: u32 = 8_000_000;

/// BAM timer: 125 MHz / 16, 32 ticks per compare count
///
/// One full frame is 510 counts, about 480 Hz.
const BAM_DIVIDER: u8 = 16;
const BAM_TICKS_PER_COUNT: u16 = 32;
const BAM_PWM_SLICE: usize = 0;

/// Everything the BAM interrupt touches
struct BamOutput {
    generator: BamGenerator,
    outputs: [RpOutput<'static>; 3],
    timer: BamTimer<'static>,
}

static SERIAL_RX: SharedRingBuffer<SERIAL_RING_CAPACITY> = SharedRingBuffer::new();
static LEVELS: ChannelLevels<MAX_CHANNELS> = ChannelLevels::new();
static BAM: Mutex<RefCell<Option<BamOutput>>> = Mutex::new(RefCell::new(None));

#[interrupt]
fn UART0_IRQ() {
    while let Some(byte) = rp_uart::read_rx_byte() {
        if !SERIAL_RX.push(byte) {
            warn!("serial rx overflow");
        }
    }
}

#[interrupt]
fn PWM_IRQ_WRAP() {
    critical_section::with(|cs| {
        if let Some(bam) = BAM.borrow_ref_mut(cs).as_mut() {
            bam.timer.clear_interrupt();
            bam.generator
                .fire(&LEVELS, &mut bam.outputs[..], &mut bam.timer);
        }
    });
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("EtheRGB firmware v{} starting...", env!("CARGO_PKG_VERSION"));

    let p = embassy_rp::init(Default::default());
    let device = device_config::DEVICE;

    // Start supervision first so a hang during bring-up still resets
    let mut watchdog = RpWatchdog::start(p.WATCHDOG);

    let mut store = FlashNvStore::new(p.FLASH);
    let ip = load_static_ip(&mut store, device.default_ip);
    info!("Static IP {}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]);

    // UART0: blocking TX, RX drained by UART0_IRQ
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = UART_BAUD;
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let (tx, _rx) = uart.split();
    rp_uart::enable_rx_interrupt();
    info!("UART initialized at {} baud", UART_BAUD);

    // W5100 on SPI0 (SCK=GPIO18, MOSI=GPIO19, MISO=GPIO16, CS=GPIO17)
    let mut spi_config = spi::Config::default();
    spi_config.frequency = SPI_FREQUENCY;
    let spi = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let mut w5100 = W5100::new(spi, cs, 0);
    match w5100.init() {
        Ok(()) => {
            if let Err(e) = w5100.set_network(&device.mac, &device.gateway, &device.subnet, &ip) {
                error!("W5100 network setup failed: {}", Debug2Format(&e));
            } else {
                info!("W5100 initialized, listening on port {}", device.server_port);
            }
        }
        Err(e) => error!("W5100 init failed: {}", Debug2Format(&e)),
    }

    // Buttons on GPIO2-5, active low
    let buttons = [
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
        Input::new(p.PIN_4, Pull::Up),
        Input::new(p.PIN_5, Pull::Up),
    ];
    let mut input = InputSource::new();
    for (index, (pin, binding)) in buttons
        .into_iter()
        .zip(device_config::BINDINGS.iter())
        .enumerate()
    {
        if binding.is_unused() {
            continue;
        }
        match input.configure(index, RpInput::new(pin), binding) {
            Ok(()) => info!("Input {} bound to command {=u8:#x}", index, binding.code),
            Err(e) => warn!("Input {} binding rejected: {}", index, e),
        }
    }

    // RGB outputs on GPIO13-15, driven from PWM_IRQ_WRAP
    let outputs = [
        RpOutput::new(Output::new(p.PIN_13, Level::Low)),
        RpOutput::new(Output::new(p.PIN_14, Level::Low)),
        RpOutput::new(Output::new(p.PIN_15, Level::Low)),
    ];
    let pwm = Pwm::new_free(p.PWM_SLICE0, Default::default());
    let mut timer = BamTimer::new(pwm, BAM_PWM_SLICE, BAM_DIVIDER, BAM_TICKS_PER_COUNT);
    let generator = BamGenerator::new();
    // TOP latches at wrap; load plane 0's weight before the first one
    generator.prime(&mut timer);
    timer.enable_interrupt();

    let dimmer = Dimmer::new(&LEVELS);
    critical_section::with(|cs| {
        BAM.borrow_ref_mut(cs).replace(BamOutput {
            generator,
            outputs,
            timer,
        });
    });

    // SAFETY: both handlers only touch state behind critical sections,
    // and that state is initialised above
    unsafe {
        cortex_m::peripheral::NVIC::unmask(interrupt::UART0_IRQ);
        cortex_m::peripheral::NVIC::unmask(interrupt::PWM_IRQ_WRAP);
    }
    info!("BAM output running");

    let serial = SerialSource::new(&SERIAL_RX, RpUartTx::new(tx), device.serial_timeout_polls);
    let network = NetworkSource::new(w5100, device.server_port, device.network_timeout_polls);
    let processor = CommandProcessor::new(dimmer, store, WatchdogReboot);
    let mut service = EtheRgb::new(input, serial, network, processor);

    info!("EtheRGB ready");

    loop {
        service.poll();
        watchdog.feed();
        yield_now().await;
    }
}
