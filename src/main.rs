// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use core::cell::RefCell;

use cortex_m::interrupt::{self, Mutex};
use cortex_m_rt::entry;
use panic_halt as _;

use hal::{
    pac::{self, interrupt},
    prelude::*,
    serial::{self, Serial},
};
use stm32f7xx_hal as hal;

use spibridge::{
    config::{BridgeConfig, Watermarks},
    control::ControlLoop,
    hw::{BoardPin, BoardPins, BridgeUart, Console, ConsoleLogger, OutputLine, SpiSlave},
    Bridge, ErrorFlags,
};

/// Bytes per direction. Both rings together stay well under 1 KiB.
const BUFFER_CAPACITY: usize = 64;

const CONSOLE_BAUD: u32 = 115_200;

/// Main-loop passes between diagnostic reports.
const REPORT_INTERVAL: u32 = 2_000_000;

/// Service the peripherals from the main loop as well as from their interrupts.
const POLL_PERIPHERALS: bool = false;

type BoardBridge = Bridge<SpiSlave, BridgeUart, BUFFER_CAPACITY>;

static BRIDGE: Mutex<RefCell<Option<BoardBridge>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOD, dp.GPIOE);

    // USART1 (DBG)
    let console_cfg = serial::Config {
        baud_rate: CONSOLE_BAUD.bps(),
        ..Default::default()
    };
    let serial = Serial::new(
        dp.USART1,
        (pins.console.tx, pins.console.rx),
        &clocks,
        console_cfg,
    );
    if ConsoleLogger::init(Console::new(serial), log::LevelFilter::Info).is_err() {
        // No console to report on; a second logger means start-up ran twice.
        panic!();
    }

    // Bridge: configure both peripherals before any interrupt source is enabled.
    let config = BridgeConfig::default();
    let spi = SpiSlave::new(dp.SPI4, pins.spi4);
    let uart = BridgeUart::new(dp.USART2, pins.usart2, clocks.pclk1().raw());
    let bridge = BoardBridge::new(spi, uart, &config).unwrap_or_else(|err| {
        log::error!("bridge init failed: {}", err);
        panic!();
    });

    interrupt::free(|cs| {
        let mut slot = BRIDGE.borrow(cs).borrow_mut();
        slot.insert(bridge).start();
    });

    // Both vectors keep the reset priority, so neither handler preempts the other.
    unsafe {
        pac::NVIC::unmask(pac::Interrupt::SPI4);
        pac::NVIC::unmask(pac::Interrupt::USART2);
    }

    log::info!(
        "bridge up: {:?} {:?}, uart {} baud {:?} {:?}, {} B/dir",
        config.spi.mode,
        config.spi.bit_order,
        config.uart.baud_rate,
        config.uart.parity,
        config.uart.stop_bits,
        BUFFER_CAPACITY
    );

    // LEDs and flow control
    let mut led_red = OutputLine::active_low(BoardPin::new(pins.leds.red));
    let mut led_yellow = OutputLine::active_low(BoardPin::new(pins.leds.yellow));
    let mut led_green = OutputLine::active_low(BoardPin::new(pins.leds.green));
    let busy_line = OutputLine::active_low(BoardPin::new(pins.busy));
    let mut control = ControlLoop::new(busy_line, Watermarks::for_capacity(BUFFER_CAPACITY));

    let mut passes: u32 = 0;

    loop {
        let status = interrupt::free(|cs| {
            BRIDGE.borrow(cs).borrow_mut().as_mut().map(|bridge| {
                if POLL_PERIPHERALS {
                    bridge.poll();
                }
                bridge.status()
            })
        });

        let Some(status) = status else {
            continue;
        };

        let outcome = control.step(&status);
        if outcome.errors.intersects(ErrorFlags::DATA_LOSS) {
            led_red.assert();
        }
        led_yellow.set(control.busy_line().is_asserted());

        passes = passes.wrapping_add(1);
        if passes % REPORT_INTERVAL == 0 {
            led_green.toggle();
            control.report(&status);
            led_red.deassert();
        }
    }
}

#[interrupt]
fn SPI4() {
    interrupt::free(|cs| {
        if let Some(bridge) = BRIDGE.borrow(cs).borrow_mut().as_mut() {
            bridge.service_spi_interrupt();
        }
    });
}

#[interrupt]
fn USART2() {
    interrupt::free(|cs| {
        if let Some(bridge) = BRIDGE.borrow(cs).borrow_mut().as_mut() {
            bridge.service_uart_interrupt();
        }
    });
}
