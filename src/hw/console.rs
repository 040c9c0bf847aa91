// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Debug console on USART1 and the `log` backend that writes to it.
//!
//! Only main-line code logs. Interrupt handlers never touch the console, so the lock below is
//! never contended from an ISR and interrupts stay enabled while a line is printed.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* <baud_rate>
//! ```
//!
//! To close the debug terminal, press `Ctrl+A` then `Ctrl+\` then `y`.

use core::fmt::{self, Write as _};
use nb::block;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;
use stm32f7xx_hal::{
    pac,
    prelude::*,
    serial::{Instance, Pins, Serial, Tx},
};

/// Blocking transmit-only serial console.
pub struct Console<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Console<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Block until the hardware TX register has drained.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }
}

impl<U: Instance> fmt::Write for Console<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Console::write_str(self, s);
        Ok(())
    }
}

static CONSOLE: Mutex<Option<Console<pac::USART1>>> = Mutex::new(None);
static LOGGER: ConsoleLogger = ConsoleLogger;

/// `log` backend printing `[LEVEL] message` lines to the debug console.
pub struct ConsoleLogger;

impl ConsoleLogger {
    /// Install the console as the global logger.
    pub fn init(console: Console<pac::USART1>, level: LevelFilter) -> Result<(), SetLoggerError> {
        *CONSOLE.lock() = Some(console);
        log::set_logger(&LOGGER)?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // A record emitted while another is printing is dropped rather than waited for.
        if let Some(mut guard) = CONSOLE.try_lock() {
            if let Some(console) = guard.as_mut() {
                let _ = write!(console, "[{:<5}] {}\r\n", record.level(), record.args());
            }
        }
    }

    fn flush(&self) {
        if let Some(console) = CONSOLE.lock().as_mut() {
            console.flush();
        }
    }
}
