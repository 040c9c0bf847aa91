// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Peripheral Driver Layer
//!
//! [`SerialPeripheral`] is the capability set the bridge needs from each serial unit. It carries no
//! buffering or retry logic: anything that cannot complete immediately fails with
//! [`nb::Error::WouldBlock`] (the peripheral is *not ready*) instead of spinning, so the same calls
//! are safe from interrupt context.
//!
//! With the `board` feature this module also provides the STM32F777 implementations: SPI4 as a
//! hardware-NSS slave (`SpiSlave`), USART2 as the bridged UART (`BridgeUart`), and USART1 as
//! the debug `Console`.

use crate::error::{Error, ErrorFlags};

pub mod line;

pub use line::{ActiveLevel, OutputLine};

#[cfg(feature = "board")]
pub mod console;
#[cfg(feature = "board")]
pub mod pins;
#[cfg(feature = "board")]
pub mod spi_slave;
#[cfg(feature = "board")]
pub mod uart;

#[cfg(feature = "board")]
pub use console::{Console, ConsoleLogger};
#[cfg(feature = "board")]
pub use pins::{BoardPin, BoardPins};
#[cfg(feature = "board")]
pub use spi_slave::SpiSlave;
#[cfg(feature = "board")]
pub use uart::BridgeUart;

/// Minimal non-blocking interface over one serial peripheral.
pub trait SerialPeripheral {
    type Config;

    /// Program the peripheral. Interrupt sources stay disabled.
    fn initialize(&mut self, config: &Self::Config) -> Result<(), Error>;

    /// Enable the receive (and error) interrupt sources.
    fn enable_interrupts(&mut self);

    /// A received byte is waiting in the data register.
    fn byte_available(&self) -> bool;

    /// Latched hardware fault, if any. Does not clear it.
    fn hardware_error(&self) -> Option<Error>;

    /// Take the received byte. A latched hardware fault is reported (and cleared) instead of data.
    fn read_byte(&mut self) -> nb::Result<u8, Error>;

    /// The transmit data register can accept a byte.
    fn tx_ready(&self) -> bool;

    /// Load one byte for transmission. Fails with `WouldBlock` while the transmitter is busy.
    fn send_byte(&mut self, byte: u8) -> nb::Result<(), Error>;

    /// Arm or disarm the transmit-ready interrupt.
    fn set_tx_interrupt(&mut self, enabled: bool);
}

/// Software view of one peripheral.
#[derive(Copy, Clone, Debug)]
pub struct PeripheralState<C> {
    enabled: bool,
    config: C,
    errors: ErrorFlags,
}

impl<C> PeripheralState<C> {
    /// State for a peripheral that has been configured but not yet enabled.
    pub const fn new(config: C) -> Self {
        Self {
            enabled: false,
            config,
            errors: ErrorFlags::empty(),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Hardware faults latched since the last [`take_errors`](Self::take_errors).
    #[inline]
    pub fn errors(&self) -> ErrorFlags {
        self.errors
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn latch(&mut self, err: Error) {
        self.errors |= err.flag();
    }

    /// Read and clear the latched faults.
    pub fn take_errors(&mut self) -> ErrorFlags {
        core::mem::take(&mut self.errors)
    }
}
