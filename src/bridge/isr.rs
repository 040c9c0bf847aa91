// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt handlers.
//!
//! One method per hardware event, each doing a single non-blocking buffer push or pop. The
//! `service_*` methods read the peripheral status and dispatch; they are what the vector table
//! entries call. Both vectors must share one priority so the handlers never preempt each other.

use crate::config::{SpiConfig, UartConfig};
use crate::hw::SerialPeripheral;

use super::{Bridge, DrainState};

impl<S, U, const N: usize> Bridge<S, U, N>
where
    S: SerialPeripheral<Config = SpiConfig>,
    U: SerialPeripheral<Config = UartConfig>,
{
    /// SPI receive complete: queue the byte for the UART.
    pub fn on_spi_receive(&mut self) {
        match self.spi.read_byte() {
            Ok(byte) => self.spi_to_uart.accept(byte, &mut self.uart),
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(err)) => {
                self.spi_state.latch(err);
                self.spi_to_uart.latch(err);
            }
        }
    }

    /// SPI transmit register empty: load the next byte for the master, or the filler.
    pub fn on_spi_byte_requested(&mut self) {
        self.uart_to_spi.feed(&mut self.spi);
    }

    /// UART transmit register empty: send the next byte, or go idle.
    pub fn on_uart_tx_ready(&mut self) {
        self.spi_to_uart.feed(&mut self.uart);
    }

    /// UART receive complete: queue the byte for the SPI master unless the frame was bad.
    pub fn on_uart_receive(&mut self) {
        match self.uart.read_byte() {
            Ok(byte) => self.uart_to_spi.accept(byte, &mut self.spi),
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(err)) => {
                self.uart_state.latch(err);
                self.uart_to_spi.latch(err);
            }
        }
    }

    /// Body of the SPI interrupt vector.
    pub fn service_spi_interrupt(&mut self) {
        if self.spi.byte_available() || self.spi.hardware_error().is_some() {
            self.on_spi_receive();
        }
        if self.spi.tx_ready() {
            self.on_spi_byte_requested();
        }
    }

    /// Body of the UART interrupt vector.
    pub fn service_uart_interrupt(&mut self) {
        if self.uart.byte_available() || self.uart.hardware_error().is_some() {
            self.on_uart_receive();
        }
        // TXE reads set whenever the UART is idle; only act on it while draining.
        if self.spi_to_uart.state() == DrainState::Draining && self.uart.tx_ready() {
            self.on_uart_tx_ready();
        }
    }
}
