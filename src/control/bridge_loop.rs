// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Main-line supervisor for the bridge.
//!
//! Each pass takes a [`BridgeStatus`] snapshot, drives the ready/busy line from the SPI→UART
//! occupancy, and folds any latched errors into [`Diagnostics`].
//!
//! Typical usage pattern:
//!
//! ```ignore
//! loop {
//!     let status = interrupt::free(|cs| bridge(cs).status());
//!     control.step(&status);
//! }
//! ```

use embedded_hal::digital::OutputPin;

use crate::bridge::{BridgeDirection, BridgeStatus};
use crate::config::Watermarks;
use crate::control::diagnostics::Diagnostics;
use crate::control::flow::{FlowState, Hysteresis};
use crate::error::ErrorFlags;
use crate::hw::OutputLine;

/// Whether the busy line follows buffer occupancy.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FlowMode {
    /// Assert busy above the high-water mark, release below the low-water mark.
    Hysteresis,

    /// Line held at ready. Errors are still counted.
    Disabled,
}

/// What one control pass observed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StepOutcome {
    /// Flow state after the pass.
    pub flow: FlowState,

    /// Set when the pass changed the flow state.
    pub transitioned: bool,

    /// Union of the conditions latched on both directions since the previous pass.
    pub errors: ErrorFlags,
}

pub struct ControlLoop<PIN: OutputPin> {
    busy_line: OutputLine<PIN>,
    hysteresis: Hysteresis,
    mode: FlowMode,
    diagnostics: Diagnostics,
}

impl<PIN: OutputPin> ControlLoop<PIN> {
    /// Create a control loop driving `busy_line` (asserted = busy), initially ready.
    pub fn new(mut busy_line: OutputLine<PIN>, marks: Watermarks) -> Self {
        busy_line.deassert();
        Self {
            busy_line,
            hysteresis: Hysteresis::new(marks),
            mode: FlowMode::Hysteresis,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn with_mode(mut self, mode: FlowMode) -> Self {
        self.set_mode(mode);
        self
    }

    /// Switch flow control on or off. Disabling releases the line immediately.
    pub fn set_mode(&mut self, mode: FlowMode) {
        self.mode = mode;
        if mode == FlowMode::Disabled {
            self.hysteresis.reset();
            self.busy_line.deassert();
        }
    }

    #[inline]
    pub fn mode(&self) -> FlowMode {
        self.mode
    }

    #[inline]
    pub fn flow_state(&self) -> FlowState {
        self.hysteresis.state()
    }

    #[inline]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    #[inline]
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    #[inline]
    pub fn busy_line(&self) -> &OutputLine<PIN> {
        &self.busy_line
    }

    /// Run one supervision pass.
    pub fn step(&mut self, status: &BridgeStatus) -> StepOutcome {
        let transition = match self.mode {
            FlowMode::Disabled => None,
            FlowMode::Hysteresis => self.hysteresis.update(status.spi_to_uart.len),
        };

        match transition {
            Some(FlowState::Busy) => {
                self.busy_line.assert();
                self.diagnostics.record_busy();
                log::info!(
                    "busy: {} at {}/{}",
                    BridgeDirection::SpiToUart,
                    status.spi_to_uart.len,
                    status.spi_to_uart.capacity
                );
            }
            Some(FlowState::Ready) => {
                self.busy_line.deassert();
                log::info!(
                    "ready: {} at {}/{}",
                    BridgeDirection::SpiToUart,
                    status.spi_to_uart.len,
                    status.spi_to_uart.capacity
                );
            }
            None => {}
        }
        if transition.is_some() {
            log::debug!(
                "busy line driven {}",
                if self.busy_line.level() { "high" } else { "low" }
            );
        }

        let mut errors = ErrorFlags::empty();
        for direction in BridgeDirection::ALL {
            let flags = status.channel(direction).errors;
            if flags.is_empty() {
                continue;
            }
            self.diagnostics.record(direction, flags);
            errors |= flags;

            let lost = flags & ErrorFlags::DATA_LOSS;
            if !lost.is_empty() {
                log::warn!("{}: {:?}", direction, lost);
            }
            if flags.contains(ErrorFlags::UNDERFLOW) {
                log::trace!("{}: underflow, filler sent", direction);
            }
        }

        StepOutcome {
            flow: self.hysteresis.state(),
            transitioned: transition.is_some(),
            errors,
        }
    }

    /// Log traffic and error counters.
    pub fn report(&self, status: &BridgeStatus) {
        log::info!("{}", status.spi_to_uart);
        log::info!("{}", status.uart_to_spi);
        log::info!("{}", self.diagnostics);
    }

    pub fn free(self) -> OutputLine<PIN> {
        self.busy_line
    }
}
