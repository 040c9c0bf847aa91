// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Diagnostic counters, the only user-visible error surface of the bridge.

use core::fmt;

use crate::bridge::BridgeDirection;
use crate::error::ErrorFlags;

/// Per-direction counts of latched conditions.
///
/// Each count is the number of control-loop passes that found the condition latched, not the
/// number of individual bytes affected. Byte-level loss is in the channel statistics.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorCounters {
    pub overflows: u32,
    pub underflows: u32,
    pub frame_errors: u32,
    pub overruns: u32,
}

impl ErrorCounters {
    fn record(&mut self, flags: ErrorFlags) {
        let bump = |counter: &mut u32, flag: ErrorFlags| {
            if flags.contains(flag) {
                *counter = counter.wrapping_add(1);
            }
        };
        bump(&mut self.overflows, ErrorFlags::OVERFLOW);
        bump(&mut self.underflows, ErrorFlags::UNDERFLOW);
        bump(&mut self.frame_errors, ErrorFlags::FRAME);
        bump(&mut self.overruns, ErrorFlags::OVERRUN);
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    spi_to_uart: ErrorCounters,
    uart_to_spi: ErrorCounters,
    busy_assertions: u32,
}

impl Diagnostics {
    pub const fn new() -> Self {
        Self {
            spi_to_uart: ErrorCounters {
                overflows: 0,
                underflows: 0,
                frame_errors: 0,
                overruns: 0,
            },
            uart_to_spi: ErrorCounters {
                overflows: 0,
                underflows: 0,
                frame_errors: 0,
                overruns: 0,
            },
            busy_assertions: 0,
        }
    }

    pub fn record(&mut self, direction: BridgeDirection, flags: ErrorFlags) {
        match direction {
            BridgeDirection::SpiToUart => self.spi_to_uart.record(flags),
            BridgeDirection::UartToSpi => self.uart_to_spi.record(flags),
        }
    }

    pub(crate) fn record_busy(&mut self) {
        self.busy_assertions = self.busy_assertions.wrapping_add(1);
    }

    pub fn counters(&self, direction: BridgeDirection) -> &ErrorCounters {
        match direction {
            BridgeDirection::SpiToUart => &self.spi_to_uart,
            BridgeDirection::UartToSpi => &self.uart_to_spi,
        }
    }

    /// Number of times the busy line has been asserted.
    #[inline]
    pub fn busy_assertions(&self) -> u32 {
        self.busy_assertions
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for direction in BridgeDirection::ALL {
            let c = self.counters(direction);
            write!(
                f,
                "{} ovf={} udf={} fe={} ore={} | ",
                direction, c.overflows, c.underflows, c.frame_errors, c.overruns
            )?;
        }
        write!(f, "busy={}", self.busy_assertions)
    }
}
