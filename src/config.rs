// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Peripheral and bridge configuration.
//!
//! Defaults match the wiring used on the bridge board: SPI mode 0, MSB first, UART at 115 200 baud
//! 8N1, and `0xFF` shifted out to the SPI master whenever nothing is queued.

use crate::error::Error;

/// UART bit rate used when none is given.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Byte loaded into the SPI data register when the UART→SPI buffer is empty.
pub const DEFAULT_FILLER: u8 = 0xFF;

/// SPI clock idle level.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    IdleLow,
    IdleHigh,
}

/// SPI clock edge on which data is sampled.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    CaptureOnFirstTransition,
    CaptureOnSecondTransition,
}

/// SPI mode (clock polarity and phase).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mode {
    pub polarity: Polarity,
    pub phase: Phase,
}

pub const MODE_0: Mode = Mode {
    polarity: Polarity::IdleLow,
    phase: Phase::CaptureOnFirstTransition,
};
pub const MODE_1: Mode = Mode {
    polarity: Polarity::IdleLow,
    phase: Phase::CaptureOnSecondTransition,
};
pub const MODE_2: Mode = Mode {
    polarity: Polarity::IdleHigh,
    phase: Phase::CaptureOnFirstTransition,
};
pub const MODE_3: Mode = Mode {
    polarity: Polarity::IdleHigh,
    phase: Phase::CaptureOnSecondTransition,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// SPI slave configuration. The clock rate is dictated by the master.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    pub mode: Mode,
    pub bit_order: BitOrder,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            mode: MODE_0,
            bit_order: BitOrder::MsbFirst,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

/// UART configuration. Data bits are fixed at 8.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    pub baud_rate: u32,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl UartConfig {
    /// Reject settings no UART can program.
    pub fn validate(&self) -> Result<(), Error> {
        if self.baud_rate == 0 {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }

    /// Bits on the wire per byte: start, 8 data, optional parity, stop.
    pub fn frame_bits(&self) -> u32 {
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        1 + 8 + parity + stop
    }

    /// Sustained UART throughput in bytes per second.
    pub fn bytes_per_second(&self) -> u32 {
        self.baud_rate / self.frame_bits()
    }
}

/// Flow-control thresholds on SPI→UART buffer occupancy.
///
/// The busy line is asserted once occupancy reaches `high` and released once it falls to `low`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Watermarks {
    low: usize,
    high: usize,
}

impl Watermarks {
    /// Create watermarks, checking `low < high <= capacity`.
    pub fn new(low: usize, high: usize, capacity: usize) -> Result<Self, Error> {
        if low >= high || high > capacity {
            return Err(Error::InvalidConfig);
        }
        Ok(Self { low, high })
    }

    /// Three-quarter / one-quarter thresholds for a buffer of `capacity` bytes.
    pub const fn for_capacity(capacity: usize) -> Self {
        Self {
            low: capacity / 4,
            high: capacity - capacity / 4,
        }
    }

    #[inline]
    pub fn low(&self) -> usize {
        self.low
    }

    #[inline]
    pub fn high(&self) -> usize {
        self.high
    }
}

/// Everything the bridge needs at start-up.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeConfig {
    pub spi: SpiConfig,
    pub uart: UartConfig,
    /// Byte shifted out to the SPI master on underflow.
    pub filler: u8,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            spi: SpiConfig::default(),
            uart: UartConfig::default(),
            filler: DEFAULT_FILLER,
        }
    }
}

impl BridgeConfig {
    pub fn with_spi_mode(mut self, mode: Mode) -> Self {
        self.spi.mode = mode;
        self
    }

    pub fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.spi.bit_order = bit_order;
        self
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.uart.baud_rate = baud_rate;
        self
    }

    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.uart.parity = parity;
        self
    }

    pub fn with_stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.uart.stop_bits = stop_bits;
        self
    }

    pub fn with_filler(mut self, filler: u8) -> Self {
        self.filler = filler;
        self
    }
}
