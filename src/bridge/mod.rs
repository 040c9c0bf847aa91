// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Bridging Engine
//!
//! A [`Bridge`] owns both peripherals and one [`Channel`] per [`BridgeDirection`]. Each channel
//! pairs a source peripheral, a ring buffer and a sink peripheral, and tracks whether its sink is
//! currently being fed ([`DrainState`]).
//!
//! The interrupt handlers live in [`isr`]. Everything here is driven by plain method calls, so
//! hardware events can be simulated one call at a time.
//!
//! Typical start-up:
//!
//! ```ignore
//! let mut bridge = Bridge::<_, _, 64>::new(spi, uart, &BridgeConfig::default())?;
//! bridge.start();
//! // unmask the SPI and UART interrupt vectors
//! ```

use core::fmt;

use crate::buffer::RingBuffer;
use crate::config::{BridgeConfig, SpiConfig, UartConfig};
use crate::error::{Error, ErrorFlags};
use crate::hw::{PeripheralState, SerialPeripheral};

pub mod isr;

/// Direction of travel through the bridge.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeDirection {
    /// SPI master → bridge → UART line.
    SpiToUart,
    /// UART line → bridge → SPI master.
    UartToSpi,
}

impl BridgeDirection {
    pub const ALL: [BridgeDirection; 2] = [BridgeDirection::SpiToUart, BridgeDirection::UartToSpi];
}

impl fmt::Display for BridgeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeDirection::SpiToUart => f.write_str("spi->uart"),
            BridgeDirection::UartToSpi => f.write_str("uart->spi"),
        }
    }
}

/// Whether a direction's sink is being fed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrainState {
    /// Nothing in flight. The next push primes the sink directly.
    Idle,
    /// The sink takes one byte per transmit-ready event until the buffer runs dry.
    Draining,
}

/// What a sink gets when it asks for a byte and the buffer is empty.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum OnEmpty {
    /// Disarm the transmit-ready interrupt. Used for the UART, which may sit idle.
    Quiesce,
    /// Shift out a filler byte. Used for the SPI slave, which must always answer the master.
    Filler(u8),
}

/// Traffic counters for one direction. All wrap on overflow.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelStats {
    /// Bytes received from the source peripheral.
    pub bytes_in: u32,
    /// Bytes handed to the sink peripheral.
    pub bytes_out: u32,
    /// Bytes lost to a full buffer or a sink that refused them.
    pub dropped: u32,
    /// Filler bytes sent in place of data.
    pub fillers: u32,
}

/// One statically allocated direction of the bridge.
pub struct Channel<const N: usize> {
    direction: BridgeDirection,
    buffer: RingBuffer<N>,
    state: DrainState,
    on_empty: OnEmpty,
    errors: ErrorFlags,
    stats: ChannelStats,
}

impl<const N: usize> Channel<N> {
    pub const fn new(direction: BridgeDirection, filler: u8) -> Self {
        let on_empty = match direction {
            BridgeDirection::SpiToUart => OnEmpty::Quiesce,
            BridgeDirection::UartToSpi => OnEmpty::Filler(filler),
        };
        Self {
            direction,
            buffer: RingBuffer::new(),
            state: DrainState::Idle,
            on_empty,
            errors: ErrorFlags::empty(),
            stats: ChannelStats {
                bytes_in: 0,
                bytes_out: 0,
                dropped: 0,
                fillers: 0,
            },
        }
    }

    #[inline]
    pub fn direction(&self) -> BridgeDirection {
        self.direction
    }

    #[inline]
    pub fn state(&self) -> DrainState {
        self.state
    }

    #[inline]
    pub fn buffer(&self) -> &RingBuffer<N> {
        &self.buffer
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    pub(crate) fn latch(&mut self, err: Error) {
        self.errors |= err.flag();
    }

    /// Producer path: queue a byte from the source, priming an idle sink straight away.
    pub(crate) fn accept<P: SerialPeripheral>(&mut self, byte: u8, sink: &mut P) {
        self.stats.bytes_in = self.stats.bytes_in.wrapping_add(1);

        if !self.buffer.try_push(byte) {
            self.stats.dropped = self.stats.dropped.wrapping_add(1);
            return;
        }

        if self.state == DrainState::Idle {
            self.prime(sink);
        }
    }

    /// Idle → Draining.
    fn prime<P: SerialPeripheral>(&mut self, sink: &mut P) {
        if sink.tx_ready() {
            if let Some(byte) = self.buffer.try_pop() {
                self.emit(byte, sink);
            }
        }
        self.state = DrainState::Draining;
        sink.set_tx_interrupt(true);
    }

    /// Consumer path: the sink signalled it can take a byte.
    ///
    /// Nothing is popped unless the sink really is ready, so a spurious event leaves the queue
    /// untouched.
    pub(crate) fn feed<P: SerialPeripheral>(&mut self, sink: &mut P) {
        if !sink.tx_ready() {
            return;
        }

        match self.on_empty {
            OnEmpty::Quiesce => {
                // Checked first so the normal end of a UART burst does not latch underflow.
                if self.buffer.is_empty() {
                    sink.set_tx_interrupt(false);
                    self.state = DrainState::Idle;
                } else if let Some(byte) = self.buffer.try_pop() {
                    self.emit(byte, sink);
                }
            }
            OnEmpty::Filler(filler) => match self.buffer.try_pop() {
                Some(byte) => self.emit(byte, sink),
                None => {
                    // Underflow is latched by the ring itself.
                    self.state = DrainState::Idle;
                    if sink.send_byte(filler).is_ok() {
                        self.stats.fillers = self.stats.fillers.wrapping_add(1);
                    }
                }
            },
        }
    }

    /// Hand a popped byte to the sink. A refusal loses the byte, so it is latched as an overrun.
    fn emit<P: SerialPeripheral>(&mut self, byte: u8, sink: &mut P) {
        match sink.send_byte(byte) {
            Ok(()) => self.stats.bytes_out = self.stats.bytes_out.wrapping_add(1),
            Err(err) => {
                self.stats.dropped = self.stats.dropped.wrapping_add(1);
                self.latch(match err {
                    nb::Error::WouldBlock => Error::HardwareOverrun,
                    nb::Error::Other(err) => err,
                });
            }
        }
    }

    /// Read and clear everything latched on this direction, including the ring's own flags.
    pub fn take_errors(&mut self) -> ErrorFlags {
        let mut errors = core::mem::take(&mut self.errors);
        if self.buffer.take_overflow() {
            errors |= Error::BufferOverflow.flag();
        }
        if self.buffer.take_underflow() {
            errors |= Error::BufferUnderflow.flag();
        }
        errors
    }

    /// Snapshot for the control loop. Latched errors are taken.
    pub fn status(&mut self) -> ChannelStatus {
        ChannelStatus {
            direction: self.direction,
            len: self.buffer.len(),
            capacity: N,
            state: self.state,
            errors: self.take_errors(),
            stats: self.stats,
        }
    }
}

/// Point-in-time view of one direction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChannelStatus {
    pub direction: BridgeDirection,
    pub len: usize,
    pub capacity: usize,
    pub state: DrainState,
    /// Conditions latched since the previous snapshot.
    pub errors: ErrorFlags,
    pub stats: ChannelStats,
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            DrainState::Idle => "idle",
            DrainState::Draining => "draining",
        };
        write!(
            f,
            "{} {}/{} {} in={} out={} drop={} fill={}",
            self.direction,
            self.len,
            self.capacity,
            state,
            self.stats.bytes_in,
            self.stats.bytes_out,
            self.stats.dropped,
            self.stats.fillers,
        )
    }
}

/// Point-in-time view of both directions.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BridgeStatus {
    pub spi_to_uart: ChannelStatus,
    pub uart_to_spi: ChannelStatus,
}

impl BridgeStatus {
    pub fn channel(&self, direction: BridgeDirection) -> &ChannelStatus {
        match direction {
            BridgeDirection::SpiToUart => &self.spi_to_uart,
            BridgeDirection::UartToSpi => &self.uart_to_spi,
        }
    }
}

/// SPI slave ⇄ UART bridge with `N`-byte buffers in each direction.
pub struct Bridge<S, U, const N: usize> {
    spi: S,
    uart: U,
    spi_state: PeripheralState<SpiConfig>,
    uart_state: PeripheralState<UartConfig>,
    spi_to_uart: Channel<N>,
    uart_to_spi: Channel<N>,
}

impl<S, U, const N: usize> Bridge<S, U, N>
where
    S: SerialPeripheral<Config = SpiConfig>,
    U: SerialPeripheral<Config = UartConfig>,
{
    /// Configure both peripherals. Interrupts stay off until [`start`](Self::start).
    pub fn new(mut spi: S, mut uart: U, config: &BridgeConfig) -> Result<Self, Error> {
        config.uart.validate()?;
        spi.initialize(&config.spi)?;
        uart.initialize(&config.uart)?;

        Ok(Self {
            spi,
            uart,
            spi_state: PeripheralState::new(config.spi),
            uart_state: PeripheralState::new(config.uart),
            spi_to_uart: Channel::new(BridgeDirection::SpiToUart, config.filler),
            uart_to_spi: Channel::new(BridgeDirection::UartToSpi, config.filler),
        })
    }

    /// Enable peripheral interrupt sources. Call once, before unmasking the vectors.
    pub fn start(&mut self) {
        self.spi.enable_interrupts();
        self.spi_state.set_enabled(true);
        self.uart.enable_interrupts();
        self.uart_state.set_enabled(true);
    }

    pub fn channel(&self, direction: BridgeDirection) -> &Channel<N> {
        match direction {
            BridgeDirection::SpiToUart => &self.spi_to_uart,
            BridgeDirection::UartToSpi => &self.uart_to_spi,
        }
    }

    #[inline]
    pub fn spi(&self) -> &S {
        &self.spi
    }

    #[inline]
    pub fn spi_mut(&mut self) -> &mut S {
        &mut self.spi
    }

    #[inline]
    pub fn uart(&self) -> &U {
        &self.uart
    }

    #[inline]
    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    #[inline]
    pub fn spi_state(&self) -> &PeripheralState<SpiConfig> {
        &self.spi_state
    }

    #[inline]
    pub fn uart_state(&self) -> &PeripheralState<UartConfig> {
        &self.uart_state
    }

    /// Snapshot both directions, taking latched errors.
    ///
    /// Peripheral-level faults stay latched on [`spi_state`](Self::spi_state) /
    /// [`uart_state`](Self::uart_state) until [`clear_peripheral_errors`](Self::clear_peripheral_errors).
    pub fn status(&mut self) -> BridgeStatus {
        BridgeStatus {
            spi_to_uart: self.spi_to_uart.status(),
            uart_to_spi: self.uart_to_spi.status(),
        }
    }

    /// Clear the latched peripheral faults, returning `(spi, uart)`.
    pub fn clear_peripheral_errors(&mut self) -> (ErrorFlags, ErrorFlags) {
        (self.spi_state.take_errors(), self.uart_state.take_errors())
    }

    /// Service both peripherals without interrupts.
    ///
    /// For targets lacking one of the interrupt sources. Safe to call alongside the handlers as
    /// long as it runs with interrupts masked.
    pub fn poll(&mut self) {
        self.service_spi_interrupt();
        self.service_uart_interrupt();
    }

    /// Release the peripherals.
    pub fn free(self) -> (S, U) {
        (self.spi, self.uart)
    }
}
