// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Simulated peripherals. Each hardware event is driven by hand from the test.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use spibridge::config::{BridgeConfig, SpiConfig, UartConfig};
use spibridge::hw::SerialPeripheral;
use spibridge::{Bridge, Error};

/// Serial peripheral with a scripted receive register and a recorded transmit line.
pub struct MockPeripheral<C> {
    pub config: Option<C>,
    pub interrupts_enabled: bool,
    pub tx_interrupt: bool,
    /// Pending receive events, oldest first.
    pub rx: VecDeque<Result<u8, Error>>,
    /// Everything successfully handed to the transmitter.
    pub sent: Vec<u8>,
    /// While set, `tx_ready` is false and `send_byte` would block.
    pub tx_busy: bool,
    /// Make `initialize` fail.
    pub reject_config: bool,
    /// Report ready but refuse the byte anyway, like a transmitter that changed state in between.
    pub refuse_send: bool,
}

impl<C> Default for MockPeripheral<C> {
    fn default() -> Self {
        Self {
            config: None,
            interrupts_enabled: false,
            tx_interrupt: false,
            rx: VecDeque::new(),
            sent: Vec::new(),
            tx_busy: false,
            reject_config: false,
            refuse_send: false,
        }
    }
}

impl<C> MockPeripheral<C> {
    pub fn receive(&mut self, byte: u8) {
        self.rx.push_back(Ok(byte));
    }

    pub fn receive_all(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied().map(Ok));
    }

    pub fn fault(&mut self, err: Error) {
        self.rx.push_back(Err(err));
    }
}

impl<C: Clone> SerialPeripheral for MockPeripheral<C> {
    type Config = C;

    fn initialize(&mut self, config: &C) -> Result<(), Error> {
        if self.reject_config {
            return Err(Error::InvalidConfig);
        }
        self.config = Some(config.clone());
        Ok(())
    }

    fn enable_interrupts(&mut self) {
        self.interrupts_enabled = true;
    }

    fn byte_available(&self) -> bool {
        matches!(self.rx.front(), Some(Ok(_)))
    }

    fn hardware_error(&self) -> Option<Error> {
        match self.rx.front() {
            Some(Err(err)) => Some(*err),
            _ => None,
        }
    }

    fn read_byte(&mut self) -> nb::Result<u8, Error> {
        match self.rx.pop_front() {
            Some(Ok(byte)) => Ok(byte),
            Some(Err(err)) => Err(nb::Error::Other(err)),
            None => Err(nb::Error::WouldBlock),
        }
    }

    fn tx_ready(&self) -> bool {
        !self.tx_busy
    }

    fn send_byte(&mut self, byte: u8) -> nb::Result<(), Error> {
        if self.tx_busy || self.refuse_send {
            return Err(nb::Error::WouldBlock);
        }
        self.sent.push(byte);
        Ok(())
    }

    fn set_tx_interrupt(&mut self, enabled: bool) {
        self.tx_interrupt = enabled;
    }
}

pub type MockSpi = MockPeripheral<SpiConfig>;
pub type MockUart = MockPeripheral<UartConfig>;
pub type TestBridge<const N: usize> = Bridge<MockSpi, MockUart, N>;

/// Bridge over fresh mocks, started.
pub fn started_bridge<const N: usize>(config: &BridgeConfig) -> TestBridge<N> {
    let mut bridge = TestBridge::<N>::new(MockSpi::default(), MockUart::default(), config)
        .expect("mock peripherals accept any config");
    bridge.start();
    bridge
}

/// Output pin that records every level it is driven to.
#[derive(Default)]
pub struct MockPin {
    pub levels: Vec<bool>,
}

impl MockPin {
    pub fn is_high(&self) -> bool {
        self.levels.last().copied().unwrap_or(false)
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.push(true);
        Ok(())
    }
}
