// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART2 as the bridged UART line.
//!
//! Programmed through its registers so the interrupt handlers can test and clear individual
//! status flags. 16x oversampling, 8 data bits (9-bit words when parity is on).

use stm32f7xx_hal::pac;

use crate::config::{Parity, StopBits, UartConfig};
use crate::error::Error;
use crate::hw::pins::Usart2Pins;
use crate::hw::SerialPeripheral;

// Register bits (RM0410 §34.8)
mod reg {
    // CR1
    pub const UE: u32 = 1 << 0;
    pub const RE: u32 = 1 << 2;
    pub const TE: u32 = 1 << 3;
    pub const RXNEIE: u32 = 1 << 5;
    pub const TXEIE: u32 = 1 << 7;
    pub const PS: u32 = 1 << 9;
    pub const PCE: u32 = 1 << 10;
    pub const M0: u32 = 1 << 12;

    // CR2
    pub const STOP_2: u32 = 0b10 << 12;

    // ISR
    pub const PE: u32 = 1 << 0;
    pub const FE: u32 = 1 << 1;
    pub const ORE: u32 = 1 << 3;
    pub const RXNE: u32 = 1 << 5;
    pub const TXE: u32 = 1 << 7;

    // ICR
    pub const PECF: u32 = 1 << 0;
    pub const FECF: u32 = 1 << 1;
    pub const NCF: u32 = 1 << 2;
    pub const ORECF: u32 = 1 << 3;

    // RCC_APB1ENR
    pub const USART2EN: u32 = 1 << 17;
}

/// Smallest and largest BRR values in 16x oversampling.
const BRR_MIN: u32 = 16;
const BRR_MAX: u32 = 0xFFFF;

pub struct BridgeUart {
    usart: pac::USART2,
    pins: Usart2Pins,
    pclk_hz: u32,
}

impl BridgeUart {
    /// `pclk_hz` is the APB1 clock feeding USART2.
    pub fn new(usart: pac::USART2, pins: Usart2Pins, pclk_hz: u32) -> Self {
        Self {
            usart,
            pins,
            pclk_hz,
        }
    }

    #[inline]
    fn isr(&self) -> u32 {
        self.usart.isr.read().bits()
    }

    #[inline]
    fn rdr(&self) -> u8 {
        self.usart.rdr.read().bits() as u8
    }

    #[inline]
    fn clear(&self, flags: u32) {
        self.usart.icr.write(|w| unsafe { w.bits(flags) });
    }

    pub fn free(self) -> (pac::USART2, Usart2Pins) {
        (self.usart, self.pins)
    }
}

impl SerialPeripheral for BridgeUart {
    type Config = UartConfig;

    fn initialize(&mut self, config: &UartConfig) -> Result<(), Error> {
        config.validate()?;
        let brr = self.pclk_hz / config.baud_rate;
        if !(BRR_MIN..=BRR_MAX).contains(&brr) {
            return Err(Error::InvalidConfig);
        }

        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr
            .modify(|r, w| unsafe { w.bits(r.bits() | reg::USART2EN) });

        // UE must be clear while BRR and STOP change.
        self.usart.cr1.write(|w| unsafe { w.bits(0) });
        self.usart.brr.write(|w| unsafe { w.bits(brr) });

        let stop = match config.stop_bits {
            StopBits::One => 0,
            StopBits::Two => reg::STOP_2,
        };
        self.usart.cr2.write(|w| unsafe { w.bits(stop) });

        let framing = match config.parity {
            Parity::None => 0,
            Parity::Even => reg::PCE | reg::M0,
            Parity::Odd => reg::PCE | reg::PS | reg::M0,
        };
        self.usart
            .cr1
            .write(|w| unsafe { w.bits(framing | reg::TE | reg::RE | reg::UE) });

        Ok(())
    }

    fn enable_interrupts(&mut self) {
        self.usart
            .cr1
            .modify(|r, w| unsafe { w.bits(r.bits() | reg::RXNEIE) });
    }

    #[inline]
    fn byte_available(&self) -> bool {
        self.isr() & reg::RXNE != 0
    }

    fn hardware_error(&self) -> Option<Error> {
        let isr = self.isr();
        if isr & (reg::FE | reg::PE) != 0 {
            Some(Error::HardwareFrameError)
        } else if isr & reg::ORE != 0 {
            Some(Error::HardwareOverrun)
        } else {
            None
        }
    }

    fn read_byte(&mut self) -> nb::Result<u8, Error> {
        let isr = self.isr();

        if isr & (reg::FE | reg::PE) != 0 {
            let _ = self.rdr();
            self.clear(reg::FECF | reg::PECF | reg::NCF);
            return Err(nb::Error::Other(Error::HardwareFrameError));
        }

        if isr & reg::ORE != 0 {
            let _ = self.rdr();
            self.clear(reg::ORECF);
            return Err(nb::Error::Other(Error::HardwareOverrun));
        }

        if isr & reg::RXNE == 0 {
            return Err(nb::Error::WouldBlock);
        }

        Ok(self.rdr())
    }

    #[inline]
    fn tx_ready(&self) -> bool {
        self.isr() & reg::TXE != 0
    }

    fn send_byte(&mut self, byte: u8) -> nb::Result<(), Error> {
        if !self.tx_ready() {
            return Err(nb::Error::WouldBlock);
        }
        self.usart.tdr.write(|w| unsafe { w.bits(byte as u32) });
        Ok(())
    }

    fn set_tx_interrupt(&mut self, enabled: bool) {
        self.usart.cr1.modify(|r, w| unsafe {
            let bits = if enabled {
                r.bits() | reg::TXEIE
            } else {
                r.bits() & !reg::TXEIE
            };
            w.bits(bits)
        });
    }
}
