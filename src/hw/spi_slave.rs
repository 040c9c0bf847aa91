// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SPI4 in slave mode.
//!
//! The HAL only drives SPI as a master, so SPI4 is programmed directly: hardware NSS on PE11,
//! 8-bit frames, RXNE raised at one byte. Data register accesses are 8 bits wide; a 32-bit access
//! would pack several frames into the FIFO at once.

use core::ptr;

use stm32f7xx_hal::pac;

use crate::config::{BitOrder, Phase, Polarity, SpiConfig};
use crate::error::Error;
use crate::hw::pins::Spi4Pins;
use crate::hw::SerialPeripheral;

// Register bits (RM0410 §35.9)
mod reg {
    // CR1
    pub const CPHA: u32 = 1 << 0;
    pub const CPOL: u32 = 1 << 1;
    pub const SPE: u32 = 1 << 6;
    pub const LSBFIRST: u32 = 1 << 7;

    // CR2
    pub const ERRIE: u32 = 1 << 5;
    pub const RXNEIE: u32 = 1 << 6;
    pub const TXEIE: u32 = 1 << 7;
    pub const DS_8BIT: u32 = 0b0111 << 8;
    pub const FRXTH: u32 = 1 << 12;

    // SR
    pub const RXNE: u32 = 1 << 0;
    pub const TXE: u32 = 1 << 1;
    pub const OVR: u32 = 1 << 6;

    // RCC_APB2ENR
    pub const SPI4EN: u32 = 1 << 13;
}

/// SPI4 configured as a slave, clocked by the external master.
pub struct SpiSlave {
    spi: pac::SPI4,
    pins: Spi4Pins,
}

impl SpiSlave {
    /// Take ownership of SPI4 and its pins. Nothing is programmed until `initialize`.
    pub fn new(spi: pac::SPI4, pins: Spi4Pins) -> Self {
        Self { spi, pins }
    }

    #[inline]
    fn sr(&self) -> u32 {
        self.spi.sr.read().bits()
    }

    #[inline]
    fn dr(&self) -> *mut u8 {
        &self.spi.dr as *const _ as *mut u8
    }

    pub fn free(self) -> (pac::SPI4, Spi4Pins) {
        (self.spi, self.pins)
    }
}

impl SerialPeripheral for SpiSlave {
    type Config = SpiConfig;

    fn initialize(&mut self, config: &SpiConfig) -> Result<(), Error> {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr
            .modify(|r, w| unsafe { w.bits(r.bits() | reg::SPI4EN) });

        // Disable while configuring. MSTR = 0 (slave), SSM = 0 (NSS from pin).
        self.spi.cr1.write(|w| unsafe { w.bits(0) });

        let mut cr1 = 0;
        if config.mode.phase == Phase::CaptureOnSecondTransition {
            cr1 |= reg::CPHA;
        }
        if config.mode.polarity == Polarity::IdleHigh {
            cr1 |= reg::CPOL;
        }
        if config.bit_order == BitOrder::LsbFirst {
            cr1 |= reg::LSBFIRST;
        }

        self.spi
            .cr2
            .write(|w| unsafe { w.bits(reg::DS_8BIT | reg::FRXTH) });
        self.spi.cr1.write(|w| unsafe { w.bits(cr1) });
        self.spi
            .cr1
            .modify(|r, w| unsafe { w.bits(r.bits() | reg::SPE) });

        Ok(())
    }

    fn enable_interrupts(&mut self) {
        self.spi.cr2.modify(|r, w| unsafe {
            w.bits(r.bits() | reg::RXNEIE | reg::TXEIE | reg::ERRIE)
        });
    }

    #[inline]
    fn byte_available(&self) -> bool {
        self.sr() & reg::RXNE != 0
    }

    fn hardware_error(&self) -> Option<Error> {
        if self.sr() & reg::OVR != 0 {
            Some(Error::HardwareOverrun)
        } else {
            None
        }
    }

    fn read_byte(&mut self) -> nb::Result<u8, Error> {
        let sr = self.sr();

        if sr & reg::OVR != 0 {
            // OVR clears on a DR read followed by an SR read.
            let _ = unsafe { ptr::read_volatile(self.dr()) };
            let _ = self.sr();
            return Err(nb::Error::Other(Error::HardwareOverrun));
        }

        if sr & reg::RXNE == 0 {
            return Err(nb::Error::WouldBlock);
        }

        Ok(unsafe { ptr::read_volatile(self.dr()) })
    }

    #[inline]
    fn tx_ready(&self) -> bool {
        self.sr() & reg::TXE != 0
    }

    fn send_byte(&mut self, byte: u8) -> nb::Result<(), Error> {
        if !self.tx_ready() {
            return Err(nb::Error::WouldBlock);
        }
        unsafe { ptr::write_volatile(self.dr(), byte) };
        Ok(())
    }

    fn set_tx_interrupt(&mut self, enabled: bool) {
        self.spi.cr2.modify(|r, w| unsafe {
            let bits = if enabled {
                r.bits() | reg::TXEIE
            } else {
                r.bits() & !reg::TXEIE
            };
            w.bits(bits)
        });
    }
}
