// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Digital output line with a board-defined active level.
//!
//! Used for the ready/busy handshake towards the SPI master and for the status LEDs.

use embedded_hal::digital::OutputPin;

/// Whether the line is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// Output line that remembers its active level and last driven state.
pub struct OutputLine<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    asserted: bool,
}

impl<PIN: OutputPin> OutputLine<PIN> {
    /// Create a line wrapper, initially deasserted.
    pub fn new(pin: PIN, active: ActiveLevel) -> Self {
        let mut line = Self {
            pin,
            active,
            asserted: false,
        };
        line.drive();
        line
    }

    pub fn active_high(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the line logically asserted (true) or deasserted (false).
    pub fn set(&mut self, asserted: bool) {
        self.asserted = asserted;
        self.drive();
    }

    /// Electrical level the pin is driven to: `true` for high.
    #[inline]
    pub fn level(&self) -> bool {
        self.asserted == (self.active == ActiveLevel::High)
    }

    #[inline]
    pub fn active_level(&self) -> ActiveLevel {
        self.active
    }

    fn drive(&mut self) {
        // Infallible on this board; a failed write leaves `level()` stale until the next set.
        let _ = if self.level() {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }

    #[inline]
    pub fn assert(&mut self) {
        self.set(true);
    }

    #[inline]
    pub fn deassert(&mut self) {
        self.set(false);
    }

    pub fn toggle(&mut self) {
        self.set(!self.asserted);
    }

    #[inline]
    pub fn is_asserted(&self) -> bool {
        self.asserted
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}
