// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bridge error taxonomy.
//!
//! None of these conditions stop the bridge. Interrupt handlers latch them into [`ErrorFlags`] and
//! the control loop folds the flags into diagnostic counters.

use bitflags::bitflags;

/// Conditions the bridge can observe while relaying bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A producer pushed into a full ring buffer. The new byte was rejected.
    ///
    /// The ring latches this and [`BufferUnderflow`](Self::BufferUnderflow) itself; channels
    /// translate the latched ring flags through [`Error::flag`].
    #[error("ring buffer overflow, byte rejected")]
    BufferOverflow,

    /// A sink was ready but its ring buffer was empty. The filler byte was sent instead.
    #[error("ring buffer underflow, filler byte substituted")]
    BufferUnderflow,

    /// The UART receiver flagged a framing or parity fault.
    #[error("UART framing or parity error")]
    HardwareFrameError,

    /// A receive register was overwritten before firmware read it.
    #[error("peripheral receive overrun")]
    HardwareOverrun,

    /// A peripheral configuration value cannot be programmed.
    #[error("invalid peripheral configuration")]
    InvalidConfig,
}

impl Error {
    /// Latched flag corresponding to this condition.
    ///
    /// `InvalidConfig` only ever surfaces at start-up and has no flag.
    pub fn flag(self) -> ErrorFlags {
        match self {
            Error::BufferOverflow => ErrorFlags::OVERFLOW,
            Error::BufferUnderflow => ErrorFlags::UNDERFLOW,
            Error::HardwareFrameError => ErrorFlags::FRAME,
            Error::HardwareOverrun => ErrorFlags::OVERRUN,
            Error::InvalidConfig => ErrorFlags::empty(),
        }
    }
}

bitflags! {
    /// Set of latched error conditions since the flags were last taken.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct ErrorFlags: u8 {
        const OVERFLOW  = 1 << 0;
        const UNDERFLOW = 1 << 1;
        const FRAME     = 1 << 2;
        const OVERRUN   = 1 << 3;
    }
}

impl ErrorFlags {
    /// Conditions that mean bytes were lost, as opposed to a filler being substituted.
    pub const DATA_LOSS: ErrorFlags = ErrorFlags::OVERFLOW
        .union(ErrorFlags::FRAME)
        .union(ErrorFlags::OVERRUN);
}

#[cfg(feature = "defmt")]
impl defmt::Format for ErrorFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ErrorFlags({=u8:#04x})", self.bits());
    }
}
