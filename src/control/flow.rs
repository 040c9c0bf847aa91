// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Ready/busy decision with hysteresis.
//!
//! Works in `no_std` and does not allocate memory.

use crate::config::Watermarks;

/// Signal presented to the upstream SPI master.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowState {
    /// The master may keep sending.
    Ready,
    /// The master should pause until the line returns to ready.
    Busy,
}

/// Two-threshold comparator over buffer occupancy.
pub struct Hysteresis {
    marks: Watermarks,
    state: FlowState,
}

impl Hysteresis {
    pub fn new(marks: Watermarks) -> Self {
        Self {
            marks,
            state: FlowState::Ready,
        }
    }

    #[inline]
    pub fn state(&self) -> FlowState {
        self.state
    }

    #[inline]
    pub fn watermarks(&self) -> Watermarks {
        self.marks
    }

    /// Feed the current occupancy. Returns the new state on a transition.
    pub fn update(&mut self, occupancy: usize) -> Option<FlowState> {
        let next = match self.state {
            FlowState::Ready if occupancy >= self.marks.high() => FlowState::Busy,
            FlowState::Busy if occupancy <= self.marks.low() => FlowState::Ready,
            current => current,
        };

        if next == self.state {
            return None;
        }
        self.state = next;
        Some(next)
    }

    /// Back to ready, e.g. after flow control has been switched off.
    pub fn reset(&mut self) {
        self.state = FlowState::Ready;
    }
}
