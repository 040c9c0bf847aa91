// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Bridge Control Loop
//!
//! Main-line code that runs whenever no interrupt handler is executing.
//!
//! ## Modules
//!
//! - [`flow`] - Ready/busy hysteresis over buffer occupancy.
//! - [`diagnostics`] - Counters for latched error conditions.
//! - [`bridge_loop`] - The supervisor that ties both to a bridge status snapshot.

pub mod bridge_loop;
pub mod diagnostics;
pub mod flow;

pub use bridge_loop::{ControlLoop, FlowMode, StepOutcome};
pub use diagnostics::{Diagnostics, ErrorCounters};
pub use flow::{FlowState, Hysteresis};
