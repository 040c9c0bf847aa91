// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fixed-capacity byte buffers shared between interrupt and main-line contexts.

pub mod ring;

pub use ring::{Consumer, Producer, RingBuffer};
