// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # SPI ⇄ UART Bridge Firmware
//!
//! This crate relays a byte stream between an external SPI master (the bridge is the slave) and a
//! UART line, in both directions, on an STM32F777 MCU. Bytes are never interpreted: whatever the
//! host clocks in over SPI comes out of the UART in order, and whatever arrives on the UART is
//! shifted back out to the master.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`buffer`] | Fixed-capacity SPSC byte rings |
//! | [`hw`] | Peripheral driver layer (traits, and STM32 SPI/USART wrappers with `board`) |
//! | [`bridge`] | The bridging engine and its interrupt handlers |
//! | [`control`] | Main-line flow control and diagnostics |
//! | [`config`] | Peripheral and bridge configuration |
//! | [`error`] | Error taxonomy and latched flags |
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features board --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod bridge;
pub mod buffer;
pub mod config;
pub mod control;
pub mod error;
pub mod hw;

pub use bridge::{Bridge, BridgeDirection, BridgeStatus, DrainState};
pub use buffer::RingBuffer;
pub use config::BridgeConfig;
pub use error::{Error, ErrorFlags};
