// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Moppy Instrument Firmware
//!
//! This crate contains the firmware for a Moppy instrument: a device that listens for Moppy
//! frames from a controller and plays notes on floppy drives, buzzers, or hard drives. It is
//! written in Rust and targets an STM32F777 MCU; everything outside [`hw`] is `no_std` and
//! hardware-agnostic (embedded-hal traits only) so it also runs on the host under test.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`protocol`] | Wire codec, frame assembler, dispatcher |
//! | [`instruments`] | Tick-driven actuator banks and the shared channel engine |
//! | [`drivers`] | Device-level drivers (floppy heads, L293 coils, 74HC595 chains) |
//! | [`network`] | Serial, datagram and radio transports |
//! | [`config`] | Addressing and timing constants |
//! | `hw` | MCU-level wrappers (USART logger, tick timer, pins). Needs the `board` feature |
//!
//! ## Getting Started
//!
//! Build docs:
//!
//! ```bash
//! cargo doc --no-deps --open
//! ```
//!
//! Flash the board with an instrument selected:
//!
//! ```bash
//! cargo run --release --features board,floppies
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod drivers;
pub mod error;
#[cfg(feature = "board")]
pub mod hw;
pub mod instruments;
pub mod network;
pub mod protocol;

#[cfg(test)]
mod mock;

pub use error::{Error, Result};
