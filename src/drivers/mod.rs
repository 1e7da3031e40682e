// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above `embedded-hal` pins and buses and
//! below the instruments.
//!
//! ## Existing drivers
//!
//! - [`floppy`] – Floppy drive STEP/DIR lines plus open-loop head tracking
//! - [`coil`] – Hard drive voice coil on an L293 half-bridge pair
//! - [`shift_register`] – 74HC595 chain on SPI with a latch line

pub mod coil;
pub mod floppy;
pub mod shift_register;

pub use coil::Coil;
pub use floppy::{FloppyDrive, Head};
pub use shift_register::ShiftRegisterChain;
