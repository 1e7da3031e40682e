// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Board support for the STM32F777 instrument board.

pub mod delay;
pub mod led;
pub mod pins;
pub mod tick_timer;
pub mod usart;

pub use delay::CycleDelay;
pub use led::{Heartbeat, Led};
pub use pins::{BoardPins, ChannelPair, ChannelPin, CHANNELS};
pub use tick_timer::TickTimer;
pub use usart::{Usart, UsartLogger};
