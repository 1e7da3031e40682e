// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

pub mod codec;
pub mod dispatch;
pub mod messages;
pub mod parser;

pub use codec::{decode, encode, encode_pong, Frame, MAX_FRAME_LEN, PONG_LEN};
pub use dispatch::{Dispatcher, Reply};
pub use messages::{DeviceCommand, Message, Scope, SystemCommand};
pub use parser::Parser;
