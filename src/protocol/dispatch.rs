// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Routes validated messages to an instrument.

use crate::config::DeviceConfig;
use crate::instruments::Instrument;
use crate::protocol::codec::{encode_pong, PONG_LEN};
use crate::protocol::messages::{DeviceCommand, Message, Scope, SystemCommand};

/// What the transport should send back after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    None,
    Pong([u8; PONG_LEN]),
}

pub struct Dispatcher {
    config: DeviceConfig,
}

impl Dispatcher {
    pub const fn new(config: DeviceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Answer pings here; hand everything else to `instrument`.
    pub fn dispatch<I: Instrument + ?Sized>(&self, message: &Message<'_>, instrument: &mut I) -> Reply {
        match message.scope {
            Scope::System => match SystemCommand::parse(message.command) {
                SystemCommand::Ping => Reply::Pong(encode_pong(&self.config)),
                command => {
                    instrument.system_message(command);
                    Reply::None
                }
            },
            Scope::Device { sub_address } => {
                match DeviceCommand::parse(message.command, message.payload) {
                    Some(command) => instrument.device_message(sub_address, command),
                    None => log::debug!(
                        "short payload for command {:#04x} ({} bytes)",
                        message.command,
                        message.payload.len()
                    ),
                }
                Reply::None
            }
        }
    }
}
