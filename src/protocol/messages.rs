// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Moppy message protocol.

/// Sync byte for the protocol ('M').
pub const START_BYTE: u8 = 0x4D;

// System commands
pub const MSG_SYS_PING: u8 = 0x80;
pub const MSG_SYS_PONG: u8 = 0x81;
pub const MSG_SYS_SEQUENCE_START: u8 = 0xFA;
pub const MSG_SYS_SEQUENCE_STOP: u8 = 0xFC;
pub const MSG_SYS_RESET: u8 = 0xFF;

// Device commands
pub const MSG_DEV_RESET: u8 = 0x00;
pub const MSG_DEV_NOTE_OFF: u8 = 0x08;
pub const MSG_DEV_NOTE_ON: u8 = 0x09;
pub const MSG_DEV_SET_MOVEMENT: u8 = 0x0A;
pub const MSG_DEV_DISABLE_LEDS: u8 = 0x0B;
pub const MSG_DEV_BEND_PITCH: u8 = 0x0E;

/// Who a message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every device on the bus.
    System,
    /// This device; `sub_address` 0 means every channel.
    Device { sub_address: u8 },
}

/// A validated message. The payload borrows the buffer it was assembled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message<'a> {
    pub scope: Scope,
    pub command: u8,
    pub payload: &'a [u8],
}

/// System-wide commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemCommand {
    Ping,
    SequenceStart,
    SequenceStop,
    Reset,
    Other(u8),
}

impl SystemCommand {
    pub fn parse(command: u8) -> Self {
        match command {
            MSG_SYS_PING => SystemCommand::Ping,
            MSG_SYS_SEQUENCE_START => SystemCommand::SequenceStart,
            MSG_SYS_SEQUENCE_STOP => SystemCommand::SequenceStop,
            MSG_SYS_RESET => SystemCommand::Reset,
            other => SystemCommand::Other(other),
        }
    }
}

/// Device-scoped commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand<'a> {
    Reset,
    NoteOn { note: u8 },
    NoteOff { note: u8 },
    /// Deflection in [-8192, 8191].
    BendPitch { deflection: i16 },
    /// Head travel on/off for position-tracking instruments.
    SetMovement { enabled: bool },
    DisableLeds { disabled: bool },
    Other { command: u8, payload: &'a [u8] },
}

impl<'a> DeviceCommand<'a> {
    /// Interpret a device command. Returns `None` when the payload is too short for it.
    pub fn parse(command: u8, payload: &'a [u8]) -> Option<Self> {
        let cmd = match command {
            MSG_DEV_RESET => DeviceCommand::Reset,
            MSG_DEV_NOTE_ON => DeviceCommand::NoteOn {
                note: *payload.first()?,
            },
            // Note-off carries the note too, but it is never needed to silence a channel.
            MSG_DEV_NOTE_OFF => DeviceCommand::NoteOff {
                note: payload.first().copied().unwrap_or(0),
            },
            MSG_DEV_BEND_PITCH => {
                let raw = payload.get(..2)?;
                DeviceCommand::BendPitch {
                    deflection: i16::from_be_bytes([raw[0], raw[1]]),
                }
            }
            // The controller sends a nonzero byte to stop head travel.
            MSG_DEV_SET_MOVEMENT => DeviceCommand::SetMovement {
                enabled: *payload.first()? == 0,
            },
            MSG_DEV_DISABLE_LEDS => DeviceCommand::DisableLeds {
                disabled: *payload.first()? != 0,
            },
            command => DeviceCommand::Other { command, payload },
        };
        Some(cmd)
    }
}
