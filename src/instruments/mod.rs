// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Instruments
//!
//! Tick-driven actuator banks that sit above the device drivers in `drivers`.
//!
//! Every kind shares one channel engine ([`ChannelBank`]); what differs is the output stage plugged
//! into it.
//!
//! ## Modules
//!
//! - [`channel`] - Channel engine: periods, pitch bend, reset, per-tick toggling.
//! - [`floppies`] - Floppy drives on direct STEP/DIR pins.
//! - [`buzzers`] - Piezo buzzers, one pin each.
//! - [`hard_drives`] - Hard drive arms struck through L293 coils.
//! - [`shifted`] - Floppies or buzzers multiplexed through a 74HC595 chain.
//! - [`shared`] - Interrupt-safe cell holding the active instrument.

pub mod buzzers;
pub mod channel;
pub mod floppies;
pub mod hard_drives;
pub mod notes;
pub mod shared;
pub mod shifted;

pub use buzzers::BuzzerChannelBank;
pub use channel::{ChannelBank, OutputStage};
pub use floppies::StepperChannelBank;
pub use hard_drives::SolenoidChannelBank;
pub use shared::Shared;
pub use shifted::{ShiftedBuzzerBank, ShiftedFloppyBank, ShiftedFrame};

use embedded_hal::blocking::delay::DelayMs;

use crate::protocol::{DeviceCommand, SystemCommand};

/// Capabilities every instrument offers to the dispatcher and the tick source.
pub trait Instrument {
    /// Bring every output to a known state. May block (homing).
    fn setup(&mut self);

    /// Handle a system-wide command. Pings never reach the instrument.
    fn system_message(&mut self, command: SystemCommand);

    /// Handle a command for `sub_address` (0 = every channel).
    fn device_message(&mut self, sub_address: u8, command: DeviceCommand<'_>);

    /// Advance every channel by one timer period. Must not block.
    fn tick(&mut self);
}

/// Rising chirp on the first channel, 200 ms per note. After a 500 ms pause every channel is
/// reset, which re-homes drive heads the chirp moved.
pub fn startup_sound<I, D>(instrument: &mut I, delay: &mut D)
where
    I: Instrument + ?Sized,
    D: DelayMs<u32>,
{
    for note in notes::STARTUP_NOTES {
        instrument.device_message(1, DeviceCommand::NoteOn { note });
        delay.delay_ms(200);
    }
    instrument.device_message(1, DeviceCommand::NoteOff { note: 0 });
    delay.delay_ms(500);
    instrument.system_message(SystemCommand::Reset);
}
