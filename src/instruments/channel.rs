// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Channel engine shared by every instrument kind.
//!
//! Each channel is split in two halves with one writer each:
//!
//! - [`Control`] is written by message handlers (note on/off, pitch bend, halt).
//! - [`Timing`] is written by [`ChannelBank::tick`] only, which reads `Control` through a shared
//!   borrow.
//!
//! Reset is the one operation that rewrites both halves. A note-on bumps a trigger counter in
//! `Control`; the tick notices the change, restarts the channel's counter and starts the output,
//! so a repeated note restarts cleanly even at the same period.
//!
//! How a toggle reaches the hardware is up to the [`OutputStage`] plugged into the bank.

use core::ops::ControlFlow;

use micromath::F32Ext;

use crate::config::BEND_OCTAVES;
use crate::instruments::notes;
use crate::instruments::Instrument;
use crate::protocol::{DeviceCommand, SystemCommand};

/// Full-scale pitch-bend deflection.
const BEND_RANGE: f32 = 8192.0;

/// Command-derived half of a channel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Control {
    period: u16,
    original_period: u16,
    trigger: u8,
}

impl Control {
    /// Ticks between toggles, after pitch bend. 0 = silent.
    #[inline]
    pub fn period(&self) -> u16 {
        self.period
    }

    /// Period of the note as played, before pitch bend.
    #[inline]
    pub fn original_period(&self) -> u16 {
        self.original_period
    }

    fn play(&mut self, period: u16) {
        self.period = period;
        self.original_period = period;
        self.trigger = self.trigger.wrapping_add(1);
    }

    fn silence(&mut self) {
        self.period = 0;
        self.original_period = 0;
    }

    /// Always computed from the original period so successive bends never compound.
    fn bend(&mut self, deflection: i16) {
        if self.original_period == 0 || deflection == 0 {
            self.period = self.original_period;
            return;
        }
        let factor = 2.0f32.powf(BEND_OCTAVES * (deflection as f32 / BEND_RANGE));
        // Float to int casts saturate, so only the lower bound needs care.
        self.period = ((self.original_period as f32 / factor) as u16).max(1);
    }
}

/// Tick-owned half of a channel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Timing {
    ticks: u16,
    period: u16,
    trigger: u8,
    active: bool,
}

impl Timing {
    /// Timing for a freshly reset channel that has already seen `control`'s trigger.
    fn idle(control: &Control) -> Self {
        Self {
            trigger: control.trigger,
            ..Self::default()
        }
    }

    /// Ticks elapsed since the last toggle.
    #[inline]
    pub fn ticks(&self) -> u16 {
        self.ticks
    }

    /// True while the output is being driven.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Kind-specific output strategy for a bank of `N` channels.
///
/// Channel indices passed to the hooks are 0-based. Hooks other than [`reset`](Self::reset),
/// [`reset_all`](Self::reset_all) and the handler-side setters run inside the timer interrupt and
/// must not block.
pub trait OutputStage<const N: usize> {
    /// Per-channel output state (pin level, head position, coil phase).
    type State: Copy + Default;

    /// Highest note this kind can play. Higher notes are dropped.
    const MAX_NOTE: u8;

    /// False for kinds whose period is fixed and ignores pitch bend.
    const BENDS: bool = true;

    /// Period in ticks for `note`, or `None` when the kind cannot play it.
    fn period_for(note: u8) -> Option<u16> {
        if note <= Self::MAX_NOTE {
            notes::half_period(note)
        } else {
            None
        }
    }

    /// A note started on `channel`.
    fn start(&mut self, _channel: usize, _state: &mut Self::State) {}

    /// The channel's period elapsed. `Break` ends the note even if it is still held.
    fn toggle(&mut self, channel: usize, state: &mut Self::State) -> ControlFlow<()>;

    /// The channel fell silent.
    fn stop(&mut self, _channel: usize, _state: &mut Self::State) {}

    /// True while the output must keep running after the note was released.
    fn sustains(&self, _state: &Self::State) -> bool {
        false
    }

    /// Called once per tick after every channel was advanced, if any hook fired.
    fn commit(&mut self, _states: &[Self::State; N]) {}

    /// Return one channel to its safe idle state. May block.
    fn reset(&mut self, channel: usize, state: &mut Self::State);

    /// Return every channel to idle, in parallel where the hardware allows. May block.
    fn reset_all(&mut self, states: &mut [Self::State; N]) {
        for (channel, state) in states.iter_mut().enumerate() {
            self.reset(channel, state);
        }
    }

    /// Enable or restrict head travel. Only position-tracking kinds care.
    fn set_movement(&mut self, _channel: usize, _state: &mut Self::State, _enabled: bool) {}

    /// Enable or blank the indicator LEDs.
    fn set_leds(&mut self, _enabled: bool, _states: &[Self::State; N]) {}

    /// Log faults the tick hooks recorded but could not report. Runs after every message.
    fn report_faults(&mut self) {}
}

/// Fixed-size bank of channels driving one output stage.
pub struct ChannelBank<O: OutputStage<N>, const N: usize> {
    control: [Control; N],
    timing: [Timing; N],
    states: [O::State; N],
    stage: O,
}

impl<O: OutputStage<N>, const N: usize> ChannelBank<O, N> {
    pub fn new(stage: O) -> Self {
        Self {
            control: [Control::default(); N],
            timing: [Timing::default(); N],
            states: [O::State::default(); N],
            stage,
        }
    }

    /// Map a 1-based sub-address onto a channel index.
    #[inline]
    fn index(sub_address: u8) -> Option<usize> {
        let index = (sub_address as usize).checked_sub(1)?;
        (index < N).then_some(index)
    }

    /// Start `note` on one channel. Sub-address 0 and unplayable notes are ignored.
    pub fn note_on(&mut self, sub_address: u8, note: u8) {
        let (Some(i), Some(period)) = (Self::index(sub_address), O::period_for(note)) else {
            return;
        };
        self.control[i].play(period);
    }

    /// Silence one channel, or every channel for sub-address 0.
    pub fn note_off(&mut self, sub_address: u8) {
        if sub_address == 0 {
            self.halt_all();
        } else if let Some(i) = Self::index(sub_address) {
            self.control[i].silence();
        }
    }

    /// Bend one channel's pitch. `deflection` spans [-8192, 8191]; 0 restores the played note.
    pub fn bend_pitch(&mut self, sub_address: u8, deflection: i16) {
        if !O::BENDS {
            return;
        }
        if let Some(i) = Self::index(sub_address) {
            self.control[i].bend(deflection);
        }
    }

    /// Silence every channel without resetting outputs (sequence stop).
    pub fn halt_all(&mut self) {
        for control in self.control.iter_mut() {
            control.silence();
        }
    }

    /// Enable or restrict head travel on one channel, or every channel for sub-address 0.
    pub fn set_movement(&mut self, sub_address: u8, enabled: bool) {
        if sub_address == 0 {
            for (channel, state) in self.states.iter_mut().enumerate() {
                self.stage.set_movement(channel, state, enabled);
            }
        } else if let Some(i) = Self::index(sub_address) {
            self.stage.set_movement(i, &mut self.states[i], enabled);
        }
    }

    pub fn set_leds(&mut self, enabled: bool) {
        self.stage.set_leds(enabled, &self.states);
    }

    /// Silence one channel and return its output to idle, or every channel for sub-address 0.
    /// Blocks while drives home; never call from the tick.
    pub fn reset(&mut self, sub_address: u8) {
        if sub_address == 0 {
            self.reset_all();
        } else if let Some(i) = Self::index(sub_address) {
            self.control[i].silence();
            self.timing[i] = Timing::idle(&self.control[i]);
            self.stage.reset(i, &mut self.states[i]);
        }
    }

    pub fn reset_all(&mut self) {
        for (control, timing) in self.control.iter_mut().zip(self.timing.iter_mut()) {
            control.silence();
            *timing = Timing::idle(control);
        }
        self.stage.reset_all(&mut self.states);
    }

    /// Advance every channel by one tick, in index order, then commit once.
    pub fn tick(&mut self) {
        let mut changed = false;

        for (i, (control, timing)) in self.control.iter().zip(self.timing.iter_mut()).enumerate() {
            let state = &mut self.states[i];

            if control.trigger != timing.trigger {
                timing.trigger = control.trigger;
                timing.ticks = 0;
                if control.period != 0 {
                    timing.active = true;
                    self.stage.start(i, state);
                    changed = true;
                }
            }

            if control.period != 0 {
                timing.period = control.period;
            } else if timing.active && !self.stage.sustains(state) {
                timing.active = false;
                timing.ticks = 0;
                self.stage.stop(i, state);
                changed = true;
            }

            if timing.active {
                timing.ticks += 1;
                if timing.ticks >= timing.period {
                    timing.ticks = 0;
                    changed = true;
                    if self.stage.toggle(i, state).is_break() {
                        timing.active = false;
                    }
                }
            }
        }

        if changed {
            self.stage.commit(&self.states);
        }
    }

    /// Command-side view of a channel.
    pub fn control(&self, sub_address: u8) -> Option<&Control> {
        Self::index(sub_address).map(|i| &self.control[i])
    }

    /// Tick-side view of a channel.
    pub fn timing(&self, sub_address: u8) -> Option<&Timing> {
        Self::index(sub_address).map(|i| &self.timing[i])
    }

    /// Output state of a channel.
    pub fn state(&self, sub_address: u8) -> Option<&O::State> {
        Self::index(sub_address).map(|i| &self.states[i])
    }

    pub fn stage(&self) -> &O {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut O {
        &mut self.stage
    }

    pub fn free(self) -> O {
        self.stage
    }
}

impl<O: OutputStage<N>, const N: usize> Instrument for ChannelBank<O, N> {
    fn setup(&mut self) {
        self.reset_all();
    }

    fn system_message(&mut self, command: SystemCommand) {
        match command {
            SystemCommand::Reset => self.reset_all(),
            SystemCommand::SequenceStop => self.halt_all(),
            SystemCommand::Ping | SystemCommand::SequenceStart | SystemCommand::Other(_) => {}
        }
        self.stage.report_faults();
    }

    fn device_message(&mut self, sub_address: u8, command: DeviceCommand<'_>) {
        match command {
            DeviceCommand::Reset => self.reset(sub_address),
            DeviceCommand::NoteOn { note } => self.note_on(sub_address, note),
            DeviceCommand::NoteOff { .. } => self.note_off(sub_address),
            DeviceCommand::BendPitch { deflection } => self.bend_pitch(sub_address, deflection),
            DeviceCommand::SetMovement { enabled } => self.set_movement(sub_address, enabled),
            DeviceCommand::DisableLeds { disabled } => self.set_leds(!disabled),
            DeviceCommand::Other { command, .. } => {
                log::debug!("ignoring device command {:#04x}", command);
            }
        }
        self.stage.report_faults();
    }

    fn tick(&mut self) {
        ChannelBank::tick(self)
    }
}
