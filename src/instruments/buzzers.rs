// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Piezo buzzers, one pin each, toggled at the note's half period.

use core::ops::ControlFlow;

use embedded_hal::digital::v2::OutputPin;

use crate::instruments::channel::{ChannelBank, OutputStage};

pub const MAX_BUZZER_NOTE: u8 = 71;

pub struct Buzzers<P, const N: usize> {
    pins: [P; N],
}

/// Buzzers on direct pins, channel `n` driving `pins[n - 1]`.
pub type BuzzerChannelBank<P, const N: usize> = ChannelBank<Buzzers<P, N>, N>;

impl<P: OutputPin, const N: usize> Buzzers<P, N> {
    pub fn new(mut pins: [P; N]) -> Self {
        for pin in pins.iter_mut() {
            pin.set_low().ok();
        }
        Self { pins }
    }

    pub fn free(self) -> [P; N] {
        self.pins
    }
}

impl<P: OutputPin, const N: usize> OutputStage<N> for Buzzers<P, N> {
    /// Pin level.
    type State = bool;
    const MAX_NOTE: u8 = MAX_BUZZER_NOTE;

    fn toggle(&mut self, channel: usize, high: &mut bool) -> ControlFlow<()> {
        *high = !*high;
        if *high {
            self.pins[channel].set_high().ok();
        } else {
            self.pins[channel].set_low().ok();
        }
        ControlFlow::Continue(())
    }

    /// Leave the piezo unpowered between notes.
    fn stop(&mut self, channel: usize, high: &mut bool) {
        *high = false;
        self.pins[channel].set_low().ok();
    }

    fn reset(&mut self, channel: usize, high: &mut bool) {
        self.stop(channel, high);
    }
}
