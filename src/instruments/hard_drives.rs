// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Hard drive arms used as drums.
//!
//! A note-on strikes: the coil pulls the arm forward for `PULSE_TICKS`, pushes it back for another
//! `PULSE_TICKS`, then releases. Pitch has no meaning here, so every playable note maps to the
//! same pulse length and pitch bend is ignored. Releasing the note never cuts a strike short.

use core::ops::ControlFlow;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

use crate::drivers::coil::Coil;
use crate::instruments::channel::{ChannelBank, OutputStage};

/// Length of each strike phase, in ticks (25 ms).
pub const PULSE_TICKS: u16 = 625;

/// Phase lengths of the reset pulse, in milliseconds.
const RESET_PULSE_MS: u32 = 25;
const RESET_SETTLE_MS: u32 = 5;

/// Coil phase of one drive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Forward,
    Reverse,
}

pub struct HardDrives<A, B, D, const N: usize> {
    coils: [Coil<A, B>; N],
    delay: D,
}

/// Hard drives on L293 half-bridges, channel `n` driving `coils[n - 1]`.
pub type SolenoidChannelBank<A, B, D, const N: usize> = ChannelBank<HardDrives<A, B, D, N>, N>;

impl<A, B, D, const N: usize> HardDrives<A, B, D, N>
where
    A: OutputPin,
    B: OutputPin,
    D: DelayMs<u32>,
{
    pub fn new(coils: [Coil<A, B>; N], delay: D) -> Self {
        Self { coils, delay }
    }

    pub fn free(self) -> ([Coil<A, B>; N], D) {
        (self.coils, self.delay)
    }
}

impl<A, B, D, const N: usize> OutputStage<N> for HardDrives<A, B, D, N>
where
    A: OutputPin,
    B: OutputPin,
    D: DelayMs<u32>,
{
    type State = Phase;
    const MAX_NOTE: u8 = 127;
    const BENDS: bool = false;

    fn period_for(note: u8) -> Option<u16> {
        (note <= Self::MAX_NOTE).then_some(PULSE_TICKS)
    }

    fn start(&mut self, channel: usize, phase: &mut Phase) {
        *phase = Phase::Forward;
        self.coils[channel].forward();
    }

    fn toggle(&mut self, channel: usize, phase: &mut Phase) -> ControlFlow<()> {
        match phase {
            Phase::Forward => {
                *phase = Phase::Reverse;
                self.coils[channel].reverse();
                ControlFlow::Continue(())
            }
            Phase::Reverse | Phase::Idle => {
                *phase = Phase::Idle;
                self.coils[channel].release();
                ControlFlow::Break(())
            }
        }
    }

    fn sustains(&self, phase: &Phase) -> bool {
        *phase != Phase::Idle
    }

    fn reset(&mut self, channel: usize, phase: &mut Phase) {
        *phase = Phase::Idle;
        let coil = &mut self.coils[channel];
        coil.forward();
        self.delay.delay_ms(RESET_PULSE_MS);
        coil.reverse();
        self.delay.delay_ms(RESET_PULSE_MS);
        coil.release();
        self.delay.delay_ms(RESET_SETTLE_MS);
    }

    fn reset_all(&mut self, phases: &mut [Phase; N]) {
        phases.fill(Phase::Idle);
        self.coils.iter_mut().for_each(Coil::forward);
        self.delay.delay_ms(RESET_PULSE_MS);
        self.coils.iter_mut().for_each(Coil::reverse);
        self.delay.delay_ms(RESET_PULSE_MS);
        self.coils.iter_mut().for_each(Coil::release);
        self.delay.delay_ms(RESET_SETTLE_MS);
    }
}
