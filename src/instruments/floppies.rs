// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Floppy drives wired straight to MCU pins, one STEP/DIR pair per drive.

use core::ops::ControlFlow;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

use crate::drivers::floppy::{FloppyDrive, Head, HOMING_STEP_MS, MAX_POSITION};
use crate::instruments::channel::{ChannelBank, OutputStage};

/// Highest note a floppy head can keep up with.
pub const MAX_FLOPPY_NOTE: u8 = 71;

/// Output stage for `N` directly wired drives. `D` paces the homing sweep.
pub struct Floppies<STEP, DIR, D, const N: usize> {
    drives: [FloppyDrive<STEP, DIR>; N],
    delay: D,
}

/// Floppy drives on direct pins, channel `n` driving `drives[n - 1]`.
pub type StepperChannelBank<STEP, DIR, D, const N: usize> = ChannelBank<Floppies<STEP, DIR, D, N>, N>;

impl<STEP, DIR, D, const N: usize> Floppies<STEP, DIR, D, N>
where
    STEP: OutputPin,
    DIR: OutputPin,
    D: DelayMs<u32>,
{
    pub fn new(drives: [FloppyDrive<STEP, DIR>; N], delay: D) -> Self {
        Self { drives, delay }
    }

    pub fn free(self) -> ([FloppyDrive<STEP, DIR>; N], D) {
        (self.drives, self.delay)
    }
}

impl<STEP, DIR, D, const N: usize> OutputStage<N> for Floppies<STEP, DIR, D, N>
where
    STEP: OutputPin,
    DIR: OutputPin,
    D: DelayMs<u32>,
{
    type State = Head;
    const MAX_NOTE: u8 = MAX_FLOPPY_NOTE;

    fn toggle(&mut self, channel: usize, head: &mut Head) -> ControlFlow<()> {
        head.advance();
        self.drives[channel].apply(head);
        ControlFlow::Continue(())
    }

    fn reset(&mut self, channel: usize, head: &mut Head) {
        self.drives[channel].home(head, &mut self.delay);
    }

    /// Home every drive at once: one pulse on all drives per 5 ms step.
    fn reset_all(&mut self, heads: &mut [Head; N]) {
        for drive in self.drives.iter_mut() {
            drive.begin_homing();
        }
        for _ in 0..MAX_POSITION / 2 {
            for drive in self.drives.iter_mut() {
                drive.pulse();
            }
            self.delay.delay_ms(HOMING_STEP_MS);
        }
        for (drive, head) in self.drives.iter_mut().zip(heads.iter_mut()) {
            drive.end_homing(head);
        }
    }

    fn set_movement(&mut self, _channel: usize, head: &mut Head, enabled: bool) {
        head.set_movement(enabled);
    }
}
