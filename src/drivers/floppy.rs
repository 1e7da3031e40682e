// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Floppy drive read head, stepped through the drive's STEP and DIR lines.
//!
//! Positions count half tracks: every toggle of the step line moves the head half a track, so a
//! 3.5" drive with 80 tracks travels over `0..=158`.

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

/// Outermost half-track position of a 3.5" drive.
pub const MAX_POSITION: u8 = 158;

/// Travel bounds used while head movement is disabled.
pub const PINNED_BOUNDS: (u8, u8) = (79, 81);

/// Delay between step pulses while homing.
pub const HOMING_STEP_MS: u32 = 5;

/// Head position and direction, tracked without feedback from the drive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Head {
    position: u8,
    min: u8,
    max: u8,
    reverse: bool,
    step_high: bool,
}

impl Head {
    pub const fn new() -> Self {
        Self {
            position: 0,
            min: 0,
            max: MAX_POSITION,
            reverse: false,
            step_high: false,
        }
    }

    #[inline]
    pub fn position(&self) -> u8 {
        self.position
    }

    /// True while the head travels toward position 0.
    #[inline]
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// Level the step line should be driven to.
    #[inline]
    pub fn step_high(&self) -> bool {
        self.step_high
    }

    #[inline]
    pub fn bounds(&self) -> (u8, u8) {
        (self.min, self.max)
    }

    /// Move half a track, turning around at the travel bounds.
    pub fn advance(&mut self) {
        if self.position >= self.max {
            self.reverse = true;
        } else if self.position <= self.min {
            self.reverse = false;
        }

        if self.reverse {
            self.position = self.position.saturating_sub(1);
        } else {
            self.position += 1;
        }
        self.step_high = !self.step_high;
    }

    /// Full travel when enabled; a short sweep around the middle track otherwise.
    pub fn set_movement(&mut self, enabled: bool) {
        (self.min, self.max) = if enabled {
            (0, MAX_POSITION)
        } else {
            PINNED_BOUNDS
        };
    }

    /// State after a homing sweep: position 0, moving outward, full travel.
    pub fn home(&mut self) {
        *self = Self::new();
    }
}

impl Default for Head {
    fn default() -> Self {
        Self::new()
    }
}

/// Pin pair of one drive. DIR high steps toward track 0.
pub struct FloppyDrive<STEP, DIR> {
    step: STEP,
    dir: DIR,
}

impl<STEP: OutputPin, DIR: OutputPin> FloppyDrive<STEP, DIR> {
    pub fn new(mut step: STEP, mut dir: DIR) -> Self {
        step.set_low().ok();
        dir.set_low().ok();
        Self { step, dir }
    }

    /// Drive both lines to match `head`.
    pub fn apply(&mut self, head: &Head) {
        if head.reverse() {
            self.dir.set_high().ok();
        } else {
            self.dir.set_low().ok();
        }
        if head.step_high() {
            self.step.set_high().ok();
        } else {
            self.step.set_low().ok();
        }
    }

    /// Point the head at track 0 for a homing sweep.
    pub fn begin_homing(&mut self) {
        self.dir.set_high().ok();
    }

    /// One full step pulse (a whole track).
    pub fn pulse(&mut self) {
        self.step.set_high().ok();
        self.step.set_low().ok();
    }

    /// Finish a homing sweep and sync `head` to the parked drive.
    pub fn end_homing(&mut self, head: &mut Head) {
        head.home();
        self.apply(head);
    }

    /// Run this drive alone back to track 0. Blocks for roughly `MAX_POSITION / 2 * 5` ms.
    pub fn home<D: DelayMs<u32>>(&mut self, head: &mut Head, delay: &mut D) {
        self.begin_homing();
        for _ in 0..MAX_POSITION / 2 {
            self.pulse();
            delay.delay_ms(HOMING_STEP_MS);
        }
        self.end_homing(head);
    }

    pub fn free(self) -> (STEP, DIR) {
        (self.step, self.dir)
    }
}
