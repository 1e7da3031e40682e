// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Busy-wait delay counted in core cycles.
//!
//! SysTick is left free and the delay is `Copy`, so the instrument (homing, solenoid reset) and
//! the startup sound can each hold one.

use embedded_hal::blocking::delay::DelayMs;

#[derive(Copy, Clone, Debug)]
pub struct CycleDelay {
    cycles_per_ms: u32,
}

impl CycleDelay {
    pub const fn new(sysclk_hz: u32) -> Self {
        Self {
            cycles_per_ms: sysclk_hz / 1_000,
        }
    }
}

impl DelayMs<u32> for CycleDelay {
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            cortex_m::asm::delay(self.cycles_per_ms);
        }
    }
}
