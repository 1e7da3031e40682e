// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Voice coil of a hard drive arm, driven through one L293 half-bridge pair.
//!
//! | A | B | Coil |
//! | - | - | ---- |
//! | H | L | forward (arm strikes) |
//! | L | H | reverse (arm returns) |
//! | L | L | released |

use embedded_hal::digital::v2::OutputPin;

pub struct Coil<A, B> {
    a: A,
    b: B,
}

impl<A: OutputPin, B: OutputPin> Coil<A, B> {
    /// Create a coil driver in the released state.
    pub fn new(a: A, b: B) -> Self {
        let mut coil = Self { a, b };
        coil.release();
        coil
    }

    pub fn forward(&mut self) {
        self.b.set_low().ok();
        self.a.set_high().ok();
    }

    pub fn reverse(&mut self) {
        self.a.set_low().ok();
        self.b.set_high().ok();
    }

    /// De-energize the coil.
    pub fn release(&mut self) {
        self.a.set_low().ok();
        self.b.set_low().ok();
    }

    pub fn free(self) -> (A, B) {
        (self.a, self.b)
    }
}
