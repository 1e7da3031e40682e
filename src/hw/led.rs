// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status LEDs on the instrument board.
//!
//! Red latches on when a transport fails to come up. Green is a [`Heartbeat`] driven by the poll
//! loop, so a wedged loop (or a tick interrupt starving it) shows up as a frozen LED.

use embedded_hal::digital::v2::{OutputPin, PinState};

/// LED that remembers its wiring polarity and last commanded state.
pub struct Led<PIN> {
    pin: PIN,
    active_low: bool,
    is_on: bool,
}

impl<PIN: OutputPin> Led<PIN> {
    /// LED wired between the pin and VDD. Starts OFF.
    pub fn active_low(pin: PIN) -> Self {
        let mut led = Self {
            pin,
            active_low: true,
            is_on: true,
        };
        led.set(false);
        led
    }

    /// Drive the LED logically ON (true) or OFF (false).
    pub fn set(&mut self, on: bool) {
        self.pin.set_state(PinState::from(on != self.active_low)).ok();
        self.is_on = on;
    }

    #[inline]
    pub fn on(&mut self) {
        self.set(true);
    }

    #[inline]
    pub fn toggle(&mut self) {
        self.set(!self.is_on);
    }
}

/// Blinks an LED once every `period` calls to [`Heartbeat::poll`].
pub struct Heartbeat<PIN> {
    led: Led<PIN>,
    period: u32,
    polls: u32,
}

impl<PIN: OutputPin> Heartbeat<PIN> {
    pub fn new(led: Led<PIN>, period: u32) -> Self {
        Self {
            led,
            period: period.max(1),
            polls: 0,
        }
    }

    pub fn poll(&mut self) {
        self.polls += 1;
        if self.polls >= self.period {
            self.polls = 0;
            self.led.toggle();
        }
    }
}
