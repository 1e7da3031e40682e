// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Instrument shared between the poll loop and the tick interrupt.
//!
//! The instrument is installed once at startup and lives in a `static`. The timer interrupt and
//! each dispatched message borrow it inside a critical section, so a handler never observes a
//! half-finished tick and the tick never observes a half-applied command.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::instruments::Instrument;
use crate::protocol::{DeviceCommand, SystemCommand};

pub struct Shared<I> {
    inner: Mutex<RefCell<Option<I>>>,
}

impl<I> Shared<I> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install the instrument. Replaces any previous one.
    pub fn install(&self, instrument: I) {
        critical_section::with(|cs| {
            self.inner.borrow(cs).replace(Some(instrument));
        });
    }

    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().is_some())
    }

    /// Run `f` on the instrument inside a critical section. Returns `None` before `install`.
    ///
    /// Interrupts stay masked for the whole call, the tick included. A reset that homes floppy
    /// heads holds them off for the full sweep.
    pub fn with<R>(&self, f: impl FnOnce(&mut I) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().as_mut().map(f))
    }
}

impl<I> Default for Shared<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Instrument> Shared<I> {
    /// Tick entry point for the timer interrupt. A no-op until installed.
    #[inline]
    pub fn tick(&self) {
        self.with(|instrument| instrument.tick());
    }
}

/// Lets transports and the dispatcher drive a shared instrument directly; every call takes the
/// lock once.
impl<I: Instrument> Instrument for &Shared<I> {
    fn setup(&mut self) {
        self.with(|instrument| instrument.setup());
    }

    fn system_message(&mut self, command: SystemCommand) {
        self.with(|instrument| instrument.system_message(command));
    }

    fn device_message(&mut self, sub_address: u8, command: DeviceCommand<'_>) {
        self.with(|instrument| instrument.device_message(sub_address, command));
    }

    fn tick(&mut self) {
        Shared::tick(self);
    }
}
