// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fakes shared by the integration scenarios.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial;

use moppy::instruments::Instrument;
use moppy::network::{PeerAddress, Radio};
use moppy::protocol::{DeviceCommand, SystemCommand};

/// Output pin counting every level change. Clones share state.
#[derive(Clone, Default)]
pub struct Pin {
    high: Rc<Cell<bool>>,
    toggles: Rc<Cell<u32>>,
}

impl Pin {
    pub fn toggles(&self) -> u32 {
        self.toggles.get()
    }

    fn drive(&self, high: bool) {
        if self.high.replace(high) != high {
            self.toggles.set(self.toggles.get() + 1);
        }
    }
}

impl OutputPin for Pin {
    type Error = Infallible;

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.drive(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.drive(false);
        Ok(())
    }
}

/// Serial port fed by the test; writes are captured. Clones share state.
#[derive(Clone, Default)]
pub struct Serial {
    rx: Rc<RefCell<VecDeque<u8>>>,
    tx: Rc<RefCell<Vec<u8>>>,
}

impl Serial {
    pub fn feed(&self, bytes: &[u8]) {
        self.rx.borrow_mut().extend(bytes.iter().copied());
    }

    pub fn take_written(&self) -> Vec<u8> {
        self.tx.borrow_mut().drain(..).collect()
    }
}

impl serial::Read<u8> for Serial {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.rx.borrow_mut().pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl serial::Write<u8> for Serial {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Infallible> {
        self.tx.borrow_mut().push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        Ok(())
    }
}

/// Radio that records outgoing datagrams until the test delivers them. Clones share state.
#[derive(Clone, Default)]
pub struct Air {
    outgoing: Rc<RefCell<VecDeque<(PeerAddress, Vec<u8>)>>>,
}

impl Air {
    pub fn take(&self) -> Option<(PeerAddress, Vec<u8>)> {
        self.outgoing.borrow_mut().pop_front()
    }
}

impl Radio for Air {
    fn begin(&mut self, _channel: u8) -> moppy::Result<()> {
        Ok(())
    }

    fn add_peer(&mut self, _peer: PeerAddress) -> moppy::Result<()> {
        Ok(())
    }

    fn start_send(&mut self, to: PeerAddress, bytes: &[u8]) -> moppy::Result<()> {
        self.outgoing.borrow_mut().push_back((to, bytes.to_vec()));
        Ok(())
    }
}

/// Instrument that only records what reached it.
#[derive(Default)]
pub struct Log {
    pub system: Vec<SystemCommand>,
    pub notes: Vec<(u8, u8)>,
    pub device: u32,
}

impl Instrument for Log {
    fn setup(&mut self) {}

    fn system_message(&mut self, command: SystemCommand) {
        self.system.push(command);
    }

    fn device_message(&mut self, sub_address: u8, command: DeviceCommand<'_>) {
        self.device += 1;
        if let DeviceCommand::NoteOn { note } = command {
            self.notes.push((sub_address, note));
        }
    }

    fn tick(&mut self) {}
}
