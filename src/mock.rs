// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host-side stand-ins for pins, delays and buses used by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::spi;
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial;

use crate::error::Error;
use crate::network::{self, PeerAddress};

/// Output pin that remembers its level and counts rising edges. Clones share state.
#[derive(Clone, Default)]
pub struct Pin {
    high: Rc<Cell<bool>>,
    rising: Rc<Cell<u32>>,
}

impl Pin {
    pub fn is_high(&self) -> bool {
        self.high.get()
    }

    pub fn rising_edges(&self) -> u32 {
        self.rising.get()
    }
}

impl OutputPin for Pin {
    type Error = Infallible;

    fn set_high(&mut self) -> Result<(), Infallible> {
        if !self.high.get() {
            self.rising.set(self.rising.get() + 1);
        }
        self.high.set(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high.set(false);
        Ok(())
    }
}

/// Delay that only adds up the requested time.
#[derive(Clone, Default)]
pub struct Delay {
    total_ms: Rc<Cell<u32>>,
}

impl Delay {
    pub fn total_ms(&self) -> u32 {
        self.total_ms.get()
    }
}

impl DelayMs<u32> for Delay {
    fn delay_ms(&mut self, ms: u32) {
        self.total_ms.set(self.total_ms.get() + ms);
    }
}

/// SPI bus recording each write as one transfer. Failed writes are not recorded.
#[derive(Clone, Default)]
pub struct Spi {
    writes: Rc<RefCell<Vec<Vec<u8>>>>,
    fail: Rc<Cell<bool>>,
}

impl Spi {
    pub fn transfers(&self) -> Vec<Vec<u8>> {
        self.writes.borrow().clone()
    }

    pub fn last(&self) -> Option<Vec<u8>> {
        self.writes.borrow().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.writes.borrow().len()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail.set(fail);
    }
}

#[derive(Debug)]
pub struct SpiError;

impl spi::Write<u8> for Spi {
    type Error = SpiError;

    fn write(&mut self, words: &[u8]) -> Result<(), SpiError> {
        if self.fail.get() {
            return Err(SpiError);
        }
        self.writes.borrow_mut().push(words.to_vec());
        Ok(())
    }
}

/// Serial port fed from a byte queue; everything written is captured.
#[derive(Clone, Default)]
pub struct Serial {
    rx: Rc<RefCell<VecDeque<u8>>>,
    tx: Rc<RefCell<Vec<u8>>>,
    fail_next_read: Rc<Cell<bool>>,
}

impl Serial {
    pub fn feed(&self, bytes: &[u8]) {
        self.rx.borrow_mut().extend(bytes.iter().copied());
    }

    pub fn fail_next_read(&self) {
        self.fail_next_read.set(true);
    }

    pub fn written(&self) -> Vec<u8> {
        self.tx.borrow().clone()
    }

    pub fn pending(&self) -> usize {
        self.rx.borrow().len()
    }
}

#[derive(Debug)]
pub struct SerialError;

impl serial::Read<u8> for Serial {
    type Error = SerialError;

    fn read(&mut self) -> nb::Result<u8, SerialError> {
        if self.fail_next_read.replace(false) {
            return Err(nb::Error::Other(SerialError));
        }
        self.rx.borrow_mut().pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl serial::Write<u8> for Serial {
    type Error = SerialError;

    fn write(&mut self, word: u8) -> nb::Result<(), SerialError> {
        self.tx.borrow_mut().push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), SerialError> {
        Ok(())
    }
}

/// One frame handed to [`Radio::start_send`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sent {
    pub to: PeerAddress,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
struct RadioState {
    channel: Option<u8>,
    peers: Vec<PeerAddress>,
    sent: Vec<Sent>,
    fail_begin: bool,
    reject_peers: bool,
    reject_sends: bool,
}

/// Radio that accepts every send at once and records it. Clones share state.
#[derive(Clone, Default)]
pub struct Radio {
    state: Rc<RefCell<RadioState>>,
}

impl Radio {
    pub fn channel(&self) -> Option<u8> {
        self.state.borrow().channel
    }

    pub fn peers(&self) -> Vec<PeerAddress> {
        self.state.borrow().peers.clone()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.state.borrow().sent.clone()
    }

    pub fn fail_begin(&self) {
        self.state.borrow_mut().fail_begin = true;
    }

    pub fn reject_peers(&self, reject: bool) {
        self.state.borrow_mut().reject_peers = reject;
    }

    pub fn reject_sends(&self, reject: bool) {
        self.state.borrow_mut().reject_sends = reject;
    }
}

impl network::Radio for Radio {
    fn begin(&mut self, channel: u8) -> crate::Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_begin {
            return Err(Error::BringUp);
        }
        state.channel = Some(channel);
        Ok(())
    }

    fn add_peer(&mut self, peer: PeerAddress) -> crate::Result<()> {
        let mut state = self.state.borrow_mut();
        if state.reject_peers {
            return Err(Error::Link);
        }
        if !state.peers.contains(&peer) {
            state.peers.push(peer);
        }
        Ok(())
    }

    fn start_send(&mut self, to: PeerAddress, bytes: &[u8]) -> crate::Result<()> {
        let mut state = self.state.borrow_mut();
        if state.reject_sends {
            return Err(Error::Link);
        }
        state.sent.push(Sent {
            to,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}
