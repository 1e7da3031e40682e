// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Frame assembler for the Moppy protocol.
//!
//! Bytes are pushed one at a time as they arrive from a transport. The parser walks the header,
//! filters frames addressed to other devices or channels, and hands back a borrowed [`Frame`] once
//! the declared body is complete. Any rejected byte resynchronizes on the next start byte.

use crate::config::DeviceConfig;
use crate::protocol::codec::{Frame, HEADER_LEN, MAX_FRAME_LEN};
use crate::protocol::messages::START_BYTE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    WaitStart,
    WaitAddress,
    WaitSubAddress,
    WaitLength,
    WaitBody { remaining: u8 },
}

/// Byte-push state machine. `N` bounds the largest frame accepted.
pub struct Parser<const N: usize = MAX_FRAME_LEN> {
    state: State,
    filter: Option<DeviceConfig>,
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> Parser<N> {
    const ROOM_FOR_A_COMMAND: () = assert!(N > HEADER_LEN, "parser buffer cannot hold a frame");

    /// Parser that only accepts frames for the system address or `config.address`, with
    /// sub-address 0 or within `config`'s bounds.
    pub const fn new(config: DeviceConfig) -> Self {
        Self::with_filter(Some(config))
    }

    /// Parser that accepts well-formed frames for any address.
    pub const fn promiscuous() -> Self {
        Self::with_filter(None)
    }

    const fn with_filter(filter: Option<DeviceConfig>) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::ROOM_FOR_A_COMMAND;
        Self {
            state: State::WaitStart,
            filter,
            buf: [0; N],
            len: 0,
        }
    }

    /// Process a single incoming byte. Returns `Some(Frame)` when a complete frame is received.
    pub fn push(&mut self, byte: u8) -> Option<Frame<'_>> {
        match self.state {
            State::WaitStart => {
                if byte == START_BYTE {
                    self.restart();
                }
            }
            State::WaitAddress => {
                if self.filter.map_or(true, |cfg| cfg.accepts_address(byte)) {
                    self.store(byte);
                    self.state = State::WaitSubAddress;
                } else {
                    self.reject(byte);
                }
            }
            State::WaitSubAddress => {
                if self.filter.map_or(true, |cfg| cfg.accepts_sub_address(byte)) {
                    self.store(byte);
                    self.state = State::WaitLength;
                } else {
                    self.reject(byte);
                }
            }
            State::WaitLength => {
                // Zero would leave no command byte
                if byte == 0 || HEADER_LEN + byte as usize > N {
                    self.reject(byte);
                } else {
                    self.store(byte);
                    self.state = State::WaitBody { remaining: byte };
                }
            }
            State::WaitBody { remaining } => {
                self.store(byte);
                if remaining > 1 {
                    self.state = State::WaitBody {
                        remaining: remaining - 1,
                    };
                } else {
                    self.state = State::WaitStart;
                    return Some(Frame::new_unchecked(&self.buf[..self.len]));
                }
            }
        }
        None
    }

    /// Push every byte of `bytes`, calling `on_frame` for each completed frame.
    pub fn push_slice<F>(&mut self, bytes: &[u8], mut on_frame: F)
    where
        F: FnMut(Frame<'_>),
    {
        for &byte in bytes {
            if let Some(frame) = self.push(byte) {
                on_frame(frame);
            }
        }
    }

    /// Drop any partial frame.
    pub fn reset(&mut self) {
        self.state = State::WaitStart;
        self.len = 0;
    }

    /// True when no partial frame is buffered.
    pub fn is_idle(&self) -> bool {
        self.state == State::WaitStart
    }

    fn restart(&mut self) {
        self.buf[0] = START_BYTE;
        self.len = 1;
        self.state = State::WaitAddress;
    }

    fn store(&mut self, byte: u8) {
        self.buf[self.len] = byte;
        self.len += 1;
    }

    fn reject(&mut self, byte: u8) {
        log::debug!("dropping frame at {:?} on byte {:#04x}", self.state, byte);
        if byte == START_BYTE {
            self.restart();
        } else {
            self.reset();
        }
    }
}
