// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Instrument reached over a datagram socket (UDP or similar).
//!
//! Each datagram carries whole frames; assembly restarts at every datagram boundary so a
//! truncated datagram cannot corrupt the next one. Replies go to the sender of the frame that
//! asked for them.

use crate::config::DeviceConfig;
use crate::error::{Error, Result};
use crate::instruments::Instrument;
use crate::network::Transport;
use crate::protocol::{Dispatcher, Parser, Reply, MAX_FRAME_LEN};

/// Non-blocking datagram socket.
pub trait DatagramSocket {
    /// Where a datagram came from and where a reply is sent.
    type Endpoint: Copy;

    /// Bind or join whatever the socket listens on.
    fn open(&mut self) -> Result<()>;

    /// Copy the next datagram into `buf`, returning its length and sender. Datagrams longer
    /// than `buf` are truncated.
    fn receive(&mut self, buf: &mut [u8]) -> nb::Result<(usize, Self::Endpoint), Error>;

    fn send_to(&mut self, to: Self::Endpoint, bytes: &[u8]) -> Result<()>;
}

pub struct DatagramTransport<D: DatagramSocket> {
    socket: D,
    parser: Parser,
    dispatcher: Dispatcher,
    buf: [u8; MAX_FRAME_LEN],
    last_sender: Option<D::Endpoint>,
}

impl<D: DatagramSocket> DatagramTransport<D> {
    pub fn new(socket: D, config: DeviceConfig) -> Self {
        Self {
            socket,
            parser: Parser::new(config),
            dispatcher: Dispatcher::new(config),
            buf: [0; MAX_FRAME_LEN],
            last_sender: None,
        }
    }

    /// Sender of the most recent datagram.
    pub fn last_sender(&self) -> Option<D::Endpoint> {
        self.last_sender
    }

    pub fn free(self) -> D {
        self.socket
    }
}

impl<D: DatagramSocket> Transport for DatagramTransport<D> {
    fn begin(&mut self) -> Result<()> {
        self.socket.open().map_err(|e| {
            log::warn!("datagram socket failed to open: {}", e);
            e
        })?;
        self.parser.reset();
        log::info!("datagram transport ready");
        Ok(())
    }

    fn poll<I: Instrument + ?Sized>(&mut self, instrument: &mut I) {
        loop {
            let (len, from) = match self.socket.receive(&mut self.buf) {
                Ok(received) => received,
                Err(nb::Error::WouldBlock) => return,
                Err(nb::Error::Other(e)) => {
                    log::warn!("datagram receive failed: {}", e);
                    return;
                }
            };
            self.last_sender = Some(from);

            self.parser.reset();
            let len = len.min(self.buf.len());
            for &byte in &self.buf[..len] {
                let reply = match self.parser.push(byte) {
                    Some(frame) => self.dispatcher.dispatch(&frame.message(), instrument),
                    None => continue,
                };
                if let Reply::Pong(pong) = reply {
                    if let Err(e) = self.socket.send_to(from, &pong) {
                        log::warn!("pong not sent: {}", e);
                    }
                }
            }
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let to = self.last_sender.ok_or(Error::NoPeer)?;
        self.socket.send_to(to, bytes)
    }
}
