// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Transports
//!
//! Byte sources and sinks that feed the frame assembler and carry replies back.
//!
//! ## Modules
//!
//! - [`serial`] - UART link to the Moppy controller.
//! - [`datagram`] - One frame stream per received datagram (UDP and similar).
//! - [`wireless`] - Peer on a connectionless radio link (ESP-NOW style).
//! - [`gateway`] - Serial to radio bridge with no instrument of its own.
//! - [`send_queue`] - Single-outstanding-send queue for radio links.

pub mod datagram;
pub mod gateway;
pub mod send_queue;
pub mod serial;
pub mod wireless;

pub use datagram::{DatagramSocket, DatagramTransport};
pub use gateway::WirelessGateway;
pub use send_queue::{Packet, SendQueue};
pub use serial::SerialTransport;
pub use wireless::{PeerAddress, Radio, WirelessPeer, BROADCAST};

use crate::error::Result;
use crate::instruments::Instrument;

/// A link the firmware receives Moppy frames on.
pub trait Transport {
    /// Bring the link up. Safe to call more than once.
    fn begin(&mut self) -> Result<()>;

    /// Consume whatever input is available without blocking, dispatching complete messages to
    /// `instrument`.
    fn poll<I: Instrument + ?Sized>(&mut self, instrument: &mut I);

    /// Best-effort send back over the link.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;
}
