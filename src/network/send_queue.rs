// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Outbound queue for radios that allow one send in flight.
//!
//! A send starts immediately when the radio is idle; otherwise it waits in a bounded queue. The
//! radio's completion callback starts the next one. A send that never completes is given up on
//! after `SEND_TIMEOUT_POLLS` polls so a lost callback cannot wedge the link, and a full queue
//! drops the newest frame rather than blocking the poll loop.

use heapless::{Deque, Vec};

use crate::error::{Error, Result};
use crate::network::wireless::{PeerAddress, Radio};
use crate::protocol::MAX_FRAME_LEN;

/// Polls to wait for a send completion before moving on.
pub const SEND_TIMEOUT_POLLS: u32 = 1_000;

/// One datagram and the peer it is going to (or came from).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    pub peer: PeerAddress,
    pub bytes: Vec<u8, MAX_FRAME_LEN>,
}

impl Packet {
    pub fn new(peer: PeerAddress, data: &[u8]) -> Result<Self> {
        let bytes = Vec::from_slice(data).map_err(|_| Error::FrameTooLarge(data.len()))?;
        Ok(Self { peer, bytes })
    }
}

pub struct SendQueue<const DEPTH: usize> {
    /// Polls waited on the send in flight, if any.
    in_flight: Option<u32>,
    pending: Deque<Packet, DEPTH>,
}

impl<const DEPTH: usize> SendQueue<DEPTH> {
    pub const fn new() -> Self {
        Self {
            in_flight: None,
            pending: Deque::new(),
        }
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Send now if the radio is idle, else queue. `Err(QueueFull)` means the frame was dropped.
    pub fn send<R: Radio>(&mut self, radio: &mut R, to: PeerAddress, bytes: &[u8]) -> Result<()> {
        let packet = Packet::new(to, bytes)?;
        if self.in_flight.is_none() {
            return self.start(radio, &packet);
        }
        self.pending.push_back(packet).map_err(|_| {
            log::warn!("send queue full, dropping frame");
            Error::QueueFull
        })
    }

    /// Completion callback for the send in flight.
    pub fn complete<R: Radio>(&mut self, radio: &mut R, ok: bool) {
        if !ok {
            log::warn!("radio send failed");
        }
        self.in_flight = None;
        self.start_next(radio);
    }

    /// Age the send in flight; give up on it once it times out.
    pub fn poll<R: Radio>(&mut self, radio: &mut R) {
        let Some(waited) = self.in_flight.as_mut() else {
            return;
        };
        *waited += 1;
        if *waited >= SEND_TIMEOUT_POLLS {
            log::warn!("radio send timed out after {} polls", SEND_TIMEOUT_POLLS);
            self.in_flight = None;
            self.start_next(radio);
        }
    }

    fn start<R: Radio>(&mut self, radio: &mut R, packet: &Packet) -> Result<()> {
        match radio.start_send(packet.peer, &packet.bytes) {
            Ok(()) => {
                self.in_flight = Some(0);
                Ok(())
            }
            Err(e) => {
                log::warn!("radio send rejected: {}", e);
                Err(e)
            }
        }
    }

    fn start_next<R: Radio>(&mut self, radio: &mut R) {
        while let Some(packet) = self.pending.pop_front() {
            if self.start(radio, &packet).is_ok() {
                break;
            }
        }
    }
}

impl<const DEPTH: usize> Default for SendQueue<DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::Radio as MockRadio;
    use crate::network::BROADCAST;

    #[test]
    fn second_send_waits_for_completion() {
        let mut radio = MockRadio::default();
        let mut queue: SendQueue<2> = SendQueue::new();

        queue.send(&mut radio, BROADCAST, &[1]).unwrap();
        queue.send(&mut radio, BROADCAST, &[2]).unwrap();
        assert_eq!(radio.sent().len(), 1);
        assert_eq!(queue.pending(), 1);

        queue.complete(&mut radio, true);
        assert_eq!(radio.sent().len(), 2);
        assert_eq!(radio.sent()[1].bytes, [2]);
        assert!(queue.is_busy());

        queue.complete(&mut radio, true);
        assert!(!queue.is_busy());
    }

    #[test]
    fn full_queue_drops_newest() {
        let mut radio = MockRadio::default();
        let mut queue: SendQueue<1> = SendQueue::new();

        queue.send(&mut radio, BROADCAST, &[1]).unwrap();
        queue.send(&mut radio, BROADCAST, &[2]).unwrap();
        assert_eq!(queue.send(&mut radio, BROADCAST, &[3]), Err(Error::QueueFull));

        queue.complete(&mut radio, false);
        queue.complete(&mut radio, true);
        let sent: std::vec::Vec<_> = radio.sent().into_iter().map(|s| s.bytes).collect();
        assert_eq!(sent, [[1], [2]]);
    }

    #[test]
    fn lost_completion_times_out() {
        let mut radio = MockRadio::default();
        let mut queue: SendQueue<2> = SendQueue::new();

        queue.send(&mut radio, BROADCAST, &[1]).unwrap();
        queue.send(&mut radio, BROADCAST, &[2]).unwrap();
        for _ in 0..SEND_TIMEOUT_POLLS - 1 {
            queue.poll(&mut radio);
        }
        assert_eq!(radio.sent().len(), 1);
        queue.poll(&mut radio);
        assert_eq!(radio.sent().len(), 2);
        assert!(queue.is_busy());
    }

    #[test]
    fn rejected_start_leaves_queue_idle() {
        let mut radio = MockRadio::default();
        radio.reject_sends(true);
        let mut queue: SendQueue<2> = SendQueue::new();
        assert_eq!(queue.send(&mut radio, BROADCAST, &[1]), Err(Error::Link));
        assert!(!queue.is_busy());
    }

    #[test]
    fn oversize_frames_are_refused() {
        let mut radio = MockRadio::default();
        let mut queue: SendQueue<2> = SendQueue::new();
        let big = [0u8; MAX_FRAME_LEN + 1];
        assert_eq!(
            queue.send(&mut radio, BROADCAST, &big),
            Err(Error::FrameTooLarge(MAX_FRAME_LEN + 1))
        );
    }
}
