// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Instrument reached over a connectionless radio link (ESP-NOW style).
//!
//! The radio driver delivers datagrams and send completions from its own callback context; the
//! owner forwards them to [`WirelessPeer::on_receive`] and [`WirelessPeer::on_send_complete`]
//! while holding the same lock it uses around [`Transport::poll`]. Received datagrams are only
//! queued there; assembly and dispatch happen in `poll`.

use heapless::{Deque, Vec};

use crate::config::{DeviceConfig, WIFI_CHANNEL};
use crate::error::{Error, Result};
use crate::instruments::Instrument;
use crate::network::send_queue::{Packet, SendQueue};
use crate::network::Transport;
use crate::protocol::{Dispatcher, Parser, Reply, MAX_FRAME_LEN};

/// Hardware address of a radio peer.
pub type PeerAddress = [u8; 6];

/// Address every peer on the channel listens to.
pub const BROADCAST: PeerAddress = [0xFF; 6];

/// Link layer of a connectionless radio.
pub trait Radio {
    /// Initialize the radio on `channel`.
    fn begin(&mut self, channel: u8) -> Result<()>;

    /// Register a peer so it can be sent to. Adding a known peer is not an error.
    fn add_peer(&mut self, peer: PeerAddress) -> Result<()>;

    /// Start sending `bytes` to `to`. Completion is reported later through the owner's callback.
    fn start_send(&mut self, to: PeerAddress, bytes: &[u8]) -> Result<()>;
}

/// Datagrams waiting to be assembled, with their sender.
pub(crate) struct Inbox<const DEPTH: usize> {
    queue: Deque<Packet, DEPTH>,
}

impl<const DEPTH: usize> Inbox<DEPTH> {
    pub(crate) const fn new() -> Self {
        Self {
            queue: Deque::new(),
        }
    }

    pub(crate) fn push(&mut self, from: PeerAddress, data: &[u8]) -> bool {
        let Ok(bytes) = Vec::<u8, MAX_FRAME_LEN>::from_slice(data) else {
            log::debug!("dropping oversize datagram ({} bytes)", data.len());
            return false;
        };
        if self.queue.push_back(Packet { peer: from, bytes }).is_err() {
            log::warn!("inbox full, dropping datagram");
            return false;
        }
        true
    }

    pub(crate) fn pop(&mut self) -> Option<Packet> {
        self.queue.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Instrument-side endpoint of a radio link. Replies go to whoever spoke last.
pub struct WirelessPeer<R, const INBOX: usize = 4, const OUTBOX: usize = 2> {
    radio: R,
    parser: Parser,
    dispatcher: Dispatcher,
    inbox: Inbox<INBOX>,
    session: Option<PeerAddress>,
    sends: SendQueue<OUTBOX>,
}

impl<R: Radio, const INBOX: usize, const OUTBOX: usize> WirelessPeer<R, INBOX, OUTBOX> {
    pub fn new(radio: R, config: DeviceConfig) -> Self {
        Self {
            radio,
            parser: Parser::new(config),
            dispatcher: Dispatcher::new(config),
            inbox: Inbox::new(),
            session: None,
            sends: SendQueue::new(),
        }
    }

    /// Radio receive callback. Queues the datagram and remembers its sender.
    pub fn on_receive(&mut self, from: PeerAddress, data: &[u8]) {
        if self.inbox.push(from, data) {
            self.session = Some(from);
        }
    }

    /// Radio send-complete callback.
    pub fn on_send_complete(&mut self, ok: bool) {
        self.sends.complete(&mut self.radio, ok);
    }

    /// Last peer a datagram was received from.
    pub fn session(&self) -> Option<PeerAddress> {
        self.session
    }

    pub fn pending_datagrams(&self) -> usize {
        self.inbox.len()
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }
}

impl<R: Radio, const INBOX: usize, const OUTBOX: usize> Transport for WirelessPeer<R, INBOX, OUTBOX> {
    fn begin(&mut self) -> Result<()> {
        self.radio.begin(WIFI_CHANNEL).map_err(|e| {
            log::warn!("radio bring-up failed: {}", e);
            e
        })?;
        log::info!("wireless peer listening on channel {}", WIFI_CHANNEL);
        Ok(())
    }

    fn poll<I: Instrument + ?Sized>(&mut self, instrument: &mut I) {
        self.sends.poll(&mut self.radio);

        while let Some(datagram) = self.inbox.pop() {
            // A frame never spans datagrams.
            self.parser.reset();
            for &byte in datagram.bytes.iter() {
                let reply = match self.parser.push(byte) {
                    Some(frame) => self.dispatcher.dispatch(&frame.message(), instrument),
                    None => continue,
                };
                if let Reply::Pong(pong) = reply {
                    match self.radio.add_peer(datagram.peer) {
                        // The queue logs its own failures.
                        Ok(()) => {
                            self.sends.send(&mut self.radio, datagram.peer, &pong).ok();
                        }
                        Err(e) => {
                            log::warn!("cannot reach {:02x?} with pong: {}", datagram.peer, e)
                        }
                    }
                }
            }
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let to = self.session.ok_or(Error::NoPeer)?;
        self.radio.add_peer(to)?;
        self.sends.send(&mut self.radio, to, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Radio as MockRadio, Sent};
    use crate::protocol::{encode_pong, DeviceCommand, SystemCommand};

    #[derive(Default)]
    struct Count {
        device: u32,
    }

    impl Instrument for Count {
        fn setup(&mut self) {}

        fn system_message(&mut self, _command: SystemCommand) {}

        fn device_message(&mut self, _sub_address: u8, _command: DeviceCommand<'_>) {
            self.device += 1;
        }

        fn tick(&mut self) {}
    }

    const CFG: DeviceConfig = DeviceConfig::new(0x02, 1, 4);
    const CONTROLLER: PeerAddress = [0x24, 0x6F, 0x28, 0x01, 0x02, 0x03];

    #[test]
    fn ping_is_answered_to_sender() {
        let radio = MockRadio::default();
        let mut peer: WirelessPeer<MockRadio> = WirelessPeer::new(radio.clone(), CFG);
        peer.begin().unwrap();
        assert_eq!(radio.channel(), Some(WIFI_CHANNEL));

        peer.on_receive(CONTROLLER, &[0x4D, 0x00, 0x00, 0x01, 0x80]);
        assert_eq!(peer.session(), Some(CONTROLLER));
        peer.poll(&mut Count::default());

        assert_eq!(
            radio.sent(),
            [Sent {
                to: CONTROLLER,
                bytes: encode_pong(&CFG).to_vec()
            }]
        );
        assert!(radio.peers().contains(&CONTROLLER));
    }

    #[test]
    fn truncated_datagram_does_not_leak_into_next() {
        let radio = MockRadio::default();
        let mut peer: WirelessPeer<MockRadio> = WirelessPeer::new(radio, CFG);
        let mut count = Count::default();

        peer.on_receive(CONTROLLER, &[0x4D, 0x02, 0x01, 0x02]);
        peer.on_receive(CONTROLLER, &[0x09, 40]);
        peer.poll(&mut count);
        assert_eq!(count.device, 0);

        peer.on_receive(CONTROLLER, &[0x4D, 0x02, 0x01, 0x02, 0x09, 40]);
        peer.poll(&mut count);
        assert_eq!(count.device, 1);
    }

    #[test]
    fn inbox_overflow_drops_newest() {
        let radio = MockRadio::default();
        let mut peer: WirelessPeer<MockRadio, 2> = WirelessPeer::new(radio, CFG);
        let note = [0x4D, 0x02, 0x01, 0x02, 0x09, 40];
        for _ in 0..3 {
            peer.on_receive(CONTROLLER, &note);
        }
        assert_eq!(peer.pending_datagrams(), 2);

        let mut count = Count::default();
        peer.poll(&mut count);
        assert_eq!(count.device, 2);
    }

    #[test]
    fn send_without_session_fails() {
        let mut peer: WirelessPeer<MockRadio> = WirelessPeer::new(MockRadio::default(), CFG);
        assert_eq!(peer.send(&[1, 2, 3]), Err(Error::NoPeer));
    }

    #[test]
    fn unregistrable_sender_gets_no_pong() {
        let radio = MockRadio::default();
        radio.reject_peers(true);
        let mut peer: WirelessPeer<MockRadio> = WirelessPeer::new(radio.clone(), CFG);
        peer.begin().unwrap();

        peer.on_receive(CONTROLLER, &[0x4D, 0x00, 0x00, 0x01, 0x80]);
        peer.poll(&mut Count::default());
        assert!(radio.sent().is_empty());
        assert!(radio.peers().is_empty());

        // Once the radio accepts the peer again the next ping is answered.
        radio.reject_peers(false);
        peer.on_receive(CONTROLLER, &[0x4D, 0x00, 0x00, 0x01, 0x80]);
        peer.poll(&mut Count::default());
        assert_eq!(radio.sent().len(), 1);
    }

    #[test]
    fn failed_bring_up_is_reported() {
        let radio = MockRadio::default();
        radio.fail_begin();
        let mut peer: WirelessPeer<MockRadio> = WirelessPeer::new(radio, CFG);
        assert_eq!(peer.begin(), Err(Error::BringUp));
    }
}
