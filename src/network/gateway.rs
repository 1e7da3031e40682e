// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Serial to radio bridge.
//!
//! The gateway sits between the Moppy controller's serial port and a set of wireless peers. Every
//! complete frame read from serial is broadcast unchanged, whatever its address, and every
//! datagram heard on the radio (pongs, mostly) is written back to serial byte for byte. It never
//! plays anything itself.

use embedded_hal::serial;

use crate::config::WIFI_CHANNEL;
use crate::error::Result;
use crate::instruments::Instrument;
use crate::network::send_queue::SendQueue;
use crate::network::serial::write_all;
use crate::network::wireless::{Inbox, PeerAddress, Radio, BROADCAST};
use crate::network::Transport;
use crate::protocol::Parser;

pub struct WirelessGateway<S, R, const INBOX: usize = 4, const OUTBOX: usize = 4> {
    serial: S,
    radio: R,
    parser: Parser,
    inbox: Inbox<INBOX>,
    sends: SendQueue<OUTBOX>,
}

impl<S, R, const INBOX: usize, const OUTBOX: usize> WirelessGateway<S, R, INBOX, OUTBOX>
where
    S: serial::Read<u8> + serial::Write<u8>,
    R: Radio,
{
    pub fn new(serial: S, radio: R) -> Self {
        Self {
            serial,
            radio,
            parser: Parser::promiscuous(),
            inbox: Inbox::new(),
            sends: SendQueue::new(),
        }
    }

    /// Radio receive callback.
    pub fn on_receive(&mut self, from: PeerAddress, data: &[u8]) {
        self.inbox.push(from, data);
    }

    /// Radio send-complete callback.
    pub fn on_send_complete(&mut self, ok: bool) {
        self.sends.complete(&mut self.radio, ok);
    }

    pub fn free(self) -> (S, R) {
        (self.serial, self.radio)
    }

    fn relay_to_serial(&mut self) {
        while let Some(datagram) = self.inbox.pop() {
            if let Err(e) = write_all(&mut self.serial, &datagram.bytes) {
                log::warn!("relay to serial failed: {}", e);
            }
        }
    }

    /// Broadcast every complete serial frame. Headers declaring an empty body carry no command
    /// and are dropped here instead of being forwarded; the next start byte resynchronizes.
    fn relay_to_radio(&mut self) {
        loop {
            let byte = match self.serial.read() {
                Ok(byte) => byte,
                Err(nb::Error::WouldBlock) => return,
                Err(nb::Error::Other(_)) => {
                    log::warn!("serial read error, resynchronizing");
                    self.parser.reset();
                    return;
                }
            };
            if let Some(frame) = self.parser.push(byte) {
                // Failures are logged by the queue; the controller will retry.
                self.sends
                    .send(&mut self.radio, BROADCAST, frame.bytes())
                    .ok();
            }
        }
    }
}

impl<S, R, const INBOX: usize, const OUTBOX: usize> Transport for WirelessGateway<S, R, INBOX, OUTBOX>
where
    S: serial::Read<u8> + serial::Write<u8>,
    R: Radio,
{
    fn begin(&mut self) -> Result<()> {
        self.radio.begin(WIFI_CHANNEL).map_err(|e| {
            log::warn!("radio bring-up failed: {}", e);
            e
        })?;
        self.radio.add_peer(BROADCAST)?;
        self.parser.reset();
        log::info!("gateway bridging serial to channel {}", WIFI_CHANNEL);
        Ok(())
    }

    /// The gateway has no instrument of its own; `instrument` is never called.
    fn poll<I: Instrument + ?Sized>(&mut self, _instrument: &mut I) {
        self.sends.poll(&mut self.radio);
        self.relay_to_serial();
        self.relay_to_radio();
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.sends.send(&mut self.radio, BROADCAST, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Radio as MockRadio, Sent, Serial};
    use crate::protocol::{encode_pong, DeviceCommand, SystemCommand};
    use crate::config::DeviceConfig;

    struct Silent;

    impl Instrument for Silent {
        fn setup(&mut self) {}

        fn system_message(&mut self, _command: SystemCommand) {
            panic!("gateway dispatched a system message");
        }

        fn device_message(&mut self, _sub_address: u8, _command: DeviceCommand<'_>) {
            panic!("gateway dispatched a device message");
        }

        fn tick(&mut self) {}
    }

    const PEER: PeerAddress = [0x30, 0xAE, 0xA4, 0x00, 0x00, 0x01];

    fn gateway(serial: &Serial, radio: &MockRadio) -> WirelessGateway<Serial, MockRadio> {
        let mut gateway = WirelessGateway::new(serial.clone(), radio.clone());
        gateway.begin().unwrap();
        gateway
    }

    #[test]
    fn begin_registers_broadcast() {
        let radio = MockRadio::default();
        gateway(&Serial::default(), &radio);
        assert_eq!(radio.channel(), Some(WIFI_CHANNEL));
        assert_eq!(radio.peers(), [BROADCAST]);
    }

    #[test]
    fn serial_frames_are_broadcast_whatever_their_address() {
        let serial = Serial::default();
        let radio = MockRadio::default();
        let mut gateway = gateway(&serial, &radio);

        let note = [0x4D, 0x09, 0x03, 0x02, 0x09, 45];
        serial.feed(&[0x00]);
        serial.feed(&note);
        gateway.poll(&mut Silent);

        assert_eq!(
            radio.sent(),
            [Sent {
                to: BROADCAST,
                bytes: note.to_vec()
            }]
        );
    }

    #[test]
    fn empty_body_headers_are_not_broadcast() {
        let serial = Serial::default();
        let radio = MockRadio::default();
        let mut gateway = gateway(&serial, &radio);

        let note = [0x4D, 0x01, 0x02, 0x02, 0x09, 50];
        serial.feed(&[0x4D, 0x01, 0x02, 0x00]);
        serial.feed(&note);
        gateway.poll(&mut Silent);

        assert_eq!(radio.sent().len(), 1);
        assert_eq!(radio.sent()[0].bytes, note);
    }

    #[test]
    fn frames_wait_for_the_previous_send() {
        let serial = Serial::default();
        let radio = MockRadio::default();
        let mut gateway = gateway(&serial, &radio);

        serial.feed(&[0x4D, 0x00, 0x00, 0x01, 0x80]);
        serial.feed(&[0x4D, 0x00, 0x00, 0x01, 0xFC]);
        gateway.poll(&mut Silent);
        assert_eq!(radio.sent().len(), 1);

        gateway.on_send_complete(true);
        assert_eq!(radio.sent().len(), 2);
        assert_eq!(radio.sent()[1].bytes, [0x4D, 0x00, 0x00, 0x01, 0xFC]);
    }

    #[test]
    fn radio_datagrams_are_written_to_serial() {
        let serial = Serial::default();
        let radio = MockRadio::default();
        let mut gateway = gateway(&serial, &radio);

        let pong = encode_pong(&DeviceConfig::new(0x02, 1, 4));
        gateway.on_receive(PEER, &pong);
        gateway.poll(&mut Silent);

        assert_eq!(serial.written(), pong.to_vec());
        assert!(radio.sent().is_empty());
    }
}
