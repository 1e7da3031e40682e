// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Serial link to the Moppy controller.
//!
//! The UART itself is configured by the board code (`config::SERIAL_BAUD_RATE`). This adapter
//! drains received bytes without blocking and writes pong replies back.

use embedded_hal::serial;
use nb::block;

use crate::config::DeviceConfig;
use crate::error::{Error, Result};
use crate::instruments::Instrument;
use crate::network::Transport;
use crate::protocol::{Dispatcher, Parser, Reply};

pub struct SerialTransport<S> {
    serial: S,
    parser: Parser,
    dispatcher: Dispatcher,
}

impl<S> SerialTransport<S>
where
    S: serial::Read<u8> + serial::Write<u8>,
{
    pub fn new(serial: S, config: DeviceConfig) -> Self {
        Self {
            serial,
            parser: Parser::new(config),
            dispatcher: Dispatcher::new(config),
        }
    }

    pub fn free(self) -> S {
        self.serial
    }
}

/// Blocking write of a whole buffer, then flush.
pub(crate) fn write_all<W: serial::Write<u8>>(serial: &mut W, bytes: &[u8]) -> Result<()> {
    for &b in bytes {
        block!(serial.write(b)).map_err(|_| Error::Link)?;
    }
    block!(serial.flush()).map_err(|_| Error::Link)
}

impl<S> Transport for SerialTransport<S>
where
    S: serial::Read<u8> + serial::Write<u8>,
{
    fn begin(&mut self) -> Result<()> {
        self.parser.reset();
        log::info!("serial transport ready");
        Ok(())
    }

    fn poll<I: Instrument + ?Sized>(&mut self, instrument: &mut I) {
        loop {
            let byte = match self.serial.read() {
                Ok(byte) => byte,
                Err(nb::Error::WouldBlock) => return,
                Err(nb::Error::Other(_)) => {
                    // Overrun or framing error: whatever was half-assembled is suspect.
                    log::warn!("serial read error, resynchronizing");
                    self.parser.reset();
                    return;
                }
            };

            let reply = match self.parser.push(byte) {
                Some(frame) => self.dispatcher.dispatch(&frame.message(), instrument),
                None => continue,
            };
            if let Reply::Pong(pong) = reply {
                if let Err(e) = self.send(&pong) {
                    log::warn!("pong not sent: {}", e);
                }
            }
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        write_all(&mut self.serial, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::Serial;
    use crate::protocol::{encode_pong, DeviceCommand, SystemCommand};

    #[derive(Default)]
    struct Notes {
        played: std::vec::Vec<(u8, u8)>,
        system: u32,
    }

    impl Instrument for Notes {
        fn setup(&mut self) {}

        fn system_message(&mut self, _command: SystemCommand) {
            self.system += 1;
        }

        fn device_message(&mut self, sub_address: u8, command: DeviceCommand<'_>) {
            if let DeviceCommand::NoteOn { note } = command {
                self.played.push((sub_address, note));
            }
        }

        fn tick(&mut self) {}
    }

    const CFG: DeviceConfig = DeviceConfig::new(0x01, 1, 4);

    #[test]
    fn ping_gets_exactly_one_pong() {
        let serial = Serial::default();
        let mut transport = SerialTransport::new(serial.clone(), CFG);
        let mut notes = Notes::default();

        serial.feed(&[0x4D, 0x00, 0x00, 0x01, 0x80]);
        transport.poll(&mut notes);

        assert_eq!(serial.written(), encode_pong(&CFG).to_vec());
        assert_eq!(notes.system, 0);
        assert!(notes.played.is_empty());
    }

    #[test]
    fn frames_split_across_polls_are_assembled() {
        let serial = Serial::default();
        let mut transport = SerialTransport::new(serial.clone(), CFG);
        let mut notes = Notes::default();

        serial.feed(&[0xAA, 0x4D, 0x01]);
        transport.poll(&mut notes);
        assert!(notes.played.is_empty());

        serial.feed(&[0x03, 0x02, 0x09, 45]);
        transport.poll(&mut notes);
        assert_eq!(notes.played, [(3, 45)]);
        assert!(serial.written().is_empty());
    }

    #[test]
    fn read_error_drops_partial_frame() {
        let serial = Serial::default();
        let mut transport = SerialTransport::new(serial.clone(), CFG);
        let mut notes = Notes::default();

        serial.feed(&[0x4D, 0x01, 0x03]);
        transport.poll(&mut notes);
        serial.fail_next_read();
        serial.feed(&[0x02, 0x09, 45]);
        transport.poll(&mut notes);
        // The tail is still queued; the next poll sees it as garbage.
        transport.poll(&mut notes);
        assert!(notes.played.is_empty());
        assert_eq!(serial.pending(), 0);
    }
}
