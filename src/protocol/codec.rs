// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wire codec for Moppy frames.
//!
//! ```text
//! byte 0  START_BYTE (0x4D)
//! byte 1  address (0x00 = system)
//! byte 2  sub-address (0x00 = whole device)
//! byte 3  body length = 1 + payload length
//! byte 4  command
//! byte 5.. payload
//! ```

use crate::config::{DeviceConfig, SYSTEM_ADDRESS};
use crate::error::{Error, Result};
use crate::protocol::messages::{Message, Scope, MSG_SYS_PONG, START_BYTE};

/// Start byte, address, sub-address and body length.
pub const HEADER_LEN: usize = 4;

/// Largest frame the body-length byte can describe.
pub const MAX_FRAME_LEN: usize = HEADER_LEN + u8::MAX as usize;

/// Length of a pong reply.
pub const PONG_LEN: usize = 8;

/// A complete, validated frame borrowed from the buffer it was assembled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    bytes: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Caller guarantees `bytes` holds a full header and exactly `body_length` body bytes.
    pub(crate) fn new_unchecked(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The frame exactly as it appeared on the wire.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn address(&self) -> u8 {
        self.bytes[1]
    }

    pub fn sub_address(&self) -> u8 {
        self.bytes[2]
    }

    pub fn command(&self) -> u8 {
        self.bytes[HEADER_LEN]
    }

    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[HEADER_LEN + 1..]
    }

    pub fn message(&self) -> Message<'a> {
        let scope = if self.address() == SYSTEM_ADDRESS {
            Scope::System
        } else {
            Scope::Device {
                sub_address: self.sub_address(),
            }
        };
        Message {
            scope,
            command: self.command(),
            payload: self.payload(),
        }
    }
}

/// Validate a buffer holding exactly one frame.
pub fn decode(bytes: &[u8]) -> Result<Frame<'_>> {
    if bytes.len() > MAX_FRAME_LEN {
        return Err(Error::FrameTooLarge(bytes.len()));
    }
    if bytes.len() < HEADER_LEN + 1 {
        return Err(Error::Truncated);
    }
    if bytes[0] != START_BYTE {
        return Err(Error::BadStartByte(bytes[0]));
    }
    let declared = bytes[3];
    if declared == 0 {
        return Err(Error::EmptyBody);
    }
    let actual = bytes.len() - HEADER_LEN;
    if actual != declared as usize {
        return Err(Error::LengthMismatch { declared, actual });
    }
    Ok(Frame::new_unchecked(bytes))
}

/// Encode one frame into `out`, returning the number of bytes written.
pub fn encode(
    address: u8,
    sub_address: u8,
    command: u8,
    payload: &[u8],
    out: &mut [u8],
) -> Result<usize> {
    let body_len = payload.len() + 1;
    let len = HEADER_LEN + body_len;
    if body_len > u8::MAX as usize {
        return Err(Error::FrameTooLarge(len));
    }
    if out.len() < len {
        return Err(Error::BufferTooSmall);
    }

    out[0] = START_BYTE;
    out[1] = address;
    out[2] = sub_address;
    out[3] = body_len as u8;
    out[HEADER_LEN] = command;
    out[HEADER_LEN + 1..len].copy_from_slice(payload);
    Ok(len)
}

/// Reply to a system ping announcing this device and its channel range.
pub fn encode_pong(config: &DeviceConfig) -> [u8; PONG_LEN] {
    [
        START_BYTE,
        SYSTEM_ADDRESS,
        0x00,
        0x04,
        MSG_SYS_PONG,
        config.address,
        config.min_sub_address,
        config.max_sub_address,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{MSG_DEV_NOTE_ON, MSG_SYS_PING};

    #[test]
    fn pong_round_trips() {
        for (addr, min, max) in [(0x01, 1, 8), (0x7F, 3, 3), (0x22, 1, 255)] {
            let cfg = DeviceConfig::new(addr, min, max);
            let pong = encode_pong(&cfg);
            assert_eq!(pong, [0x4D, 0x00, 0x00, 0x04, 0x81, addr, min, max]);

            let frame = decode(&pong).unwrap();
            assert_eq!(frame.bytes(), &pong);
            assert_eq!(frame.command(), MSG_SYS_PONG);
            assert_eq!(frame.payload(), &[addr, min, max]);
        }
    }

    #[test]
    fn encode_then_decode_device_frame() {
        let mut buf = [0u8; 16];
        let n = encode(0x01, 0x02, MSG_DEV_NOTE_ON, &[40], &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x4D, 0x01, 0x02, 0x02, 0x09, 40]);

        let msg = decode(&buf[..n]).unwrap().message();
        assert_eq!(msg.scope, Scope::Device { sub_address: 2 });
        assert_eq!(msg.command, MSG_DEV_NOTE_ON);
        assert_eq!(msg.payload, &[40]);
    }

    #[test]
    fn system_address_yields_system_scope() {
        let msg = decode(&[0x4D, 0x00, 0x00, 0x01, MSG_SYS_PING])
            .unwrap()
            .message();
        assert_eq!(msg.scope, Scope::System);
        assert!(msg.payload.is_empty());
    }

    #[test]
    fn decode_rejects_malformed() {
        assert_eq!(decode(&[0x4D, 0x01, 0x01]), Err(Error::Truncated));
        assert_eq!(
            decode(&[0x4E, 0x01, 0x01, 0x01, 0x00]),
            Err(Error::BadStartByte(0x4E))
        );
        assert_eq!(
            decode(&[0x4D, 0x01, 0x01, 0x00, 0x00]),
            Err(Error::EmptyBody)
        );
        assert_eq!(
            decode(&[0x4D, 0x01, 0x01, 0x03, 0x09, 40]),
            Err(Error::LengthMismatch {
                declared: 3,
                actual: 2
            })
        );
        assert_eq!(
            decode(&[0u8; MAX_FRAME_LEN + 1]),
            Err(Error::FrameTooLarge(MAX_FRAME_LEN + 1))
        );
    }

    #[test]
    fn encode_checks_output_room() {
        let mut small = [0u8; 5];
        assert_eq!(
            encode(0x01, 0x01, MSG_DEV_NOTE_ON, &[40], &mut small),
            Err(Error::BufferTooSmall)
        );
        let mut big = [0u8; MAX_FRAME_LEN + 8];
        assert_eq!(
            encode(0x01, 0x01, 0x42, &[0u8; 255], &mut big),
            Err(Error::FrameTooLarge(MAX_FRAME_LEN + 1))
        );
        assert_eq!(encode(0x01, 0x01, 0x42, &[0u8; 254], &mut big), Ok(MAX_FRAME_LEN));
    }
}
