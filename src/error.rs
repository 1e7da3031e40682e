// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Crate-wide error type.

use core::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Fewer bytes than a frame header plus command.
    Truncated,
    /// First byte is not `START_BYTE`.
    BadStartByte(u8),
    /// Declared body length of zero (no command byte).
    EmptyBody,
    /// Declared body length disagrees with the bytes present.
    LengthMismatch { declared: u8, actual: usize },
    /// Frame does not fit the fixed-size buffer.
    FrameTooLarge(usize),
    /// Output buffer too small for the encoded frame.
    BufferTooSmall,
    /// Transport bring-up failed.
    BringUp,
    /// A send is outstanding and the pending queue is full.
    QueueFull,
    /// No peer has been seen yet to reply to.
    NoPeer,
    /// The link layer rejected or failed a transfer.
    Link,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Truncated => f.write_str("frame truncated"),
            Error::BadStartByte(b) => write!(f, "bad start byte {b:#04x}"),
            Error::EmptyBody => f.write_str("frame has no command byte"),
            Error::LengthMismatch { declared, actual } => {
                write!(f, "body length {declared} declared, {actual} present")
            }
            Error::FrameTooLarge(len) => write!(f, "frame of {len} bytes exceeds buffer"),
            Error::BufferTooSmall => f.write_str("output buffer too small"),
            Error::BringUp => f.write_str("transport bring-up failed"),
            Error::QueueFull => f.write_str("send queue full"),
            Error::NoPeer => f.write_str("no peer to reply to"),
            Error::Link => f.write_str("link send failed"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
