// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MIDI note periods.
//!
//! Each entry is half the period of the note's frequency, measured in timer ticks of
//! `TIMER_RESOLUTION_US`: `round(1_000_000 / (f * 2 * 40))`. An output toggled every that many
//! ticks completes one full cycle at the note's pitch.

/// Half-period ticks for MIDI notes 0..=127.
#[rustfmt::skip]
pub const NOTE_TICKS: [u16; 128] = [
    1529, 1443, 1362, 1286, 1213, 1145, 1081, 1020, 963, 909, 858, 810,
    764, 722, 681, 643, 607, 573, 541, 510, 482, 455, 429, 405,
    382, 361, 341, 321, 303, 286, 270, 255, 241, 227, 215, 202,
    191, 180, 170, 161, 152, 143, 135, 128, 120, 114, 107, 101,
    96, 90, 85, 80, 76, 72, 68, 64, 60, 57, 54, 51,
    48, 45, 43, 40, 38, 36, 34, 32, 30, 28, 27, 25,
    24, 23, 21, 20, 19, 18, 17, 16, 15, 14, 13, 13,
    12, 11, 11, 10, 9, 9, 8, 8, 8, 7, 7, 6,
    6, 6, 5, 5, 5, 4, 4, 4, 4, 4, 3, 3,
    3, 3, 3, 3, 2, 2, 2, 2, 2, 2, 2, 2,
    1, 1, 1, 1, 1, 1, 1, 1,
];

/// Half-period ticks for `note`, or `None` past the end of the MIDI range.
#[inline]
pub fn half_period(note: u8) -> Option<u16> {
    NOTE_TICKS.get(note as usize).copied()
}

/// Notes of the startup chirp, played 200 ms apart then silenced.
pub const STARTUP_NOTES: [u8; 4] = [31, 36, 38, 43];
