// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Floppies and buzzers multiplexed through a chain of 74HC595 shift registers.
//!
//! All outputs of the chain live in one [`ShiftedFrame`]. Toggles only edit the frame; the bank
//! commits it in a single latched SPI write at the end of the tick, so one tick never costs more
//! than one transfer no matter how many channels changed.
//!
//! Frame layouts on the wire (first byte shifted out first):
//!
//! | Kind | Bytes |
//! | ---- | ----- |
//! | Floppies (up to 8) | `[direction, step, led]` |
//! | Buzzers (up to 12) | 24-bit `led << 12 \| level`, least significant byte first |

use core::ops::ControlFlow;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::spi;
use embedded_hal::digital::v2::OutputPin;

use crate::drivers::floppy::{Head, HOMING_STEP_MS, MAX_POSITION};
use crate::drivers::shift_register::ShiftRegisterChain;
use crate::instruments::channel::{ChannelBank, OutputStage};

/// Named groups of outputs in a shifted frame, one bit per channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lane {
    Direction,
    /// Step line for drives, output level for buzzers.
    Step,
    Led,
}

/// Packed output bits of a shift-register chain.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShiftedFrame {
    direction: u16,
    step: u16,
    led: u16,
}

impl ShiftedFrame {
    pub const fn new() -> Self {
        Self {
            direction: 0,
            step: 0,
            led: 0,
        }
    }

    #[inline]
    pub fn lane(&self, lane: Lane) -> u16 {
        match lane {
            Lane::Direction => self.direction,
            Lane::Step => self.step,
            Lane::Led => self.led,
        }
    }

    #[inline]
    fn lane_mut(&mut self, lane: Lane) -> &mut u16 {
        match lane {
            Lane::Direction => &mut self.direction,
            Lane::Step => &mut self.step,
            Lane::Led => &mut self.led,
        }
    }

    #[inline]
    pub fn get(&self, lane: Lane, channel: usize) -> bool {
        self.lane(lane) & (1 << channel) != 0
    }

    #[inline]
    pub fn set(&mut self, lane: Lane, channel: usize, on: bool) {
        let bits = self.lane_mut(lane);
        if on {
            *bits |= 1 << channel;
        } else {
            *bits &= !(1 << channel);
        }
    }

    #[inline]
    pub fn toggle(&mut self, lane: Lane, channel: usize) {
        *self.lane_mut(lane) ^= 1 << channel;
    }

    /// Set or clear every bit of a lane.
    pub fn fill(&mut self, lane: Lane, on: bool) {
        *self.lane_mut(lane) = if on { u16::MAX } else { 0 };
    }
}

/// Floppy drives behind a shift-register chain. LEDs are wired active-low: a lane bit is clear
/// while its drive plays.
pub struct ShiftedFloppies<SPI, LATCH, D, const N: usize> {
    chain: ShiftRegisterChain<SPI, LATCH>,
    frame: ShiftedFrame,
    leds_enabled: bool,
    write_failures: u32,
    delay: D,
}

pub type ShiftedFloppyBank<SPI, LATCH, D, const N: usize> =
    ChannelBank<ShiftedFloppies<SPI, LATCH, D, N>, N>;

impl<SPI, LATCH, D, const N: usize> ShiftedFloppies<SPI, LATCH, D, N>
where
    SPI: spi::Write<u8>,
    LATCH: OutputPin,
    D: DelayMs<u32>,
{
    const FITS_ONE_BYTE_PER_LANE: () = assert!(N <= 8, "at most 8 shifted floppies");

    pub fn new(chain: ShiftRegisterChain<SPI, LATCH>, delay: D) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS_ONE_BYTE_PER_LANE;
        let mut frame = ShiftedFrame::new();
        frame.fill(Lane::Led, true);
        Self {
            chain,
            frame,
            leds_enabled: true,
            write_failures: 0,
            delay,
        }
    }

    pub fn frame(&self) -> &ShiftedFrame {
        &self.frame
    }

    /// Tick frames that failed to write and have not been logged yet.
    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }

    fn bytes(&self) -> [u8; 3] {
        let led = if self.leds_enabled {
            self.frame.lane(Lane::Led) as u8
        } else {
            0xFF
        };
        [
            self.frame.lane(Lane::Direction) as u8,
            self.frame.lane(Lane::Step) as u8,
            led,
        ]
    }

    fn flush(&mut self) -> bool {
        let bytes = self.bytes();
        self.chain.write(&bytes).is_ok()
    }

    /// Step every channel in `mask` back to track 0, one pulse per 5 ms.
    fn home(&mut self, mask: u16) {
        let mut ok = true;
        for channel in (0..N).filter(|&c| mask & (1 << c) != 0) {
            self.frame.set(Lane::Direction, channel, true);
        }
        ok &= self.flush();
        for _ in 0..MAX_POSITION / 2 {
            *self.frame.lane_mut(Lane::Step) |= mask;
            ok &= self.flush();
            *self.frame.lane_mut(Lane::Step) &= !mask;
            ok &= self.flush();
            self.delay.delay_ms(HOMING_STEP_MS);
        }
        for channel in (0..N).filter(|&c| mask & (1 << c) != 0) {
            self.frame.set(Lane::Direction, channel, false);
            self.frame.set(Lane::Led, channel, true);
        }
        ok &= self.flush();
        if !ok {
            log::warn!("shift register write failed while homing");
        }
    }
}

impl<SPI, LATCH, D, const N: usize> OutputStage<N> for ShiftedFloppies<SPI, LATCH, D, N>
where
    SPI: spi::Write<u8>,
    LATCH: OutputPin,
    D: DelayMs<u32>,
{
    type State = Head;
    const MAX_NOTE: u8 = 71;

    fn start(&mut self, channel: usize, _head: &mut Head) {
        self.frame.set(Lane::Led, channel, false);
    }

    fn toggle(&mut self, channel: usize, head: &mut Head) -> ControlFlow<()> {
        head.advance();
        self.frame.set(Lane::Direction, channel, head.reverse());
        self.frame.set(Lane::Step, channel, head.step_high());
        ControlFlow::Continue(())
    }

    fn stop(&mut self, channel: usize, _head: &mut Head) {
        self.frame.set(Lane::Led, channel, true);
    }

    fn commit(&mut self, _heads: &[Head; N]) {
        // No logging from the tick; counted and reported by the next handler.
        if !self.flush() {
            self.write_failures = self.write_failures.saturating_add(1);
        }
    }

    fn reset(&mut self, channel: usize, head: &mut Head) {
        self.home(1 << channel);
        head.home();
    }

    fn reset_all(&mut self, heads: &mut [Head; N]) {
        self.frame.fill(Lane::Step, false);
        self.home(((1u32 << N) - 1) as u16);
        heads.iter_mut().for_each(Head::home);
    }

    fn set_movement(&mut self, _channel: usize, head: &mut Head, enabled: bool) {
        head.set_movement(enabled);
    }

    fn set_leds(&mut self, enabled: bool, _heads: &[Head; N]) {
        self.leds_enabled = enabled;
        if !self.flush() {
            log::warn!("shift register write failed on LED change");
        }
    }

    fn report_faults(&mut self) {
        if self.write_failures > 0 {
            log::warn!("{} shift register frame writes failed", self.write_failures);
            self.write_failures = 0;
        }
    }
}

/// Buzzers behind a shift-register chain, with an LED per buzzer lit while it sounds.
pub struct ShiftedBuzzers<SPI, LATCH, const N: usize> {
    chain: ShiftRegisterChain<SPI, LATCH>,
    frame: ShiftedFrame,
    leds_enabled: bool,
    write_failures: u32,
}

pub type ShiftedBuzzerBank<SPI, LATCH, const N: usize> =
    ChannelBank<ShiftedBuzzers<SPI, LATCH, N>, N>;

/// Outputs per lane in the buzzer layout.
const BUZZER_LANE_BITS: u32 = 12;

impl<SPI, LATCH, const N: usize> ShiftedBuzzers<SPI, LATCH, N>
where
    SPI: spi::Write<u8>,
    LATCH: OutputPin,
{
    const FITS_TWELVE_BIT_LANES: () = assert!(N <= 12, "at most 12 shifted buzzers");

    pub fn new(chain: ShiftRegisterChain<SPI, LATCH>) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS_TWELVE_BIT_LANES;
        Self {
            chain,
            frame: ShiftedFrame::new(),
            leds_enabled: true,
            write_failures: 0,
        }
    }

    pub fn frame(&self) -> &ShiftedFrame {
        &self.frame
    }

    /// Tick frames that failed to write and have not been logged yet.
    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }

    fn bytes(&self) -> [u8; 3] {
        let mask = (1u32 << BUZZER_LANE_BITS) - 1;
        let led = if self.leds_enabled {
            self.frame.lane(Lane::Led) as u32 & mask
        } else {
            0
        };
        let word = led << BUZZER_LANE_BITS | (self.frame.lane(Lane::Step) as u32 & mask);
        let [b0, b1, b2, _] = word.to_le_bytes();
        [b0, b1, b2]
    }

    fn flush(&mut self) -> bool {
        let bytes = self.bytes();
        self.chain.write(&bytes).is_ok()
    }
}

impl<SPI, LATCH, const N: usize> OutputStage<N> for ShiftedBuzzers<SPI, LATCH, N>
where
    SPI: spi::Write<u8>,
    LATCH: OutputPin,
{
    /// Buzzer level.
    type State = bool;
    // The table ends at 127; higher notes would only be sub-tick periods anyway.
    const MAX_NOTE: u8 = 127;

    fn start(&mut self, channel: usize, _high: &mut bool) {
        self.frame.set(Lane::Led, channel, true);
    }

    fn toggle(&mut self, channel: usize, high: &mut bool) -> ControlFlow<()> {
        *high = !*high;
        self.frame.set(Lane::Step, channel, *high);
        ControlFlow::Continue(())
    }

    fn stop(&mut self, channel: usize, high: &mut bool) {
        *high = false;
        self.frame.set(Lane::Step, channel, false);
        self.frame.set(Lane::Led, channel, false);
    }

    fn commit(&mut self, _levels: &[bool; N]) {
        // No logging from the tick; counted and reported by the next handler.
        if !self.flush() {
            self.write_failures = self.write_failures.saturating_add(1);
        }
    }

    fn reset(&mut self, channel: usize, high: &mut bool) {
        self.stop(channel, high);
        if !self.flush() {
            log::warn!("shift register write failed on reset");
        }
    }

    fn reset_all(&mut self, levels: &mut [bool; N]) {
        levels.fill(false);
        self.frame.fill(Lane::Step, false);
        self.frame.fill(Lane::Led, false);
        if !self.flush() {
            log::warn!("shift register write failed on reset");
        }
    }

    fn set_leds(&mut self, enabled: bool, _levels: &[bool; N]) {
        self.leds_enabled = enabled;
        if !self.flush() {
            log::warn!("shift register write failed on LED change");
        }
    }

    fn report_faults(&mut self) {
        if self.write_failures > 0 {
            log::warn!("{} shift register frame writes failed", self.write_failures);
            self.write_failures = 0;
        }
    }
}
