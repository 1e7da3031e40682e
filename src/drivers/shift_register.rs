// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Chain of 74HC595 shift registers on a SPI bus.
//!
//! - The bus clocks bits into the chain (LSB first, mode 0).
//! - `LATCH` (RCLK) is held high while idle. Pulling it low frames a transfer, and the rising edge
//!   at the end moves the shifted bits onto the outputs all at once.

use embedded_hal::blocking::spi;
use embedded_hal::digital::v2::OutputPin;

pub struct ShiftRegisterChain<SPI, LATCH> {
    spi: SPI,
    latch: LATCH,
}

impl<SPI, LATCH> ShiftRegisterChain<SPI, LATCH>
where
    SPI: spi::Write<u8>,
    LATCH: OutputPin,
{
    /// Create a chain and park the latch in its inactive state (i.e., high).
    pub fn new(spi: SPI, mut latch: LATCH) -> Self {
        latch.set_high().ok();
        Self { spi, latch }
    }

    /// Shift `bytes` into the chain and latch them onto the outputs.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), SPI::Error> {
        self.latch.set_low().ok();
        let res = self.spi.write(bytes);
        // Latch even on error so the line never stays low.
        self.latch.set_high().ok();
        res
    }

    pub fn free(self) -> (SPI, LATCH) {
        (self.spi, self.latch)
    }
}
