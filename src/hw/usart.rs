// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART abstraction layer.
//!
//! `Usart` wraps the TX half of a configured HAL serial port for the debug terminal, and
//! `UsartLogger` routes the `log` facade onto it.
//!
//! Note: When using `writeln!`, be sure to include `\r` (CR) in the format string to ensure correct
//! line endings on the terminal.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```
//! $ screen /dev/tty.usbmodem* <baud_rate>
//! ```
//!
//! To close the debug terminal, press `Ctrl+A` then `Ctrl+\` then `y`.

use core::cell::RefCell;
use core::fmt::{self, Write as _};

use critical_section::Mutex;
use log::{LevelFilter, Log, Metadata, Record};
use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{Instance, Pins, Serial, Tx},
};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Usart`.
impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}

/// `log` backend writing one line per record to a debug USART.
///
/// Lives in a `static`; records are written inside a critical section, so logging from the tick
/// interrupt would stall it. Keep interrupt paths silent.
pub struct UsartLogger<U: Instance> {
    usart: Mutex<RefCell<Option<Usart<U>>>>,
}

impl<U: Instance> UsartLogger<U> {
    pub const fn new() -> Self {
        Self {
            usart: Mutex::new(RefCell::new(None)),
        }
    }
}

impl<U: Instance> UsartLogger<U>
where
    Usart<U>: Send,
{
    /// Take ownership of `usart` and register as the global logger.
    pub fn init(&'static self, usart: Usart<U>, level: LevelFilter) {
        critical_section::with(|cs| {
            self.usart.borrow(cs).replace(Some(usart));
        });
        if log::set_logger(self).is_ok() {
            log::set_max_level(level);
        }
    }
}

impl<U: Instance> Log for UsartLogger<U>
where
    Usart<U>: Send,
{
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        critical_section::with(|cs| {
            if let Some(usart) = self.usart.borrow_ref_mut(cs).as_mut() {
                let _ = write!(
                    usart,
                    "[{:<5}] {}: {}\r\n",
                    record.level(),
                    record.target(),
                    record.args()
                );
            }
        });
    }

    fn flush(&self) {
        critical_section::with(|cs| {
            if let Some(usart) = self.usart.borrow_ref_mut(cs).as_mut() {
                usart.flush();
            }
        });
    }
}
