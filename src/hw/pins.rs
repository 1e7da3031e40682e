// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for STM32F777 MCU for the Moppy instrument board.
//!
//! The eight instrument channels each get two outputs. Which instrument uses them how:
//!
//! | Instrument | `a` | `b` |
//! | ---------- | ------ | ------ |
//! | Floppies | STEP | DIR |
//! | Buzzers | signal | unused |
//! | Hard drives | coil A | coil B |
//!
//! Shifted instruments leave the channel pins idle and drive the 74HC595 chain on SPI4 instead.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiod, gpioe, Alternate, ErasedPin, Output, PushPull},
    pac,
    prelude::*,
};

/// Channel pins have different port/pin numbers, so they are type-erased to fit in arrays.
pub type ChannelPin = ErasedPin<Output<PushPull>>;

/// Number of directly driven instrument channels.
pub const CHANNELS: usize = 8;

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOD, dp.GPIOE, dp.GPIOF, dp.GPIOG);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub usart1: Usart1Pins,
    pub usart2: Usart2Pins,
    pub spi4: Spi4Pins,
    pub channels: [ChannelPair; CHANNELS],
}

pub struct LedPins {
    pub red: gpiod::PD8<Output<PushPull>>,
    pub yellow: gpiod::PD9<Output<PushPull>>,
    pub green: gpiod::PD10<Output<PushPull>>,
}

/// Debug terminal
pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// Moppy controller link
pub struct Usart2Pins {
    pub tx: gpiod::PD5<Alternate<7>>,
    pub rx: gpiod::PD6<Alternate<7>>,
}

/// SPI4 SCK/MISO/MOSI and the shift register latch
pub struct Spi4Pins {
    pub sck: gpioe::PE12<Alternate<5>>,
    pub miso: gpioe::PE13<Alternate<5>>,
    pub mosi: gpioe::PE14<Alternate<5>>,
    pub latch: gpioe::PE4<Output<PushPull>>,
}

/// Two outputs of one instrument channel: PFn and PGn
pub struct ChannelPair {
    pub a: ChannelPin,
    pub b: ChannelPin,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(
        gpioa: pac::GPIOA,
        gpiod: pac::GPIOD,
        gpioe: pac::GPIOE,
        gpiof: pac::GPIOF,
        gpiog: pac::GPIOG,
    ) -> Self {
        let gpioa = gpioa.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();
        let gpiof = gpiof.split();
        let gpiog = gpiog.split();

        Self {
            leds: LedPins {
                red: gpiod.pd8.into_push_pull_output(),
                yellow: gpiod.pd9.into_push_pull_output(),
                green: gpiod.pd10.into_push_pull_output(),
            },

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            usart2: Usart2Pins {
                tx: gpiod.pd5.into_alternate::<7>(),
                rx: gpiod.pd6.into_alternate::<7>(),
            },

            spi4: Spi4Pins {
                sck: gpioe.pe12.into_alternate::<5>(),
                miso: gpioe.pe13.into_alternate::<5>(),
                mosi: gpioe.pe14.into_alternate::<5>(),
                latch: gpioe.pe4.into_push_pull_output(),
            },

            channels: [
                ChannelPair {
                    a: gpiof.pf0.into_push_pull_output().erase(),
                    b: gpiog.pg0.into_push_pull_output().erase(),
                },
                ChannelPair {
                    a: gpiof.pf1.into_push_pull_output().erase(),
                    b: gpiog.pg1.into_push_pull_output().erase(),
                },
                ChannelPair {
                    a: gpiof.pf2.into_push_pull_output().erase(),
                    b: gpiog.pg2.into_push_pull_output().erase(),
                },
                ChannelPair {
                    a: gpiof.pf3.into_push_pull_output().erase(),
                    b: gpiog.pg3.into_push_pull_output().erase(),
                },
                ChannelPair {
                    a: gpiof.pf4.into_push_pull_output().erase(),
                    b: gpiog.pg4.into_push_pull_output().erase(),
                },
                ChannelPair {
                    a: gpiof.pf5.into_push_pull_output().erase(),
                    b: gpiog.pg5.into_push_pull_output().erase(),
                },
                ChannelPair {
                    a: gpiof.pf6.into_push_pull_output().erase(),
                    b: gpiog.pg6.into_push_pull_output().erase(),
                },
                ChannelPair {
                    a: gpiof.pf7.into_push_pull_output().erase(),
                    b: gpiog.pg7.into_push_pull_output().erase(),
                },
            ],
        }
    }
}
