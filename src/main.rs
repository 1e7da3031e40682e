// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use log::LevelFilter;
use panic_halt as _;

use hal::{
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use moppy::config::{DEVICE, SERIAL_BAUD_RATE, TIMER_RESOLUTION_US};
use moppy::hw::{BoardPins, CycleDelay, Heartbeat, Led, TickTimer, Usart, UsartLogger};
use moppy::instruments::{self, Instrument, Shared};
use moppy::network::{SerialTransport, Transport};

#[cfg(not(any(
    feature = "floppies",
    feature = "buzzers",
    feature = "hard-drives",
    feature = "shifted-floppies",
    feature = "shifted-buzzers"
)))]
compile_error!(
    "select an instrument feature: floppies, buzzers, hard-drives, shifted-floppies or shifted-buzzers"
);

#[cfg(feature = "floppies")]
type Board = moppy::instruments::StepperChannelBank<
    moppy::hw::ChannelPin,
    moppy::hw::ChannelPin,
    CycleDelay,
    { moppy::hw::CHANNELS },
>;

#[cfg(feature = "buzzers")]
type Board = moppy::instruments::BuzzerChannelBank<moppy::hw::ChannelPin, { moppy::hw::CHANNELS }>;

#[cfg(feature = "hard-drives")]
type Board = moppy::instruments::SolenoidChannelBank<
    moppy::hw::ChannelPin,
    moppy::hw::ChannelPin,
    CycleDelay,
    { moppy::hw::CHANNELS },
>;

#[cfg(any(feature = "shifted-floppies", feature = "shifted-buzzers"))]
type Spi4 = hal::spi::Spi<
    pac::SPI4,
    (
        hal::gpio::gpioe::PE12<hal::gpio::Alternate<5>>,
        hal::gpio::gpioe::PE13<hal::gpio::Alternate<5>>,
        hal::gpio::gpioe::PE14<hal::gpio::Alternate<5>>,
    ),
    hal::spi::Enabled<u8>,
>;

#[cfg(any(feature = "shifted-floppies", feature = "shifted-buzzers"))]
type Latch = hal::gpio::gpioe::PE4<hal::gpio::Output<hal::gpio::PushPull>>;

#[cfg(feature = "shifted-floppies")]
type Board = moppy::instruments::ShiftedFloppyBank<Spi4, Latch, CycleDelay, 8>;

#[cfg(feature = "shifted-buzzers")]
type Board = moppy::instruments::ShiftedBuzzerBank<Spi4, Latch, 8>;

static INSTRUMENT: Shared<Board> = Shared::new();
static LOGGER: UsartLogger<pac::USART1> = UsartLogger::new();

#[interrupt]
fn TIM2() {
    TickTimer::clear();
    INSTRUMENT.tick();
}

/// Poll iterations between heartbeat LED toggles.
const HEARTBEAT_POLLS: u32 = 200_000;

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.sysclk(216.MHz()).freeze();
    #[cfg(any(feature = "shifted-floppies", feature = "shifted-buzzers"))]
    let mut apb2 = rcc.apb2;

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOD, dp.GPIOE, dp.GPIOF, dp.GPIOG);

    // LED
    let mut led_red = Led::active_low(pins.leds.red);
    let mut heartbeat = Heartbeat::new(Led::active_low(pins.leds.green), HEARTBEAT_POLLS);

    // USART1 (DBG)
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART1, (pins.usart1.tx, pins.usart1.rx), &clocks, usart_cfg);
    LOGGER.init(Usart::new(serial), LevelFilter::Info);
    log::info!(
        "moppy device {:#04x}, channels {}..={}",
        DEVICE.address,
        DEVICE.min_sub_address,
        DEVICE.max_sub_address
    );

    // Instrument
    let mut delay = CycleDelay::new(clocks.sysclk().raw());

    #[cfg(feature = "floppies")]
    let board = {
        use moppy::drivers::FloppyDrive;
        use moppy::instruments::floppies::Floppies;
        let drives = pins.channels.map(|pair| FloppyDrive::new(pair.a, pair.b));
        Board::new(Floppies::new(drives, delay))
    };

    #[cfg(feature = "buzzers")]
    let board = {
        use moppy::instruments::buzzers::Buzzers;
        Board::new(Buzzers::new(pins.channels.map(|pair| pair.a)))
    };

    #[cfg(feature = "hard-drives")]
    let board = {
        use moppy::drivers::Coil;
        use moppy::instruments::hard_drives::HardDrives;
        let coils = pins.channels.map(|pair| Coil::new(pair.a, pair.b));
        Board::new(HardDrives::new(coils, delay))
    };

    #[cfg(any(feature = "shifted-floppies", feature = "shifted-buzzers"))]
    let chain = {
        use hal::spi::{Mode, Phase, Polarity, Spi};
        use moppy::drivers::ShiftRegisterChain;

        // SPI4 into the 74HC595 chain
        let spi_mode = Mode {
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
        };
        let spi4_raw = Spi::new(dp.SPI4, (pins.spi4.sck, pins.spi4.miso, pins.spi4.mosi));
        let spi4: Spi4 = spi4_raw.enable::<u8>(spi_mode, 1.MHz(), &clocks, &mut apb2);
        ShiftRegisterChain::new(spi4, pins.spi4.latch)
    };

    #[cfg(feature = "shifted-floppies")]
    let board = Board::new(moppy::instruments::shifted::ShiftedFloppies::new(chain, delay));

    #[cfg(feature = "shifted-buzzers")]
    let board = Board::new(moppy::instruments::shifted::ShiftedBuzzers::new(chain));

    INSTRUMENT.install(board);
    let mut instrument = &INSTRUMENT;
    instrument.setup();

    // TIM2 drives the tick
    let mut timer = TickTimer::tim2(dp.TIM2, clocks.timclk1().raw(), TIMER_RESOLUTION_US);
    timer.start();
    unsafe { NVIC::unmask(pac::Interrupt::TIM2) };

    if DEVICE.startup_sound {
        instruments::startup_sound(&mut instrument, &mut delay);
    }

    // USART2 (Moppy)
    let moppy_cfg = Config {
        baud_rate: SERIAL_BAUD_RATE.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART2, (pins.usart2.tx, pins.usart2.rx), &clocks, moppy_cfg);
    let mut transport = SerialTransport::new(serial, DEVICE);
    if let Err(e) = transport.begin() {
        log::error!("moppy link failed to start: {}", e);
        led_red.on();
    }

    loop {
        transport.poll(&mut instrument);
        heartbeat.poll();
    }
}
