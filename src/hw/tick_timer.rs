// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Periodic update interrupt on TIM2 that drives the instrument tick.
//!
//! The timer is configured at the register level: prescale to 1 MHz, auto-reload at the tick
//! period, update interrupt enabled. The interrupt handler must call [`TickTimer::clear`] before
//! returning or it fires again immediately.

use stm32f7xx_hal::pac;

pub struct TickTimer {
    tim: pac::TIM2,
}

impl TickTimer {
    /// Configure TIM2 to raise an update interrupt every `period_us` microseconds.
    ///
    /// `timer_clock_hz` is the TIM2 kernel clock (APB1 timer clock).
    pub fn tim2(tim2: pac::TIM2, timer_clock_hz: u32, period_us: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim2en().set_bit());

        let tim = tim2;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // 1 MHz count rate
        let psc = (timer_clock_hz / 1_000_000).saturating_sub(1);
        tim.psc.write(|w| unsafe { w.psc().bits(psc as u16) });

        // Reload at the tick period
        tim.arr.write(|w| w.bits(period_us.saturating_sub(1)));

        // Latch PSC/ARR now rather than on the first overflow
        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.modify(|_, w| w.uif().clear_bit());

        // Update interrupt only
        tim.dier.modify(|_, w| w.uie().set_bit());

        // Reset the counter
        tim.cnt.write(|w| w.bits(0));

        Self { tim }
    }

    /// Start counting. Interrupts begin once TIM2 is unmasked in the NVIC.
    #[inline]
    pub fn start(&mut self) {
        self.tim.cr1.modify(|_, w| w.cen().set_bit());
    }

    /// Acknowledge the update interrupt. Safe to call from the handler without owning the timer.
    #[inline]
    pub fn clear() {
        let tim = unsafe { &*pac::TIM2::ptr() };
        tim.sr.modify(|_, w| w.uif().clear_bit());
    }

    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> pac::TIM2 {
        self.tim
    }
}
