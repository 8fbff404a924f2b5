// SPDX-License-Identifier: MIT

//! Edge-timestamp source via an STM32F7 timer in input-capture mode.
//!
//! This module configures TIM3 (16-bit) as a free-running counter ticking at
//! the reference clock rate, with capture units CC1/CC2 latching the counter
//! on each rising edge of the two encoder inputs and raising the shared TIM3
//! interrupt. Software never writes the counter after start; it only reads
//! the capture registers and acknowledges the per-unit flags.

use stm32f7xx_hal::pac;

use crate::control::estimator::REF_CLK_HZ;

/// Which capture unit raised the shared TIM3 interrupt.
///
/// The hardware multiplexes both encoder channels through one vector; this is
/// the closed set of causes the handler dispatches over.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CaptureEvent {
    Encoder1,
    Encoder2,
}

impl CaptureEvent {
    /// Index of the matching estimator channel / reading cell.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            CaptureEvent::Encoder1 => 0,
            CaptureEvent::Encoder2 => 1,
        }
    }
}

pub struct CaptureTimer<TIM> {
    tim: TIM,
}

impl<TIM> CaptureTimer<TIM> {
    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> TIM {
        self.tim
    }
}

impl CaptureTimer<pac::TIM3> {
    /// Configure TIM3 with CC1/CC2 as rising-edge capture units.
    ///
    /// `timer_clk_hz` is the clock feeding the timer (PCLK1 with an APB
    /// prescaler of 1). The counter prescaler divides it down to the
    /// reference rate by the nearest integer; with a 16 MHz timer clock the
    /// tick ends up within 0.1 % of 32 768 Hz.
    pub fn tim3(tim3: pac::TIM3, timer_clk_hz: u32) -> Self {
        let tim = tim3;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // Tick at the reference clock rate, full 16-bit free run
        let psc = (timer_clk_hz / (REF_CLK_HZ as u32)).saturating_sub(1) as u16;
        tim.psc.write(|w| w.psc().bits(psc));
        tim.arr.write(|w| unsafe { w.bits(0xFFFF) });

        // Capture units 1/2 latch from their own input pins (TI1/TI2)
        tim.ccmr1_input().modify(|_, w| w.cc1s().ti1().cc2s().ti2());

        // Rising edge on both channels, capture enabled.
        tim.ccer.modify(|_, w| {
            w.cc1p()
                .clear_bit()
                .cc1np()
                .clear_bit()
                .cc2p()
                .clear_bit()
                .cc2np()
                .clear_bit()
                .cc1e()
                .set_bit()
                .cc2e()
                .set_bit()
        });

        // Interrupt on either capture
        tim.dier.modify(|_, w| w.cc1ie().set_bit().cc2ie().set_bit());

        // Load the prescaler and start from zero
        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.modify(|_, w| w.uif().clear_bit());

        // Enable the counter
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }

    /// Return a capture unit with a latched value waiting, if any.
    ///
    /// CC1 is polled first; with both units pending the handler drains them
    /// one call at a time.
    pub fn pending(&self) -> Option<CaptureEvent> {
        let sr = self.tim.sr.read();
        if sr.cc1if().bit_is_set() {
            Some(CaptureEvent::Encoder1)
        } else if sr.cc2if().bit_is_set() {
            Some(CaptureEvent::Encoder2)
        } else {
            None
        }
    }

    /// Read the latched edge timestamp for `event` and acknowledge its flags.
    ///
    /// Reading CCRx clears CCxIF in hardware; the overcapture flag is cleared
    /// explicitly. An overcapture (a second edge before the previous stamp
    /// was read) just means a longer measured interval, same as a missed
    /// edge.
    pub fn capture(&self, event: CaptureEvent) -> u16 {
        match event {
            CaptureEvent::Encoder1 => {
                let stamp = self.tim.ccr1().read().bits() as u16;
                self.tim
                    .sr
                    .modify(|_, w| w.cc1if().clear_bit().cc1of().clear_bit());
                stamp
            }
            CaptureEvent::Encoder2 => {
                let stamp = self.tim.ccr2().read().bits() as u16;
                self.tim
                    .sr
                    .modify(|_, w| w.cc2if().clear_bit().cc2of().clear_bit());
                stamp
            }
        }
    }

    /// Read the free-running counter directly.
    #[inline]
    pub fn raw(&self) -> u16 {
        self.tim.cnt.read().cnt().bits()
    }
}
