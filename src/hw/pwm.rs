// SPDX-License-Identifier: MIT

//! Motor PWM output via TIM4 channel 1.
//!
//! The duty cycle is set once at startup and is not adjusted from the
//! measured RPM (open loop). The reporting loop reads the live compare and
//! reload registers back to display the duty fraction.

use stm32f7xx_hal::pac;

/// PWM period, in timer counts.
pub const PWM_PERIOD: u16 = 1024;

/// Initial on-duration, in timer counts.
pub const PWM_DUTY_START: u16 = 400;

pub struct PwmTimer<TIM> {
    tim: TIM,
}

impl<TIM> PwmTimer<TIM> {
    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> TIM {
        self.tim
    }
}

impl PwmTimer<pac::TIM4> {
    /// Configure TIM4 CH1 as a PWM output at [`PWM_PERIOD`] counts per cycle,
    /// starting at [`PWM_DUTY_START`] counts on.
    pub fn tim4(tim4: pac::TIM4) -> Self {
        let tim = tim4;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        tim.arr.write(|w| unsafe { w.bits(PWM_PERIOD as u32) });
        tim.ccr1().write(|w| unsafe { w.bits(PWM_DUTY_START as u32) });

        // PWM mode 1 with preload on the compare register
        tim.ccmr1_output()
            .modify(|_, w| unsafe { w.oc1m().bits(0b110).oc1pe().set_bit() });

        // Active-high output on CH1
        tim.ccer.modify(|_, w| w.cc1p().clear_bit().cc1e().set_bit());

        // Buffer the reload register and latch everything in
        tim.cr1.modify(|_, w| w.arpe().set_bit());
        tim.egr.write(|w| w.ug().set_bit());

        // Enable the counter
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }

    /// Read back the live on-duration and period, in timer counts.
    pub fn duty_counts(&self) -> (u16, u16) {
        let on = self.tim.ccr1().read().bits() as u16;
        let period = self.tim.arr.read().bits() as u16;
        (on, period)
    }
}
