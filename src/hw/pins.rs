// SPDX-License-Identifier: MIT

//! Pin definitions for the STM32F777 tachometer board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, Alternate, OpenDrain},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB);
/// ```
pub struct BoardPins {
    pub capture: CapturePins,
    pub pwm: PwmPins,
    pub display: DisplayPins,
}

/// TIM3 CH1/CH2 capture inputs, one per encoder.
pub struct CapturePins {
    pub encoder1: gpioa::PA6<Alternate<2>>,
    pub encoder2: gpioa::PA7<Alternate<2>>,
}

/// TIM4 CH1 motor PWM output.
pub struct PwmPins {
    pub out: gpiob::PB6<Alternate<2>>,
}

/// I2C1 bus to the SSD1306 OLED.
pub struct DisplayPins {
    pub scl: gpiob::PB8<Alternate<4, OpenDrain>>,
    pub sda: gpiob::PB9<Alternate<4, OpenDrain>>,
}

impl BoardPins {
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();

        Self {
            capture: CapturePins {
                encoder1: gpioa.pa6.into_alternate::<2>(),
                encoder2: gpioa.pa7.into_alternate::<2>(),
            },
            pwm: PwmPins {
                out: gpiob.pb6.into_alternate::<2>(),
            },
            display: DisplayPins {
                scl: gpiob.pb8.into_alternate_open_drain::<4>(),
                sda: gpiob.pb9.into_alternate_open_drain::<4>(),
            },
        }
    }
}
