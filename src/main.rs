// SPDX-License-Identifier: MIT

//! Firmware entry point.
//!
//! Two execution contexts and nothing else: the TIM3 interrupt timestamps
//! encoder edges and publishes frequency readings, and the foreground loop
//! below polls those readings and renders them. The only state crossing the
//! boundary is the pair of [`ReadingCell`]s; everything the interrupt mutates
//! beyond that lives inside [`CAPTURE`].

#![no_main]
#![no_std]

use core::cell::RefCell;
use core::fmt::Write;

use arrayvec::ArrayString;
use cortex_m::{interrupt::Mutex, peripheral::NVIC};
use cortex_m_rt::entry;
use panic_halt as _;

use hal::{
    i2c::{BlockingI2c, Mode},
    pac,
    pac::interrupt,
    prelude::*,
};
use stm32f7xx_hal as hal;

use dualtach::control::estimator::{duty_percent, rpm_from_freq, CaptureChannel};
use dualtach::control::ReadingCell;
use dualtach::drivers::Ssd1306;
use dualtach::hw::{BoardPins, CaptureTimer, PwmTimer};

/// Capture timer and per-channel estimator state, owned by the TIM3 handler
/// after startup hands it over.
struct CaptureState {
    timer: CaptureTimer<pac::TIM3>,
    channels: [CaptureChannel; 2],
}

static CAPTURE: Mutex<RefCell<Option<CaptureState>>> = Mutex::new(RefCell::new(None));

/// Published readings, one cell per encoder channel. Written by the TIM3
/// handler, consumed by the reporting loop.
static READINGS: [ReadingCell; 2] = [ReadingCell::new(), ReadingCell::new()];

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();

    // TIM3/TIM4 are configured at the register level, so their bus clocks
    // are enabled here rather than by a HAL constructor.
    dp.RCC
        .apb1enr
        .modify(|_, w| w.tim3en().set_bit().tim4en().set_bit());

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let mut apb1 = rcc.apb1;

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB);

    // Motor PWM, duty fixed at startup (open loop)
    let pwm = PwmTimer::tim4(dp.TIM4);

    // Edge timestamp source. APB1 prescaler is 1, so the timers see PCLK1.
    let timer = CaptureTimer::tim3(dp.TIM3, clocks.pclk1().raw());

    // I2C1 + OLED. The panel needs a moment after power-on before it will
    // take commands.
    let i2c = BlockingI2c::i2c1(
        dp.I2C1,
        (pins.display.scl, pins.display.sda),
        Mode::standard(100_000.Hz()),
        &clocks,
        &mut apb1,
        10_000,
    );
    cortex_m::asm::delay(100_000);
    let mut display = Ssd1306::new(i2c);
    display.init().ok();
    display.clear().ok();

    // Hand the capture state to the interrupt, then let it fire.
    cortex_m::interrupt::free(|cs| {
        CAPTURE.borrow(cs).borrow_mut().replace(CaptureState {
            timer,
            channels: [CaptureChannel::new(), CaptureChannel::new()],
        });
    });
    unsafe { NVIC::unmask(interrupt::TIM3) };

    // Reporting loop: never blocks, polls both channels every pass.
    loop {
        for (index, reading) in READINGS.iter().enumerate() {
            if let Some(freq) = reading.take() {
                let mut line = ArrayString::<20>::new();
                let _ = write!(line, "RPM{}: {:.1}", index + 1, rpm_from_freq(freq));
                display.write_text(0, index as u8 + 1, &line).ok();
            }
        }

        let (on, period) = pwm.duty_counts();
        let mut line = ArrayString::<20>::new();
        let _ = write!(line, "Duty: {:.1}%", duty_percent(on, period));
        display.write_text(0, 0, &line).ok();
    }
}

/// Shared capture interrupt for both encoder channels.
///
/// Drains every pending capture unit: reads the latched stamp, feeds the
/// matching channel's estimator, and publishes when a window completes.
/// No display or bus traffic happens here.
#[interrupt]
fn TIM3() {
    cortex_m::interrupt::free(|cs| {
        let mut capture = CAPTURE.borrow(cs).borrow_mut();
        let Some(state) = capture.as_mut() else {
            return;
        };

        while let Some(event) = state.timer.pending() {
            let stamp = state.timer.capture(event);
            if let Some(freq) = state.channels[event.index()].on_edge(stamp) {
                READINGS[event.index()].publish(freq);
            }
        }
    });
}
