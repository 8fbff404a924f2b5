// SPDX-License-Identifier: MIT

//! # DualTach Firmware
//!
//! Firmware for a two-encoder tachometer display, targeting an STM32F777 MCU.
//! A capture timer timestamps the rising edges of two shaft encoders; an
//! interrupt-driven estimator turns edge intervals into per-channel frequency
//! readings; the foreground loop converts them to RPM and renders them, next
//! to the live PWM duty cycle, on an SSD1306 OLED.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | MCU-level wrappers around the capture timer, PWM timer, and pins |
//! | [`drivers`] | Device-level drivers (SSD1306 OLED) |
//! | [`control`]   | Edge-interval frequency estimation and the reading handoff |
//!
//! ## Getting Started
//!
//! Build docs:
//!
//! ```bash
//! cargo doc --no-deps --open
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release
//! ```
//!
//! Run the unit tests on the host (the estimator and handoff logic are
//! hardware-free):
//!
//! ```bash
//! cargo test --lib --target x86_64-unknown-linux-gnu
//! ```

#![no_std]

#[cfg(test)]
extern crate std;

pub mod control;
pub mod drivers;
pub mod hw;
