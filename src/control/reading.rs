// SPDX-License-Identifier: MIT

//! Published-reading handoff between the capture interrupt and the loop.
//!
//! One [`ReadingCell`] per channel, with exactly one writer (the capture
//! interrupt) and one reader (the foreground loop). The frequency is stored as
//! the bit pattern of an `f32` in a single `AtomicU32`, so a value is always
//! observed whole — the reader sees the old reading or the new one, never a
//! mix. No interrupt masking is required around the consume step.
//!
//! The fresh flag only ever goes false→true in [`ReadingCell::publish`]
//! (interrupt context) and true→false in [`ReadingCell::take`] (loop
//! context). If two publishes land between polls, the earlier value is
//! overwritten: last-publish-wins.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Single-writer / single-reader cell holding one channel's latest frequency.
pub struct ReadingCell {
    freq_bits: AtomicU32,
    fresh: AtomicBool,
}

impl ReadingCell {
    /// An empty cell (frequency 0.0, nothing fresh). `const` so cells can
    /// live in a `static` for the life of the firmware.
    pub const fn new() -> Self {
        Self {
            freq_bits: AtomicU32::new(0),
            fresh: AtomicBool::new(false),
        }
    }

    /// Publish a new frequency reading. Interrupt context only.
    pub fn publish(&self, freq_hz: f32) {
        self.freq_bits.store(freq_hz.to_bits(), Ordering::Relaxed);
        // Release: the value store above is visible before the flag reads
        // true on the consumer side.
        self.fresh.store(true, Ordering::Release);
    }

    /// Consume the reading if one is fresh, clearing the flag.
    ///
    /// If a publish races this call, the returned value is either the old
    /// reading or the new one in full; the new one then surfaces on the next
    /// poll at the latest.
    pub fn take(&self) -> Option<f32> {
        if self.fresh.swap(false, Ordering::Acquire) {
            Some(f32::from_bits(self.freq_bits.load(Ordering::Relaxed)))
        } else {
            None
        }
    }
}

impl Default for ReadingCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn empty_cell_has_nothing_to_take() {
        let cell = ReadingCell::new();
        assert_eq!(cell.take(), None);
    }

    #[test]
    fn take_is_idempotent() {
        let cell = ReadingCell::new();
        cell.publish(42.5);
        assert_eq!(cell.take(), Some(42.5));
        // Consumed: a second poll without an intervening publish sees stale.
        assert_eq!(cell.take(), None);
    }

    #[test]
    fn last_publish_wins() {
        let cell = ReadingCell::new();
        cell.publish(10.0);
        cell.publish(11.0);
        assert_eq!(cell.take(), Some(11.0));
        assert_eq!(cell.take(), None);
    }

    #[test]
    fn concurrent_take_never_sees_a_torn_value() {
        // Two bit patterns that differ in every byte, so any mix of the two
        // would decode to something else entirely.
        const OLD: f32 = 1.0; // 0x3F80_0000
        const NEW: f32 = -2.5; // 0xC020_0000

        static CELL: ReadingCell = ReadingCell::new();

        let writer = thread::spawn(|| {
            for i in 0..100_000u32 {
                CELL.publish(if i % 2 == 0 { OLD } else { NEW });
            }
        });

        let mut seen = 0u32;
        while !writer.is_finished() {
            if let Some(freq) = CELL.take() {
                assert!(freq == OLD || freq == NEW, "torn value: {freq}");
                seen += 1;
            }
        }
        writer.join().unwrap();

        // The final publish is still fresh unless the poll above caught it.
        if let Some(freq) = CELL.take() {
            assert!(freq == OLD || freq == NEW, "torn value: {freq}");
            seen += 1;
        }
        assert!(seen > 0);
    }
}
