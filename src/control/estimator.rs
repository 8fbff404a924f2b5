// SPDX-License-Identifier: MIT

//! Edge-interval frequency estimation for one capture channel.
//!
//! Runs entirely in interrupt context. Each rising edge of an encoder delivers
//! a 16-bit counter stamp; consecutive stamps give an interval in reference
//! clock ticks, and after [`EDGES_PER_PUBLISH`] edges the most recent interval
//! is converted to a frequency for the foreground loop to pick up.
//!
//! Works in `no_std` and does not touch hardware, so it is testable on the
//! host.

/// Rate of the clock feeding the capture counter, in Hz.
pub const REF_CLK_HZ: f32 = 32_768.0;

/// Encoder pulses per full mechanical revolution of the shaft.
pub const PULSES_PER_REV: f32 = 48.0;

/// Edges accumulated per channel before a frequency is published.
///
/// A higher threshold rejects more edge jitter at the cost of a slower
/// update rate.
pub const EDGES_PER_PUBLISH: u8 = 2;

/// Per-channel estimator state.
///
/// Owned by the capture interrupt; the foreground loop never sees this
/// directly, only the readings it publishes.
pub struct CaptureChannel {
    /// Counter stamp of the previous edge.
    last_edge: u16,
    /// Edges seen since the last publish.
    edges: u8,
}

impl CaptureChannel {
    pub const fn new() -> Self {
        Self {
            last_edge: 0,
            edges: 0,
        }
    }

    /// Feed one captured edge stamp.
    ///
    /// Returns `Some(frequency_hz)` when this edge completes an accumulation
    /// window, `None` otherwise.
    ///
    /// The interval is 16-bit modular subtraction, which corrects for exactly
    /// one counter wraparound between edges. If the shaft turns so slowly that
    /// a full counter period (~2 s at 32 768 Hz) elapses between edges, the
    /// computed frequency is silently high; that is a stated design limit, not
    /// a detected error.
    pub fn on_edge(&mut self, stamp: u16) -> Option<f32> {
        let interval = stamp.wrapping_sub(self.last_edge);
        self.last_edge = stamp;

        self.edges += 1;
        if self.edges < EDGES_PER_PUBLISH {
            return None;
        }
        self.edges = 0;

        // Two captures at the identical tick; skip the publish rather than
        // divide by zero.
        if interval == 0 {
            return None;
        }

        Some(REF_CLK_HZ / interval as f32)
    }
}

impl Default for CaptureChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an edge frequency to shaft RPM.
#[inline]
pub fn rpm_from_freq(freq_hz: f32) -> f32 {
    freq_hz / PULSES_PER_REV * 60.0
}

/// Convert PWM on-duration and period counts to a duty percentage.
pub fn duty_percent(on: u16, period: u16) -> f32 {
    if period == 0 {
        return 0.0;
    }
    on as f32 / period as f32 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive one full accumulation window ending at `stamp`.
    fn publish_at(ch: &mut CaptureChannel, mid: u16, stamp: u16) -> Option<f32> {
        assert_eq!(ch.on_edge(mid), None);
        ch.on_edge(stamp)
    }

    #[test]
    fn forward_interval() {
        let mut ch = CaptureChannel::new();
        // Edges at 0, 100, 200: window closes with interval 100.
        let freq = publish_at(&mut ch, 100, 200).unwrap();
        assert_eq!(freq, REF_CLK_HZ / 100.0);
    }

    #[test]
    fn wraparound_interval_is_modular() {
        let mut ch = CaptureChannel::new();
        // Land the publishing edge just past the wrap: 0xFFF6 -> 10 is
        // 10 ticks to the wrap plus 10 after, 20 of true elapsed time.
        let freq = publish_at(&mut ch, 0xFFF6, 10).unwrap();
        assert_eq!(freq, REF_CLK_HZ / 20.0);
    }

    #[test]
    fn wrap_boundary_is_one_tick() {
        let mut ch = CaptureChannel::new();
        // 0xFFFF -> 0 is exactly one tick.
        let freq = publish_at(&mut ch, 0xFFFF, 0).unwrap();
        assert_eq!(freq, REF_CLK_HZ);
    }

    #[test]
    fn zero_interval_does_not_publish() {
        let mut ch = CaptureChannel::new();
        assert_eq!(publish_at(&mut ch, 500, 500), None);
        // The window still closed: the next publish is two edges away and
        // measures from the duplicated stamp.
        let freq = publish_at(&mut ch, 600, 700).unwrap();
        assert_eq!(freq, REF_CLK_HZ / 100.0);
    }

    #[test]
    fn publishes_on_every_second_edge() {
        let mut ch = CaptureChannel::new();
        let mut stamp = 0u16;
        for window in 0..8 {
            stamp = stamp.wrapping_add(50);
            assert_eq!(ch.on_edge(stamp), None, "window {window}: first edge");
            stamp = stamp.wrapping_add(50);
            assert!(
                ch.on_edge(stamp).is_some(),
                "window {window}: second edge"
            );
        }
    }

    #[test]
    fn channels_are_independent() {
        let mut ch1 = CaptureChannel::new();
        let mut ch2 = CaptureChannel::new();

        // Interleave edges with different spacing per channel.
        assert_eq!(ch1.on_edge(100), None);
        assert_eq!(ch2.on_edge(7), None);
        let f2 = ch2.on_edge(17).unwrap();
        let f1 = ch1.on_edge(300).unwrap();

        assert_eq!(f1, REF_CLK_HZ / 200.0);
        assert_eq!(f2, REF_CLK_HZ / 10.0);
    }

    #[test]
    fn rpm_conversion() {
        // 16 Hz at 48 pulses/rev is a third of a rev per second.
        assert_eq!(rpm_from_freq(16.0), 20.0);
        assert_eq!(rpm_from_freq(0.0), 0.0);
    }

    #[test]
    fn duty_conversion() {
        assert_eq!(duty_percent(400, 1024), 400.0 / 1024.0 * 100.0);
        assert_eq!(duty_percent(0, 1024), 0.0);
        assert_eq!(duty_percent(1024, 1024), 100.0);
        // Degenerate period must not divide by zero.
        assert_eq!(duty_percent(400, 0), 0.0);
    }

    #[test]
    fn duty_formats_to_one_decimal() {
        use arrayvec::ArrayString;
        use core::fmt::Write;

        let mut text = ArrayString::<20>::new();
        write!(text, "Duty: {:.1}%", duty_percent(400, 1024)).unwrap();
        assert_eq!(&*text, "Duty: 39.1%");
    }
}
