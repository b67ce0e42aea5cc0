// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-step frame synchronization.
//!
//! [`FrameSync`] decouples the application framerate from the rate at which
//! the host delivers rendering opportunities. The host calls
//! [`request_frame`](FrameSync::request_frame) once per opportunity (vsync
//! callback, headless step) with a monotonic millisecond timestamp;
//! `FrameSync` accumulates the elapsed wall time and invokes the callback
//! zero or more times, each time advancing the simulation by exactly one
//! step of `1 / target_framerate` seconds.
//!
//! Over a long run the cumulative delivered time tracks cumulative wall
//! time: a host refreshing slower than the target rate receives multiple
//! steps per call, a faster host receives zero steps on some calls.

/// Maximum number of steps' worth of elapsed time considered per call.
///
/// A stalled clock (task switch, suspended tab, debugger pause) produces one
/// very large gap; clamping keeps it from being replayed as hundreds of
/// catch-up steps.
pub const MAX_FRAMES: f64 = 2.0;

/// Tolerated shortfall, in milliseconds, when deciding whether a full step
/// has elapsed.
///
/// Host timers whose granularity does not evenly divide the step duration
/// land consistently a few milliseconds short; without leeway every such
/// frame would be deferred by one call and the output would stutter at half
/// rate. The remainder may go slightly negative and is paid back on the next
/// call.
pub const LEEWAY_MS: f64 = 5.0;

/// Converts monotonic timestamps into fixed-size simulation steps.
#[derive(Clone, Debug)]
pub struct FrameSync {
    target_framerate: u32,
    step_seconds: f32,
    step_ms: f64,
    accumulated_ms: f64,
    last_timestamp: Option<u64>,
}

impl FrameSync {
    /// Creates a synchronizer targeting the given framerate.
    ///
    /// # Panics
    ///
    /// Panics if `target_framerate` is zero.
    #[must_use]
    pub fn new(target_framerate: u32) -> Self {
        assert!(target_framerate > 0, "target framerate must be positive");
        Self {
            target_framerate,
            step_seconds: 1.0 / target_framerate as f32,
            step_ms: 1000.0 / f64::from(target_framerate),
            accumulated_ms: 0.0,
            last_timestamp: None,
        }
    }

    /// Returns the configured target framerate.
    #[must_use]
    pub fn target_framerate(&self) -> u32 {
        self.target_framerate
    }

    /// Returns the step duration in seconds, the `dt` delivered to every
    /// callback invocation.
    #[must_use]
    pub fn step_seconds(&self) -> f32 {
        self.step_seconds
    }

    /// Delivers zero or more fixed steps for the rendering opportunity at
    /// `timestamp_ms`, returning the number of steps emitted.
    ///
    /// The very first call records the baseline timestamp and emits exactly
    /// one synthesized step (the leading marker), so a scene's first update
    /// happens on the first opportunity rather than the second. Later calls
    /// accumulate `min(elapsed, MAX_FRAMES * step)` milliseconds and emit a
    /// step while at least `step - LEEWAY_MS` remains, subtracting a full
    /// step each time.
    ///
    /// Timestamps that go backwards are treated as zero elapsed time.
    pub fn request_frame(&mut self, timestamp_ms: u64, mut callback: impl FnMut(f32)) -> u32 {
        let Some(last) = self.last_timestamp else {
            self.last_timestamp = Some(timestamp_ms);
            callback(self.step_seconds);
            return 1;
        };

        let elapsed = (timestamp_ms.saturating_sub(last)) as f64;
        self.accumulated_ms += elapsed.min(MAX_FRAMES * self.step_ms);
        self.last_timestamp = Some(timestamp_ms);

        let mut steps = 0;
        while self.accumulated_ms >= self.step_ms - LEEWAY_MS {
            callback(self.step_seconds);
            self.accumulated_ms -= self.step_ms;
            steps += 1;
        }
        steps
    }

    /// Forgets the baseline timestamp and accumulated remainder.
    ///
    /// The next [`request_frame`](Self::request_frame) behaves like a first
    /// call. Use after a deliberate pause so the gap is not interpreted as
    /// elapsed time.
    pub fn reset(&mut self) {
        self.accumulated_ms = 0.0;
        self.last_timestamp = None;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    /// Runs `sync` over the timestamps, collecting every delivered dt.
    fn collect_steps(sync: &mut FrameSync, timestamps: &[u64]) -> Vec<f32> {
        let mut dts = Vec::new();
        for &ts in timestamps {
            sync.request_frame(ts, |dt| dts.push(dt));
        }
        dts
    }

    #[test]
    fn first_call_emits_the_leading_marker() {
        let mut sync = FrameSync::new(10);
        let mut dts = Vec::new();
        let steps = sync.request_frame(1000, |dt| dts.push(dt));
        assert_eq!(steps, 1);
        assert_eq!(dts, alloc::vec![0.1]);
    }

    #[test]
    fn slow_refresh_emits_one_step_per_call() {
        // Target 10 fps, host refreshing at exactly the step interval.
        let mut sync = FrameSync::new(10);
        let dts = collect_steps(&mut sync, &[1000, 1100, 1200]);
        assert_eq!(dts.len(), 3, "marker plus one step per later call");
        assert!(dts.iter().all(|&dt| (dt - 0.1).abs() < 1e-6));
    }

    #[test]
    fn doubled_interval_emits_two_steps() {
        let mut sync = FrameSync::new(10);
        let mut counts = Vec::new();
        for ts in [1000, 1200, 1400] {
            counts.push(sync.request_frame(ts, |_| {}));
        }
        assert_eq!(counts, alloc::vec![1, 2, 2]);
    }

    #[test]
    fn fast_refresh_alternates_zero_and_one() {
        // Target 10 fps, host at 20 Hz: half the calls deliver nothing.
        let mut sync = FrameSync::new(10);
        let mut counts = Vec::new();
        for ts in [1000, 1050, 1100, 1150, 1200] {
            counts.push(sync.request_frame(ts, |_| {}));
        }
        assert_eq!(counts, alloc::vec![1, 0, 1, 0, 1]);
    }

    #[test]
    fn conservation_over_a_long_run() {
        let mut sync = FrameSync::new(60);
        let timestamps: Vec<u64> = (0..600).map(|i| i * 16).collect();
        let dts = collect_steps(&mut sync, &timestamps);

        let delivered: f64 = dts.iter().map(|&dt| f64::from(dt)).sum();
        let wall = (599 * 16) as f64 / 1000.0;
        let step = 1.0 / 60.0;
        assert!(
            (delivered - wall).abs() <= 2.0 * step,
            "delivered {delivered} vs wall {wall}"
        );
        assert!(dts.iter().all(|&dt| dt > 0.0));
    }

    #[test]
    fn stalled_clock_is_clamped() {
        let mut sync = FrameSync::new(10);
        sync.request_frame(1000, |_| {});
        sync.request_frame(1100, |_| {});

        // A five-second stall counts the same as a moderately large gap.
        let steps = sync.request_frame(6100, |_| {});
        assert_eq!(steps, 2, "clamped to MAX_FRAMES steps");

        // And it leaves no residue that would replay later.
        let steps = sync.request_frame(6150, |_| {});
        assert_eq!(steps, 0);
    }

    #[test]
    fn leeway_absorbs_short_timer_granularity() {
        // 60 fps step is 16.67ms; a 16ms timer is persistently short.
        let mut sync = FrameSync::new(60);
        let timestamps: Vec<u64> = (0..8).map(|i| i * 16).collect();
        let mut counts = Vec::new();
        for &ts in &timestamps {
            counts.push(sync.request_frame(ts, |_| {}));
        }
        assert!(
            counts[1..].iter().all(|&c| c == 1),
            "every call lands one step, no stutter: {counts:?}"
        );
    }

    #[test]
    fn backwards_timestamp_counts_as_zero_elapsed() {
        let mut sync = FrameSync::new(10);
        sync.request_frame(1000, |_| {});
        let steps = sync.request_frame(900, |_| {});
        assert_eq!(steps, 0);
    }

    #[test]
    fn reset_restores_first_call_behavior() {
        let mut sync = FrameSync::new(10);
        sync.request_frame(1000, |_| {});
        sync.request_frame(1100, |_| {});
        sync.reset();
        let steps = sync.request_frame(50_000, |_| {});
        assert_eq!(steps, 1, "post-reset call is a fresh baseline");
    }

    #[test]
    #[should_panic(expected = "target framerate must be positive")]
    fn zero_framerate_is_rejected() {
        let _ = FrameSync::new(0);
    }
}
