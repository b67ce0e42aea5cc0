// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Smoothed frame statistics.
//!
//! [`FrameStats`] tracks the observed framerate and the time spent in
//! update and render work, smoothed with an exponential moving average so
//! the diagnostics output is readable instead of flickering with per-frame
//! noise. The manager records frame and update times; the host reports
//! render times if it has them.

/// An exponential moving average.
///
/// The first observation seeds the average directly; later observations
/// blend in with weight `alpha`.
#[derive(Clone, Copy, Debug)]
pub struct Ema {
    alpha: f64,
    value: f64,
    initialized: bool,
}

impl Ema {
    /// Creates an average blending new samples with weight `alpha`
    /// (`0 < alpha <= 1`; smaller is smoother).
    #[must_use]
    pub const fn new(alpha: f64) -> Self {
        Self {
            alpha,
            value: 0.0,
            initialized: false,
        }
    }

    /// Feeds one sample and returns the updated average.
    pub fn observe(&mut self, sample: f64) -> f64 {
        if self.initialized {
            self.value = self.alpha * sample + (1.0 - self.alpha) * self.value;
        } else {
            self.value = sample;
            self.initialized = true;
        }
        self.value
    }

    /// Returns the current average (`0.0` before any sample).
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Discards all observations.
    pub fn reset(&mut self) {
        self.value = 0.0;
        self.initialized = false;
    }
}

/// Smoothing weight used for all frame statistics.
const SMOOTHING_ALPHA: f64 = 0.1;

/// EMA-smoothed framerate and frame-cost observations.
#[derive(Clone, Copy, Debug)]
pub struct FrameStats {
    target_framerate: u32,
    framerate: Ema,
    update_ms: Ema,
    render_ms: Ema,
}

impl FrameStats {
    /// Creates statistics for a loop targeting the given framerate.
    #[must_use]
    pub const fn new(target_framerate: u32) -> Self {
        Self {
            target_framerate,
            framerate: Ema::new(SMOOTHING_ALPHA),
            update_ms: Ema::new(SMOOTHING_ALPHA),
            render_ms: Ema::new(SMOOTHING_ALPHA),
        }
    }

    /// Returns the configured target framerate.
    #[must_use]
    pub const fn target_framerate(&self) -> u32 {
        self.target_framerate
    }

    /// Records one simulation step of `delta_seconds`. Non-positive deltas
    /// are ignored.
    pub fn record_frame(&mut self, delta_seconds: f32) {
        if delta_seconds > 0.0 {
            let _ = self.framerate.observe(1.0 / f64::from(delta_seconds));
        }
    }

    /// Records the cost of one update pass, in milliseconds.
    pub fn record_update_time(&mut self, millis: f64) {
        let _ = self.update_ms.observe(millis);
    }

    /// Records the cost of one render pass, in milliseconds. Reported by
    /// the host; stays at zero in headless runs.
    pub fn record_render_time(&mut self, millis: f64) {
        let _ = self.render_ms.observe(millis);
    }

    /// Returns the smoothed observed framerate.
    #[must_use]
    pub fn framerate(&self) -> f64 {
        self.framerate.value()
    }

    /// Returns the smoothed update cost in milliseconds.
    #[must_use]
    pub fn update_time_ms(&self) -> f64 {
        self.update_ms.value()
    }

    /// Returns the smoothed render cost in milliseconds.
    #[must_use]
    pub fn render_time_ms(&self) -> f64 {
        self.render_ms.value()
    }
}
