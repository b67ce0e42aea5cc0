// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless frame loop driver and pacing metrics.
//!
//! [`HeadlessDriver`] wires a [`TickSource`] clock, a [`FrameSync`], and a
//! [`SceneManager`] into a complete frame loop with no display attached:
//! each [`step`](HeadlessDriver::step) asks the clock for a timestamp and
//! lets the synchronizer run zero or more fixed manager updates.
//!
//! [`PacingTracker`] grades delivered pacing against the target framerate
//! from a rolling window of frame deltas.

#![no_std]

extern crate alloc;

use alloc::string::String;
use core::fmt;

use proscenium_core::context::{Canvas, SceneManager};
use proscenium_core::frame_sync::FrameSync;
use proscenium_core::time::TickSource;

/// A complete frame loop without a display: clock in, scene updates out.
pub struct HeadlessDriver<C: TickSource> {
    clock: C,
    sync: FrameSync,
    manager: SceneManager,
}

impl<C: TickSource> fmt::Debug for HeadlessDriver<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessDriver")
            .field("sync", &self.sync)
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}

impl<C: TickSource> HeadlessDriver<C> {
    /// Creates a driver with an empty manager targeting the given framerate.
    #[must_use]
    pub fn new(clock: C, canvas: Canvas, target_framerate: u32) -> Self {
        Self {
            clock,
            sync: FrameSync::new(target_framerate),
            manager: SceneManager::new(canvas, target_framerate),
        }
    }

    /// Returns the scene manager.
    #[must_use]
    pub fn manager(&self) -> &SceneManager {
        &self.manager
    }

    /// Returns the scene manager mutably, for changing scenes and feeding
    /// input between steps.
    pub fn manager_mut(&mut self) -> &mut SceneManager {
        &mut self.manager
    }

    /// Returns the frame synchronizer.
    #[must_use]
    pub fn sync(&self) -> &FrameSync {
        &self.sync
    }

    /// Runs one rendering opportunity: reads the clock and delivers zero or
    /// more fixed-step manager updates. Returns the number of steps.
    pub fn step(&mut self) -> u32 {
        let now = self.clock.now_ms();
        let manager = &mut self.manager;
        self.sync.request_frame(now, |dt| manager.update(dt))
    }

    /// Runs `frames` rendering opportunities, returning the total number of
    /// simulation steps delivered.
    pub fn run_frames(&mut self, frames: u32) -> u32 {
        let mut total = 0;
        for _ in 0..frames {
            total += self.step();
        }
        total
    }
}

/// Letter grade for frame pacing quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacingGrade {
    /// Delivered rate tracks the target with almost no misses.
    A,
    /// Minor deviation or occasional misses.
    B,
    /// Degraded but usable.
    C,
    /// Poor pacing.
    D,
}

impl PacingGrade {
    /// Returns a short label for HUD rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Aggregated report returned by [`PacingTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct PacingReport {
    /// Current grade.
    pub grade: PacingGrade,
    /// Average framerate over the rolling window.
    pub average_fps: f64,
    /// Misses per 1000 observed frames.
    pub miss_rate_per_1000: f64,
    /// Total frames observed.
    pub total_frames: u64,
    /// Total misses observed.
    pub missed_frames: u64,
}

/// Rolling pacing tracker with fixed-size frame-delta history.
#[derive(Debug)]
pub struct PacingTracker<const N: usize> {
    target_framerate: u32,
    deltas_ms: [f64; N],
    cursor: usize,
    total_frames: u64,
    missed_frames: u64,
}

impl<const N: usize> PacingTracker<N> {
    /// Creates a tracker with the ideal step duration prefilled in the ring
    /// buffer, so early reports are not skewed by zeros.
    #[must_use]
    pub const fn new(target_framerate: u32) -> Self {
        let ideal_ms = 1000.0 / target_framerate as f64;
        Self {
            target_framerate,
            deltas_ms: [ideal_ms; N],
            cursor: 0,
            total_frames: 0,
            missed_frames: 0,
        }
    }

    /// Observes one frame delta and returns an updated report. A frame whose
    /// delta exceeds 1.5 ideal steps counts as a miss.
    #[must_use]
    pub fn observe(&mut self, frame_delta_ms: f64) -> PacingReport {
        self.total_frames = self.total_frames.saturating_add(1);
        self.deltas_ms[self.cursor % N] = frame_delta_ms;
        self.cursor = (self.cursor + 1) % N;

        let ideal_ms = 1000.0 / f64::from(self.target_framerate);
        if frame_delta_ms > 1.5 * ideal_ms {
            self.missed_frames = self.missed_frames.saturating_add(1);
        }

        let miss_rate = self.missed_frames as f64 * 1000.0 / self.total_frames as f64;
        let average_fps = self.average_fps();
        let grade = grade_for(f64::from(self.target_framerate), average_fps, miss_rate);

        PacingReport {
            grade,
            average_fps,
            miss_rate_per_1000: miss_rate,
            total_frames: self.total_frames,
            missed_frames: self.missed_frames,
        }
    }

    /// Returns the average framerate over the rolling window.
    #[must_use]
    pub fn average_fps(&self) -> f64 {
        let mut sum = 0.0;
        let mut i = 0;
        while i < N {
            sum += self.deltas_ms[i];
            i += 1;
        }
        if sum <= 0.0 {
            return 0.0;
        }
        1000.0 * N as f64 / sum
    }

    /// Returns ring-buffer frame deltas oldest to newest.
    #[must_use]
    pub fn frame_deltas(&self) -> [f64; N] {
        let mut out = [0.0; N];
        let mut i = 0;
        while i < N {
            out[i] = self.deltas_ms[(self.cursor + i) % N];
            i += 1;
        }
        out
    }

    /// Returns an ASCII sparkline over `frame_deltas()`.
    #[must_use]
    pub fn sparkline_ascii(&self, min_ms: f64, max_ms: f64) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        let mut out = String::with_capacity(N);
        let mut i = 0;
        while i < N {
            let v = self.deltas_ms[(self.cursor + i) % N].clamp(min_ms, max_ms);
            let t = (v - min_ms) / (max_ms - min_ms);
            #[expect(
                clippy::cast_possible_truncation,
                reason = "index is clamped to ASCII level count"
            )]
            let level = (t * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
            out.push(LEVELS[level] as char);
            i += 1;
        }
        out
    }
}

fn grade_for(target_fps: f64, average_fps: f64, miss_rate_per_1000: f64) -> PacingGrade {
    if average_fps >= 0.95 * target_fps && miss_rate_per_1000 < 5.0 {
        PacingGrade::A
    } else if average_fps >= 0.85 * target_fps && miss_rate_per_1000 < 20.0 {
        PacingGrade::B
    } else if average_fps >= 0.6 * target_fps && miss_rate_per_1000 < 80.0 {
        PacingGrade::C
    } else {
        PacingGrade::D
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_deltas_grade_a() {
        let mut tracker = PacingTracker::<16>::new(60);
        for _ in 0..100 {
            let _ = tracker.observe(16.67);
        }
        let report = tracker.observe(16.67);
        assert_eq!(report.grade, PacingGrade::A);
        assert!((report.average_fps - 60.0).abs() < 0.5);
        assert_eq!(report.missed_frames, 0);
    }

    #[test]
    fn long_deltas_count_as_misses() {
        let mut tracker = PacingTracker::<8>::new(60);
        let _ = tracker.observe(16.67);
        for _ in 0..8 {
            let _ = tracker.observe(40.0);
        }
        let report = tracker.observe(40.0);
        assert_eq!(report.missed_frames, 9);
        assert!((report.miss_rate_per_1000 - 900.0).abs() < 1e-6);
        assert_eq!(report.grade, PacingGrade::D);
    }

    #[test]
    fn frame_deltas_come_back_oldest_first() {
        let mut tracker = PacingTracker::<3>::new(60);
        let _ = tracker.observe(10.0);
        let _ = tracker.observe(20.0);
        let _ = tracker.observe(30.0);
        let _ = tracker.observe(40.0);
        assert_eq!(tracker.frame_deltas(), [20.0, 30.0, 40.0]);
    }

    #[test]
    fn sparkline_has_window_length() {
        let tracker = PacingTracker::<12>::new(60);
        assert_eq!(tracker.sparkline_ascii(0.0, 33.0).len(), 12);
    }
}
