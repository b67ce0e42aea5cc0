// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timestamp sources for the frame loop.
//!
//! The frame loop never reads a platform clock directly; it asks a
//! [`TickSource`] for monotonic millisecond timestamps. Hosts wrap their
//! platform mechanism (display link, `requestAnimationFrame`, a thread
//! sleeping on an interval); tests and headless runs substitute the scripted
//! implementations in this module.

use alloc::vec::Vec;

/// A monotonic source of millisecond timestamps.
///
/// Implementations must never go backwards. Absolute values carry no
/// meaning; only differences between consecutive calls are used.
pub trait TickSource {
    /// Returns the current timestamp in milliseconds.
    fn now_ms(&mut self) -> u64;
}

/// A tick source replaying a fixed sequence of timestamps.
///
/// Once the sequence is exhausted, the last timestamp repeats, which reads
/// as a stalled clock.
#[derive(Clone, Debug)]
pub struct ScriptedClock {
    timestamps: Vec<u64>,
    cursor: usize,
}

impl ScriptedClock {
    /// Creates a clock replaying `timestamps` in order.
    ///
    /// # Panics
    ///
    /// Panics if `timestamps` is empty or not monotonically non-decreasing.
    #[must_use]
    pub fn new(timestamps: Vec<u64>) -> Self {
        assert!(!timestamps.is_empty(), "scripted clock needs timestamps");
        assert!(
            timestamps.windows(2).all(|w| w[0] <= w[1]),
            "scripted timestamps must be monotonic"
        );
        Self {
            timestamps,
            cursor: 0,
        }
    }
}

impl TickSource for ScriptedClock {
    fn now_ms(&mut self) -> u64 {
        let ts = self.timestamps[self.cursor];
        if self.cursor + 1 < self.timestamps.len() {
            self.cursor += 1;
        }
        ts
    }
}

/// A tick source advancing a constant interval per call.
///
/// The first call returns the configured start time; each subsequent call
/// advances by the interval. Useful for headless runs at a synthetic refresh
/// rate.
#[derive(Clone, Copy, Debug)]
pub struct FixedStepClock {
    current: u64,
    interval_ms: u64,
    started: bool,
}

impl FixedStepClock {
    /// Creates a clock starting at `start_ms` that advances `interval_ms`
    /// per call.
    #[must_use]
    pub const fn new(start_ms: u64, interval_ms: u64) -> Self {
        Self {
            current: start_ms,
            interval_ms,
            started: false,
        }
    }
}

impl TickSource for FixedStepClock {
    fn now_ms(&mut self) -> u64 {
        if self.started {
            self.current += self.interval_ms;
        } else {
            self.started = true;
        }
        self.current
    }
}
