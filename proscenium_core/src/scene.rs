// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene lifecycle contract and the [`Timer`] utility.
//!
//! A [`Scene`] is a unit of application behavior driven by the
//! [`SceneManager`](crate::context::SceneManager): `start` runs once before
//! the first `update`, `update` runs once per simulation step, and `end`
//! runs exactly once when the scene is replaced, detached, or reports
//! completion. All callbacks receive the shared
//! [`SceneContext`](crate::context::SceneContext) explicitly; there is no
//! ambient "current scene" state.
//!
//! Callbacks return `Result` so a failing scene cannot take down the frame:
//! the manager reports the error to its [`ErrorSink`] and continues with the
//! remaining scenes in the pass.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::context::SceneContext;

/// A runtime failure escaping a scene callback.
///
/// Carries a human-readable message; the manager attaches the lifecycle
/// phase when reporting it.
#[derive(Clone, PartialEq, Eq)]
pub struct SceneError {
    message: String,
}

impl SceneError {
    /// Creates an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SceneError({:?})", self.message)
    }
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for SceneError {}

/// Convenience alias for scene callback results.
pub type SceneResult = Result<(), SceneError>;

/// The lifecycle callback that produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenePhase {
    /// The scene's `start` callback.
    Start,
    /// The scene's `update` callback.
    Update,
    /// The scene's `end` callback.
    End,
    /// The scene's `resize` callback.
    Resize,
}

/// Receives scene errors from the manager.
///
/// The manager is the only component that invokes the sink; it does so once
/// per failing callback and then continues the pass.
pub trait ErrorSink {
    /// Reports an error escaping the given lifecycle phase.
    fn scene_error(&mut self, phase: ScenePhase, error: &SceneError);
}

/// A unit of application behavior with a managed lifecycle.
///
/// Only [`update`](Self::update) is mandatory; the other callbacks default
/// to doing nothing.
pub trait Scene {
    /// Called once, before the first `update`.
    fn start(&mut self, ctx: &mut SceneContext) -> SceneResult {
        let _ = ctx;
        Ok(())
    }

    /// Called once per simulation step while the scene is active.
    fn update(&mut self, ctx: &mut SceneContext, dt: f32) -> SceneResult;

    /// Called exactly once when the scene is replaced, detached, or has
    /// reported completion. Only called if `start` ran.
    fn end(&mut self, ctx: &mut SceneContext) -> SceneResult {
        let _ = ctx;
        Ok(())
    }

    /// Called when the canvas is resized, for every live scene.
    fn resize(&mut self, ctx: &mut SceneContext, width: f32, height: f32) -> SceneResult {
        let _ = (ctx, width, height);
        Ok(())
    }

    /// Polled after each update; returning `true` schedules `end` and
    /// removal. The primary scene is exempt (it lasts until replaced).
    fn is_completed(&self) -> bool {
        false
    }
}

/// Counts simulation time toward a duration, in seconds.
///
/// Attached frame-update actions run on every [`update`](Self::update);
/// completion actions fire exactly once when the duration is reached (or
/// when [`complete`](Self::complete) forces it).
pub struct Timer {
    position: f32,
    duration: f32,
    fired: bool,
    frame_actions: Vec<Box<dyn FnMut(f32)>>,
    completion_actions: Vec<Box<dyn FnMut()>>,
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("position", &self.position)
            .field("duration", &self.duration)
            .field("fired", &self.fired)
            .finish_non_exhaustive()
    }
}

impl Timer {
    /// Creates a timer counting toward `duration` seconds.
    ///
    /// # Panics
    ///
    /// Panics if `duration` is negative or NaN.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        assert!(duration >= 0.0, "timer duration must be non-negative");
        Self {
            position: 0.0,
            duration,
            fired: false,
            frame_actions: Vec::new(),
            completion_actions: Vec::new(),
        }
    }

    /// Creates a timer that never completes.
    #[must_use]
    pub fn indefinite() -> Self {
        Self::new(f32::INFINITY)
    }

    /// Creates a timer that is already completed.
    #[must_use]
    pub fn completed() -> Self {
        Self::new(0.0)
    }

    /// Returns the elapsed position in seconds.
    #[must_use]
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Returns the configured duration in seconds.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Returns the completion ratio in `[0, 1]`. An indefinite timer stays
    /// at `0.0`; a zero-duration timer is always at `1.0`.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.duration == 0.0 {
            return 1.0;
        }
        if self.duration.is_infinite() {
            return 0.0;
        }
        (self.position / self.duration).clamp(0.0, 1.0)
    }

    /// Returns whether the duration has been reached.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.position >= self.duration
    }

    /// Advances the timer, running frame actions and (on reaching the
    /// duration) the completion actions exactly once.
    pub fn update(&mut self, dt: f32) {
        self.position += dt;
        for action in &mut self.frame_actions {
            action(dt);
        }
        if self.is_completed() {
            self.fire_completion();
        }
    }

    /// Forces the timer to its duration, firing completion actions if they
    /// have not fired yet. No-op on an indefinite timer.
    pub fn complete(&mut self) {
        if self.duration.is_infinite() {
            return;
        }
        self.position = self.duration;
        self.fire_completion();
    }

    /// Rewinds to zero and re-arms the completion actions.
    pub fn reset(&mut self) {
        self.position = 0.0;
        self.fired = false;
    }

    /// Attaches an action run on every update with the step's `dt`.
    pub fn attach_frame_update(&mut self, action: impl FnMut(f32) + 'static) {
        self.frame_actions.push(Box::new(action));
    }

    /// Attaches an action fired once on completion.
    pub fn attach_completion(&mut self, action: impl FnMut() + 'static) {
        self.completion_actions.push(Box::new(action));
    }

    fn fire_completion(&mut self) {
        if self.fired {
            return;
        }
        self.fired = true;
        for action in &mut self.completion_actions {
            action();
        }
    }
}
