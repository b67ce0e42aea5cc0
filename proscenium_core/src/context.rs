// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene ownership and the per-frame update pass.
//!
//! [`SceneManager`] owns three groups of scenes:
//!
//! - the **primary** scene, the single top-level behavior driving the
//!   application;
//! - **sub-scenes**, owned by the current primary and ended with it;
//! - **global scenes**, which survive primary changes.
//!
//! Each [`update`](SceneManager::update) call runs the primary first, then
//! sub-scenes in attach order, then global scenes. The sets visited in a
//! pass are snapshotted at the start of the pass: scenes attached during
//! the pass first update on the next call, while detached scenes receive no
//! further updates within the same pass.
//!
//! Scene callbacks receive a [`SceneContext`]. Structural operations
//! requested through it (`change_scene`, `attach`, `detach`) are queued and
//! applied by the manager immediately after the requesting callback
//! returns, which keeps mutation out of the borrow the callback holds.
//! The manager-level methods of the same names apply synchronously.
//!
//! The pass finishes by evaluating both stage graphs, so world transforms
//! and change lists are consistent before the host renders.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::input::InputState;
use crate::scene::{ErrorSink, Scene, ScenePhase, SceneResult};
use crate::stage::{Stage, StageChanges};
use crate::stats::FrameStats;

/// The logical drawing surface, in stage coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    width: f32,
    height: f32,
}

impl Canvas {
    /// Creates a canvas of the given size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width in stage coordinates.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Returns the height in stage coordinates.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> kurbo::Point {
        kurbo::Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }
}

/// Identifies an attached scene for later [`detach`](SceneContext::detach).
///
/// Handles are unique for the lifetime of a manager and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneHandle(u64);

/// A structural operation queued by a scene callback.
enum PendingOp {
    ChangeScene(Box<dyn Scene>),
    Attach {
        handle: SceneHandle,
        scene: Box<dyn Scene>,
    },
    AttachGlobal {
        handle: SceneHandle,
        scene: Box<dyn Scene>,
    },
    Detach(SceneHandle),
}

/// Everything a scene callback can reach: the stage, this frame's input,
/// the canvas, frame statistics, and deferred scene operations.
pub struct SceneContext {
    stage: Stage,
    input: InputState,
    canvas: Canvas,
    stats: FrameStats,
    renderer_name: String,
    pending: Vec<PendingOp>,
    next_handle: u64,
}

impl fmt::Debug for SceneContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneContext")
            .field("canvas", &self.canvas)
            .field("renderer_name", &self.renderer_name)
            .field("stats", &self.stats)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl SceneContext {
    fn new(canvas: Canvas, target_framerate: u32) -> Self {
        Self {
            stage: Stage::new(),
            input: InputState::new(),
            canvas,
            stats: FrameStats::new(target_framerate),
            renderer_name: String::from("headless"),
            pending: Vec::new(),
            next_handle: 0,
        }
    }

    /// Returns the stage.
    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Returns the stage mutably.
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    /// Returns this frame's input snapshot.
    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Returns the canvas.
    #[must_use]
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Returns the frame statistics.
    #[must_use]
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Requests a primary-scene change.
    ///
    /// Applied right after the current callback returns: the current primary
    /// and its sub-scenes end, the stage is cleared, and `scene` starts at
    /// the top of the next update. Requesting again before that start drops
    /// the earlier never-started request without callbacks.
    pub fn change_scene(&mut self, scene: impl Scene + 'static) {
        self.pending.push(PendingOp::ChangeScene(Box::new(scene)));
    }

    /// Attaches a sub-scene owned by the current primary scene.
    ///
    /// The sub-scene first updates on the next manager update.
    pub fn attach(&mut self, scene: impl Scene + 'static) -> SceneHandle {
        let handle = self.alloc_handle();
        self.pending.push(PendingOp::Attach {
            handle,
            scene: Box::new(scene),
        });
        handle
    }

    /// Attaches a scene outside the primary ownership graph; it survives
    /// primary-scene changes.
    pub fn attach_global(&mut self, scene: impl Scene + 'static) -> SceneHandle {
        let handle = self.alloc_handle();
        self.pending.push(PendingOp::AttachGlobal {
            handle,
            scene: Box::new(scene),
        });
        handle
    }

    /// Detaches a previously attached scene.
    ///
    /// Applied right after the current callback returns: an active scene
    /// receives `end`, a never-started one is removed without callbacks.
    /// Unknown or already-detached handles are ignored.
    pub fn detach(&mut self, handle: SceneHandle) {
        self.pending.push(PendingOp::Detach(handle));
    }

    /// Returns the diagnostics lines: renderer, canvas size, framerate,
    /// update and render cost.
    #[must_use]
    pub fn debug_lines(&self) -> Vec<String> {
        alloc::vec![
            format!("Renderer:  {}", self.renderer_name),
            format!("Canvas:  {}x{}", self.canvas.width(), self.canvas.height()),
            format!(
                "Framerate:  {:.1} / {}",
                self.stats.framerate(),
                self.stats.target_framerate()
            ),
            format!("Update time:  {:.1}ms", self.stats.update_time_ms()),
            format!("Render time:  {:.1}ms", self.stats.render_time_ms()),
        ]
    }

    fn alloc_handle(&mut self) -> SceneHandle {
        let handle = SceneHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Pending,
    Active,
}

struct Slot {
    handle: SceneHandle,
    scene: Box<dyn Scene>,
    state: SlotState,
}

#[derive(Clone, Copy)]
enum SceneList {
    Sub,
    Global,
}

/// Owns the primary, sub, and global scenes and drives their lifecycles.
pub struct SceneManager {
    context: SceneContext,
    primary: Option<Slot>,
    requested_primary: Option<Box<dyn Scene>>,
    sub_scenes: Vec<Slot>,
    global_scenes: Vec<Slot>,
    error_sink: Option<Box<dyn ErrorSink>>,
    changes: StageChanges,
}

impl fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneManager")
            .field("context", &self.context)
            .field("has_primary", &self.primary.is_some())
            .field("sub_scenes", &self.sub_scenes.len())
            .field("global_scenes", &self.global_scenes.len())
            .finish_non_exhaustive()
    }
}

impl SceneManager {
    /// Creates a manager with an empty stage and no scenes.
    ///
    /// Updates before the first [`change_scene`](Self::change_scene) are
    /// no-ops.
    #[must_use]
    pub fn new(canvas: Canvas, target_framerate: u32) -> Self {
        Self {
            context: SceneContext::new(canvas, target_framerate),
            primary: None,
            requested_primary: None,
            sub_scenes: Vec::new(),
            global_scenes: Vec::new(),
            error_sink: None,
            changes: StageChanges::default(),
        }
    }

    /// Names the renderer shown in [`SceneContext::debug_lines`].
    pub fn set_renderer_name(&mut self, name: impl Into<String>) {
        self.context.renderer_name = name.into();
    }

    /// Installs the sink receiving scene errors. Without one, errors are
    /// swallowed after the failing scene's callback returns.
    pub fn set_error_sink(&mut self, sink: impl ErrorSink + 'static) {
        self.error_sink = Some(Box::new(sink));
    }

    /// Returns the shared context.
    #[must_use]
    pub fn context(&self) -> &SceneContext {
        &self.context
    }

    /// Returns the shared context mutably (for hosts; scenes receive it in
    /// their callbacks).
    pub fn context_mut(&mut self) -> &mut SceneContext {
        &mut self.context
    }

    /// Returns the stage.
    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.context.stage
    }

    /// Returns the stage mutably.
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.context.stage
    }

    /// Replaces this frame's input snapshot. Hosts call this before
    /// [`update`](Self::update).
    pub fn set_input(&mut self, input: InputState) {
        self.context.input = input;
    }

    /// Returns the frame statistics mutably, so hosts can report render
    /// cost.
    pub fn stats_mut(&mut self) -> &mut FrameStats {
        &mut self.context.stats
    }

    /// Returns the stage changes produced by the most recent update.
    #[must_use]
    pub fn last_changes(&self) -> &StageChanges {
        &self.changes
    }

    /// Replaces the primary scene.
    ///
    /// The current primary (if started) and all its sub-scenes end
    /// synchronously, each exactly once, and the stage is cleared. The new
    /// primary starts lazily at the top of the next
    /// [`update`](Self::update), so a `start` implementation may itself
    /// request another change without recursing. Calling again before that
    /// update replaces the never-started request without callbacks.
    pub fn change_scene(&mut self, scene: impl Scene + 'static) {
        self.begin_scene_change(Box::new(scene));
        self.drain_pending();
    }

    /// Attaches a sub-scene owned by the current (or requested) primary.
    ///
    /// It starts and first updates on the next [`update`](Self::update).
    pub fn attach(&mut self, scene: impl Scene + 'static) -> SceneHandle {
        let handle = self.context.alloc_handle();
        self.sub_scenes.push(Slot {
            handle,
            scene: Box::new(scene),
            state: SlotState::Pending,
        });
        handle
    }

    /// Attaches a global scene; it survives primary-scene changes.
    pub fn attach_global(&mut self, scene: impl Scene + 'static) -> SceneHandle {
        let handle = self.context.alloc_handle();
        self.global_scenes.push(Slot {
            handle,
            scene: Box::new(scene),
            state: SlotState::Pending,
        });
        handle
    }

    /// Detaches a previously attached scene synchronously.
    ///
    /// An active scene receives `end`; a never-started one is removed
    /// without callbacks. Unknown handles are ignored.
    pub fn detach(&mut self, handle: SceneHandle) {
        self.detach_now(handle);
        self.drain_pending();
    }

    /// Runs one simulation step of `dt` seconds.
    ///
    /// Order: activate a requested primary (running its `start`), then
    /// update the primary, the sub-scenes in attach order, and the global
    /// scenes; finally evaluate both stage graphs. Completion is polled
    /// after each sub/global scene's update, triggering `end` and removal.
    pub fn update(&mut self, dt: f32) {
        self.context.stats.record_frame(dt);
        self.activate_requested();

        // Snapshot both passes before running anything, so scenes attached
        // during this call wait until the next one.
        let sub_pass: Vec<SceneHandle> = self.sub_scenes.iter().map(|s| s.handle).collect();
        let global_pass: Vec<SceneHandle> = self.global_scenes.iter().map(|s| s.handle).collect();

        // Primary pass.
        let primary_result = self
            .primary
            .as_mut()
            .map(|slot| slot.scene.update(&mut self.context, dt));
        if let Some(result) = primary_result {
            self.report(ScenePhase::Update, result);
            self.drain_pending();
        }

        for handle in sub_pass {
            self.run_slot(SceneList::Sub, handle, dt);
        }
        for handle in global_pass {
            self.run_slot(SceneList::Global, handle, dt);
        }

        self.context.stage.evaluate_into(&mut self.changes);
    }

    /// Resizes the canvas and forwards the new size to every started scene.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.context.canvas.resize(width, height);

        let mut results = Vec::new();
        if let Some(slot) = self.primary.as_mut() {
            results.push(slot.scene.resize(&mut self.context, width, height));
        }
        for i in 0..self.sub_scenes.len() {
            if self.sub_scenes[i].state == SlotState::Active {
                results.push(self.sub_scenes[i].scene.resize(&mut self.context, width, height));
            }
        }
        for i in 0..self.global_scenes.len() {
            if self.global_scenes[i].state == SlotState::Active {
                results.push(self.global_scenes[i].scene.resize(
                    &mut self.context,
                    width,
                    height,
                ));
            }
        }
        for result in results {
            self.report(ScenePhase::Resize, result);
        }
        self.drain_pending();
    }

    // -- Internal machinery --

    /// Starts (if pending), updates, and completion-checks one snapshotted
    /// scene. Missing handles mean the scene was detached or torn down
    /// earlier in the pass; they are skipped silently.
    fn run_slot(&mut self, list: SceneList, handle: SceneHandle, dt: f32) {
        // Start if pending. The borrows below go through the fields directly
        // so the context stays independently borrowable.
        let start_result = {
            let slots = match list {
                SceneList::Sub => &mut self.sub_scenes,
                SceneList::Global => &mut self.global_scenes,
            };
            let Some(i) = slots.iter().position(|s| s.handle == handle) else {
                return;
            };
            if slots[i].state == SlotState::Pending {
                slots[i].state = SlotState::Active;
                Some(slots[i].scene.start(&mut self.context))
            } else {
                None
            }
        };
        if let Some(result) = start_result {
            self.report(ScenePhase::Start, result);
            self.drain_pending();
        }

        // Update, unless the start above tore the scene down.
        let update_result = {
            let slots = match list {
                SceneList::Sub => &mut self.sub_scenes,
                SceneList::Global => &mut self.global_scenes,
            };
            let Some(i) = slots.iter().position(|s| s.handle == handle) else {
                return;
            };
            slots[i].scene.update(&mut self.context, dt)
        };
        self.report(ScenePhase::Update, update_result);
        self.drain_pending();

        // Completion check.
        let ended = {
            let slots = self.list_mut(list);
            match slots.iter().position(|s| s.handle == handle) {
                Some(i) if slots[i].scene.is_completed() => Some(slots.remove(i)),
                _ => None,
            }
        };
        if let Some(mut slot) = ended {
            let result = slot.scene.end(&mut self.context);
            self.report(ScenePhase::End, result);
            self.drain_pending();
        }
    }

    fn list_mut(&mut self, list: SceneList) -> &mut Vec<Slot> {
        match list {
            SceneList::Sub => &mut self.sub_scenes,
            SceneList::Global => &mut self.global_scenes,
        }
    }

    /// Activates a requested primary, looping because its `start` may
    /// request yet another change (the just-started scene is then abandoned:
    /// ended, never updated).
    fn activate_requested(&mut self) {
        while let Some(scene) = self.requested_primary.take() {
            let handle = self.context.alloc_handle();
            self.primary = Some(Slot {
                handle,
                scene,
                state: SlotState::Active,
            });
            let start_result = self
                .primary
                .as_mut()
                .map(|slot| slot.scene.start(&mut self.context));
            if let Some(result) = start_result {
                self.report(ScenePhase::Start, result);
            }
            self.drain_pending();
        }
    }

    /// Ends the current primary and every sub-scene, clears the stage, and
    /// registers the replacement as pending.
    fn begin_scene_change(&mut self, scene: Box<dyn Scene>) {
        if self.primary.is_some() || !self.sub_scenes.is_empty() {
            self.teardown_primary();
        }
        // An earlier never-started request is dropped without callbacks.
        self.requested_primary = Some(scene);
    }

    fn teardown_primary(&mut self) {
        if let Some(mut slot) = self.primary.take() {
            if slot.state == SlotState::Active {
                let result = slot.scene.end(&mut self.context);
                self.report(ScenePhase::End, result);
            }
        }
        let subs = core::mem::take(&mut self.sub_scenes);
        for mut slot in subs {
            if slot.state == SlotState::Active {
                let result = slot.scene.end(&mut self.context);
                self.report(ScenePhase::End, result);
            }
        }
        self.context.stage.clear();
    }

    fn detach_now(&mut self, handle: SceneHandle) {
        for list in [SceneList::Sub, SceneList::Global] {
            let removed = {
                let slots = self.list_mut(list);
                slots
                    .iter()
                    .position(|s| s.handle == handle)
                    .map(|i| slots.remove(i))
            };
            if let Some(mut slot) = removed {
                if slot.state == SlotState::Active {
                    let result = slot.scene.end(&mut self.context);
                    self.report(ScenePhase::End, result);
                }
                return;
            }
        }
    }

    /// Applies queued context operations until none remain (an applied
    /// operation may run callbacks that queue more).
    fn drain_pending(&mut self) {
        while !self.context.pending.is_empty() {
            let ops = core::mem::take(&mut self.context.pending);
            for op in ops {
                match op {
                    PendingOp::ChangeScene(scene) => self.begin_scene_change(scene),
                    PendingOp::Attach { handle, scene } => self.sub_scenes.push(Slot {
                        handle,
                        scene,
                        state: SlotState::Pending,
                    }),
                    PendingOp::AttachGlobal { handle, scene } => self.global_scenes.push(Slot {
                        handle,
                        scene,
                        state: SlotState::Pending,
                    }),
                    PendingOp::Detach(handle) => self.detach_now(handle),
                }
            }
        }
    }

    fn report(&mut self, phase: ScenePhase, result: SceneResult) {
        if let Err(error) = result {
            if let Some(sink) = self.error_sink.as_mut() {
                sink.scene_error(phase, &error);
            }
        }
    }
}
