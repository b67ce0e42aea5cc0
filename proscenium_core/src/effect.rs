// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Self-contained animated behaviors built on the [`Scene`] lifecycle.
//!
//! An [`Effect`] bundles per-frame handlers, click regions, completion
//! conditions, and stage nodes whose lifetime is tied to the effect. It is
//! attached as a sub-scene and removed by the manager when it reports
//! completion; linked nodes are detached from the stage at that point, so a
//! fire-and-forget animation cleans up after itself.
//!
//! Completion is the conjunction of all registered conditions. Every
//! condition is evaluated on every frame even after one has failed, so
//! stateful conditions such as [`stop_after`](Effect::stop_after) timers
//! keep advancing regardless of the order they were registered in.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect};

use crate::context::SceneContext;
use crate::scene::{Scene, SceneResult, Timer};
use crate::stage::{LocalTransform as _, NodeId, Stage};

type FrameHandler = Box<dyn FnMut(&mut SceneContext, f32)>;
type RegionSupplier = Box<dyn Fn(&Stage) -> Rect>;
type ClickAction = Box<dyn FnMut(&mut SceneContext, Point)>;
type Condition = Box<dyn FnMut(&SceneContext, f32) -> bool>;
type CompletionHandler = Box<dyn FnMut(&mut SceneContext)>;

struct ClickHandler {
    region: RegionSupplier,
    action: ClickAction,
}

/// A composable sub-scene: frame handlers, click handling, completion
/// conditions, and linked stage nodes.
///
/// Built with the `with_*` methods, then attached through
/// [`SceneContext::attach`](crate::context::SceneContext::attach).
#[derive(Default)]
pub struct Effect {
    frame_handlers: Vec<FrameHandler>,
    click_handlers: Vec<ClickHandler>,
    conditions: Vec<Condition>,
    completion_handlers: Vec<CompletionHandler>,
    linked_nodes: Vec<NodeId>,
    completed: bool,
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("frame_handlers", &self.frame_handlers.len())
            .field("click_handlers", &self.click_handlers.len())
            .field("conditions", &self.conditions.len())
            .field("linked_nodes", &self.linked_nodes)
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}

impl Effect {
    /// Creates an effect with no handlers; it runs until detached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler run on every frame with the step's `dt`.
    #[must_use]
    pub fn with_frame_handler(
        mut self,
        handler: impl FnMut(&mut SceneContext, f32) + 'static,
    ) -> Self {
        self.frame_handlers.push(Box::new(handler));
        self
    }

    /// Adds a click handler: when a pointer is released inside the region
    /// the supplier yields for the current stage, the action runs with the
    /// release position.
    ///
    /// Click handling is suspended while every linked node is dead or
    /// invisible; an effect with no linked nodes is always clickable.
    #[must_use]
    pub fn with_click_handler(
        mut self,
        region: impl Fn(&Stage) -> Rect + 'static,
        action: impl FnMut(&mut SceneContext, Point) + 'static,
    ) -> Self {
        self.click_handlers.push(ClickHandler {
            region: Box::new(region),
            action: Box::new(action),
        });
        self
    }

    /// Adds a completion condition. The effect completes on the first frame
    /// where every registered condition returns `true`.
    #[must_use]
    pub fn with_completion_condition(
        mut self,
        condition: impl FnMut(&SceneContext, f32) -> bool + 'static,
    ) -> Self {
        self.conditions.push(Box::new(condition));
        self
    }

    /// Completes the effect after `duration` seconds of simulation time.
    #[must_use]
    pub fn stop_after(self, duration: f32) -> Self {
        let mut timer = Timer::new(duration);
        self.with_completion_condition(move |_, dt| {
            timer.update(dt);
            timer.is_completed()
        })
    }

    /// Completes the effect once the predicate holds.
    #[must_use]
    pub fn stop_if(self, mut predicate: impl FnMut(&SceneContext) -> bool + 'static) -> Self {
        self.with_completion_condition(move |ctx, _| predicate(ctx))
    }

    /// Adds a handler fired once when the effect completes. Handlers run in
    /// registration order, after linked nodes are detached.
    ///
    /// Not fired when an uncompleted effect is torn down by a scene change
    /// or detach.
    #[must_use]
    pub fn on_complete(mut self, handler: impl FnMut(&mut SceneContext) + 'static) -> Self {
        self.completion_handlers.push(Box::new(handler));
        self
    }

    /// Ties a 2D stage node's lifetime to the effect: the node is detached
    /// from its parent when the effect completes or is torn down.
    #[must_use]
    pub fn with_linked_node(mut self, node: NodeId) -> Self {
        self.linked_nodes.push(node);
        self
    }

    /// Whether any linked node is alive and world-visible. Effects without
    /// linked nodes are always clickable.
    fn is_clickable(&self, stage: &Stage) -> bool {
        if self.linked_nodes.is_empty() {
            return true;
        }
        // Recomputed instead of cached: a visibility change made earlier in
        // this very update pass must gate clicks immediately.
        self.linked_nodes.iter().any(|&node| {
            stage.graph2d().is_alive(node)
                && stage.graph2d().recalculate_world_transform(node).is_visible()
        })
    }

    fn detach_linked(&mut self, ctx: &mut SceneContext) {
        for node in self.linked_nodes.drain(..) {
            if ctx.stage().graph2d().is_alive(node) {
                ctx.stage_mut().graph2d_mut().detach(node);
            }
        }
    }

    fn run_click_handlers(&mut self, ctx: &mut SceneContext) {
        if self.click_handlers.is_empty() || !self.is_clickable(ctx.stage()) {
            return;
        }
        let releases: Vec<Point> = ctx.input().release_points().collect();
        for point in releases {
            for handler in &mut self.click_handlers {
                if (handler.region)(ctx.stage()).contains(point) {
                    (handler.action)(ctx, point);
                }
            }
        }
    }

    fn complete_now(&mut self, ctx: &mut SceneContext) {
        self.completed = true;
        self.detach_linked(ctx);
        for handler in &mut self.completion_handlers {
            handler(ctx);
        }
    }
}

impl Scene for Effect {
    fn update(&mut self, ctx: &mut SceneContext, dt: f32) -> SceneResult {
        if self.completed {
            return Ok(());
        }

        for handler in &mut self.frame_handlers {
            handler(ctx, dt);
        }
        self.run_click_handlers(ctx);

        // No short-circuit: stateful conditions must see every frame.
        let mut done = !self.conditions.is_empty();
        for condition in &mut self.conditions {
            if !condition(ctx, dt) {
                done = false;
            }
        }
        if done {
            self.complete_now(ctx);
        }
        Ok(())
    }

    /// Torn down before completing: linked nodes are detached but
    /// completion handlers stay unfired.
    fn end(&mut self, ctx: &mut SceneContext) -> SceneResult {
        if !self.completed {
            self.detach_linked(ctx);
        }
        Ok(())
    }

    fn is_completed(&self) -> bool {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::{Cell, RefCell};

    use super::*;
    use crate::context::{Canvas, SceneManager};
    use crate::input::{InputState, Pointer};
    use crate::stage::{Node2d, Transform2d};

    struct IdleScene;
    impl Scene for IdleScene {
        fn update(&mut self, _ctx: &mut SceneContext, _dt: f32) -> SceneResult {
            Ok(())
        }
    }

    fn manager() -> SceneManager {
        let mut mgr = SceneManager::new(Canvas::new(800.0, 600.0), 60);
        mgr.change_scene(IdleScene);
        mgr.update(0.1);
        mgr
    }

    #[test]
    fn frame_handlers_run_every_update() {
        let ticks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ticks);
        let mut mgr = manager();
        let _ = mgr.attach(Effect::new().with_frame_handler(move |_, _| {
            counter.set(counter.get() + 1);
        }));

        mgr.update(0.1);
        mgr.update(0.1);
        assert_eq!(ticks.get(), 2);
    }

    #[test]
    fn completes_only_when_all_conditions_hold() {
        let flag = Rc::new(Cell::new(false));
        let probe = Rc::clone(&flag);
        let completions = Rc::new(Cell::new(0));
        let counter = Rc::clone(&completions);

        let mut mgr = manager();
        let effect = Effect::new()
            .stop_after(0.2)
            .stop_if(move |_| probe.get())
            .on_complete(move |_| counter.set(counter.get() + 1));
        let _ = mgr.attach(effect);

        // Timer passes at 0.2s, but the flag still blocks completion.
        mgr.update(0.1);
        mgr.update(0.1);
        mgr.update(0.1);
        assert_eq!(completions.get(), 0);

        flag.set(true);
        mgr.update(0.1);
        assert_eq!(completions.get(), 1);

        // Removed by the manager: no further frames.
        mgr.update(0.1);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn timer_condition_advances_even_while_another_blocks() {
        // stop_if registered FIRST; the timer after it must still count.
        let flag = Rc::new(Cell::new(false));
        let probe = Rc::clone(&flag);
        let completed = Rc::new(Cell::new(false));
        let done = Rc::clone(&completed);

        let mut mgr = manager();
        let effect = Effect::new()
            .stop_if(move |_| probe.get())
            .stop_after(0.3)
            .on_complete(move |_| done.set(true));
        let _ = mgr.attach(effect);

        mgr.update(0.1);
        mgr.update(0.1);
        mgr.update(0.1);
        flag.set(true);
        // Timer already at 0.3s; one more frame completes immediately.
        mgr.update(0.1);
        assert!(completed.get());
    }

    #[test]
    fn linked_nodes_are_detached_on_completion() {
        let mut mgr = manager();
        let root = mgr.stage_mut().graph2d_mut().create_node(Node2d::Container);
        let sprite = mgr.stage_mut().graph2d_mut().create_node(Node2d::Group);
        mgr.stage_mut().graph2d_mut().add_child(root, sprite);

        let _ = mgr.attach(Effect::new().stop_after(0.15).with_linked_node(sprite));

        mgr.update(0.1);
        assert_eq!(mgr.stage().graph2d().parent(sprite), Some(root));

        mgr.update(0.1);
        assert!(mgr.stage().graph2d().is_alive(sprite), "detached, not destroyed");
        assert_eq!(mgr.stage().graph2d().parent(sprite), None);
    }

    #[test]
    fn teardown_before_completion_skips_completion_handlers() {
        let completions = Rc::new(Cell::new(0));
        let counter = Rc::clone(&completions);
        let mut mgr = manager();
        let root = mgr.stage_mut().graph2d_mut().create_node(Node2d::Container);
        let node = mgr.stage_mut().graph2d_mut().create_node(Node2d::Group);
        mgr.stage_mut().graph2d_mut().add_child(root, node);

        let handle = mgr.attach(
            Effect::new()
                .stop_after(100.0)
                .with_linked_node(node)
                .on_complete(move |_| counter.set(counter.get() + 1)),
        );
        mgr.update(0.1);

        mgr.detach(handle);
        assert_eq!(completions.get(), 0, "ended, not completed");
        assert_eq!(mgr.stage().graph2d().parent(node), None);
    }

    #[test]
    fn completion_handlers_fire_in_registration_order() {
        let order: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let first = Rc::clone(&order);
        let second = Rc::clone(&order);

        let mut mgr = manager();
        let _ = mgr.attach(
            Effect::new()
                .stop_after(0.05)
                .on_complete(move |_| first.borrow_mut().push("first"))
                .on_complete(move |_| second.borrow_mut().push("second")),
        );
        mgr.update(0.1);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn click_handler_fires_inside_region_only() {
        let clicks: Rc<RefCell<Vec<Point>>> = Rc::default();
        let sink = Rc::clone(&clicks);

        let mut mgr = manager();
        let _ = mgr.attach(Effect::new().with_click_handler(
            |_| Rect::new(0.0, 0.0, 100.0, 100.0),
            move |_, point| sink.borrow_mut().push(point),
        ));
        mgr.update(0.1);

        let mut input = InputState::new();
        input.set_pointers(vec![
            Pointer {
                position: Point::new(50.0, 50.0),
                released: true,
            },
            Pointer {
                position: Point::new(500.0, 50.0),
                released: true,
            },
            Pointer {
                position: Point::new(60.0, 60.0),
                released: false,
            },
        ]);
        mgr.set_input(input);
        mgr.update(0.1);

        assert_eq!(*clicks.borrow(), vec![Point::new(50.0, 50.0)]);
    }

    #[test]
    fn clicks_are_gated_on_linked_node_visibility() {
        let clicks = Rc::new(Cell::new(0));
        let sink = Rc::clone(&clicks);

        let mut mgr = manager();
        let node = mgr.stage_mut().graph2d_mut().create_node(Node2d::Group);
        mgr.stage_mut().graph2d_mut().update_transform(node, |t| {
            t.visible = false;
        });
        mgr.update(0.1);

        let _ = mgr.attach(
            Effect::new()
                .with_linked_node(node)
                .with_click_handler(
                    |_| Rect::new(0.0, 0.0, 100.0, 100.0),
                    move |_, _| sink.set(sink.get() + 1),
                ),
        );
        mgr.update(0.1);

        let mut input = InputState::new();
        input.push_pointer(Pointer {
            position: Point::new(10.0, 10.0),
            released: true,
        });
        mgr.set_input(input.clone());
        mgr.update(0.1);
        assert_eq!(clicks.get(), 0, "invisible linked node suspends clicks");

        mgr.stage_mut().graph2d_mut().update_transform(node, |t| {
            t.visible = true;
        });
        mgr.set_input(input);
        mgr.update(0.1);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn region_supplier_sees_current_node_positions() {
        let clicks = Rc::new(Cell::new(0));
        let sink = Rc::clone(&clicks);

        let mut mgr = manager();
        let node = mgr.stage_mut().graph2d_mut().create_node(Node2d::Group);
        mgr.stage_mut()
            .graph2d_mut()
            .set_transform(node, Transform2d::from_position(200.0, 200.0));
        mgr.update(0.1);

        let _ = mgr.attach(Effect::new().with_click_handler(
            move |stage| {
                let center = stage.graph2d().world_transform(node).position;
                Rect::new(center.x - 10.0, center.y - 10.0, center.x + 10.0, center.y + 10.0)
            },
            move |_, _| sink.set(sink.get() + 1),
        ));
        mgr.update(0.1);

        let mut input = InputState::new();
        input.push_pointer(Pointer {
            position: Point::new(205.0, 195.0),
            released: true,
        });
        mgr.set_input(input);
        mgr.update(0.1);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn effect_without_conditions_runs_until_detached() {
        let ticks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ticks);
        let mut mgr = manager();
        let handle = mgr.attach(Effect::new().with_frame_handler(move |_, _| {
            counter.set(counter.get() + 1);
        }));

        for _ in 0..5 {
            mgr.update(0.1);
        }
        mgr.detach(handle);
        mgr.update(0.1);
        assert_eq!(ticks.get(), 5);
    }
}
