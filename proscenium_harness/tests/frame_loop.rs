// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end frame loop tests: clock, synchronizer, and scene manager
//! wired together by the headless driver.

use std::cell::Cell;
use std::rc::Rc;

use proscenium_core::context::{Canvas, SceneContext, SceneManager};
use proscenium_core::effect::Effect;
use proscenium_core::scene::{Scene, SceneResult};
use proscenium_core::stage::Node2d;
use proscenium_core::time::{FixedStepClock, ScriptedClock};
use proscenium_harness::HeadlessDriver;

/// Counts updates and accumulates delivered simulation time.
struct CountingScene {
    updates: Rc<Cell<u32>>,
    elapsed: Rc<Cell<f32>>,
}

impl Scene for CountingScene {
    fn update(&mut self, _ctx: &mut SceneContext, dt: f32) -> SceneResult {
        self.updates.set(self.updates.get() + 1);
        self.elapsed.set(self.elapsed.get() + dt);
        Ok(())
    }
}

fn counting_driver<C: proscenium_core::time::TickSource>(
    clock: C,
    target_framerate: u32,
) -> (HeadlessDriver<C>, Rc<Cell<u32>>, Rc<Cell<f32>>) {
    let updates = Rc::new(Cell::new(0));
    let elapsed = Rc::new(Cell::new(0.0));
    let mut driver = HeadlessDriver::new(clock, Canvas::new(800.0, 600.0), target_framerate);
    driver.manager_mut().change_scene(CountingScene {
        updates: Rc::clone(&updates),
        elapsed: Rc::clone(&elapsed),
    });
    (driver, updates, elapsed)
}

#[test]
fn delivered_time_tracks_wall_time() {
    // 16ms host refresh against a 16.67ms step, for ten simulated seconds.
    let (mut driver, updates, elapsed) = counting_driver(FixedStepClock::new(0, 16), 60);
    let steps = driver.run_frames(600);

    assert_eq!(updates.get(), steps, "one manager update per delivered step");

    let wall = (599 * 16) as f64 / 1000.0;
    let step = 1.0 / 60.0;
    let delivered = f64::from(elapsed.get());
    assert!(
        (delivered - wall).abs() <= 2.0 * step,
        "delivered {delivered}s vs wall {wall}s"
    );
}

#[test]
fn slow_host_receives_catch_up_steps() {
    // 30 fps target refreshed every 50ms: some calls deliver two steps.
    let (mut driver, updates, _) = counting_driver(FixedStepClock::new(0, 50), 30);
    let steps = driver.run_frames(20);

    assert_eq!(updates.get(), steps);
    // 19 intervals of 50ms is 950ms of wall time, plus the leading marker.
    let expected = 950.0 / (1000.0 / 30.0);
    assert!(
        (f64::from(steps) - 1.0 - expected).abs() <= 2.0,
        "steps {steps} vs expected {expected}"
    );
}

#[test]
fn stalled_clock_is_clamped_per_opportunity() {
    let clock = ScriptedClock::new(vec![0, 33, 66, 5066, 5100]);
    let (mut driver, _, _) = counting_driver(clock, 30);

    let counts: Vec<u32> = (0..5).map(|_| driver.step()).collect();
    assert_eq!(counts, vec![1, 1, 1, 2, 1], "five-second stall replays as two steps");
}

#[test]
fn scene_change_mid_run_switches_update_target() {
    let (mut driver, first_updates, _) = counting_driver(FixedStepClock::new(0, 100), 10);
    let _ = driver.run_frames(3);
    let first_count = first_updates.get();
    assert!(first_count >= 3);

    let second_updates = Rc::new(Cell::new(0));
    let second_elapsed = Rc::new(Cell::new(0.0));
    driver.manager_mut().change_scene(CountingScene {
        updates: Rc::clone(&second_updates),
        elapsed: second_elapsed,
    });
    let _ = driver.run_frames(3);

    assert_eq!(first_updates.get(), first_count, "replaced scene stops updating");
    assert!(second_updates.get() >= 3);
}

#[test]
fn effect_completes_from_accumulated_simulation_time() {
    // 10 fps target on a matching 100ms clock: one 0.1s step per frame.
    let mut driver = HeadlessDriver::new(FixedStepClock::new(0, 100), Canvas::new(640.0, 480.0), 10);

    struct HostScene;
    impl Scene for HostScene {
        fn update(&mut self, _ctx: &mut SceneContext, _dt: f32) -> SceneResult {
            Ok(())
        }
    }
    driver.manager_mut().change_scene(HostScene);
    let _ = driver.step();

    let node = driver
        .manager_mut()
        .stage_mut()
        .graph2d_mut()
        .create_node(Node2d::Container);
    let completions = Rc::new(Cell::new(0));
    let counter = Rc::clone(&completions);
    let _ = driver.manager_mut().attach(
        Effect::new()
            .stop_after(0.35)
            .with_linked_node(node)
            .on_complete(move |_| counter.set(counter.get() + 1)),
    );

    let _ = driver.run_frames(3);
    assert_eq!(completions.get(), 0, "0.3s accumulated, timer still short");

    let _ = driver.run_frames(1);
    assert_eq!(completions.get(), 1);

    let _ = driver.run_frames(5);
    assert_eq!(completions.get(), 1, "completed effect was removed");
}

#[test]
fn driver_manager_is_reachable_for_inspection() {
    let driver = HeadlessDriver::new(FixedStepClock::new(0, 16), Canvas::new(800.0, 600.0), 60);
    let manager: &SceneManager = driver.manager();
    assert_eq!(manager.context().canvas().width(), 800.0);
    assert_eq!(driver.sync().target_framerate(), 60);
}
