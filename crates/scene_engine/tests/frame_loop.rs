//! Frame loop integration tests
//!
//! Fixed-step catch-up, day-cycle wrap and update ordering through a whole
//! scene.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use approx::assert_relative_eq;
use scene_engine::ecs::{Component, ComponentBase, ComponentKind};
use scene_engine::prelude::*;

type Log = Rc<RefCell<Vec<(String, &'static str)>>>;

/// Records every hook call into a shared log
struct Recorder {
    base: ComponentBase,
    label: String,
    log: Log,
}

impl Recorder {
    fn boxed(label: &str, log: &Log) -> Box<dyn Component> {
        Box::new(Self {
            base: ComponentBase::default(),
            label: label.to_string(),
            log: Rc::clone(log),
        })
    }

    fn record(&self, hook: &'static str) {
        self.log.borrow_mut().push((self.label.clone(), hook));
    }
}

impl Component for Recorder {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Fog
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn update(&mut self, _scene: &mut Scene) {
        self.record("update");
    }

    fn fixed_update(&mut self, _scene: &mut Scene) {
        self.record("fixed");
    }
}

fn count(log: &Log, hook: &str) -> usize {
    log.borrow().iter().filter(|(_, h)| *h == hook).count()
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn test_catch_up_runs_whole_steps_and_keeps_remainder() {
    let config = EngineConfig::default().with_time(TimeConfig::default().with_fixed_step_ms(20));
    let mut scene = Scene::with_config("catch-up", &config);
    let log: Log = Rc::default();
    let entity = scene.create_entity("recorder");
    scene.attach(entity, Recorder::boxed("recorder", &log)).unwrap();

    scene.update(ms(0));
    assert_eq!(count(&log, "fixed"), 0);

    scene.update(ms(65));
    assert_eq!(count(&log, "fixed"), 3);
    assert_eq!(scene.time().physics_remainder(), ms(5));

    // 5ms carried + 15ms elapsed make one more step.
    scene.update(ms(80));
    assert_eq!(count(&log, "fixed"), 4);
    assert_eq!(scene.time().physics_remainder(), ms(0));
}

#[test]
fn test_catch_up_is_capped_per_frame() {
    let time = TimeConfig::default()
        .with_fixed_step_ms(20)
        .with_max_fixed_steps_per_frame(8);
    let mut scene = Scene::with_config("stall", &EngineConfig::default().with_time(time));
    let log: Log = Rc::default();
    let entity = scene.create_entity("recorder");
    scene.attach(entity, Recorder::boxed("recorder", &log)).unwrap();

    scene.update(ms(0));
    scene.update(ms(1_010));
    assert_eq!(count(&log, "fixed"), 8);
    assert_eq!(scene.time().dropped_fixed_steps(), 42);
    assert_eq!(scene.time().physics_remainder(), ms(10));

    scene.update(ms(1_020));
    assert_eq!(count(&log, "fixed"), 9);
}

#[test]
fn test_day_time_wraps() {
    let time = TimeConfig::default().with_day_duration(10.0);
    let mut scene = Scene::with_config("day", &EngineConfig::default().with_time(time));
    scene.time_mut().set_day_time(0.95);

    scene.update(ms(0));
    assert_relative_eq!(scene.time().delta_time(), 0.0);
    scene.update(ms(1_000));
    assert_relative_eq!(scene.time().day_time(), 0.05, epsilon = 1e-5);
    assert_relative_eq!(scene.time().delta_time(), 1.0, epsilon = 1e-6);
}

#[test]
fn test_camera_entity_updates_first_and_once() {
    let mut scene = Scene::new("order");
    let log: Log = Rc::default();

    let first = scene.create_entity("first");
    scene.attach(first, Recorder::boxed("first", &log)).unwrap();
    let parent = scene.create_entity("parent");
    let child = scene.create_entity("child");
    scene.attach(child, Recorder::boxed("child", &log)).unwrap();
    scene.add_child(parent, child).unwrap();
    let camera = scene.create_entity("camera");
    scene.add_component::<Camera>(camera).unwrap();
    scene.attach(camera, Recorder::boxed("camera", &log)).unwrap();

    scene.update(ms(0));
    let updates: Vec<String> = log
        .borrow()
        .iter()
        .filter(|(_, hook)| *hook == "update")
        .map(|(label, _)| label.clone())
        .collect();
    assert_eq!(updates, ["camera", "first", "child"]);
}

#[test]
fn test_inactive_entities_are_skipped() {
    let mut scene = Scene::new("inactive");
    let log: Log = Rc::default();
    let entity = scene.create_entity("sleeper");
    scene.attach(entity, Recorder::boxed("sleeper", &log)).unwrap();
    scene.set_entity_active(entity, false).unwrap();

    scene.update(ms(0));
    scene.update(ms(100));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_rigid_body_falls_under_gravity() {
    let mut scene = Scene::new("gravity");
    let body = scene.create_entity("body");
    scene.add_component::<RigidBody>(body).unwrap().gravity = true;

    scene.update(ms(0));
    scene.update(ms(200));
    let position = scene.world_position(body).unwrap();
    assert!(position.y < 0.0);
    assert_relative_eq!(position.x, 0.0);
}
