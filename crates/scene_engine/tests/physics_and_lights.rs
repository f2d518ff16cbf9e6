//! Collision resolution and light registration through a whole scene

use std::time::Duration;

use approx::assert_relative_eq;
use scene_engine::prelude::*;
use scene_engine::render::lighting::MAX_LIGHTS;

const EPSILON: f32 = 1e-4;

fn sphere(scene: &mut Scene, name: &str, position: Vec3) -> EntityId {
    let entity = scene.create_entity_with_transform(name, TransformNode::from_position(position));
    scene.add_component::<SphereCollider>(entity).unwrap().radius = 1.0;
    entity
}

fn step_once(scene: &mut Scene) {
    scene.update(Duration::ZERO);
    scene.update(Duration::from_millis(20));
}

#[test]
fn test_overlapping_spheres_end_up_touching() {
    let mut scene = Scene::new("collision");
    let a = sphere(&mut scene, "a", Vec3::zeros());
    let b = sphere(&mut scene, "b", Vec3::new(1.5, 0.0, 0.0));
    assert_eq!(scene.colliders().len(), 2);

    step_once(&mut scene);

    let pa = scene.world_position(a).unwrap();
    let pb = scene.world_position(b).unwrap();
    assert_relative_eq!((pb - pa).magnitude(), 2.0, epsilon = EPSILON);
    assert_relative_eq!(pa, Vec3::new(-0.25, 0.0, 0.0), epsilon = EPSILON);
    assert_relative_eq!(pb, Vec3::new(1.75, 0.0, 0.0), epsilon = EPSILON);
}

#[test]
fn test_separated_spheres_do_not_move() {
    let mut scene = Scene::new("apart");
    let a = sphere(&mut scene, "a", Vec3::zeros());
    let b = sphere(&mut scene, "b", Vec3::new(0.0, 3.0, 0.0));

    step_once(&mut scene);

    assert_relative_eq!(scene.world_position(a).unwrap(), Vec3::zeros());
    assert_relative_eq!(scene.world_position(b).unwrap(), Vec3::new(0.0, 3.0, 0.0));
}

#[test]
fn test_disabled_collider_is_ignored() {
    let mut scene = Scene::new("disabled");
    let a = sphere(&mut scene, "a", Vec3::zeros());
    let b = sphere(&mut scene, "b", Vec3::new(1.0, 0.0, 0.0));
    scene.component_mut::<SphereCollider>(b).unwrap().base_mut().set_enabled(false);

    step_once(&mut scene);

    assert_relative_eq!(scene.world_position(a).unwrap(), Vec3::zeros());
    assert_relative_eq!(scene.world_position(b).unwrap(), Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_collider_deregisters_on_delete() {
    let mut scene = Scene::new("registry");
    let a = sphere(&mut scene, "a", Vec3::zeros());
    sphere(&mut scene, "b", Vec3::new(5.0, 0.0, 0.0));

    assert!(scene.delete_entity(a));
    assert_eq!(scene.colliders().len(), 1);
}

#[test]
fn test_lights_beyond_capacity_are_dropped() {
    let mut scene = Scene::new("lights");
    for i in 0..MAX_LIGHTS + 5 {
        let entity = scene.create_entity(format!("light {}", i));
        scene.add_component::<PointLight>(entity).unwrap();
    }

    assert_eq!(scene.lights().len(), MAX_LIGHTS);
    assert_eq!(scene.lights().dropped(), 5);
    assert_eq!(scene.pack_lights().count() as usize, MAX_LIGHTS);
}

#[test]
fn test_packed_lights_follow_registration_and_state() {
    let mut scene = Scene::new("packing");
    let warm = scene.create_entity_with_transform("warm", TransformNode::from_position(Vec3::new(1.0, 2.0, 3.0)));
    let light = scene.add_component::<PointLight>(warm).unwrap();
    light.color = Vec3::new(1.0, 0.5, 0.25);
    light.intensity = 2.0;
    let cold = scene.create_entity("cold");
    scene.add_component::<PointLight>(cold).unwrap();

    {
        let buffer = scene.pack_lights();
        assert_eq!(buffer.count(), 2);
        let record = buffer.records()[0];
        assert_eq!(record.header[0], 0.0);
        assert_relative_eq!(record.header[1], 2.0);
        assert_eq!(record.position, [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(record.color, [1.0, 0.5, 0.25, 0.0]);
    }

    scene.set_entity_active(warm, false).unwrap();
    assert_eq!(scene.pack_lights().count(), 1);

    scene.delete_entity(cold);
    assert_eq!(scene.pack_lights().count(), 0);
    assert_eq!(scene.lights().len(), 1);
}

#[test]
fn test_render_uploads_packed_lights() {
    let mut scene = Scene::new("upload");
    let entity = scene.create_entity("light");
    scene.add_component::<PointLight>(entity).unwrap();

    let mut recorder = CommandRecorder::new();
    scene.render(&mut recorder);
    assert_eq!(recorder.lights().map(LightBuffer::count), Some(1));
}

#[test]
fn test_deleting_an_entity_deregisters_its_collider_and_light() {
    let mut scene = Scene::new("cleanup");
    let keep = sphere(&mut scene, "keep", Vec3::new(5.0, 0.0, 0.0));
    let lamp = sphere(&mut scene, "lamp", Vec3::zeros());
    scene.add_component::<PointLight>(lamp).unwrap();

    let record = scene.entity(lamp).unwrap();
    let collider = (record.get::<SphereCollider>().unwrap() as &dyn Component).handle();
    let light = (record.get::<PointLight>().unwrap() as &dyn Component).handle();
    assert!(scene.colliders().contains(&collider));
    assert!(scene.lights().handles().contains(&light));

    assert!(scene.delete_entity(lamp));
    assert!(!scene.colliders().contains(&collider));
    assert!(!scene.lights().handles().contains(&light));
    assert_eq!(scene.colliders().len(), 1);
    assert_eq!(scene.lights().len(), 0);
    assert_eq!(scene.root_entities(), [keep]);
}
