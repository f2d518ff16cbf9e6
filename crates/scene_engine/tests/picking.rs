//! Ray picking against loaded renderer bounds

use std::time::Duration;

use approx::assert_relative_eq;
use scene_engine::prelude::*;

fn unit_box() -> BoundingBox {
    BoundingBox::new(Vec3::repeat(-0.5), Vec3::repeat(0.5))
}

fn scene_with_box() -> (Scene, EntityId) {
    let mut assets = InMemoryAssets::with_builtin_shaders();
    assets.insert_box_model("box.obj", unit_box());
    let mut scene = Scene::new("picking");
    scene.set_asset_source(Box::new(assets));
    let entity = scene.load_entity("box", "box.obj").unwrap();
    scene.update(Duration::ZERO);
    (scene, entity)
}

#[test]
fn test_ray_hits_box_front_face() {
    let (scene, entity) = scene_with_box();
    let hit = scene
        .ray_cast(&Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::z()))
        .unwrap();
    assert_eq!(hit.entity, entity);
    assert_relative_eq!(hit.distance, 4.5, epsilon = 1e-5);
}

#[test]
fn test_offset_ray_misses() {
    let (scene, _) = scene_with_box();
    assert!(scene.ray_cast(&Ray::new(Vec3::new(10.0, 0.0, -5.0), Vec3::z())).is_none());
}

#[test]
fn test_nothing_is_picked_before_the_model_arrives() {
    let mut assets = InMemoryAssets::with_builtin_shaders();
    assets.insert_box_model("box.obj", unit_box());
    let mut scene = Scene::new("pending");
    scene.set_asset_source(Box::new(assets));
    scene.load_entity("box", "box.obj").unwrap();

    let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::z());
    assert!(scene.ray_cast(&ray).is_none());
    scene.update(Duration::ZERO);
    assert!(scene.ray_cast(&ray).is_some());
}

#[test]
fn test_children_are_picked_in_world_space() {
    let (mut scene, entity) = scene_with_box();
    let parent = scene.create_entity_with_transform("parent", TransformNode::from_position(Vec3::new(10.0, 0.0, 0.0)));
    scene.add_child(parent, entity).unwrap();

    assert!(scene.ray_cast(&Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::z())).is_none());
    let hit = scene
        .ray_cast(&Ray::new(Vec3::new(10.0, 0.0, -5.0), Vec3::z()))
        .unwrap();
    assert_eq!(hit.entity, entity);
    assert_relative_eq!(hit.distance, 4.5, epsilon = 1e-5);
}

#[test]
fn test_closest_entity_wins() {
    let (mut scene, near) = scene_with_box();
    let far = scene.create_entity_with_transform("far", TransformNode::from_position(Vec3::new(0.0, 0.0, 3.0)));
    scene.add_component::<SpriteRenderer>(far).unwrap();

    let hit = scene
        .ray_cast(&Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::z()))
        .unwrap();
    assert_eq!(hit.entity, near);

    scene.delete_entity(near);
    let hit = scene
        .ray_cast(&Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::z()))
        .unwrap();
    assert_eq!(hit.entity, far);
    assert_relative_eq!(hit.distance, 8.0, epsilon = 1e-5);
}

#[test]
fn test_zero_scale_entity_is_not_hit() {
    let (mut scene, entity) = scene_with_box();
    scene.transform_mut(entity).unwrap().set_scale(Vec3::zeros());

    assert!(scene.ray_cast(&Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::z())).is_none());
    assert!(scene.ray_cast(&Ray::new(Vec3::new(0.0, 0.0, 0.0), Vec3::z())).is_none());
}

#[test]
fn test_mesh_without_shader_is_not_picked() {
    let mut assets = InMemoryAssets::new();
    assets.insert_box_model("box.obj", unit_box());
    let mut scene = Scene::new("no shader");
    scene.set_asset_source(Box::new(assets));
    let entity = scene.load_entity("box", "box.obj").unwrap();
    scene.update(Duration::ZERO);

    let renderer = scene.component::<MeshRenderer>(entity).unwrap();
    assert_eq!(renderer.parts().len(), 1);
    assert!(!renderer.is_ready());
    assert!(scene.ray_cast(&Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::z())).is_none());
}

#[test]
fn test_removing_the_renderer_falls_back_to_the_next_one() {
    let (mut scene, entity) = scene_with_box();
    scene.add_component::<SpriteRenderer>(entity).unwrap();
    assert_eq!(scene.entity(entity).unwrap().renderer_kind(), Some(ComponentKind::MeshRenderer));

    scene.remove_component(entity, ComponentKind::MeshRenderer).unwrap();
    assert_eq!(scene.entity(entity).unwrap().renderer_kind(), Some(ComponentKind::SpriteRenderer));

    // The sprite quad in the z = 0 plane is picked in the mesh's place.
    let hit = scene
        .ray_cast(&Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::z()))
        .unwrap();
    assert_eq!(hit.entity, entity);
    assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-5);
}
