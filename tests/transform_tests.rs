//! Transform Tests
//!
//! Tests for:
//! - Local matrix composition (T * R * S) and dirty tracking
//! - Animation overlays folded over the base values
//! - World matrices through the shape hierarchy
//! - Camera matrices bound to the scene range
//! - Light switching and edits

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3, Vec4};

use tessera::config::{CameraConfig, SceneConfig};
use tessera::resources::primitives::{CubeOptions, create_cube};
use tessera::scene::{Camera, Light, Overlay, ProjectionType, Scene, SceneEvent, Transform};

const EPSILON: f32 = 1e-5;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn scene() -> Scene {
    Scene::new(&SceneConfig::new("xf", 8.0, 6.0, 20.0)).unwrap()
}

// ============================================================================
// Local matrix
// ============================================================================

#[test]
fn scale_then_rotate_then_translate() {
    let mut t = Transform::new();
    t.translate(Vec3::new(0.0, 0.0, 5.0))
        .rotate_z(FRAC_PI_2)
        .scale(Vec3::new(2.0, 1.0, 1.0));

    // x is doubled, turned onto y, then pushed along z
    let p = t.local_matrix().transform_point3(Vec3::X);
    assert!(approx_vec3(p, Vec3::new(0.0, 2.0, 5.0)));
}

#[test]
fn operations_accumulate() {
    let mut t = Transform::new();
    t.translate(Vec3::X).translate(Vec3::X);
    t.scale(Vec3::splat(2.0)).scale(Vec3::splat(3.0));
    t.rotate_y(FRAC_PI_2).rotate_y(FRAC_PI_2);

    assert_eq!(t.position, Vec3::new(2.0, 0.0, 0.0));
    assert_eq!(t.scale, Vec3::splat(6.0));
    let turned = t.rotation * Vec3::X;
    assert!(approx_vec3(turned, -Vec3::X));
}

#[test]
fn zero_axis_rotation_is_ignored() {
    let mut t = Transform::new();
    t.rotate(1.0, Vec3::ZERO);
    assert_eq!(t.rotation, Quat::IDENTITY);
    assert!(t.is_identity());
}

#[test]
fn clear_keeps_overlays() {
    let mut t = Transform::new();
    t.translate(Vec3::ONE).set_overlay(
        "clip",
        Overlay {
            translation: Vec3::Y,
            ..Overlay::IDENTITY
        },
    );
    t.clear();
    assert_eq!(t.position, Vec3::ZERO);
    assert_eq!(t.overlay_count(), 1);
    assert!(approx_vec3(t.local_matrix().translation.into(), Vec3::Y));
}

#[test]
fn update_reports_only_real_changes() {
    let mut t = Transform::new();
    assert!(!t.update_local_matrix());
    t.translate(Vec3::Z);
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());
    assert_eq!(*t.cached_local_matrix(), t.local_matrix());

    t.reset_overlay("nothing");
    assert!(!t.update_local_matrix());
    t.mark_dirty();
    assert!(t.update_local_matrix());
}

// ============================================================================
// Overlays
// ============================================================================

#[test]
fn overlays_fold_component_wise() {
    let mut t = Transform::new();
    t.translate(Vec3::X).scale(Vec3::splat(2.0));
    t.set_overlay(
        "a",
        Overlay {
            translation: Vec3::Y,
            scale: Vec3::splat(1.5),
            ..Overlay::IDENTITY
        },
    );
    t.set_overlay(
        "b",
        Overlay {
            translation: Vec3::Z,
            ..Overlay::IDENTITY
        },
    );

    let (translation, _, scale) = t.effective();
    assert_eq!(translation, Vec3::new(1.0, 1.0, 1.0));
    assert_eq!(scale, Vec3::splat(3.0));

    // replacing an overlay does not stack it
    t.set_overlay(
        "b",
        Overlay {
            translation: Vec3::Z * 2.0,
            ..Overlay::IDENTITY
        },
    );
    assert_eq!(t.effective().0, Vec3::new(1.0, 1.0, 2.0));

    t.clear_overlays();
    assert_eq!(t.effective().0, Vec3::X);
    assert!(t.update_local_matrix());
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn grandchild_inherits_every_ancestor() {
    let mut scene = scene();
    let cube = || create_cube(&CubeOptions::default()).unwrap();
    let root = scene.add_shape(cube().with_position([1.0, 0.0, 0.0]));
    let child = scene.add_child(root, cube()).unwrap();
    let grandchild = scene.add_child(child, cube().with_position([0.0, 0.0, 1.0])).unwrap();

    scene.transform_mut(child).unwrap().rotate_z(FRAC_PI_2).translate(Vec3::Y);
    scene.transform_mut(root).unwrap().scale(Vec3::splat(2.0));

    // grandchild origin: (0,0,1) -> child rotates about z and moves up y by 1
    // -> root doubles and shifts x by 1
    let world = scene.model_matrix(grandchild).unwrap();
    let origin = world.transform_point3(Vec3::ZERO);
    assert!(approx_vec3(origin, Vec3::new(1.0, 2.0, 2.0)));

    let removed = scene.remove_shape(child).unwrap();
    assert_eq!(removed, vec![child, grandchild]);
    assert!(scene.shape(root).unwrap().children().is_empty());
    assert!(scene.model_matrix(grandchild).is_none());
}

#[test]
fn moving_a_parent_reports_only_the_parent() {
    let mut scene = scene();
    let cube = || create_cube(&CubeOptions::default()).unwrap();
    let root = scene.add_shape(cube());
    let child = scene.add_child(root, cube()).unwrap();
    let events = scene.event_channel();

    scene.transform_mut(root).unwrap().translate(Vec3::X);
    assert_eq!(events.try_iter().collect::<Vec<_>>(), vec![SceneEvent::TransformChanged(root)]);
    assert!(approx_vec3(scene.model_matrix(child).unwrap().w_axis.truncate(), Vec3::X));
}

#[test]
fn transform_edits_go_through_the_scene() {
    let mut scene = scene();
    let key = scene.add_shape(create_cube(&CubeOptions::default()).unwrap());
    let events = scene.event_channel();

    // geometry edits leave the transform alone
    scene.shape_mut(key).unwrap().set_color([0.0, 1.0, 0.0, 1.0]);
    assert_eq!(scene.shape(key).unwrap().transform().position, Vec3::ZERO);
    assert_eq!(events.try_iter().collect::<Vec<_>>(), vec![SceneEvent::GeometryChanged(key)]);

    scene.transform_mut(key).unwrap().translate(Vec3::Y);
    assert_eq!(scene.shape(key).unwrap().transform().position, Vec3::Y);
    assert_eq!(events.try_iter().collect::<Vec<_>>(), vec![SceneEvent::TransformChanged(key)]);
    assert!(approx_vec3(scene.model_matrix(key).unwrap().w_axis.truncate(), Vec3::Y));
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn orthographic_camera_spans_the_scene() {
    let mut scene = scene();
    scene.add_camera(Camera::new("main"));
    let camera = scene.camera().unwrap();
    assert_eq!(camera.projection, ProjectionType::Orthographic);
    assert!((camera.far_plane() - 17.0).abs() < EPSILON);

    // the top-right corner of the near extent lands on the clip corner
    let clip = camera.matrix() * Vec4::new(4.0, 3.0, 0.0, 1.0);
    assert!((clip.x / clip.w - 1.0).abs() < EPSILON);
    assert!((clip.y / clip.w - 1.0).abs() < EPSILON);
}

#[test]
fn camera_edits_refresh_matrices_on_release() {
    let mut scene = scene();
    let key = scene.add_camera(Camera::perspective("eye", 45.0));
    let before = scene.camera().unwrap().matrix();
    let version = scene.camera().unwrap().version();
    let events = scene.event_channel();

    scene.camera_mut(key).unwrap().position = Vec3::new(0.0, 5.0, 10.0);

    let camera = scene.camera().unwrap();
    assert_ne!(camera.matrix(), before);
    assert!(camera.version() > version);
    assert!((camera.aspect_ratio() - 8.0 / 6.0).abs() < EPSILON);
    assert_eq!(events.try_iter().collect::<Vec<_>>(), vec![SceneEvent::CameraChanged(key)]);
}

#[test]
fn switching_cameras_by_id() {
    let mut scene = scene();
    scene.add_camera(Camera::new("first"));
    let second = scene.add_camera(Camera::from_config(&CameraConfig {
        id: "second".into(),
        position: [0.0, 10.0, 0.0],
        up: [0.0, 0.0, -1.0],
        ..CameraConfig::default()
    }));
    assert_eq!(scene.camera().unwrap().id, "first");
    assert_eq!(scene.use_camera("second").unwrap(), second);
    assert_eq!(scene.camera().unwrap().id, "second");
    assert!(scene.use_camera("missing").is_err());
    assert_ne!(scene.camera().unwrap().view_matrix(), Mat4::IDENTITY);
}

// ============================================================================
// Light
// ============================================================================

#[test]
fn light_edits_bump_the_version_and_notify() {
    let mut scene = scene();
    let sun = scene.add_light(Light::new("sun"));
    scene.add_light(Light::new("lamp"));
    assert_eq!(scene.light().unwrap().id, "sun");

    let version = scene.light().unwrap().version();
    let events = scene.event_channel();
    scene.light_mut(sun).unwrap().set_direction([0.0, 2.0, 0.0]);

    let light = scene.light().unwrap();
    assert!(light.version() > version);
    assert!(approx_vec3(light.direction(), Vec3::Y));
    assert_eq!(light.uniform().direction, [0.0, 1.0, 0.0, 0.0]);
    assert_eq!(events.try_iter().collect::<Vec<_>>(), vec![SceneEvent::LightChanged(sun)]);

    let lamp = scene.use_light("lamp").unwrap();
    assert_eq!(events.try_iter().collect::<Vec<_>>(), vec![SceneEvent::LightChanged(lamp)]);
    // switching to the active light is silent
    scene.use_light("lamp").unwrap();
    assert!(events.try_iter().next().is_none());
    assert!(scene.use_light("moon").is_err());
}
