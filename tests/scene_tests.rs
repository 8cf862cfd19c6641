//! Scene, Camera, and Orchestration Tests
//!
//! Tests for:
//! - Scene document parsing (including the empty animation record)
//! - Camera matrix recomputation and resize behavior
//! - Model matrix composition order
//! - Tick driver policies

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use vitrine::app::tick::{TickDriver, TickPolicy};
use vitrine::assets::SceneDocument;
use vitrine::renderer::{compose_model_matrix, rotate_scale_about};
use vitrine::scene::Camera;

const EPSILON: f32 = 1e-5;

fn mat_approx(a: Mat4, b: Mat4) -> bool {
    a.to_cols_array()
        .iter()
        .zip(b.to_cols_array().iter())
        .all(|(x, y)| (x - y).abs() < EPSILON)
}

// ============================================================================
// Scene document
// ============================================================================

const TWO_MESH_DOCUMENT: &str = r#"[
    {
        "transform": { "location": [0.0, 0.0, -1.5], "rotation": [0.0, 0.0, 0.0, 1.0] },
        "vertices": [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        "normals": [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        "indices": [0, 1, 2],
        "material": { "color": [0.8, 0.2, 0.2], "roughness": 0.4, "metallic": 1.0 },
        "animation": { "keyframes": [0.0, 0.1, 0.2] }
    },
    {
        "transform": { "location": [1.0, 2.0, 3.0], "rotation": [0.0, 0.7071, 0.0, 0.7071] },
        "vertices": [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        "normals": [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        "indices": [],
        "material": { "color": [1.0, 1.0, 1.0], "roughness": 0.0, "metallic": 0.0 },
        "animation": {}
    }
]"#;

#[test]
fn parses_two_mesh_document() {
    let document = SceneDocument::from_slice(TWO_MESH_DOCUMENT.as_bytes()).unwrap();
    assert_eq!(document.meshes.len(), 2);

    let first = &document.meshes[0];
    assert_eq!(first.transform.location, [0.0, 0.0, -1.5]);
    assert_eq!(first.indices, vec![0, 1, 2]);
    assert!(first.animation.has_keyframes());
    assert_eq!(first.animation.keyframes, vec![0.0, 0.1, 0.2]);

    let second = &document.meshes[1];
    assert!(!second.animation.has_keyframes());
    assert!(second.indices.is_empty());
}

#[test]
fn missing_animation_key_defaults_to_empty() {
    let json = r#"[{
        "transform": { "location": [0, 0, 0], "rotation": [0, 0, 0, 1] },
        "vertices": [0, 0, 0],
        "normals": [0, 0, 1],
        "indices": [],
        "material": { "color": [1, 1, 1], "roughness": 0.5, "metallic": 0.5 }
    }]"#;
    let document = SceneDocument::from_slice(json.as_bytes()).unwrap();
    assert!(!document.meshes[0].animation.has_keyframes());
}

#[test]
fn rejects_malformed_document() {
    assert!(SceneDocument::from_slice(b"{\"not\": \"a list\"}").is_err());
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn camera_maps_its_location_to_the_eye_origin() {
    let camera = Camera::showcase(16.0 / 9.0);
    let eye = camera.view_matrix() * Vec4::new(0.0, 2.0, 0.0, 1.0);
    assert!(eye.truncate().length() < EPSILON, "eye {eye:?}");
}

#[test]
fn camera_direction_points_at_target() {
    let camera = Camera::showcase(1.0);
    let direction = camera.direction();
    assert!((direction - Vec3::new(0.0, -1.0, 0.0)).length() < EPSILON);
}

#[test]
fn resize_updates_only_aspect_and_projection() {
    let mut camera = Camera::showcase(1.0);
    let view_before = camera.view_matrix();
    let projection_before = camera.projection_matrix();

    camera.resize(800, 400);

    assert_eq!(camera.aspect, 2.0);
    assert_eq!(camera.location, Vec3::new(0.0, 2.0, 0.0));
    assert_eq!(camera.target, Vec3::ZERO);
    assert!(mat_approx(camera.view_matrix(), view_before));
    assert!(!mat_approx(camera.projection_matrix(), projection_before));
}

#[test]
fn resize_to_zero_height_is_ignored() {
    let mut camera = Camera::showcase(1.0);
    camera.resize(800, 0);
    assert_eq!(camera.aspect, 1.0);
}

// ============================================================================
// Model matrix composition
// ============================================================================

#[test]
fn rotation_about_origin_keeps_the_origin_fixed() {
    let origin = Vec3::new(0.5, -2.0, 3.0);
    let m = rotate_scale_about(Quat::from_rotation_y(1.2), Vec3::splat(2.0), origin);
    let moved = m * origin.extend(1.0);
    assert!((moved.truncate() - origin).length() < EPSILON);
}

#[test]
fn animation_offset_is_applied_last_in_local_z() {
    let location = Vec3::new(0.3, 0.0, -1.0);
    let rotation = Quat::from_rotation_x(0.4);
    let base = compose_model_matrix(location, rotation, 1.0, Vec2::new(0.2, -0.1), 0.0, 1.0);
    let offset = compose_model_matrix(location, rotation, 1.0, Vec2::new(0.2, -0.1), 0.75, 1.0);

    let expected = base * Mat4::from_translation(Vec3::new(0.0, 0.0, 0.75));
    assert!(mat_approx(offset, expected));
}

#[test]
fn intro_interpolates_from_unit_z_offset_to_rest() {
    let location = Vec3::new(1.0, 2.0, 3.0);
    let rotation = Quat::IDENTITY;
    let at_start = compose_model_matrix(location, rotation, 0.0, Vec2::ZERO, 0.0, 1.0);
    let at_rest = compose_model_matrix(location, rotation, 1.0, Vec2::ZERO, 0.0, 1.0);

    // Eased progress 0 places the mesh one unit along +Z of its rest pose.
    let expected = Mat4::from_translation(Vec3::Z) * at_rest;
    assert!(mat_approx(at_start, expected));
}

// ============================================================================
// Tick driver
// ============================================================================

#[test]
fn per_display_frame_always_ticks_once() {
    let mut driver = TickDriver::new(TickPolicy::PerDisplayFrame);
    assert_eq!(driver.advance(1.0), 1);
    assert_eq!(driver.advance(100.0), 1);
    assert_eq!(driver.advance(0.0), 1);
}

#[test]
fn fixed_step_accumulates_fractional_frames() {
    let mut driver = TickDriver::new(TickPolicy::FixedStep { fps: 60.0 });
    // Three steps' worth of time at once.
    assert_eq!(driver.advance(50.0), 3);
    // Not enough for a step yet, then the remainder tips it over.
    assert_eq!(driver.advance(8.0), 0);
    assert_eq!(driver.advance(9.0), 1);
}

#[test]
fn fixed_step_accumulator_saturates_at_one_second() {
    let mut driver = TickDriver::new(TickPolicy::FixedStep { fps: 60.0 });
    // A huge stall collapses to at most one second of catch-up.
    assert_eq!(driver.advance(10_000.0), 60);
    assert_eq!(driver.advance(0.0), 0);
}
