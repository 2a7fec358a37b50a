//! Integration tests for fibra-model.

use fibra_math::{Domain, Vec3};
use fibra_model::generators::{ring, segment_count, straight_fiber};
use fibra_model::{BodyKind, BodyProp, FiberProp, Scene};
use fibra_types::{BodyId, FibraError, GroupId, PropId};

fn make_scene() -> Scene {
    Scene::new(Domain::centered(Vec3::splat(10.0), 3))
}

// ─── Property Tests ───────────────────────────────────────────

#[test]
fn fiber_prop_defaults_to_pane_one() {
    let p = FiberProp::new("actin", 0.5, 0.01);
    assert!(p.has_steric());
    assert_eq!(p.steric, 1);
    assert!(p.validate().is_ok());
}

#[test]
fn fiber_prop_rejects_zero_segmentation() {
    let p = FiberProp::new("bad", 0.0, 0.01);
    assert!(matches!(p.validate(), Err(FibraError::InvalidConfig(_))));
}

#[test]
fn body_prop_rejects_negative_range() {
    let p = BodyProp::new("bead").with_range(-1.0);
    assert!(p.validate().is_err());
}

#[test]
fn props_round_trip_toml() {
    let p = FiberProp::new("microtubule", 1.0, 0.0125).with_range(0.01).with_panes(3);
    let text = toml::to_string(&p).unwrap();
    let recovered: FiberProp = toml::from_str(&text).unwrap();
    assert_eq!(recovered, p);
}

#[test]
fn steric_fields_default_to_disabled() {
    let p: BodyProp = toml::from_str("name = \"inert\"").unwrap();
    assert!(!p.has_steric());
    assert_eq!(p.steric_range, 0.0);
}

// ─── Scene Tests ──────────────────────────────────────────────

#[test]
fn body_ids_are_shared_across_kinds() {
    let mut scene = make_scene();
    let fp = scene.add_fiber_prop(FiberProp::new("f", 1.0, 0.1)).unwrap();
    let bp = scene.add_body_prop(BodyProp::new("b")).unwrap();

    let f = scene
        .add_fiber(fp, straight_fiber(Vec3::ZERO, Vec3::X, 2.0, 2), None)
        .unwrap();
    let b = scene.add_bead(bp, Vec3::ONE, 0.5, None).unwrap();
    let s = scene.add_sphere(bp, Vec3::ZERO, 1.0, None).unwrap();

    assert_eq!((f, b, s), (BodyId(0), BodyId(1), BodyId(2)));
    assert_eq!(scene.body_kind(b), Some(BodyKind::Bead(0)));
    assert!(scene.fiber(f).is_some());
    assert!(scene.fiber(b).is_none());
    assert_eq!(scene.body_count(), 3);
}

#[test]
fn unregistered_object_fails_validation() {
    let mut scene = make_scene();
    let bp = scene.add_body_prop(BodyProp::new("b")).unwrap();
    scene.add_bead(bp, Vec3::ONE, 0.5, None).unwrap();
    assert!(scene.validate().is_ok());

    let mut stray = scene.beads[0].clone();
    stray.position = Vec3::ZERO;
    scene.beads.push(stray);
    assert!(matches!(scene.validate(), Err(FibraError::InvalidConfig(_))));
}

#[test]
fn mismatched_body_id_fails_validation() {
    let mut scene = make_scene();
    let bp = scene.add_body_prop(BodyProp::new("b")).unwrap();
    scene.add_bead(bp, Vec3::ONE, 0.5, None).unwrap();
    scene.add_sphere(bp, Vec3::ZERO, 1.0, None).unwrap();

    // same counts, but the two ids are swapped
    let mut json: serde_json::Value = serde_json::to_value(&scene).unwrap();
    json["beads"][0]["id"] = serde_json::json!(1);
    json["spheres"][0]["id"] = serde_json::json!(0);
    let swapped: Scene = serde_json::from_value(json).unwrap();
    assert!(matches!(swapped.validate(), Err(FibraError::InvalidConfig(_))));
}

#[test]
fn fiber_needs_two_vertices() {
    let mut scene = make_scene();
    let fp = scene.add_fiber_prop(FiberProp::new("f", 1.0, 0.1)).unwrap();
    let err = scene.add_fiber(fp, vec![Vec3::ZERO], None).unwrap_err();
    assert!(matches!(err, FibraError::InvalidGeometry(_)));
    assert_eq!(scene.body_count(), 0);
}

#[test]
fn fiber_rejects_repeated_vertex() {
    let mut scene = make_scene();
    let fp = scene.add_fiber_prop(FiberProp::new("f", 1.0, 0.1)).unwrap();
    assert!(scene
        .add_fiber(fp, vec![Vec3::ZERO, Vec3::ZERO, Vec3::X], None)
        .is_err());
}

#[test]
fn unknown_property_is_rejected() {
    let mut scene = make_scene();
    let err = scene.add_bead(PropId(4), Vec3::ZERO, 1.0, None).unwrap_err();
    assert!(matches!(err, FibraError::InvalidConfig(_)));
}

#[test]
fn solid_radii_must_match_points() {
    let mut scene = make_scene();
    let bp = scene.add_body_prop(BodyProp::new("core")).unwrap();
    let pts = ring(Vec3::ZERO, 1.0, 4);
    assert!(scene.add_solid(bp, pts.clone(), vec![0.1; 3], None).is_err());
    assert!(scene.add_solid(bp, pts, vec![0.1; 4], Some(GroupId(1))).is_ok());
    assert!(scene.validate().is_ok());
}

#[test]
fn for_each_position_visits_everything() {
    let mut scene = make_scene();
    let fp = scene.add_fiber_prop(FiberProp::new("f", 1.0, 0.1)).unwrap();
    let bp = scene.add_body_prop(BodyProp::new("b")).unwrap();
    scene
        .add_fiber(fp, straight_fiber(Vec3::ZERO, Vec3::X, 3.0, 3), None)
        .unwrap();
    scene.add_bead(bp, Vec3::ZERO, 0.5, None).unwrap();
    scene
        .add_solid(bp, ring(Vec3::ZERO, 1.0, 3), vec![0.2; 3], None)
        .unwrap();

    let mut count = 0;
    scene.for_each_position_mut(|p| {
        p.z += 1.0;
        count += 1;
    });
    assert_eq!(count, 4 + 1 + 3);
    assert_eq!(scene.beads[0].position.z, 1.0);
}

// ─── Fiber Geometry Tests ─────────────────────────────────────

#[test]
fn straight_fiber_geometry() {
    let pts = straight_fiber(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), 4.0, 4);
    assert_eq!(pts.len(), 5);
    assert!((pts[4].y - 4.0).abs() < 1e-6);

    let mut scene = make_scene();
    let fp = scene.add_fiber_prop(FiberProp::new("f", 1.0, 0.1)).unwrap();
    let id = scene.add_fiber(fp, pts, None).unwrap();
    let fiber = scene.fiber(id).unwrap();
    assert_eq!(fiber.nb_segments(), 4);
    assert!((fiber.segmentation() - 1.0).abs() < 1e-6);
    assert!((fiber.length() - 4.0).abs() < 1e-5);
    assert!((fiber.segment(2).len() - 1.0).abs() < 1e-6);
}

#[test]
fn segment_count_rounds() {
    assert_eq!(segment_count(10.0, 1.0), 10);
    assert_eq!(segment_count(0.2, 1.0), 1);
    assert_eq!(segment_count(3.0, 0.0), 1);
}

#[test]
fn scene_serialization() {
    let mut scene = make_scene();
    let bp = scene.add_body_prop(BodyProp::new("b")).unwrap();
    scene.add_bead(bp, Vec3::ONE, 0.5, None).unwrap();
    let json = serde_json::to_string(&scene).unwrap();
    let recovered: Scene = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered.beads.len(), 1);
    assert_eq!(recovered.body_kind(BodyId(0)), Some(BodyKind::Bead(0)));
}
