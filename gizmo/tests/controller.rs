//! End-to-end gizmo interaction against an in-memory scene.
//!
//! Colliders are spheres attached to entities; gizmo parts sit at fixed
//! offsets from the gizmo root so they follow it around. The camera looks at
//! the origin from +Z, so the `z = 0` plane maps to the screen without skew.

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_3;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rstest::rstest;

use stagehand_core::{Color, Transform};
use stagehand_core::input::{InputSnapshot, KeyCode, MouseButton};
use stagehand_core::math::{Quat, Vec2, Vec3};
use stagehand_core::scene::{
    CollisionFilter, EntityId, RaycastHit, Raycaster, SceneGraph, TransformStore,
};
use stagehand_debug_drawer::{
    BufferAllocator, DebugDrawConfig, DebugDrawRegistry, DebugVertex, LineMeshBuffers,
    UploadError,
};
use stagehand_gizmo::{
    Camera, GizmoConfig, GizmoController, GizmoMode, GizmoResponse, GizmoRig, NoIntersection,
    PrefabInstance,
};

const ROOT: EntityId = EntityId(100);
const CUBE: EntityId = EntityId(200);

// ============================================================================
// Fakes
// ============================================================================

struct Collider {
    owner: EntityId,
    radius: f32,
    filter: CollisionFilter,
}

struct FakeScene {
    transforms: HashMap<EntityId, Transform>,
    /// Gizmo parts, as offsets from the root.
    parts: HashMap<EntityId, Vec3>,
    local_rotations: HashMap<EntityId, Quat>,
    colliders: Vec<Collider>,
}

fn part_entity(mode: GizmoMode) -> EntityId {
    let index = GizmoMode::PARTS.iter().position(|m| *m == mode).unwrap();
    EntityId(index as u64 + 1)
}

impl FakeScene {
    fn new(cube_position: Vec3) -> Self {
        let mut parts = HashMap::new();
        for mode in GizmoMode::PARTS {
            parts.insert(part_entity(mode), Vec3::zeros());
        }
        let mut scene = Self {
            transforms: HashMap::from([
                (ROOT, Transform::identity()),
                (CUBE, Transform::from_position(cube_position)),
            ]),
            parts,
            local_rotations: HashMap::new(),
            colliders: vec![Collider {
                owner: CUBE,
                radius: 0.5,
                filter: CollisionFilter::Default,
            }],
        };
        scene.add_part_collider(GizmoMode::TranslationX, Vec3::new(1.0, 0.0, 0.0), 0.2);
        scene.add_part_collider(GizmoMode::TranslationPlaneXY, Vec3::new(0.5, 0.5, 0.0), 0.15);
        scene.add_part_collider(GizmoMode::RotationZ, Vec3::new(-1.0, -1.0, 0.0), 0.2);
        scene
    }

    fn add_part_collider(&mut self, mode: GizmoMode, offset: Vec3, radius: f32) {
        let owner = part_entity(mode);
        self.parts.insert(owner, offset);
        self.colliders.push(Collider {
            owner,
            radius,
            filter: CollisionFilter::Gizmo,
        });
    }

    fn prefab(&self) -> PrefabInstance {
        GizmoMode::PARTS
            .iter()
            .fold(PrefabInstance::new(vec![ROOT]), |prefab, mode| {
                prefab.with_child(mode.part_name().unwrap(), part_entity(*mode))
            })
    }

    fn position(&self, entity: EntityId) -> Vec3 {
        self.world_transform(entity).unwrap().position
    }
}

impl Raycaster for FakeScene {
    fn raycast(&self, from: Vec3, to: Vec3, filter: CollisionFilter) -> Option<RaycastHit> {
        let dir = to - from;
        let len_sq = dir.norm_squared();
        self.colliders
            .iter()
            .filter(|c| c.filter == filter)
            .filter_map(|c| {
                let center = self.world_transform(c.owner)?.position;
                let t = ((center - from).dot(&dir) / len_sq).clamp(0.0, 1.0);
                let closest = from + dir * t;
                ((closest - center).norm() <= c.radius).then_some((
                    t,
                    RaycastHit {
                        owner: c.owner,
                        point: closest,
                    },
                ))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, hit)| hit)
    }
}

impl TransformStore for FakeScene {
    fn world_transform(&self, entity: EntityId) -> Option<Transform> {
        if let Some(offset) = self.parts.get(&entity) {
            let root = self.transforms.get(&ROOT)?;
            return Some(Transform::from_position(root.position + offset));
        }
        self.transforms.get(&entity).copied()
    }

    fn set_world_position(&mut self, entity: EntityId, position: Vec3) {
        if let Some(t) = self.transforms.get_mut(&entity) {
            t.position = position;
        }
    }

    fn set_world_rotation(&mut self, entity: EntityId, rotation: Quat) {
        if let Some(t) = self.transforms.get_mut(&entity) {
            t.rotation = rotation;
        }
    }

    fn set_world_scale(&mut self, entity: EntityId, scale: Vec3) {
        if let Some(t) = self.transforms.get_mut(&entity) {
            t.scale = scale;
        }
    }

    fn set_local_rotation(&mut self, entity: EntityId, rotation: Quat) {
        self.local_rotations.insert(entity, rotation);
    }
}

#[derive(Default)]
struct NullGraph {
    next: AtomicU64,
}

impl SceneGraph for NullGraph {
    fn attach_node(&self, _parent: Option<EntityId>, _name: &str) -> EntityId {
        EntityId(1000 + self.next.fetch_add(1, Ordering::Relaxed))
    }

    fn detach_node(&self, _node: EntityId) {}
}

struct NullBuffers;

impl LineMeshBuffers for NullBuffers {
    fn ensure_capacity(&mut self, _vertices: usize, _indices: usize) -> Result<(), UploadError> {
        Ok(())
    }

    fn upload(&mut self, _vertices: &[DebugVertex], _indices: &[u32]) -> Result<(), UploadError> {
        Ok(())
    }
}

struct NullAllocator;

impl BufferAllocator for NullAllocator {
    fn create_line_mesh(
        &self,
        _label: &str,
        _color: Color,
    ) -> Result<Box<dyn LineMeshBuffers>, UploadError> {
        Ok(Box::new(NullBuffers))
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    scene: FakeScene,
    camera: Camera,
    drawer: DebugDrawRegistry,
    gizmo: GizmoController,
    input: InputSnapshot,
}

impl Harness {
    fn new() -> Self {
        Self::with(GizmoConfig::default(), Vec3::new(0.0, 0.0, 10.0))
    }

    fn with(config: GizmoConfig, eye: Vec3) -> Self {
        let scene = FakeScene::new(Vec3::zeros());
        let rig = GizmoRig::from_prefab(&scene.prefab()).unwrap();
        Self {
            camera: Camera::look_at(eye, Vec3::zeros(), FRAC_PI_3, 1.0, 0.1, 100.0),
            drawer: DebugDrawRegistry::new(
                DebugDrawConfig::default(),
                Arc::new(NullGraph::default()),
                Arc::new(NullAllocator),
            ),
            gizmo: GizmoController::new(rig, config),
            input: InputSnapshot::default(),
            scene,
        }
    }

    fn screen(&self, p: Vec3) -> Vec2 {
        self.camera.project_to_screen(&p).unwrap()
    }

    fn frame(&mut self, input: InputSnapshot) -> GizmoResponse {
        self.input = input.clone();
        self.gizmo
            .update(&input, &self.camera, &mut self.scene, &self.drawer)
    }

    fn hover(&mut self, p: Vec3) -> GizmoResponse {
        let input = self.input.next_frame(self.screen(p));
        self.frame(input)
    }

    fn press(&mut self, p: Vec3) -> GizmoResponse {
        let input = self.input.next_frame(self.screen(p)).press(MouseButton::Left);
        self.frame(input)
    }

    fn drag_to(&mut self, p: Vec3) -> GizmoResponse {
        let input = self.input.next_frame(self.screen(p));
        self.frame(input)
    }

    fn release(&mut self, p: Vec3) -> GizmoResponse {
        let input = self.input.next_frame(self.screen(p)).release(MouseButton::Left);
        self.frame(input)
    }

    fn click(&mut self, p: Vec3) -> GizmoResponse {
        let response = self.press(p);
        self.release(p);
        response
    }

    fn select_cube(&mut self) {
        let response = self.click(Vec3::zeros());
        assert_eq!(response.selected, Some(CUBE));
    }
}

fn assert_near(actual: Vec3, expected: Vec3) {
    assert!(
        (actual - expected).norm() < 1e-3,
        "expected {expected:?}, got {actual:?}"
    );
}

// ============================================================================
// Selection and hover
// ============================================================================

#[test]
fn test_click_selects_entity_and_moves_gizmo() {
    let mut h = Harness::new();
    h.scene
        .set_world_position(CUBE, Vec3::new(0.2, -0.1, 0.0));
    h.scene
        .set_world_rotation(ROOT, Quat::from_axis_angle(&Vec3::z_axis(), 1.0));

    let response = h.press(Vec3::new(0.2, -0.1, 0.0));

    assert!(response.selection_changed);
    assert!(response.visible);
    assert_eq!(h.gizmo.selected(), Some(CUBE));
    assert_near(h.scene.position(ROOT), Vec3::new(0.2, -0.1, 0.0));
    assert_eq!(h.scene.transforms[&ROOT].rotation, Quat::identity());
}

#[test]
fn test_click_on_empty_space_clears_selection() {
    let mut h = Harness::new();
    h.select_cube();

    let response = h.press(Vec3::new(3.0, 3.0, 0.0));

    assert!(response.selection_changed);
    assert!(!response.visible);
    assert_eq!(h.gizmo.selected(), None);
}

#[test]
fn test_hover_sets_mode_from_gizmo_part() {
    let mut h = Harness::new();
    h.select_cube();

    let response = h.hover(Vec3::new(1.0, 0.0, 0.0));
    assert!(response.mode_changed);
    assert_eq!(response.mode, GizmoMode::TranslationX);
    assert!(h.gizmo.is_axial_translation_mode());
    assert_eq!(h.gizmo.part_intensity(GizmoMode::TranslationX), 1.0);
    assert_eq!(h.gizmo.part_intensity(GizmoMode::RotationZ), 0.1);

    let response = h.hover(Vec3::new(1.0, 0.0, 0.0));
    assert!(!response.mode_changed);

    let response = h.hover(Vec3::new(3.0, 3.0, 0.0));
    assert!(response.mode_changed);
    assert_eq!(response.mode, GizmoMode::None);
}

#[test]
fn test_hover_reports_scene_entity() {
    let mut h = Harness::new();
    let response = h.hover(Vec3::zeros());
    assert_eq!(response.hovered, Some(CUBE));
    let response = h.hover(Vec3::new(3.0, 0.0, 0.0));
    assert_eq!(response.hovered, None);
}

#[test]
fn test_hidden_gizmo_is_not_hoverable() {
    let mut h = Harness::new();
    let response = h.hover(Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(response.mode, GizmoMode::None);
    assert!(!response.visible);
}

#[test]
fn test_no_mouse_does_nothing() {
    let mut h = Harness::new();
    let mut input = InputSnapshot::at(h.screen(Vec3::zeros())).press(MouseButton::Left);
    input.has_mouse = false;

    let response = h.frame(input);

    assert!(!response.selection_changed);
    assert_eq!(h.gizmo.selected(), None);
}

#[test]
fn test_missing_root_is_reported_without_panicking() {
    let mut h = Harness::new();
    h.scene.transforms.remove(&ROOT);
    let response = h.press(Vec3::zeros());
    assert_eq!(response, GizmoResponse::default());
}

// ============================================================================
// Translation
// ============================================================================

#[test]
fn test_axial_drag_moves_along_axis_only() {
    let mut h = Harness::new();
    h.select_cube();
    h.hover(Vec3::new(1.0, 0.0, 0.0));

    let response = h.press(Vec3::new(1.0, 0.0, 0.0));
    assert!(h.gizmo.is_manipulating());
    assert_eq!(response.manipulated, Some(CUBE));
    assert_near(h.scene.position(CUBE), Vec3::zeros());

    let response = h.drag_to(Vec3::new(2.0, 0.5, 0.0));
    assert_eq!(response.manipulated, Some(CUBE));
    assert_near(h.scene.position(CUBE), Vec3::new(1.0, 0.0, 0.0));
    assert_near(h.scene.position(ROOT), Vec3::new(1.0, 0.0, 0.0));

    h.release(Vec3::new(2.0, 0.5, 0.0));
    assert!(!h.gizmo.is_manipulating());
}

#[test]
fn test_planar_drag_moves_within_plane() {
    let mut h = Harness::new();
    h.select_cube();
    h.hover(Vec3::new(0.5, 0.5, 0.0));
    assert_eq!(h.gizmo.mode(), GizmoMode::TranslationPlaneXY);

    h.press(Vec3::new(0.5, 0.5, 0.0));
    h.drag_to(Vec3::new(1.5, -0.5, 0.0));

    assert_near(h.scene.position(CUBE), Vec3::new(1.0, -1.0, 0.0));
    assert_near(h.scene.position(ROOT), Vec3::new(1.0, -1.0, 0.0));
}

#[test]
fn test_shift_drag_moves_gizmo_only() {
    let mut h = Harness::new();
    h.select_cube();
    h.hover(Vec3::new(1.0, 0.0, 0.0));

    let input = h
        .input
        .next_frame(h.screen(Vec3::new(1.0, 0.0, 0.0)))
        .with_key(KeyCode::ShiftLeft)
        .press(MouseButton::Left);
    let response = h.frame(input);
    assert_eq!(response.manipulated, Some(ROOT));

    h.drag_to(Vec3::new(2.0, 0.0, 0.0));

    assert_near(h.scene.position(ROOT), Vec3::new(1.0, 0.0, 0.0));
    assert_near(h.scene.position(CUBE), Vec3::zeros());
}

#[test]
fn test_drag_beyond_axis_extent_stalls() {
    let config = GizmoConfig {
        axis_extent: 2.0,
        ..Default::default()
    };
    let mut h = Harness::with(config, Vec3::new(0.0, 0.0, 10.0));
    h.select_cube();
    h.hover(Vec3::new(1.0, 0.0, 0.0));
    h.press(Vec3::new(1.0, 0.0, 0.0));

    let response = h.drag_to(Vec3::new(3.0, 0.2, 0.0));

    assert_eq!(response.stalled, Some(NoIntersection::OutOfRange));
    assert_eq!(response.manipulated, None);
    assert!(h.gizmo.is_manipulating());
    assert_near(h.scene.position(CUBE), Vec3::zeros());
}

// ============================================================================
// Rotation
// ============================================================================

// The same world-space sweep looks counter-clockwise from the front and
// clockwise from behind; both must turn the selection the same way.
#[rstest]
#[case::front(Vec3::new(0.0, 0.0, 10.0))]
#[case::behind(Vec3::new(0.0, 0.0, -10.0))]
fn test_rotation_drag_turns_selection(#[case] eye: Vec3) {
    let mut h = Harness::with(GizmoConfig::default(), eye);
    h.select_cube();
    h.hover(Vec3::new(-1.0, -1.0, 0.0));
    assert_eq!(h.gizmo.mode(), GizmoMode::RotationZ);

    h.press(Vec3::new(-1.0, -1.0, 0.0));
    // A quarter turn counter-clockwise around +Z.
    h.drag_to(Vec3::new(1.0, -1.0, 0.0));

    let rotation = h.scene.transforms[&CUBE].rotation;
    assert_near(rotation * Vec3::x(), Vec3::y());
    assert_near(h.scene.position(CUBE), Vec3::zeros());
}

#[test]
fn test_rotation_orbits_selection_around_offset_gizmo() {
    let mut h = Harness::new();
    h.select_cube();

    // Move the gizmo one unit along X, away from the cube.
    h.hover(Vec3::new(1.0, 0.0, 0.0));
    let input = h
        .input
        .next_frame(h.screen(Vec3::new(1.0, 0.0, 0.0)))
        .with_key(KeyCode::ShiftLeft)
        .press(MouseButton::Left);
    h.frame(input);
    h.drag_to(Vec3::new(2.0, 0.0, 0.0));
    h.release(Vec3::new(2.0, 0.0, 0.0));
    h.input.keys_down.clear();
    assert_near(h.scene.position(ROOT), Vec3::new(1.0, 0.0, 0.0));

    // Ring handle is at root + (-1, -1, 0).
    h.hover(Vec3::new(0.0, -1.0, 0.0));
    assert_eq!(h.gizmo.mode(), GizmoMode::RotationZ);
    h.press(Vec3::new(0.0, -1.0, 0.0));
    assert_near(h.scene.position(CUBE), Vec3::zeros());

    h.drag_to(Vec3::new(2.0, -1.0, 0.0));

    assert_near(h.scene.position(CUBE), Vec3::new(1.0, -1.0, 0.0));
    assert_near(h.scene.position(ROOT), Vec3::new(1.0, 0.0, 0.0));
}

// ============================================================================
// Per-frame presentation
// ============================================================================

#[rstest]
#[case::front(Vec3::new(0.0, 0.0, 10.0))]
#[case::above_right(Vec3::new(5.0, 3.0, 8.0))]
#[case::below_left(Vec3::new(-6.0, -2.0, 4.0))]
fn test_gizmo_is_scaled_and_ring_faces_camera(#[case] eye: Vec3) {
    let mut h = Harness::with(GizmoConfig::default(), eye);
    h.select_cube();

    assert_eq!(h.scene.transforms[&ROOT].scale, Vec3::repeat(0.25));
    let ring = part_entity(GizmoMode::RotationCamera);
    let ring_normal = h.scene.local_rotations[&ring] * Vec3::y();
    assert_near(ring_normal, eye.normalize());
}

#[test]
fn test_transform_axis_follows_gizmo_rotation() {
    let mut h = Harness::new();
    h.select_cube();
    h.scene.set_world_rotation(
        ROOT,
        Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2),
    );
    h.hover(Vec3::new(3.0, 3.0, 0.0));

    let camera = h.camera;
    assert_near(h.gizmo.get_transform_axis(GizmoMode::TranslationX, &camera), Vec3::y());
    assert_near(
        h.gizmo
            .get_transform_axis(GizmoMode::TranslationPlaneCamera, &camera),
        Vec3::repeat(1.0),
    );
    assert_near(
        h.gizmo.get_transform_axis(GizmoMode::RotationCamera, &camera),
        Vec3::z(),
    );
    assert_eq!(
        h.gizmo.get_transform_axis(GizmoMode::None, &camera),
        Vec3::zeros()
    );
}

#[test]
fn test_translation_plane_per_mode() {
    let mut h = Harness::new();
    h.select_cube();
    let camera = h.camera;

    h.gizmo.set_mode(GizmoMode::TranslationPlaneCamera);
    let plane = h.gizmo.translation_plane(&camera).unwrap();
    assert_near(plane.normal, Vec3::z());

    h.gizmo.set_mode(GizmoMode::TranslationPlaneXZ);
    let plane = h.gizmo.translation_plane(&camera).unwrap();
    assert_near(plane.normal, Vec3::y());

    h.gizmo.set_mode(GizmoMode::RotationX);
    assert!(h.gizmo.translation_plane(&camera).is_none());
}

#[test]
fn test_debug_visualization_draws_single_frame_shapes() {
    let config = GizmoConfig {
        debug_visualization: true,
        ..Default::default()
    };
    let mut h = Harness::with(config, Vec3::new(0.0, 0.0, 10.0));
    h.select_cube();
    h.drawer.draw_phase();
    h.drawer.per_frame_update(0.016);
    assert_eq!(h.drawer.shape_count(), 0);

    h.hover(Vec3::new(1.0, 0.0, 0.0));

    // Pick marker, drag plane, active axis line, three gizmo axes.
    assert_eq!(h.drawer.shape_count(), 6);
    assert_eq!(h.drawer.collection(Color::YELLOW).unwrap().len(), 2);

    h.drawer.draw_phase();
    h.drawer.per_frame_update(0.016);
    assert_eq!(h.drawer.shape_count(), 0);
}
