//! Per-frame gizmo interaction.
//!
//! [`GizmoController::update`] runs once per frame after input was polled:
//!
//! 1. Left press with a hovered part starts a drag of the selection (or of
//!    the gizmo itself while Shift is held). Left press on empty gizmo space
//!    selects whatever scene entity is under the cursor.
//! 2. While the button is held the drag is applied to the target transform.
//! 3. While the button is up the hovered part decides the mode.
//! 4. The gizmo follows the dragged entity, is rescaled, and its camera ring
//!    is turned towards the viewer.

use std::f32::consts::FRAC_PI_2;

use stagehand_core::input::{InputState, MouseButton};
use stagehand_core::math::{self, EPSILON, Quat, Vec2, Vec3};
use stagehand_core::scene::{CollisionFilter, EntityId, Raycaster, TransformStore};
use stagehand_core::{Color, Transform};
use stagehand_debug_drawer::DebugDrawRegistry;

use crate::camera::Camera;
use crate::config::GizmoConfig;
use crate::math::{
    NoIntersection, Plane, angle_between_2d, camera_facing_rotation, closest_point_to_axis,
    intersect_ray_plane,
};
use crate::mode::GizmoMode;
use crate::rig::GizmoRig;

/// Outcome of one [`GizmoController::update`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GizmoResponse {
    pub mode: GizmoMode,
    /// The hovered part changed; part highlights need refreshing.
    pub mode_changed: bool,
    pub selected: Option<EntityId>,
    pub selection_changed: bool,
    /// Scene entity under the cursor while no button is held.
    pub hovered: Option<EntityId>,
    /// Entity whose transform a drag wrote this frame.
    pub manipulated: Option<EntityId>,
    /// A drag is active but could not be applied this frame.
    pub stalled: Option<NoIntersection>,
    /// The gizmo should be shown; it is hidden while nothing is selected.
    pub visible: bool,
}

#[derive(Debug, Clone, Copy)]
enum Drag {
    /// Planar drags store the pick point relative to the start position,
    /// axial drags the pick point projected onto the axis.
    Translation { offset: Vec3 },
    /// `gizmo_offset` is the selection-to-gizmo offset when the drag began.
    Rotation { accumulated: f32, gizmo_offset: Vec3 },
}

#[derive(Debug, Clone, Copy)]
struct Manipulation {
    target: EntityId,
    snapshot: Transform,
    axis: Vec3,
    plane: Plane,
    drag: Drag,
}

/// Drives a [`GizmoRig`] from mouse and keyboard input.
pub struct GizmoController {
    rig: GizmoRig,
    config: GizmoConfig,
    mode: GizmoMode,
    selected: Option<EntityId>,
    hovered: Option<EntityId>,
    manipulation: Option<Manipulation>,
    /// Selection position minus gizmo position.
    gizmo_offset: Vec3,
    /// Gizmo root world transform as of the last read.
    gizmo: Transform,
    previous_mouse: Vec2,
}

impl GizmoController {
    pub fn new(rig: GizmoRig, config: GizmoConfig) -> Self {
        Self {
            rig,
            config,
            mode: GizmoMode::None,
            selected: None,
            hovered: None,
            manipulation: None,
            gizmo_offset: Vec3::zeros(),
            gizmo: Transform::identity(),
            previous_mouse: Vec2::new(0.5, 0.5),
        }
    }

    pub fn update<S>(
        &mut self,
        input: &dyn InputState,
        camera: &Camera,
        scene: &mut S,
        drawer: &DebugDrawRegistry,
    ) -> GizmoResponse
    where
        S: Raycaster + TransformStore + ?Sized,
    {
        let mut response = GizmoResponse::default();
        if !input.has_mouse() {
            return self.fill(response);
        }
        let root = self.rig.root();
        let Some(gizmo) = scene.world_transform(root) else {
            log::warn!("Gizmo root {root} is not in the scene");
            return self.fill(response);
        };
        self.gizmo = gizmo;
        let mouse = input.mouse_position();

        if input.is_mouse_pressed(MouseButton::Left) && self.manipulation.is_none() {
            if self.mode != GizmoMode::None {
                self.manipulation = self.begin_manipulation(input, camera, scene, mouse);
            } else {
                let picked = self.pick(camera, scene, mouse, CollisionFilter::Default);
                response.selection_changed = self.select(picked, scene);
            }
        }

        if input.is_mouse_released(MouseButton::Left) && self.manipulation.take().is_some() {
            log::debug!("{} drag finished", self.mode);
        }

        if input.is_mouse_down(MouseButton::Left) {
            if let Some(mut manipulation) = self.manipulation.take() {
                match self.manipulate(&mut manipulation, camera, scene, mouse) {
                    Ok(()) => response.manipulated = Some(manipulation.target),
                    Err(e) => {
                        log::trace!("{} drag skipped this frame: {e}", self.mode);
                        response.stalled = Some(e);
                    }
                }
                self.manipulation = Some(manipulation);
            }
        } else {
            self.hovered = self.pick(camera, scene, mouse, CollisionFilter::Default);
            let mode = if self.is_visible() {
                let part = self.pick(camera, scene, mouse, CollisionFilter::Gizmo);
                self.rig.mode_for(part)
            } else {
                GizmoMode::None
            };
            response.mode_changed = self.set_mode(mode);
        }

        if self.config.debug_visualization && self.is_visible() {
            self.draw_debug(camera, drawer, mouse);
        }

        self.follow_manipulation(scene);
        self.orient(camera, scene);
        self.previous_mouse = mouse;

        self.fill(response)
    }

    /// Change the selection. The gizmo jumps to the new selection with no
    /// rotation; clearing the selection hides it.
    ///
    /// Returns `true` if the selection changed.
    pub fn select<S>(&mut self, entity: Option<EntityId>, scene: &mut S) -> bool
    where
        S: TransformStore + ?Sized,
    {
        if entity == self.selected {
            return false;
        }
        self.selected = entity;
        self.manipulation = None;
        self.gizmo_offset = Vec3::zeros();

        match entity {
            Some(entity) => {
                let root = self.rig.root();
                match scene.world_transform(entity) {
                    Some(transform) => {
                        scene.set_world_position(root, transform.position);
                        scene.set_world_rotation(root, Quat::identity());
                        self.gizmo.position = transform.position;
                        self.gizmo.rotation = Quat::identity();
                    }
                    None => log::warn!("Selected entity {entity} has no transform"),
                }
                log::debug!("Selected {entity}");
            }
            None => {
                self.set_mode(GizmoMode::None);
                log::debug!("Selection cleared");
            }
        }
        true
    }

    /// Returns `true` if the mode changed.
    pub fn set_mode(&mut self, mode: GizmoMode) -> bool {
        if mode == self.mode {
            return false;
        }
        log::trace!("Gizmo mode {} -> {}", self.mode, mode);
        self.mode = mode;
        true
    }

    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    pub fn is_translation_mode(&self) -> bool {
        self.mode.is_translation()
    }

    pub fn is_rotation_mode(&self) -> bool {
        self.mode.is_rotation()
    }

    pub fn is_planar_translation_mode(&self) -> bool {
        self.mode.is_planar_translation()
    }

    pub fn is_axial_translation_mode(&self) -> bool {
        self.mode.is_axial_translation()
    }

    pub fn is_manipulating(&self) -> bool {
        self.manipulation.is_some()
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn hovered(&self) -> Option<EntityId> {
        self.hovered
    }

    pub fn is_visible(&self) -> bool {
        self.selected.is_some()
    }

    pub fn rig(&self) -> &GizmoRig {
        &self.rig
    }

    pub fn config(&self) -> &GizmoConfig {
        &self.config
    }

    /// Gizmo root world transform as of the last update.
    pub fn gizmo_transform(&self) -> Transform {
        self.gizmo
    }

    /// Emissive intensity for the part of `mode`.
    pub fn part_intensity(&self, mode: GizmoMode) -> f32 {
        if mode != GizmoMode::None && mode == self.mode {
            self.config.highlight_intensity
        } else {
            self.config.idle_intensity
        }
    }

    /// World-space manipulation axis of `mode`.
    ///
    /// Fixed axes follow the gizmo rotation. Planar translation modes return
    /// a component mask. [`GizmoMode::RotationCamera`] returns the direction
    /// from the gizmo to the camera.
    pub fn get_transform_axis(&self, mode: GizmoMode, camera: &Camera) -> Vec3 {
        match mode.local_axis() {
            Some(axis) if mode.is_camera_relative() => axis,
            Some(axis) => self.gizmo.rotation * axis,
            None => self.to_camera(camera).unwrap_or_else(Vec3::zeros),
        }
    }

    /// Drag plane of the current translation mode, through the gizmo.
    ///
    /// During a drag this is the plane captured when the drag began.
    pub fn translation_plane(&self, camera: &Camera) -> Option<Plane> {
        if !self.mode.is_translation() {
            return None;
        }
        if let Some(manipulation) = &self.manipulation {
            return Some(manipulation.plane);
        }
        self.translation_normal(self.mode, camera)
            .map(|normal| Plane::new(self.gizmo.position, normal))
    }

    fn fill(&self, mut response: GizmoResponse) -> GizmoResponse {
        response.mode = self.mode;
        response.selected = self.selected;
        response.hovered = self.hovered;
        response.visible = self.is_visible();
        response
    }

    fn to_camera(&self, camera: &Camera) -> Option<Vec3> {
        (camera.position - self.gizmo.position).try_normalize(EPSILON)
    }

    fn translation_normal(&self, mode: GizmoMode, camera: &Camera) -> Option<Vec3> {
        if mode == GizmoMode::TranslationPlaneCamera {
            self.to_camera(camera)
        } else {
            mode.local_translation_normal()
                .map(|normal| self.gizmo.rotation * normal)
        }
    }

    fn reference_plane(&self, camera: &Camera) -> Option<Plane> {
        if let Some(manipulation) = &self.manipulation {
            return Some(manipulation.plane);
        }
        if self.mode.is_rotation() {
            let axis = self.get_transform_axis(self.mode, camera);
            return Some(Plane::new(self.gizmo.position, axis));
        }
        self.translation_plane(camera)
    }

    fn pick<S>(&self, camera: &Camera, scene: &S, mouse: Vec2, filter: CollisionFilter) -> Option<EntityId>
    where
        S: Raycaster + ?Sized,
    {
        let (near, far) = camera.mouse_segment(mouse)?;
        scene.raycast(near, far, filter).map(|hit| hit.owner)
    }

    fn begin_manipulation<S>(
        &self,
        input: &dyn InputState,
        camera: &Camera,
        scene: &S,
        mouse: Vec2,
    ) -> Option<Manipulation>
    where
        S: TransformStore + ?Sized,
    {
        let target = if input.is_shift_down() {
            self.rig.root()
        } else {
            self.selected?
        };
        let Some(snapshot) = scene.world_transform(target) else {
            log::warn!("Cannot drag {target}: it has no transform");
            return None;
        };
        let axis = self.get_transform_axis(self.mode, camera);

        let (plane, drag) = if self.mode.is_translation() {
            let plane = Plane::new(snapshot.position, self.translation_normal(self.mode, camera)?);
            let offset = match self.translation_offset(camera, mouse, &plane, axis, &snapshot) {
                Ok(offset) => offset,
                Err(e) => {
                    log::trace!("{} drag not started: {e}", self.mode);
                    return None;
                }
            };
            (plane, Drag::Translation { offset })
        } else if self.mode.is_rotation() {
            let plane = Plane::new(self.gizmo.position, axis);
            let drag = Drag::Rotation {
                accumulated: 0.0,
                gizmo_offset: self.gizmo_offset,
            };
            (plane, drag)
        } else {
            return None;
        };

        log::debug!("{} drag of {target} started", self.mode);
        Some(Manipulation {
            target,
            snapshot,
            axis,
            plane,
            drag,
        })
    }

    fn translation_offset(
        &self,
        camera: &Camera,
        mouse: Vec2,
        plane: &Plane,
        axis: Vec3,
        snapshot: &Transform,
    ) -> Result<Vec3, NoIntersection> {
        let ray = camera.mouse_ray(mouse).ok_or(NoIntersection::Degenerate)?;
        let hit = intersect_ray_plane(&ray, plane)?;
        if self.mode.is_axial_translation() {
            closest_point_to_axis(
                axis,
                plane.normal,
                snapshot.position,
                hit,
                self.config.axis_extent,
            )
        } else {
            Ok(hit - snapshot.position)
        }
    }

    fn manipulate<S>(
        &mut self,
        manipulation: &mut Manipulation,
        camera: &Camera,
        scene: &mut S,
        mouse: Vec2,
    ) -> Result<(), NoIntersection>
    where
        S: TransformStore + ?Sized,
    {
        let start = manipulation.snapshot;
        let axis = manipulation.axis;

        match &mut manipulation.drag {
            Drag::Translation { offset } => {
                let ray = camera.mouse_ray(mouse).ok_or(NoIntersection::Degenerate)?;
                let p = intersect_ray_plane(&ray, &manipulation.plane)?;
                let position = if self.mode.is_planar_translation() {
                    math::mul_components(&(p - *offset), &axis)
                        + math::mul_components(&start.position, &(Vec3::repeat(1.0) - axis))
                } else {
                    closest_point_to_axis(
                        axis,
                        manipulation.plane.normal,
                        start.position,
                        p,
                        self.config.axis_extent,
                    )? - *offset
                        + start.position
                };
                scene.set_world_position(manipulation.target, position);
            }
            Drag::Rotation {
                accumulated,
                gizmo_offset,
            } => {
                let center = camera
                    .project_to_screen(&self.gizmo.position)
                    .ok_or(NoIntersection::Degenerate)?;
                let mut delta = angle_between_2d(self.previous_mouse - center, mouse - center);
                if camera.faces_away(&axis) {
                    delta = -delta;
                }
                *accumulated += delta;

                let rotation = math::quat_from_axis_angle(axis, -*accumulated);
                scene.set_world_rotation(manipulation.target, start.rotation * rotation);
                if manipulation.target != self.rig.root() {
                    self.gizmo_offset = rotation * *gizmo_offset;
                }
            }
        }
        Ok(())
    }

    /// Keep the gizmo and the selection together after a drag step.
    fn follow_manipulation<S>(&mut self, scene: &mut S)
    where
        S: TransformStore + ?Sized,
    {
        let Some(manipulation) = self.manipulation else {
            return;
        };
        let root = self.rig.root();

        if manipulation.target == root {
            // Moving the gizmo alone changes where it sits relative to the selection.
            let gizmo = scene.world_transform(root);
            let selected = self.selected.and_then(|e| scene.world_transform(e));
            if let (Some(gizmo), Some(selected)) = (gizmo, selected) {
                self.gizmo_offset = selected.position - gizmo.position;
            }
        } else if self.mode.is_rotation() {
            // Orbit the selection around the gizmo.
            scene.set_world_position(manipulation.target, self.gizmo.position + self.gizmo_offset);
        } else if let Some(target) = scene.world_transform(manipulation.target) {
            scene.set_world_position(root, target.position - self.gizmo_offset);
        }

        if let Some(gizmo) = scene.world_transform(root) {
            self.gizmo = gizmo;
        }
    }

    /// Apply the fixed gizmo scale and turn the camera ring towards the viewer.
    fn orient<S>(&mut self, camera: &Camera, scene: &mut S)
    where
        S: TransformStore + ?Sized,
    {
        let root = self.rig.root();
        scene.set_world_scale(root, Vec3::repeat(self.config.scale));

        let Some(ring) = self.rig.part(GizmoMode::RotationCamera) else {
            return;
        };
        let ring_position = scene
            .world_transform(ring)
            .map_or(self.gizmo.position, |t| t.position);
        let facing = camera_facing_rotation(camera.position, ring_position);
        // The ring is modelled lying in XZ; stand it up so its normal is +Z.
        let upright = math::quat_from_yaw_pitch_roll(0.0, FRAC_PI_2, 0.0);
        scene.set_local_rotation(ring, self.gizmo.rotation.inverse() * facing * upright);
    }

    fn draw_debug(&self, camera: &Camera, drawer: &DebugDrawRegistry, mouse: Vec2) {
        let lifetime = Some(0.0);
        let origin = self.gizmo.position;

        let plane = self.reference_plane(camera);
        let ray = camera.mouse_ray(mouse);
        if let (Some(plane), Some(ray)) = (plane, ray) {
            if let Ok(p) = intersect_ray_plane(&ray, &plane) {
                drawer.draw_cube(p, self.config.marker_size, Color::YELLOW, lifetime);
                drawer.draw_plane(origin, plane.normal, self.config.plane_size, Color::YELLOW, lifetime);
            }
        }

        if self.mode != GizmoMode::None {
            let axis = self.get_transform_axis(self.mode, camera) * self.config.axis_line_length;
            drawer.draw_line(origin - axis, origin + axis, Color::RED, lifetime);
        }

        for (mode, color) in [
            (GizmoMode::TranslationX, Color::RED),
            (GizmoMode::TranslationY, Color::GREEN),
            (GizmoMode::TranslationZ, Color::BLUE),
        ] {
            drawer.draw_axis(origin, self.get_transform_axis(mode, camera), color, lifetime);
        }
    }
}

impl std::fmt::Debug for GizmoController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GizmoController")
            .field("mode", &self.mode)
            .field("selected", &self.selected)
            .field("manipulating", &self.is_manipulating())
            .field("gizmo", &self.gizmo)
            .finish()
    }
}
