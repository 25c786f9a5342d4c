//! Headless gizmo demo.
//!
//! Builds an in-memory scene with one crate, selects it, drags it along X
//! with the translation arrow and turns it around Y with the rotation ring,
//! logging what the gizmo and debug drawer do each frame.
//!
//! Run with `RUST_LOG=debug cargo run --bin headless_gizmo` for per-frame
//! output. Settings are read from `stagehand.toml` in the working directory.

use std::f32::consts::FRAC_PI_4;
use std::path::Path;
use std::sync::Arc;

use stagehand_core::Transform;
use stagehand_core::input::{InputSnapshot, MouseButton};
use stagehand_core::math::{Vec2, Vec3, quat_from_axis_angle};
use stagehand_core::scene::{CollisionFilter, EntityId, TransformStore};
use stagehand_debug_drawer::{DebugDrawRegistry, DrawStats};
use stagehand_demos::{LoggingAllocator, Sandbox, Settings, load_or_default};
use stagehand_gizmo::{Camera, GizmoController, GizmoError, GizmoMode, GizmoResponse, GizmoRig};

struct Session {
    sandbox: Sandbox,
    drawer: DebugDrawRegistry,
    gizmo: GizmoController,
    camera: Camera,
    delta_seconds: f32,
    frame: u64,
}

impl Session {
    fn frame(&mut self, input: &InputSnapshot) -> GizmoResponse {
        self.frame += 1;
        let expired = self.drawer.per_frame_update(self.delta_seconds);
        let response = self
            .gizmo
            .update(input, &self.camera, &mut self.sandbox, &self.drawer);
        let stats: DrawStats = self.drawer.draw_phase();

        if response.mode_changed {
            log::info!("frame {}: gizmo mode -> {}", self.frame, response.mode);
        }
        if let Some(reason) = response.stalled {
            log::debug!("frame {}: drag stalled ({reason})", self.frame);
        }
        log::debug!(
            "frame {}: {} shapes expired, {} collections, {} rebuilt, {} uploaded, {} indices",
            self.frame,
            expired,
            stats.collections,
            stats.rebuilt,
            stats.uploaded,
            stats.indices
        );
        response
    }

    fn screen_of(&self, point: Vec3) -> Vec2 {
        self.camera
            .project_to_screen(&point)
            .unwrap_or_else(|| Vec2::new(0.5, 0.5))
    }

    fn part_position(&self, mode: GizmoMode) -> Option<Vec3> {
        let part = self.gizmo.rig().part(mode)?;
        Some(self.sandbox.world_transform(part)?.position)
    }

    fn click(&mut self, at: Vec2) -> GizmoResponse {
        self.frame(&InputSnapshot::at(at));
        let pressed = InputSnapshot::at(at).press(MouseButton::Left);
        self.frame(&pressed);
        self.frame(&pressed.next_frame(at).release(MouseButton::Left))
    }

    /// Hover `path[0]`, press, walk the mouse along `path`, release.
    fn drag(&mut self, expected: GizmoMode, path: &[Vec2]) {
        let Some((&start, rest)) = path.split_first() else {
            return;
        };
        let hover = self.frame(&InputSnapshot::at(start));
        if hover.mode != expected {
            log::warn!("Expected to grab {expected}, hovering {} instead", hover.mode);
        }

        let mut input = InputSnapshot::at(start).press(MouseButton::Left);
        self.frame(&input);
        for &mouse in rest {
            input = input.next_frame(mouse);
            self.frame(&input);
        }
        let last = path.last().copied().unwrap_or(start);
        self.frame(&input.next_frame(last).release(MouseButton::Left));
    }

    fn log_transform(&self, label: &str, entity: EntityId) {
        if let Some(t) = self.sandbox.world_transform(entity) {
            let (roll, pitch, yaw) = t.rotation.euler_angles();
            log::info!(
                "{label}: position ({:.3}, {:.3}, {:.3}), euler ({:.1}°, {:.1}°, {:.1}°)",
                t.position.x,
                t.position.y,
                t.position.z,
                roll.to_degrees(),
                pitch.to_degrees(),
                yaw.to_degrees()
            );
        }
    }
}

fn run(settings: &Settings) -> Result<(), GizmoError> {
    let sandbox = Sandbox::new();
    let crate_entity = sandbox.spawn(
        "Crate",
        None,
        Transform::from_position(Vec3::new(0.0, 0.5, 0.0)),
    );
    sandbox.add_collider(crate_entity, Vec3::zeros(), 0.5, CollisionFilter::Default);

    let rig = GizmoRig::from_prefab(&sandbox.instantiate_gizmo())?;
    let drawer = DebugDrawRegistry::new(
        settings.debug_draw.clone(),
        Arc::new(sandbox.clone()),
        Arc::new(LoggingAllocator),
    );
    let camera = Camera::look_at(
        Vec3::new(4.0, 3.0, 6.0),
        Vec3::zeros(),
        FRAC_PI_4,
        16.0 / 9.0,
        0.1,
        100.0,
    );
    let mut session = Session {
        sandbox,
        drawer,
        gizmo: GizmoController::new(rig, settings.gizmo.clone()),
        camera,
        delta_seconds: settings.script.delta_seconds,
        frame: 0,
    };
    let steps = settings.script.drag_frames.max(1);

    log::info!("Selecting the crate");
    let crate_screen = session.screen_of(Vec3::new(0.0, 0.5, 0.0));
    let response = session.click(crate_screen);
    log::info!("Selected {:?}, gizmo visible: {}", response.selected, response.visible);
    session.log_transform("Crate", crate_entity);

    if let Some(arrow) = session.part_position(GizmoMode::TranslationX) {
        log::info!("Dragging along X by {}", settings.script.drag_distance);
        let offset = Vec3::x() * settings.script.drag_distance;
        let path: Vec<_> = (0..=steps)
            .map(|i| arrow + offset * (i as f32 / steps as f32))
            .map(|p| session.screen_of(p))
            .collect();
        session.drag(GizmoMode::TranslationX, &path);
        session.log_transform("Crate", crate_entity);
    }

    let center = session.gizmo.gizmo_transform().position;
    if let Some(ring) = session.part_position(GizmoMode::RotationY) {
        log::info!(
            "Turning around Y by {:.1}°",
            settings.script.turn_angle.to_degrees()
        );
        let path: Vec<_> = (0..=steps)
            .map(|i| settings.script.turn_angle * (i as f32 / steps as f32))
            .map(|angle| center + quat_from_axis_angle(Vec3::y(), angle) * (ring - center))
            .map(|p| session.screen_of(p))
            .collect();
        session.drag(GizmoMode::RotationY, &path);
        session.log_transform("Crate", crate_entity);
    }

    log::info!("Clearing the selection");
    session.click(Vec2::new(0.02, 0.02));
    for _ in 0..2 {
        session.frame(&InputSnapshot::at(Vec2::new(0.02, 0.02)));
    }
    log::info!(
        "Done after {} frames: {} debug shapes, {} collections",
        session.frame,
        session.drawer.shape_count(),
        session.drawer.collection_count()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = load_or_default(Path::new("stagehand.toml"));
    if let Err(e) = run(&settings) {
        log::error!("Gizmo setup failed: {e}");
        std::process::exit(1);
    }
}
