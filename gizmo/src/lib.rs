//! Transform gizmo for the Stagehand editor overlay.
//!
//! The gizmo is a prefab instantiated by the host: one root entity with
//! eleven named parts (three arrows, three plane squares, a camera square,
//! three rings and a camera ring). [`GizmoRig`] binds those entities to
//! [`GizmoMode`]s and [`GizmoController`] turns mouse input into translation
//! or rotation of the selected entity.
//!
//! The host supplies the scene through [`Raycaster`] and [`TransformStore`]
//! and a [`Camera`] each frame:
//!
//! ```ignore
//! let rig = GizmoRig::from_prefab(&host.instantiate("Gizmo/TransformGizmo"))?;
//! let mut gizmo = GizmoController::new(rig, config.gizmo);
//!
//! // Every frame:
//! let response = gizmo.update(&input, &camera, &mut scene, &drawer);
//! if response.mode_changed {
//!     host.refresh_highlights(&gizmo);
//! }
//! ```
//!
//! [`Raycaster`]: stagehand_core::scene::Raycaster
//! [`TransformStore`]: stagehand_core::scene::TransformStore

pub mod camera;
pub mod config;
pub mod controller;
pub mod math;
pub mod mode;
pub mod rig;

pub use camera::Camera;
pub use config::GizmoConfig;
pub use controller::{GizmoController, GizmoResponse};
pub use math::{NoIntersection, Plane, Ray};
pub use mode::GizmoMode;
pub use rig::{GizmoError, GizmoRig, PrefabInstance};
