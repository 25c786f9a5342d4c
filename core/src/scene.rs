//! Traits through which the overlay reaches into the host engine's scene.
//!
//! The overlay never owns a scene graph, a physics world, or entity
//! transforms. The host implements these traits over whatever it has.

use crate::math::{Quat, Vec3};
use crate::transform::Transform;

/// Opaque handle to an entity or node in the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which colliders a raycast may hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollisionFilter {
    /// Regular scene content.
    #[default]
    Default,
    /// Gizmo part colliders only.
    Gizmo,
}

/// Successful raycast result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Entity owning the collider that was hit.
    pub owner: EntityId,
    /// World-space hit point.
    pub point: Vec3,
}

/// Node attachment in the host scene graph.
///
/// Implementations must be callable from any thread; shapes may be added to
/// the debug drawer from physics callbacks or background logic.
pub trait SceneGraph: Send + Sync {
    /// Create a named node under `parent` (or at the scene root when `None`).
    fn attach_node(&self, parent: Option<EntityId>, name: &str) -> EntityId;

    /// Remove a node and its children from the scene.
    fn detach_node(&self, node: EntityId);
}

/// Ray queries against scene colliders.
pub trait Raycaster {
    /// Cast the segment `from -> to` and return the closest hit passing `filter`.
    fn raycast(&self, from: Vec3, to: Vec3, filter: CollisionFilter) -> Option<RaycastHit>;
}

/// Read and write access to entity transforms.
pub trait TransformStore {
    /// World-space transform of `entity`, or `None` if it does not exist.
    fn world_transform(&self, entity: EntityId) -> Option<Transform>;

    fn set_world_position(&mut self, entity: EntityId, position: Vec3);

    fn set_world_rotation(&mut self, entity: EntityId, rotation: Quat);

    fn set_world_scale(&mut self, entity: EntityId, scale: Vec3);

    /// Set rotation relative to the entity's parent.
    fn set_local_rotation(&mut self, entity: EntityId, rotation: Quat);
}
