//! In-memory host scene used by the demos.
//!
//! Entities form a parent/child hierarchy of local transforms. Colliders are
//! spheres positioned in their owner's local space, so they follow the owner
//! through translation, rotation and scale.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use stagehand_core::Transform;
use stagehand_core::math::{Quat, Vec3, mul_components};
use stagehand_core::scene::{
    CollisionFilter, EntityId, RaycastHit, Raycaster, SceneGraph, TransformStore,
};
use stagehand_debug_drawer::{BufferAllocator, DebugVertex, LineMeshBuffers, UploadError};
use stagehand_gizmo::{GizmoMode, PrefabInstance};

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<EntityId>,
    local: Transform,
}

#[derive(Debug, Clone, Copy)]
struct Collider {
    owner: EntityId,
    offset: Vec3,
    radius: f32,
    filter: CollisionFilter,
}

#[derive(Debug, Default)]
struct World {
    next_id: u64,
    nodes: HashMap<EntityId, Node>,
    colliders: Vec<Collider>,
}

impl World {
    fn spawn(&mut self, name: &str, parent: Option<EntityId>, local: Transform) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.nodes.insert(
            id,
            Node {
                name: name.to_owned(),
                parent,
                local,
            },
        );
        id
    }

    fn world(&self, entity: EntityId) -> Option<Transform> {
        let node = self.nodes.get(&entity)?;
        match node.parent {
            None => Some(node.local),
            Some(parent) => Some(compose(&self.world(parent)?, &node.local)),
        }
    }

    fn parent_world(&self, entity: EntityId) -> Option<Transform> {
        let parent = self.nodes.get(&entity)?.parent?;
        self.world(parent)
    }

    fn despawn(&mut self, entity: EntityId) {
        let children: Vec<_> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.parent == Some(entity))
            .map(|(id, _)| *id)
            .collect();
        for child in children {
            self.despawn(child);
        }
        self.nodes.remove(&entity);
        self.colliders.retain(|c| c.owner != entity);
    }
}

fn compose(parent: &Transform, local: &Transform) -> Transform {
    Transform {
        position: parent.position + parent.rotation * mul_components(&parent.scale, &local.position),
        rotation: parent.rotation * local.rotation,
        scale: mul_components(&parent.scale, &local.scale),
    }
}

fn div_components(a: &Vec3, b: &Vec3) -> Vec3 {
    a.zip_map(b, |a, b| if b.abs() > f32::EPSILON { a / b } else { a })
}

/// Gizmo part placement in the root's local space: entity position,
/// collider offset in the part's own frame, collider radius.
const GIZMO_LAYOUT: [(GizmoMode, Vec3, Vec3, f32); 11] = [
    (GizmoMode::TranslationX, Vec3::new(1.6, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0), 0.25),
    (GizmoMode::TranslationY, Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, 0.0, 0.0), 0.25),
    (GizmoMode::TranslationZ, Vec3::new(0.0, 0.0, 1.6), Vec3::new(0.0, 0.0, 0.0), 0.25),
    (GizmoMode::TranslationPlaneXY, Vec3::new(0.6, 0.6, 0.0), Vec3::new(0.0, 0.0, 0.0), 0.2),
    (GizmoMode::TranslationPlaneYZ, Vec3::new(0.0, 0.6, 0.6), Vec3::new(0.0, 0.0, 0.0), 0.2),
    (GizmoMode::TranslationPlaneXZ, Vec3::new(0.6, 0.0, 0.6), Vec3::new(0.0, 0.0, 0.0), 0.2),
    (GizmoMode::TranslationPlaneCamera, Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0), 0.15),
    (GizmoMode::RotationX, Vec3::new(0.0, -0.85, 0.85), Vec3::new(0.0, 0.0, 0.0), 0.15),
    (GizmoMode::RotationY, Vec3::new(0.85, 0.0, -0.85), Vec3::new(0.0, 0.0, 0.0), 0.15),
    (GizmoMode::RotationZ, Vec3::new(-0.85, 0.85, 0.0), Vec3::new(0.0, 0.0, 0.0), 0.15),
    // The camera ring is modelled lying in its local XZ plane.
    (GizmoMode::RotationCamera, Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.4, 0.0, 0.0), 0.15),
];

/// Shared handle to an in-memory scene.
///
/// Clones refer to the same scene, so one handle can be given to the debug
/// drawer as its [`SceneGraph`] while another is passed to the gizmo.
#[derive(Debug, Clone, Default)]
pub struct Sandbox {
    world: Arc<Mutex<World>>,
}

impl Sandbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&self, name: &str, parent: Option<EntityId>, local: Transform) -> EntityId {
        self.world.lock().spawn(name, parent, local)
    }

    /// Attach a sphere collider at `offset` in the owner's local space.
    pub fn add_collider(&self, owner: EntityId, offset: Vec3, radius: f32, filter: CollisionFilter) {
        self.world.lock().colliders.push(Collider {
            owner,
            offset,
            radius,
            filter,
        });
    }

    /// Spawn the transform gizmo: a root named `TransformGizmo` and one
    /// collider-carrying child per part.
    pub fn instantiate_gizmo(&self) -> PrefabInstance {
        let mut world = self.world.lock();
        let root = world.spawn("TransformGizmo", None, Transform::identity());
        let mut prefab = PrefabInstance::new(vec![root]);
        for (mode, position, offset, radius) in GIZMO_LAYOUT {
            let Some(name) = mode.part_name() else {
                continue;
            };
            let part = world.spawn(name, Some(root), Transform::from_position(position));
            world.colliders.push(Collider {
                owner: part,
                offset,
                radius,
                filter: CollisionFilter::Gizmo,
            });
            prefab = prefab.with_child(name, part);
        }
        prefab
    }

    pub fn name(&self, entity: EntityId) -> Option<String> {
        self.world.lock().nodes.get(&entity).map(|n| n.name.clone())
    }

    pub fn children(&self, parent: Option<EntityId>) -> Vec<EntityId> {
        let world = self.world.lock();
        let mut children: Vec<_> = world
            .nodes
            .iter()
            .filter(|(_, node)| node.parent == parent)
            .map(|(id, _)| *id)
            .collect();
        children.sort_unstable();
        children
    }

    pub fn node_count(&self) -> usize {
        self.world.lock().nodes.len()
    }
}

impl SceneGraph for Sandbox {
    fn attach_node(&self, parent: Option<EntityId>, name: &str) -> EntityId {
        let id = self.spawn(name, parent, Transform::identity());
        log::debug!("Attached node {name} ({id})");
        id
    }

    fn detach_node(&self, node: EntityId) {
        log::debug!("Detached node {node}");
        self.world.lock().despawn(node);
    }
}

impl Raycaster for Sandbox {
    fn raycast(&self, from: Vec3, to: Vec3, filter: CollisionFilter) -> Option<RaycastHit> {
        let world = self.world.lock();
        let dir = to - from;
        let len_sq = dir.norm_squared();
        if len_sq <= f32::EPSILON {
            return None;
        }

        world
            .colliders
            .iter()
            .filter(|c| c.filter == filter)
            .filter_map(|c| {
                let owner = world.world(c.owner)?;
                let center = owner.position + owner.rotation * mul_components(&owner.scale, &c.offset);
                let radius = c.radius * owner.scale.amax();
                let t = ((center - from).dot(&dir) / len_sq).clamp(0.0, 1.0);
                let closest = from + dir * t;
                ((closest - center).norm() <= radius).then_some((
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

impl TransformStore for Sandbox {
    fn world_transform(&self, entity: EntityId) -> Option<Transform> {
        self.world.lock().world(entity)
    }

    fn set_world_position(&mut self, entity: EntityId, position: Vec3) {
        let mut world = self.world.lock();
        let local = match world.parent_world(entity) {
            Some(parent) => div_components(
                &(parent.rotation.inverse() * (position - parent.position)),
                &parent.scale,
            ),
            None => position,
        };
        if let Some(node) = world.nodes.get_mut(&entity) {
            node.local.position = local;
        }
    }

    fn set_world_rotation(&mut self, entity: EntityId, rotation: Quat) {
        let mut world = self.world.lock();
        let local = match world.parent_world(entity) {
            Some(parent) => parent.rotation.inverse() * rotation,
            None => rotation,
        };
        if let Some(node) = world.nodes.get_mut(&entity) {
            node.local.rotation = local;
        }
    }

    fn set_world_scale(&mut self, entity: EntityId, scale: Vec3) {
        let mut world = self.world.lock();
        let local = match world.parent_world(entity) {
            Some(parent) => div_components(&scale, &parent.scale),
            None => scale,
        };
        if let Some(node) = world.nodes.get_mut(&entity) {
            node.local.scale = local;
        }
    }

    fn set_local_rotation(&mut self, entity: EntityId, rotation: Quat) {
        if let Some(node) = self.world.lock().nodes.get_mut(&entity) {
            node.local.rotation = rotation;
        }
    }
}

/// Buffer allocator that keeps nothing and logs what would reach the GPU.
#[derive(Debug, Default)]
pub struct LoggingAllocator;

impl BufferAllocator for LoggingAllocator {
    fn create_line_mesh(
        &self,
        label: &str,
        _color: stagehand_core::Color,
    ) -> Result<Box<dyn LineMeshBuffers>, UploadError> {
        log::info!("Created line mesh buffers '{label}'");
        Ok(Box::new(LoggingBuffers {
            label: label.to_owned(),
            vertex_capacity: 0,
            index_capacity: 0,
        }))
    }
}

struct LoggingBuffers {
    label: String,
    vertex_capacity: usize,
    index_capacity: usize,
}

impl LineMeshBuffers for LoggingBuffers {
    fn ensure_capacity(&mut self, vertices: usize, indices: usize) -> Result<(), UploadError> {
        if vertices > self.vertex_capacity || indices > self.index_capacity {
            log::debug!(
                "'{}' buffers grown to {vertices} vertices / {indices} indices",
                self.label
            );
            self.vertex_capacity = vertices;
            self.index_capacity = indices;
        }
        Ok(())
    }

    fn upload(&mut self, vertices: &[DebugVertex], indices: &[u32]) -> Result<(), UploadError> {
        if vertices.len() > self.vertex_capacity || indices.len() > self.index_capacity {
            return Err(UploadError::Write(format!(
                "'{}' upload of {} vertices exceeds capacity {}",
                self.label,
                vertices.len(),
                self.vertex_capacity
            )));
        }
        log::trace!(
            "'{}' upload: {} vertex bytes, {} index bytes",
            self.label,
            bytemuck::cast_slice::<DebugVertex, u8>(vertices).len(),
            bytemuck::cast_slice::<u32, u8>(indices).len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::math::quat_from_axis_angle;
    use std::f32::consts::FRAC_PI_2;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).norm() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn children_follow_parent_transform() {
        let mut sandbox = Sandbox::new();
        let parent = sandbox.spawn("parent", None, Transform::identity());
        let child = sandbox.spawn("child", Some(parent), Transform::from_position(Vec3::x()));

        sandbox.set_world_position(parent, Vec3::new(0.0, 2.0, 0.0));
        sandbox.set_world_scale(parent, Vec3::repeat(2.0));
        sandbox.set_world_rotation(parent, quat_from_axis_angle(Vec3::y(), FRAC_PI_2));

        let world = sandbox.world_transform(child).unwrap();
        assert_close(world.position, Vec3::new(0.0, 2.0, -2.0));
        assert_close(world.scale, Vec3::repeat(2.0));
    }

    #[test]
    fn world_position_of_child_is_exact() {
        let mut sandbox = Sandbox::new();
        let parent = sandbox.spawn("parent", None, Transform::from_position(Vec3::new(1.0, 1.0, 1.0)));
        sandbox.set_world_scale(parent, Vec3::repeat(0.5));
        let child = sandbox.spawn("child", Some(parent), Transform::identity());

        sandbox.set_world_position(child, Vec3::new(3.0, 0.0, -1.0));
        assert_close(
            sandbox.world_transform(child).unwrap().position,
            Vec3::new(3.0, 0.0, -1.0),
        );
    }

    #[test]
    fn raycast_respects_filter_and_picks_nearest() {
        let sandbox = Sandbox::new();
        let near = sandbox.spawn("near", None, Transform::from_position(Vec3::new(0.0, 0.0, 2.0)));
        let far = sandbox.spawn("far", None, Transform::identity());
        sandbox.add_collider(near, Vec3::zeros(), 0.5, CollisionFilter::Gizmo);
        sandbox.add_collider(far, Vec3::zeros(), 0.5, CollisionFilter::Default);

        let from = Vec3::new(0.0, 0.0, 10.0);
        let to = Vec3::new(0.0, 0.0, -10.0);
        assert_eq!(sandbox.raycast(from, to, CollisionFilter::Default).unwrap().owner, far);
        assert_eq!(sandbox.raycast(from, to, CollisionFilter::Gizmo).unwrap().owner, near);
        assert!(
            sandbox
                .raycast(Vec3::new(5.0, 0.0, 10.0), Vec3::new(5.0, 0.0, -10.0), CollisionFilter::Default)
                .is_none()
        );
    }

    #[test]
    fn gizmo_prefab_binds_every_part() {
        let sandbox = Sandbox::new();
        let prefab = sandbox.instantiate_gizmo();
        assert_eq!(prefab.roots.len(), 1);
        assert_eq!(sandbox.children(Some(prefab.roots[0])).len(), GizmoMode::PARTS.len());
        assert!(stagehand_gizmo::GizmoRig::from_prefab(&prefab).is_ok());
    }

    #[test]
    fn detach_removes_subtree() {
        let sandbox = Sandbox::new();
        let root = sandbox.attach_node(None, "DebugRoot");
        sandbox.attach_node(Some(root), "Red");
        sandbox.attach_node(Some(root), "Blue");
        assert_eq!(sandbox.node_count(), 3);

        sandbox.detach_node(root);
        assert_eq!(sandbox.node_count(), 0);
    }
}
