use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use stagehand_core::Color;
use stagehand_core::scene::EntityId;

use crate::buffers::LineMeshBuffers;
use crate::error::{DebugDrawError, UploadError};
use crate::shape::{Segment, Shape, ShapeChange, ShapeEdit, ShapeId};
use crate::vertex::DebugVertex;

/// CPU-side line-list mesh of one collection.
#[derive(Debug, Clone, Default)]
pub struct LineMesh {
    pub vertices: Vec<DebugVertex>,
    pub indices: Vec<u32>,
    /// Incremented on every rebuild. Version 0 is the never-built mesh.
    pub version: u64,
    /// Reserved vertex slots; grows by doubling, never shrinks.
    pub vertex_capacity: usize,
    /// Reserved index slots; grows by doubling, never shrinks.
    pub index_capacity: usize,
    /// Shapes this mesh was built from, in id order.
    pub shapes: Vec<ShapeId>,
}

/// Result of [`ShapeCollection::apply_edit`].
#[derive(Debug)]
pub enum EditOutcome {
    Unchanged,
    Updated,
    /// The shape changed color and was taken out of this collection.
    Relocate(Shape),
}

/// All shapes sharing one color, batched into a single line mesh.
///
/// Shapes may be added, removed and edited from any thread. The shape set is
/// guarded by a mutex; [`rebuild`](Self::rebuild) copies the segments out
/// under the lock and does the deduplication after releasing it.
pub struct ShapeCollection {
    color: Color,
    node: Option<EntityId>,
    shapes: Mutex<BTreeMap<ShapeId, Shape>>,
    dirty: AtomicBool,
    mesh: RwLock<LineMesh>,
    buffers: Mutex<Option<Box<dyn LineMeshBuffers>>>,
    uploaded_version: AtomicU64,
}

impl ShapeCollection {
    /// Create an empty collection without scene node or GPU buffers.
    pub fn new(color: Color, initial_capacity: usize) -> Self {
        let capacity = initial_capacity.max(2);
        Self {
            color,
            node: None,
            shapes: Mutex::new(BTreeMap::new()),
            dirty: AtomicBool::new(false),
            mesh: RwLock::new(LineMesh {
                vertices: Vec::with_capacity(capacity),
                indices: Vec::with_capacity(capacity),
                version: 0,
                vertex_capacity: capacity,
                index_capacity: capacity,
                shapes: Vec::new(),
            }),
            buffers: Mutex::new(None),
            uploaded_version: AtomicU64::new(0),
        }
    }

    pub(crate) fn with_resources(
        mut self,
        node: EntityId,
        buffers: Option<Box<dyn LineMeshBuffers>>,
    ) -> Self {
        self.node = Some(node);
        self.buffers = Mutex::new(buffers);
        self
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Scene node this collection renders through, if attached.
    pub fn node(&self) -> Option<EntityId> {
        self.node
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Insert a shape. Re-adding a shape that is already present keeps the
    /// existing entry.
    ///
    /// A shape of another color is handed back untouched.
    pub fn add(&self, shape: Shape) -> Result<ShapeId, Shape> {
        if shape.color() != self.color {
            return Err(shape);
        }
        Ok(self.insert(shape))
    }

    /// Insert a shape the caller already routed by color.
    pub(crate) fn insert(&self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.shapes.lock().entry(id).or_insert(shape);
        self.mark_dirty();
        id
    }

    /// Remove a shape, returning whether it was present.
    pub fn remove(&self, id: ShapeId) -> bool {
        let removed = self.shapes.lock().remove(&id).is_some();
        if removed {
            self.mark_dirty();
        }
        removed
    }

    /// Remove and return a shape.
    pub fn take(&self, id: ShapeId) -> Option<Shape> {
        let shape = self.shapes.lock().remove(&id);
        if shape.is_some() {
            self.mark_dirty();
        }
        shape
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.lock().is_empty()
    }

    /// Clone of a contained shape.
    pub fn get(&self, id: ShapeId) -> Option<Shape> {
        self.shapes.lock().get(&id).cloned()
    }

    /// Apply an edit to a contained shape.
    pub fn apply_edit(&self, id: ShapeId, edit: ShapeEdit) -> Result<EditOutcome, DebugDrawError> {
        let change = {
            let mut shapes = self.shapes.lock();
            let shape = shapes.get_mut(&id).ok_or(DebugDrawError::UnknownShape(id))?;
            shape.apply(edit)?
        };

        match change {
            ShapeChange::None => Ok(EditOutcome::Unchanged),
            ShapeChange::Geometry => {
                self.mark_dirty();
                Ok(EditOutcome::Updated)
            }
            ShapeChange::Recolor { .. } => Ok(match self.on_color_changed(id) {
                Some(shape) => EditOutcome::Relocate(shape),
                None => EditOutcome::Updated,
            }),
        }
    }

    /// React to a contained shape's color changing.
    ///
    /// If the shape no longer matches this collection's color it is removed
    /// and handed back so the registry can move it to the right collection.
    /// Otherwise the mesh is only marked dirty.
    pub fn on_color_changed(&self, id: ShapeId) -> Option<Shape> {
        let mut shapes = self.shapes.lock();
        let matches = shapes.get(&id)?.color() == self.color;
        let relocated = if matches { None } else { shapes.remove(&id) };
        drop(shapes);
        self.mark_dirty();
        relocated
    }

    /// Age finite-lifetime shapes and drop the ones that expired.
    ///
    /// Returns the number of shapes removed.
    pub fn age(&self, delta: f32) -> usize {
        let mut shapes = self.shapes.lock();
        let expired: Vec<ShapeId> = shapes
            .iter_mut()
            .filter_map(|(id, shape)| shape.age(delta).then_some(*id))
            .collect();
        for id in &expired {
            shapes.remove(id);
        }
        drop(shapes);

        if !expired.is_empty() {
            log::trace!("{} collection expired {} shapes", self.color, expired.len());
            self.mark_dirty();
        }
        expired.len()
    }

    /// Count one more draw for every shape in the current mesh.
    ///
    /// Shapes added after the last rebuild were not part of anything
    /// uploaded and keep their draw count.
    pub fn mark_drawn(&self) {
        let mesh = self.mesh.read();
        let mut shapes = self.shapes.lock();
        for id in &mesh.shapes {
            if let Some(shape) = shapes.get_mut(id) {
                shape.mark_drawn();
            }
        }
    }

    /// Regenerate the line mesh if anything changed since the last rebuild.
    ///
    /// Returns `true` if the mesh was regenerated.
    pub fn rebuild(&self) -> bool {
        // Cleared before the snapshot so edits racing with it re-mark the
        // collection for the next frame.
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return false;
        }

        let (meshed, segments): (Vec<ShapeId>, Vec<Segment>) = {
            let shapes = self.shapes.lock();
            let segments = shapes
                .values()
                .flat_map(|shape| shape.segments().iter().copied())
                .collect();
            (shapes.keys().copied().collect(), segments)
        };

        let mut vertices: Vec<DebugVertex> = Vec::new();
        let mut indices: Vec<u32> = Vec::with_capacity(segments.len() * 2);
        let mut lookup: HashMap<VertexKey, u32> = HashMap::new();

        for segment in &segments {
            for point in [segment.start, segment.end] {
                let key = VertexKey::new(&point, segment.color);
                let index = *lookup.entry(key).or_insert_with(|| {
                    vertices.push(DebugVertex {
                        position: [point.x, point.y, point.z],
                        color: segment.color.to_rgba_f32(),
                        uv: [0.0, 0.0],
                    });
                    (vertices.len() - 1) as u32
                });
                indices.push(index);
            }
        }

        let mut mesh = self.mesh.write();
        let vertex_capacity = grow_capacity(mesh.vertex_capacity, vertices.len());
        let index_capacity = grow_capacity(mesh.index_capacity, indices.len());
        if vertex_capacity != mesh.vertex_capacity || index_capacity != mesh.index_capacity {
            log::debug!(
                "{} collection staging grown to {} vertices / {} indices",
                self.color,
                vertex_capacity,
                index_capacity
            );
        }
        vertices.reserve(vertex_capacity.saturating_sub(vertices.len()));
        indices.reserve(index_capacity.saturating_sub(indices.len()));
        *mesh = LineMesh {
            vertices,
            indices,
            version: mesh.version + 1,
            vertex_capacity,
            index_capacity,
            shapes: meshed,
        };
        true
    }

    /// Snapshot of the current mesh.
    pub fn mesh(&self) -> LineMesh {
        self.mesh.read().clone()
    }

    pub fn mesh_version(&self) -> u64 {
        self.mesh.read().version
    }

    /// Push the current mesh to the GPU buffers if it changed since the last
    /// upload. Returns `Ok(true)` when data was uploaded.
    pub fn upload(&self) -> Result<bool, UploadError> {
        let mut buffers = self.buffers.lock();
        let Some(buffers) = buffers.as_mut() else {
            return Ok(false);
        };

        let mesh = self.mesh.read();
        if mesh.version == self.uploaded_version.load(Ordering::Acquire) {
            return Ok(false);
        }
        buffers.ensure_capacity(mesh.vertex_capacity, mesh.index_capacity)?;
        buffers.upload(&mesh.vertices, &mesh.indices)?;
        self.uploaded_version.store(mesh.version, Ordering::Release);
        Ok(true)
    }
}

impl std::fmt::Debug for ShapeCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeCollection")
            .field("color", &self.color)
            .field("node", &self.node)
            .field("shapes", &self.len())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

/// Deduplication key: exact position bits plus color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey {
    position: [u32; 3],
    color: Color,
}

impl VertexKey {
    fn new(p: &stagehand_core::math::Vec3, color: Color) -> Self {
        // Adding +0.0 folds -0.0 into +0.0 so both hash alike.
        Self {
            position: [
                (p.x + 0.0).to_bits(),
                (p.y + 0.0).to_bits(),
                (p.z + 0.0).to_bits(),
            ],
            color,
        }
    }
}

/// Smallest doubling of `current` that holds `needed`.
fn grow_capacity(current: usize, needed: usize) -> usize {
    let mut capacity = current.max(1);
    while capacity < needed {
        capacity = capacity.saturating_mul(2);
    }
    capacity
}
