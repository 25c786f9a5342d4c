use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use stagehand_core::Color;
use stagehand_core::scene::{EntityId, SceneGraph};

use crate::buffers::BufferAllocator;
use crate::collection::{EditOutcome, ShapeCollection};
use crate::config::DebugDrawConfig;
use crate::error::DebugDrawError;
use crate::shape::{Shape, ShapeEdit, ShapeId};

/// Per-frame counters returned by [`DebugDrawRegistry::draw_phase`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub collections: usize,
    /// Collections whose mesh was regenerated this frame.
    pub rebuilt: usize,
    /// Collections whose buffers received new data this frame.
    pub uploaded: usize,
    /// Collections whose upload failed.
    pub failed: usize,
    pub vertices: usize,
    pub indices: usize,
}

/// Owns one [`ShapeCollection`] per color and drives them frame by frame.
///
/// Create one per editor session and share it (usually as `Arc`) with every
/// part of the host that wants to draw. All methods take `&self` and may be
/// called from any thread.
///
/// # Frame order
///
/// 1. Any number of `add` / `edit` / `remove` / `draw_*` calls.
/// 2. [`draw_phase`](Self::draw_phase): rebuild dirty meshes, upload, count draws.
/// 3. [`per_frame_update`](Self::per_frame_update) at the start of the next
///    frame: age shapes and drop expired ones.
///
/// Because draws are counted before shapes age, a shape always survives its
/// first draw phase even with a zero lifetime.
///
/// [`SceneGraph`] and [`BufferAllocator`] calls are made without any registry
/// lock held, except when a recolor races with [`clear`](Self::clear) and has
/// to recreate the target collection.
pub struct DebugDrawRegistry {
    config: DebugDrawConfig,
    scene: Arc<dyn SceneGraph>,
    allocator: Arc<dyn BufferAllocator>,
    root: Mutex<Option<EntityId>>,
    collections: RwLock<HashMap<Color, Arc<ShapeCollection>>>,
    /// Held exclusively while a shape moves between collections or the
    /// collections are cleared; lookups hold it shared. Taken before
    /// `collections`.
    moves: RwLock<()>,
}

impl DebugDrawRegistry {
    pub fn new(
        config: DebugDrawConfig,
        scene: Arc<dyn SceneGraph>,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Self {
        Self {
            config,
            scene,
            allocator,
            root: Mutex::new(None),
            collections: RwLock::new(HashMap::new()),
            moves: RwLock::new(()),
        }
    }

    pub fn config(&self) -> &DebugDrawConfig {
        &self.config
    }

    /// Scene node the collection nodes hang from, once the first shape was added.
    pub fn root(&self) -> Option<EntityId> {
        *self.root.lock()
    }

    /// Hand a shape to the collection matching its color.
    pub fn add(&self, shape: Shape) -> ShapeId {
        self.ensure_collection(shape.color()).insert(shape)
    }

    /// Remove a shape from whichever collection holds it.
    pub fn remove(&self, id: ShapeId) -> bool {
        let _moves = self.moves.read();
        self.collections_snapshot()
            .iter()
            .any(|collection| collection.remove(id))
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        let _moves = self.moves.read();
        self.find(id).is_some()
    }

    /// Clone of a registered shape.
    pub fn shape(&self, id: ShapeId) -> Option<Shape> {
        let _moves = self.moves.read();
        self.find(id).and_then(|collection| collection.get(id))
    }

    /// Apply an edit to a registered shape, moving it to another collection
    /// when its color changes.
    ///
    /// The move is atomic: concurrent lookups see the shape in exactly one
    /// collection, and a concurrent [`clear`](Self::clear) removes it for good.
    pub fn edit(&self, id: ShapeId, edit: ShapeEdit) -> Result<(), DebugDrawError> {
        if let ShapeEdit::SetColor(color) = edit {
            if self.contains(id) {
                self.ensure_collection(color);
            }
        }

        let _moves = self.moves.write();
        let collection = self.find(id).ok_or(DebugDrawError::UnknownShape(id))?;
        if let EditOutcome::Relocate(shape) = collection.apply_edit(id, edit)? {
            log::debug!(
                "{} moved from {} to {}",
                id,
                collection.color(),
                shape.color()
            );
            self.ensure_collection(shape.color()).insert(shape);
        }
        Ok(())
    }

    /// Collection for `color`, if one was created.
    pub fn collection(&self, color: Color) -> Option<Arc<ShapeCollection>> {
        self.collections.read().get(&color).cloned()
    }

    pub fn collection_count(&self) -> usize {
        self.collections.read().len()
    }

    pub fn shape_count(&self) -> usize {
        self.collections_snapshot()
            .iter()
            .map(|collection| collection.len())
            .sum()
    }

    /// Age every finite-lifetime shape by `delta_seconds` and remove the ones
    /// that ran out after being drawn at least once.
    ///
    /// Returns the number of shapes removed.
    pub fn per_frame_update(&self, delta_seconds: f32) -> usize {
        self.collections_snapshot()
            .iter()
            .map(|collection| collection.age(delta_seconds))
            .sum()
    }

    /// Rebuild dirty meshes, upload them, and count one draw for every shape
    /// that made it into a mesh.
    pub fn draw_phase(&self) -> DrawStats {
        let mut stats = DrawStats::default();

        for collection in self.collections_snapshot() {
            stats.collections += 1;
            if collection.rebuild() {
                stats.rebuilt += 1;
            }

            if self.config.enabled {
                match collection.upload() {
                    Ok(true) => stats.uploaded += 1,
                    Ok(false) => {}
                    Err(e) => {
                        stats.failed += 1;
                        log::error!(
                            "Failed to upload {} debug lines: {e}",
                            collection.color()
                        );
                    }
                }
            }

            let mesh = collection.mesh();
            stats.vertices += mesh.vertices.len();
            stats.indices += mesh.indices.len();
            collection.mark_drawn();
        }

        log::trace!("Debug draw phase: {stats:?}");
        stats
    }

    /// Detach and drop every collection together with its shapes and buffers.
    pub fn clear(&self) {
        let drained: Vec<Arc<ShapeCollection>> = {
            let _moves = self.moves.write();
            self.collections.write().drain().map(|(_, c)| c).collect()
        };
        for collection in &drained {
            if let Some(node) = collection.node() {
                self.scene.detach_node(node);
            }
        }
        if !drained.is_empty() {
            log::debug!("Cleared {} debug draw collections", drained.len());
        }
    }

    /// Caller holds `moves`.
    fn find(&self, id: ShapeId) -> Option<Arc<ShapeCollection>> {
        self.collections_snapshot()
            .into_iter()
            .find(|collection| collection.contains(id))
    }

    fn collections_snapshot(&self) -> Vec<Arc<ShapeCollection>> {
        self.collections.read().values().cloned().collect()
    }

    fn ensure_root(&self) -> EntityId {
        let mut root = self.root.lock();
        *root.get_or_insert_with(|| {
            let node = self.scene.attach_node(None, &self.config.root_name);
            log::debug!("Debug draw root attached as {node}");
            node
        })
    }

    fn ensure_collection(&self, color: Color) -> Arc<ShapeCollection> {
        if let Some(collection) = self.collections.read().get(&color) {
            return Arc::clone(collection);
        }

        let root = self.ensure_root();
        let label = color.to_string();
        let node = self.scene.attach_node(Some(root), &label);
        let buffers = match self.allocator.create_line_mesh(&label, color) {
            Ok(buffers) => Some(buffers),
            Err(e) => {
                log::error!("Failed to create debug line buffers for {label}: {e}");
                None
            }
        };
        let collection = Arc::new(
            ShapeCollection::new(color, self.config.initial_capacity).with_resources(node, buffers),
        );

        let existing = match self.collections.write().entry(color) {
            Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&collection));
                None
            }
        };
        if let Some(existing) = existing {
            // Another thread created it first; its node and buffers win.
            self.scene.detach_node(node);
            return existing;
        }

        log::debug!("Created debug draw collection {label} as {node}");
        collection
    }
}

impl Drop for DebugDrawRegistry {
    fn drop(&mut self) {
        self.clear();
        if let Some(root) = self.root.get_mut().take() {
            self.scene.detach_node(root);
        }
    }
}

impl std::fmt::Debug for DebugDrawRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugDrawRegistry")
            .field("config", &self.config)
            .field("root", &self.root())
            .field("collections", &self.collection_count())
            .finish()
    }
}
