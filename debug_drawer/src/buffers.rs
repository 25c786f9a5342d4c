//! GPU buffer collaborator traits.
//!
//! The debug drawer produces CPU-side vertex/index arrays; the host decides
//! how they reach the GPU. Each [`ShapeCollection`](crate::ShapeCollection)
//! owns one [`LineMeshBuffers`] and drops it when the collection is removed,
//! which is where implementations release their GPU resources.

use stagehand_core::Color;

use crate::error::UploadError;
use crate::vertex::DebugVertex;

/// A dynamic vertex + index buffer pair drawn as an indexed line list.
pub trait LineMeshBuffers: Send {
    /// Make room for at least `vertices` vertices and `indices` indices.
    ///
    /// Called before every upload with the collection's staging capacity,
    /// which only ever grows.
    fn ensure_capacity(&mut self, vertices: usize, indices: usize) -> Result<(), UploadError>;

    /// Replace the buffer contents.
    fn upload(&mut self, vertices: &[DebugVertex], indices: &[u32]) -> Result<(), UploadError>;
}

/// Creates [`LineMeshBuffers`] for new collections.
pub trait BufferAllocator: Send + Sync {
    fn create_line_mesh(
        &self,
        label: &str,
        color: Color,
    ) -> Result<Box<dyn LineMeshBuffers>, UploadError>;
}
