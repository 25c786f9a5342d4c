//! Debug drawer error types.

use thiserror::Error;

use crate::shape::ShapeId;

/// Errors returned by shape and registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebugDrawError {
    /// The shape is not held by any collection.
    #[error("{0} is not registered")]
    UnknownShape(ShapeId),
    /// The edit targets a parameter the shape variant does not have.
    #[error("{edit} does not apply to a {kind}")]
    UnsupportedEdit {
        edit: &'static str,
        kind: &'static str,
    },
    /// Line mesh buffers could not be created or written.
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Errors reported by a [`BufferAllocator`](crate::BufferAllocator) or
/// [`LineMeshBuffers`](crate::LineMeshBuffers) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("buffer allocation failed: {0}")]
    Allocation(String),
    #[error("buffer write failed: {0}")]
    Write(String),
    #[error("GPU device lost")]
    DeviceLost,
}
