//! Retained-mode debug line drawing for the Stagehand editor overlay.
//!
//! Shapes (lines, boxes, planes) are grouped by color into
//! [`ShapeCollection`]s. Each collection owns one scene node and one set of
//! GPU line buffers, and rebuilds its deduplicated vertex/index mesh only
//! when one of its shapes changed.
//!
//! # Architecture
//!
//! - [`DebugDrawRegistry`]: thread-safe owner of all collections (share as `Arc`)
//! - [`ShapeCollection`]: per-color shape set and mesh
//! - [`BufferAllocator`] / [`LineMeshBuffers`]: seam to the host renderer
//!
//! # Usage
//!
//! ```ignore
//! let drawer = Arc::new(DebugDrawRegistry::new(config, scene, allocator));
//!
//! // From any thread:
//! drawer.draw_line(Vec3::zeros(), Vec3::x(), Color::RED, None);
//! drawer.draw_cube(hit_point, 0.1, Color::YELLOW, Some(0.0));
//!
//! // Each frame, on the render thread:
//! let stats = drawer.draw_phase();
//! // Next frame:
//! drawer.per_frame_update(delta_seconds);
//! ```

mod buffers;
mod collection;
mod config;
mod draw_api;
mod error;
mod registry;
mod shape;
mod vertex;

pub use buffers::{BufferAllocator, LineMeshBuffers};
pub use collection::{EditOutcome, LineMesh, ShapeCollection};
pub use config::DebugDrawConfig;
pub use error::{DebugDrawError, UploadError};
pub use registry::{DebugDrawRegistry, DrawStats};
pub use shape::{Segment, Shape, ShapeChange, ShapeEdit, ShapeId, ShapeKind, segments};
pub use vertex::DebugVertex;
