//! # Stagehand Core
//!
//! Shared building blocks for the Stagehand editor overlay crates: math
//! aliases, colors, transforms, input snapshots, and the traits through which
//! the overlay talks to the host engine's scene.

pub mod color;
pub mod input;
pub mod math;
pub mod scene;
pub mod transform;

pub use color::Color;
pub use transform::Transform;

