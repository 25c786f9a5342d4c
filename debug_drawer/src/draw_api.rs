use stagehand_core::Color;
use stagehand_core::math::Vec3;

use crate::registry::DebugDrawRegistry;
use crate::shape::{Shape, ShapeId, ShapeKind};

/// One-call drawing helpers. `lifetime` is in seconds; `None` keeps the shape
/// until it is removed or the registry is cleared.
impl DebugDrawRegistry {
    /// Draw a single line segment.
    pub fn draw_line(&self, start: Vec3, end: Vec3, color: Color, lifetime: Option<f32>) -> ShapeId {
        self.add(Shape::line(start, end, color).with_lifetime(lifetime))
    }

    /// Draw an axis-aligned box centered on `position` with full extents `scale` (12 edges).
    pub fn draw_box(&self, position: Vec3, scale: Vec3, color: Color, lifetime: Option<f32>) -> ShapeId {
        self.add(Shape::cube(position, scale, color).with_lifetime(lifetime))
    }

    /// Draw an axis-aligned cube with side `size`.
    pub fn draw_cube(&self, position: Vec3, size: f32, color: Color, lifetime: Option<f32>) -> ShapeId {
        self.draw_box(position, Vec3::new(size, size, size), color, lifetime)
    }

    /// Draw a square of side `scale` centered on `position` and facing `normal`,
    /// with both diagonals.
    pub fn draw_plane(
        &self,
        position: Vec3,
        normal: Vec3,
        scale: f32,
        color: Color,
        lifetime: Option<f32>,
    ) -> ShapeId {
        let kind = ShapeKind::Plane {
            position,
            normal,
            scale: Vec3::new(scale, scale, scale),
        };
        self.add(Shape::new(kind, color).with_lifetime(lifetime))
    }

    /// Draw `axis` from `origin`, scaled by the configured axis length.
    pub fn draw_axis(&self, origin: Vec3, axis: Vec3, color: Color, lifetime: Option<f32>) -> ShapeId {
        let end = origin + axis * self.config().axis_length;
        self.draw_line(origin, end, color, lifetime)
    }
}
