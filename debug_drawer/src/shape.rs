//! Debug shapes and their line-segment representation.

use std::sync::atomic::{AtomicU64, Ordering};

use stagehand_core::Color;
use stagehand_core::math::{self, Vec3};

use crate::error::DebugDrawError;

static NEXT_SHAPE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique shape identity, assigned when the shape is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

impl ShapeId {
    fn next() -> Self {
        Self(NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shape#{}", self.0)
    }
}

/// One drawable line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color,
}

/// Geometric parameters of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Line { start: Vec3, end: Vec3 },
    /// Axis-aligned box centered on `position` with full extents `scale`.
    Box { position: Vec3, scale: Vec3 },
    /// `scale.x` by `scale.y` quad centered on `position`, facing `normal`.
    Plane {
        position: Vec3,
        normal: Vec3,
        scale: Vec3,
    },
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Line { .. } => "line",
            Self::Box { .. } => "box",
            Self::Plane { .. } => "plane",
        }
    }
}

/// Map a shape variant onto the line segments that draw it.
pub fn segments(kind: &ShapeKind, color: Color) -> Vec<Segment> {
    let seg = |start: Vec3, end: Vec3| Segment { start, end, color };

    match *kind {
        ShapeKind::Line { start, end } => vec![seg(start, end)],
        ShapeKind::Box { position, scale } => {
            let h = scale * 0.5;
            let corner = |sx: f32, sy: f32, sz: f32| {
                Vec3::new(
                    position.x + h.x * sx,
                    position.y + h.y * sy,
                    position.z + h.z * sz,
                )
            };
            vec![
                // Bottom face
                seg(corner(-1.0, -1.0, -1.0), corner(-1.0, -1.0, 1.0)),
                seg(corner(-1.0, -1.0, 1.0), corner(1.0, -1.0, 1.0)),
                seg(corner(1.0, -1.0, 1.0), corner(1.0, -1.0, -1.0)),
                seg(corner(1.0, -1.0, -1.0), corner(-1.0, -1.0, -1.0)),
                // Vertical edges
                seg(corner(-1.0, -1.0, -1.0), corner(-1.0, 1.0, -1.0)),
                seg(corner(-1.0, -1.0, 1.0), corner(-1.0, 1.0, 1.0)),
                seg(corner(1.0, -1.0, -1.0), corner(1.0, 1.0, -1.0)),
                seg(corner(1.0, -1.0, 1.0), corner(1.0, 1.0, 1.0)),
                // Top face
                seg(corner(-1.0, 1.0, -1.0), corner(-1.0, 1.0, 1.0)),
                seg(corner(-1.0, 1.0, 1.0), corner(1.0, 1.0, 1.0)),
                seg(corner(1.0, 1.0, 1.0), corner(1.0, 1.0, -1.0)),
                seg(corner(1.0, 1.0, -1.0), corner(-1.0, 1.0, -1.0)),
            ]
        }
        ShapeKind::Plane {
            position,
            normal,
            scale,
        } => {
            let w = scale.x * 0.5;
            let h = scale.y * 0.5;
            let rotation = math::quat_between_directions(Vec3::z(), normal);
            let c = [
                Vec3::new(-w, -h, 0.0),
                Vec3::new(w, -h, 0.0),
                Vec3::new(w, h, 0.0),
                Vec3::new(-w, h, 0.0),
            ]
            .map(|v| rotation * v + position);
            vec![
                // Contour
                seg(c[0], c[1]),
                seg(c[1], c[2]),
                seg(c[2], c[3]),
                seg(c[3], c[0]),
                // Diagonals
                seg(c[0], c[2]),
                seg(c[1], c[3]),
            ]
        }
    }
}

/// A mutation request for a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeEdit {
    SetColor(Color),
    /// Line endpoints. Lines only.
    SetLine { start: Vec3, end: Vec3 },
    /// Center. Boxes and planes only.
    SetPosition(Vec3),
    /// Extents. Boxes and planes only.
    SetScale(Vec3),
    /// Facing direction. Planes only.
    SetNormal(Vec3),
    /// Remaining seconds, `None` for permanent.
    SetLifetime(Option<f32>),
}

impl ShapeEdit {
    fn name(&self) -> &'static str {
        match self {
            Self::SetColor(_) => "SetColor",
            Self::SetLine { .. } => "SetLine",
            Self::SetPosition(_) => "SetPosition",
            Self::SetScale(_) => "SetScale",
            Self::SetNormal(_) => "SetNormal",
            Self::SetLifetime(_) => "SetLifetime",
        }
    }
}

/// What an applied [`ShapeEdit`] means for the collection holding the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeChange {
    /// Nothing drawable changed.
    None,
    /// Segments changed; the owning mesh must be rebuilt.
    Geometry,
    /// The shape now belongs in the collection for `new`.
    Recolor { old: Color, new: Color },
}

/// A debug-drawable primitive.
#[derive(Debug, Clone)]
pub struct Shape {
    id: ShapeId,
    kind: ShapeKind,
    color: Color,
    lifetime: f32,
    draw_count: u32,
    segments: Vec<Segment>,
}

impl Shape {
    /// Create a permanent shape of the given kind.
    pub fn new(kind: ShapeKind, color: Color) -> Self {
        Self {
            id: ShapeId::next(),
            segments: segments(&kind, color),
            kind,
            color,
            lifetime: f32::INFINITY,
            draw_count: 0,
        }
    }

    pub fn line(start: Vec3, end: Vec3, color: Color) -> Self {
        Self::new(ShapeKind::Line { start, end }, color)
    }

    /// Axis-aligned box. Named `cube` to stay clear of `std::boxed::Box`.
    pub fn cube(position: Vec3, scale: Vec3, color: Color) -> Self {
        Self::new(ShapeKind::Box { position, scale }, color)
    }

    /// Square plane of side `scale` at the origin, facing +X.
    pub fn plane(scale: f32, color: Color) -> Self {
        Self::new(
            ShapeKind::Plane {
                position: Vec3::zeros(),
                normal: Vec3::x(),
                scale: Vec3::new(scale, scale, scale),
            },
            color,
        )
    }

    /// Builder form of [`ShapeEdit::SetLifetime`].
    pub fn with_lifetime(mut self, lifetime: Option<f32>) -> Self {
        self.lifetime = lifetime.unwrap_or(f32::INFINITY);
        self
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Remaining seconds; infinite for permanent shapes.
    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    pub fn is_permanent(&self) -> bool {
        self.lifetime.is_infinite()
    }

    /// Number of draw phases this shape has been part of.
    pub fn draw_count(&self) -> u32 {
        self.draw_count
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Apply an edit, recomputing segments when geometry or color changed.
    pub fn apply(&mut self, edit: ShapeEdit) -> Result<ShapeChange, DebugDrawError> {
        let unsupported = DebugDrawError::UnsupportedEdit {
            edit: edit.name(),
            kind: self.kind.name(),
        };

        match edit {
            ShapeEdit::SetColor(color) => {
                if color == self.color {
                    return Ok(ShapeChange::None);
                }
                let old = self.color;
                self.color = color;
                self.segments = segments(&self.kind, color);
                return Ok(ShapeChange::Recolor { old, new: color });
            }
            ShapeEdit::SetLifetime(lifetime) => {
                self.lifetime = lifetime.unwrap_or(f32::INFINITY);
                return Ok(ShapeChange::None);
            }
            ShapeEdit::SetLine { start: s, end: e } => match &mut self.kind {
                ShapeKind::Line { start, end } => {
                    *start = s;
                    *end = e;
                }
                _ => return Err(unsupported),
            },
            ShapeEdit::SetPosition(p) => match &mut self.kind {
                ShapeKind::Box { position, .. } | ShapeKind::Plane { position, .. } => {
                    *position = p;
                }
                _ => return Err(unsupported),
            },
            ShapeEdit::SetScale(s) => match &mut self.kind {
                ShapeKind::Box { scale, .. } | ShapeKind::Plane { scale, .. } => *scale = s,
                _ => return Err(unsupported),
            },
            ShapeEdit::SetNormal(n) => match &mut self.kind {
                ShapeKind::Plane { normal, .. } => *normal = n,
                _ => return Err(unsupported),
            },
        }

        self.segments = segments(&self.kind, self.color);
        Ok(ShapeChange::Geometry)
    }

    /// Age a finite-lifetime shape by `delta` seconds.
    ///
    /// Returns `true` when the shape has run out of time and has been drawn
    /// at least once.
    pub(crate) fn age(&mut self, delta: f32) -> bool {
        if self.lifetime.is_infinite() {
            return false;
        }
        self.lifetime -= delta;
        self.lifetime <= 0.0 && self.draw_count > 0
    }

    pub(crate) fn mark_drawn(&mut self) {
        self.draw_count = self.draw_count.saturating_add(1);
    }
}
