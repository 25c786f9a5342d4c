//! Geometric routines behind gizmo manipulation.
//!
//! Degenerate inputs (parallel lines, rays running along a plane, points
//! outside the tested segments) are normal outcomes of interaction, e.g. when
//! the camera looks at a drag plane edge-on. They are reported as
//! [`NoIntersection`] and the caller skips the frame.

use stagehand_core::math::{self, EPSILON, Quat, Vec2, Vec3};

/// Why a geometric query produced no point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NoIntersection {
    #[error("lines or ray and plane are parallel")]
    Parallel,
    #[error("intersection lies behind the ray origin")]
    BehindOrigin,
    #[error("intersection lies outside the tested segments")]
    OutOfRange,
    #[error("zero-length direction")]
    Degenerate,
}

/// Half-line from `origin` along unit `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Ray from `from` through `to`.
    pub fn through(from: Vec3, to: Vec3) -> Result<Self, NoIntersection> {
        let direction = (to - from)
            .try_normalize(EPSILON)
            .ok_or(NoIntersection::Degenerate)?;
        Ok(Self {
            origin: from,
            direction,
        })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Plane through `point` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    /// The normal is normalized; a zero normal is kept as is and never
    /// intersects anything.
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.try_normalize(EPSILON).unwrap_or(normal),
        }
    }
}

/// Point where `ray` crosses `plane`.
pub fn intersect_ray_plane(ray: &Ray, plane: &Plane) -> Result<Vec3, NoIntersection> {
    let denom = plane.normal.dot(&ray.direction);
    if denom.abs() < EPSILON {
        return Err(NoIntersection::Parallel);
    }
    let t = plane.normal.dot(&(plane.point - ray.origin)) / denom;
    if t < 0.0 {
        return Err(NoIntersection::BehindOrigin);
    }
    Ok(ray.at(t))
}

/// Intersection of segments `a1-a2` and `b1-b2` in 2D.
///
/// Endpoints themselves are excluded.
pub fn line_intersection_2d(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Result<Vec2, NoIntersection> {
    const ZERO: f32 = 1e-5;

    let d = (a1.x - a2.x) * (b2.y - b1.y) - (a1.y - a2.y) * (b2.x - b1.x);
    if d.abs() <= ZERO {
        return Err(NoIntersection::Parallel);
    }
    let da = (a1.x - b1.x) * (b2.y - b1.y) - (a1.y - b1.y) * (b2.x - b1.x);
    let db = (a1.x - a2.x) * (a1.y - b1.y) - (a1.y - a2.y) * (a1.x - b1.x);
    let ta = da / d;
    let tb = db / d;

    if ta > ZERO && ta < 1.0 && tb > ZERO && tb < 1.0 {
        Ok(a1 + (a2 - a1) * ta)
    } else {
        Err(NoIntersection::OutOfRange)
    }
}

/// Intersection of segments `a1-a2` and `b1-b2` in 3D.
///
/// The lines are assumed coplanar; for skew lines this returns the point on
/// `a1-a2` closest to the other line.
pub fn line_intersection_3d(a1: Vec3, a2: Vec3, b1: Vec3, b2: Vec3) -> Result<Vec3, NoIntersection> {
    let da = a2 - a1;
    let db = b2 - b1;
    let dc = b1 - a1;

    let cross = da.cross(&db);
    let len_sq = cross.norm_squared();
    if len_sq < EPSILON {
        return Err(NoIntersection::Parallel);
    }

    let s = dc.cross(&db).dot(&cross) / len_sq;
    if (0.0..=1.0).contains(&s) {
        Ok(a1 + da * s)
    } else {
        Err(NoIntersection::OutOfRange)
    }
}

/// Project `point` onto the line through `axis_origin` along `axis`.
///
/// The projection runs inside the drag plane with normal `plane_normal`:
/// the axis, extended `extent` units both ways, is intersected with a line
/// through `point` along `axis × plane_normal`.
pub fn closest_point_to_axis(
    axis: Vec3,
    plane_normal: Vec3,
    axis_origin: Vec3,
    point: Vec3,
    extent: f32,
) -> Result<Vec3, NoIntersection> {
    let across = axis.cross(&plane_normal);
    if across.norm_squared() < EPSILON {
        return Err(NoIntersection::Degenerate);
    }

    let a1 = axis_origin - axis * extent;
    let a2 = axis_origin + axis * extent;
    let b1 = point - across * extent;
    let b2 = point + across * extent;
    line_intersection_3d(a1, a2, b1, b2)
}

/// Signed angle in radians from `v1` to `v2`, positive counter-clockwise.
pub fn angle_between_2d(v1: Vec2, v2: Vec2) -> f32 {
    let sin = v1.x * v2.y - v2.x * v1.y;
    let cos = v1.dot(&v2);
    sin.atan2(cos)
}

/// Unsigned angle in radians between `v1` and `v2`.
///
/// Uses the chord length instead of `acos` so small and near-opposite
/// angles stay precise.
pub fn angle_between_3d(v1: Vec3, v2: Vec3) -> Result<f32, NoIntersection> {
    let a = v1.try_normalize(EPSILON).ok_or(NoIntersection::Degenerate)?;
    let b = v2.try_normalize(EPSILON).ok_or(NoIntersection::Degenerate)?;

    let angle = if a.dot(&b) < 0.0 {
        std::f32::consts::PI - 2.0 * ((-a - b).norm() / 2.0).min(1.0).asin()
    } else {
        2.0 * ((a - b).norm() / 2.0).min(1.0).asin()
    };
    Ok(angle)
}

/// Rotation turning +Z into the direction from `target` to `eye`.
///
/// Roll is always zero, so the rotated +Y stays as upright as possible.
pub fn camera_facing_rotation(eye: Vec3, target: Vec3) -> Quat {
    let dir = eye - target;
    let pitch = dir.y.atan2((dir.x * dir.x + dir.z * dir.z).sqrt());
    let yaw = dir.x.atan2(dir.z);
    math::quat_from_yaw_pitch_roll(yaw, -pitch, 0.0)
}
