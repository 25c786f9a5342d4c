//! Math type aliases and helper functions.
//!
//! Everything is `f32`; the overlay never needs double precision.

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Unit quaternion (f32).
pub type Quat = nalgebra::UnitQuaternion<f32>;

/// Tolerance used to reject near-zero denominators.
pub const EPSILON: f32 = 1e-6;

/// Build a 4x4 TRS matrix from scale, rotation, and translation.
pub fn mat4_from_scale_rotation_translation(scale: Vec3, rotation: Quat, translation: Vec3) -> Mat4 {
    let m = rotation.to_rotation_matrix();
    let rm = m.matrix();
    #[rustfmt::skip]
    let result = Mat4::new(
        rm[(0, 0)] * scale.x, rm[(0, 1)] * scale.y, rm[(0, 2)] * scale.z, translation.x,
        rm[(1, 0)] * scale.x, rm[(1, 1)] * scale.y, rm[(1, 2)] * scale.z, translation.y,
        rm[(2, 0)] * scale.x, rm[(2, 1)] * scale.y, rm[(2, 2)] * scale.z, translation.z,
        0.0,                  0.0,                  0.0,                  1.0,
    );
    result
}

/// Build a right-handed perspective projection with depth range [0, 1] (wgpu/Vulkan convention).
pub fn perspective_rh(yfov: f32, aspect: f32, znear: f32, zfar: f32) -> Mat4 {
    let f = 1.0 / (yfov / 2.0).tan();
    let nf = 1.0 / (znear - zfar);
    #[rustfmt::skip]
    let result = Mat4::new(
        f / aspect, 0.0,  0.0,              0.0,
        0.0,        f,    0.0,              0.0,
        0.0,        0.0,  zfar * nf,        znear * zfar * nf,
        0.0,        0.0,  -1.0,             0.0,
    );
    result
}

/// Right-handed look-at view matrix.
pub fn look_at_rh(eye: &Vec3, target: &Vec3, up: &Vec3) -> Mat4 {
    let eye_point = nalgebra::Point3::from(*eye);
    let target_point = nalgebra::Point3::from(*target);
    nalgebra::Isometry3::look_at_rh(&eye_point, &target_point, up).to_homogeneous()
}

/// Rotation of `angle` radians around `axis`.
///
/// A zero-length axis yields the identity rotation.
pub fn quat_from_axis_angle(axis: Vec3, angle: f32) -> Quat {
    match nalgebra::Unit::try_new(axis, EPSILON) {
        Some(unit) => Quat::from_axis_angle(&unit, angle),
        None => Quat::identity(),
    }
}

/// Yaw around Y, then pitch around X, then roll around Z, composed as `yaw * pitch * roll`.
pub fn quat_from_yaw_pitch_roll(yaw: f32, pitch: f32, roll: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), yaw)
        * Quat::from_axis_angle(&Vec3::x_axis(), pitch)
        * Quat::from_axis_angle(&Vec3::z_axis(), roll)
}

/// Shortest rotation taking direction `from` onto direction `to`.
///
/// Opposite directions rotate half a turn around any axis perpendicular to
/// `from`. Zero-length inputs yield the identity.
pub fn quat_between_directions(from: Vec3, to: Vec3) -> Quat {
    if from.norm_squared() < EPSILON || to.norm_squared() < EPSILON {
        return Quat::identity();
    }
    if let Some(q) = Quat::rotation_between(&from, &to) {
        return q;
    }
    let from = from.normalize();
    let mut perpendicular = from.cross(&Vec3::x());
    if perpendicular.norm_squared() < EPSILON {
        perpendicular = from.cross(&Vec3::y());
    }
    quat_from_axis_angle(perpendicular, std::f32::consts::PI)
}

/// Transform a point by a 4x4 matrix with perspective divide.
///
/// Returns `None` when the homogeneous `w` collapses to zero.
pub fn transform_point(m: &Mat4, p: &Vec3) -> Option<Vec3> {
    let v = m * Vec4::new(p.x, p.y, p.z, 1.0);
    if v.w.abs() < EPSILON {
        return None;
    }
    Some(Vec3::new(v.x / v.w, v.y / v.w, v.z / v.w))
}

/// Transform a direction by the upper 3x3 block of a 4x4 matrix (no translation).
pub fn transform_normal(m: &Mat4, n: &Vec3) -> Vec3 {
    let block: Mat3 = m.fixed_view::<3, 3>(0, 0).into_owned();
    block * n
}

/// Component-wise product of two vectors.
pub fn mul_components(a: &Vec3, b: &Vec3) -> Vec3 {
    a.component_mul(b)
}
