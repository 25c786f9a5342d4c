use stagehand_core::math::{self, Mat4, Vec2, Vec3};

use crate::math::Ray;

/// The viewpoint the gizmo is manipulated from.
///
/// Screen coordinates are normalized: `(0, 0)` is the top-left corner and
/// `(1, 1)` the bottom-right one. The projection is expected to map depth to
/// `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Camera {
    pub fn new(position: Vec3, view: Mat4, projection: Mat4) -> Self {
        Self {
            position,
            view,
            projection,
        }
    }

    /// Perspective camera at `eye` looking at `target`.
    pub fn look_at(eye: Vec3, target: Vec3, yfov: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        Self {
            position: eye,
            view: math::look_at_rh(&eye, &target, &Vec3::y()),
            projection: math::perspective_rh(yfov, aspect, znear, zfar),
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }

    /// World-space points under the cursor on the near and far planes.
    ///
    /// `None` if the view-projection matrix cannot be inverted.
    pub fn mouse_segment(&self, mouse: Vec2) -> Option<(Vec3, Vec3)> {
        let inverse = self.view_proj().try_inverse()?;
        let x = mouse.x * 2.0 - 1.0;
        let y = 1.0 - mouse.y * 2.0;
        let near = math::transform_point(&inverse, &Vec3::new(x, y, 0.0))?;
        let far = math::transform_point(&inverse, &Vec3::new(x, y, 1.0))?;
        Some((near, far))
    }

    /// Ray from the near plane through the cursor.
    pub fn mouse_ray(&self, mouse: Vec2) -> Option<Ray> {
        let (near, far) = self.mouse_segment(mouse)?;
        Ray::through(near, far).ok()
    }

    /// Normalized screen position of a world-space point.
    pub fn project_to_screen(&self, point: &Vec3) -> Option<Vec2> {
        let ndc = math::transform_point(&self.view_proj(), point)?;
        Some(Vec2::new((ndc.x + 1.0) / 2.0, 1.0 - (ndc.y + 1.0) / 2.0))
    }

    /// Whether `direction` points away from the viewer in view space.
    pub fn faces_away(&self, direction: &Vec3) -> bool {
        math::transform_normal(&self.view, direction).z < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::f32::consts::FRAC_PI_3;

    fn camera() -> Camera {
        Camera::look_at(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::zeros(),
            FRAC_PI_3,
            16.0 / 9.0,
            0.1,
            100.0,
        )
    }

    #[test]
    fn center_ray_looks_down_view_axis() {
        let ray = camera().mouse_ray(Vec2::new(0.5, 0.5)).unwrap();
        assert!((ray.direction - (-Vec3::z())).norm() < 1e-4);
        assert!((ray.origin.z - 9.9).abs() < 1e-3);
    }

    #[rstest]
    #[case(Vec3::zeros())]
    #[case(Vec3::new(1.0, 2.0, 0.0))]
    #[case(Vec3::new(-2.0, -1.0, 3.0))]
    fn projection_and_unprojection_agree(#[case] point: Vec3) {
        let cam = camera();
        let screen = cam.project_to_screen(&point).unwrap();
        let ray = cam.mouse_ray(screen).unwrap();
        let to_point = (point - ray.origin).normalize();
        assert!((to_point - ray.direction).norm() < 1e-3);
    }

    #[test]
    fn screen_y_grows_downwards() {
        let cam = camera();
        let above = cam.project_to_screen(&Vec3::new(0.0, 1.0, 0.0)).unwrap();
        let below = cam.project_to_screen(&Vec3::new(0.0, -1.0, 0.0)).unwrap();
        assert!(above.y < 0.5);
        assert!(below.y > 0.5);
    }

    #[test]
    fn singular_projection_has_no_ray() {
        let cam = Camera::new(Vec3::zeros(), Mat4::identity(), Mat4::zeros());
        assert!(cam.mouse_ray(Vec2::new(0.5, 0.5)).is_none());
    }

    #[test]
    fn axis_toward_viewer_does_not_face_away() {
        let cam = camera();
        assert!(!cam.faces_away(&Vec3::z()));
        assert!(cam.faces_away(&-Vec3::z()));
    }
}
