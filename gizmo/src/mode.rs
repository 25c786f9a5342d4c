use stagehand_core::Color;
use stagehand_core::math::Vec3;

/// Which gizmo handle is hovered or being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GizmoMode {
    #[default]
    None,
    TranslationX,
    TranslationY,
    TranslationZ,
    TranslationPlaneXY,
    TranslationPlaneYZ,
    TranslationPlaneXZ,
    /// Drag in the plane facing the camera.
    TranslationPlaneCamera,
    RotationX,
    RotationY,
    RotationZ,
    /// Rotate around the view direction.
    RotationCamera,
}

impl GizmoMode {
    /// Every mode that has a pickable part, in prefab order.
    pub const PARTS: [GizmoMode; 11] = [
        GizmoMode::TranslationX,
        GizmoMode::TranslationY,
        GizmoMode::TranslationZ,
        GizmoMode::TranslationPlaneXY,
        GizmoMode::TranslationPlaneYZ,
        GizmoMode::TranslationPlaneXZ,
        GizmoMode::TranslationPlaneCamera,
        GizmoMode::RotationX,
        GizmoMode::RotationY,
        GizmoMode::RotationZ,
        GizmoMode::RotationCamera,
    ];

    pub fn is_translation(self) -> bool {
        matches!(
            self,
            Self::TranslationX
                | Self::TranslationY
                | Self::TranslationZ
                | Self::TranslationPlaneXY
                | Self::TranslationPlaneYZ
                | Self::TranslationPlaneXZ
                | Self::TranslationPlaneCamera
        )
    }

    pub fn is_rotation(self) -> bool {
        matches!(
            self,
            Self::RotationX | Self::RotationY | Self::RotationZ | Self::RotationCamera
        )
    }

    pub fn is_planar_translation(self) -> bool {
        matches!(
            self,
            Self::TranslationPlaneXY
                | Self::TranslationPlaneYZ
                | Self::TranslationPlaneXZ
                | Self::TranslationPlaneCamera
        )
    }

    pub fn is_axial_translation(self) -> bool {
        self.is_translation() && !self.is_planar_translation()
    }

    /// Modes whose axis or plane follows the camera instead of the gizmo rotation.
    pub fn is_camera_relative(self) -> bool {
        matches!(self, Self::TranslationPlaneCamera | Self::RotationCamera)
    }

    /// Name of the prefab child entity that activates this mode.
    pub fn part_name(self) -> Option<&'static str> {
        Some(match self {
            Self::None => return None,
            Self::TranslationX => "TranslationX",
            Self::TranslationY => "TranslationY",
            Self::TranslationZ => "TranslationZ",
            Self::TranslationPlaneXY => "TranslationXY",
            Self::TranslationPlaneYZ => "TranslationYZ",
            Self::TranslationPlaneXZ => "TranslationXZ",
            Self::TranslationPlaneCamera => "TranslationCC",
            Self::RotationX => "RotationX",
            Self::RotationY => "RotationY",
            Self::RotationZ => "RotationZ",
            Self::RotationCamera => "RotationC",
        })
    }

    /// Part color: red for X handles, green for Y, blue for Z, white for the
    /// camera-facing ones. Plane handles take the color of their normal axis.
    pub fn color(self) -> Option<Color> {
        match self {
            Self::None => None,
            Self::TranslationX | Self::TranslationPlaneYZ | Self::RotationX => Some(Color::RED),
            Self::TranslationY | Self::TranslationPlaneXZ | Self::RotationY => Some(Color::GREEN),
            Self::TranslationZ | Self::TranslationPlaneXY | Self::RotationZ => Some(Color::BLUE),
            Self::TranslationPlaneCamera | Self::RotationCamera => Some(Color::WHITE),
        }
    }

    /// Normal of the drag plane in gizmo space.
    ///
    /// Single-axis modes use a plane containing the axis. `None` for the
    /// camera plane and for non-translation modes.
    pub fn local_translation_normal(self) -> Option<Vec3> {
        match self {
            Self::TranslationX | Self::TranslationPlaneXY => Some(Vec3::z()),
            Self::TranslationY | Self::TranslationZ | Self::TranslationPlaneYZ => Some(Vec3::x()),
            Self::TranslationPlaneXZ => Some(Vec3::y()),
            _ => None,
        }
    }

    /// Manipulation axis in gizmo space.
    ///
    /// For planar translation this is a component mask rather than a
    /// direction. `None` for [`GizmoMode::RotationCamera`], whose axis is
    /// the view direction.
    pub fn local_axis(self) -> Option<Vec3> {
        match self {
            Self::None => Some(Vec3::zeros()),
            Self::TranslationX | Self::RotationX => Some(Vec3::x()),
            Self::TranslationY | Self::RotationY => Some(Vec3::y()),
            Self::TranslationZ | Self::RotationZ => Some(Vec3::z()),
            Self::TranslationPlaneXY => Some(Vec3::new(1.0, 1.0, 0.0)),
            Self::TranslationPlaneYZ => Some(Vec3::new(0.0, 1.0, 1.0)),
            Self::TranslationPlaneXZ => Some(Vec3::new(1.0, 0.0, 1.0)),
            Self::TranslationPlaneCamera => Some(Vec3::new(1.0, 1.0, 1.0)),
            Self::RotationCamera => None,
        }
    }
}

impl std::fmt::Display for GizmoMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.part_name().unwrap_or("None"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_part_is_exactly_one_kind() {
        for mode in GizmoMode::PARTS {
            assert_ne!(mode.is_translation(), mode.is_rotation(), "{mode:?}");
            assert!(mode.part_name().is_some());
            assert!(mode.color().is_some());
        }
        assert!(!GizmoMode::None.is_translation());
        assert!(!GizmoMode::None.is_rotation());
    }

    #[test]
    fn axial_and_planar_split_translation() {
        let axial: Vec<_> = GizmoMode::PARTS
            .into_iter()
            .filter(|m| m.is_axial_translation())
            .collect();
        assert_eq!(
            axial,
            [
                GizmoMode::TranslationX,
                GizmoMode::TranslationY,
                GizmoMode::TranslationZ
            ]
        );
        assert!(GizmoMode::TranslationPlaneCamera.is_planar_translation());
        assert!(!GizmoMode::RotationX.is_planar_translation());
    }

    #[test]
    fn translation_normals_contain_the_axis() {
        for mode in [
            GizmoMode::TranslationX,
            GizmoMode::TranslationY,
            GizmoMode::TranslationZ,
        ] {
            let normal = mode.local_translation_normal().unwrap();
            let axis = mode.local_axis().unwrap();
            assert_eq!(normal.dot(&axis), 0.0, "{mode:?}");
        }
        assert_eq!(GizmoMode::TranslationPlaneCamera.local_translation_normal(), None);
        assert_eq!(GizmoMode::RotationX.local_translation_normal(), None);
    }

    #[test]
    fn part_names_are_unique() {
        let mut names: Vec<_> = GizmoMode::PARTS
            .iter()
            .filter_map(|m| m.part_name())
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), GizmoMode::PARTS.len());
    }
}
