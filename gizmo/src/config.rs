use serde::Deserialize;

/// Gizmo settings, read from the `[gizmo]` table of the overlay config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GizmoConfig {
    /// Uniform scale applied to the gizmo root every frame.
    pub scale: f32,
    /// Half-length of the line a single-axis drag is projected onto.
    pub axis_extent: f32,
    /// Draw the drag plane, pick point and axes through the debug drawer.
    pub debug_visualization: bool,
    /// Side of the box marking the pick point.
    pub marker_size: f32,
    /// Side of the drag plane drawn around the gizmo.
    pub plane_size: f32,
    /// Half-length of the line drawn along the active axis.
    pub axis_line_length: f32,
    /// Emissive intensity of parts that are not hovered.
    pub idle_intensity: f32,
    /// Emissive intensity of the hovered or dragged part.
    pub highlight_intensity: f32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            scale: 0.25,
            axis_extent: 100.0,
            debug_visualization: false,
            marker_size: 0.1,
            plane_size: 3.0,
            axis_line_length: 10.0,
            idle_intensity: 0.1,
            highlight_intensity: 1.0,
        }
    }
}
