use serde::Deserialize;

/// Debug drawer settings, usually read from the `[debug_draw]` table of the
/// overlay config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DebugDrawConfig {
    /// When `false`, shapes are still tracked and aged but never uploaded.
    pub enabled: bool,
    /// Initial staging capacity (vertices and indices) of each collection.
    pub initial_capacity: usize,
    /// Name of the scene node all collection nodes are attached under.
    pub root_name: String,
    /// Length of lines emitted by `draw_axis`.
    pub axis_length: f32,
}

impl Default for DebugDrawConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_capacity: 1024,
            root_name: "DebugRoot".into(),
            axis_length: 1.0,
        }
    }
}
