use std::path::Path;

use serde::Deserialize;
use stagehand_debug_drawer::DebugDrawConfig;
use stagehand_gizmo::GizmoConfig;

/// Demo configuration loaded from `stagehand.toml`.
///
/// Every table is optional:
///
/// ```toml
/// [debug_draw]
/// initial_capacity = 256
///
/// [gizmo]
/// debug_visualization = true
///
/// [script]
/// drag_frames = 60
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub debug_draw: DebugDrawConfig,
    pub gizmo: GizmoConfig,
    pub script: ScriptSettings,
}

/// Timing of the scripted interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    pub delta_seconds: f32,
    /// Frames spent on each drag.
    pub drag_frames: usize,
    /// World units the selection is dragged along X.
    pub drag_distance: f32,
    /// Radians the selection is turned around Y.
    pub turn_angle: f32,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            delta_seconds: 1.0 / 60.0,
            drag_frames: 30,
            drag_distance: 2.0,
            turn_angle: std::f32::consts::FRAC_PI_2,
        }
    }
}

/// Load settings from a TOML file.
///
/// Returns `Err` with a human-readable message if the file cannot be read
/// or parsed.
pub fn load_settings(path: &Path) -> Result<Settings, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    toml::from_str(&content).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

/// Load settings, falling back to demo defaults (with gizmo debug drawing
/// enabled) if the file is missing or invalid.
pub fn load_or_default(path: &Path) -> Settings {
    match load_settings(path) {
        Ok(settings) => {
            log::info!("Loaded settings from {}", path.display());
            settings
        }
        Err(e) => {
            log::warn!("No settings file ({e}), using defaults");
            let mut settings = Settings::default();
            settings.gizmo.debug_visualization = true;
            settings
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [debug_draw]
            initial_capacity = 256

            [gizmo]
            scale = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(settings.debug_draw.initial_capacity, 256);
        assert!(settings.debug_draw.enabled);
        assert_eq!(settings.gizmo.scale, 0.5);
        assert_eq!(settings.gizmo.axis_extent, 100.0);
        assert_eq!(settings.script, ScriptSettings::default());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.debug_draw, DebugDrawConfig::default());
        assert_eq!(settings.gizmo, GizmoConfig::default());
    }

    #[test]
    fn missing_file_falls_back_with_debug_drawing() {
        let settings = load_or_default(Path::new("definitely/not/here/stagehand.toml"));
        assert!(settings.gizmo.debug_visualization);
    }

    #[test]
    fn invalid_file_reports_path() {
        let err = load_settings(Path::new("definitely/not/here/stagehand.toml")).unwrap_err();
        assert!(err.contains("stagehand.toml"));
    }
}
