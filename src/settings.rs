//! Editor configuration.
//!
//! Defaults reproduce the shipped world: a 100x100 cell land grid with unit
//! cells, a radius-3 brush, and a 16 ms stroke cadence. An optional
//! `editor.json` next to the binary overrides any subset of fields; a missing
//! or malformed file logs a warning and keeps the defaults.

use std::time::Duration;

use anyhow::Context;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub const SETTINGS_PATH: &str = "editor.json";

#[derive(Resource, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Land grid cells along x.
    pub grid_columns: u32,
    /// Land grid cells along z.
    pub grid_rows: u32,
    /// Brush half-extent in cells; the footprint is `(2r+1)^2` vertices.
    pub brush_radius: i32,
    /// Elevation delta applied per stroke application.
    pub edit_step: f32,
    /// Camera translation per edge-pan firing, world units.
    pub pan_step: f32,
    /// Hover strip thickness at the window border, logical pixels.
    pub pan_margin: f32,
    /// Period of the held-stroke / edge-pan cadence, milliseconds.
    pub stroke_interval_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid_columns: 100,
            grid_rows: 100,
            brush_radius: 3,
            edit_step: 0.02,
            pan_step: 0.5,
            pan_margin: 20.0,
            stroke_interval_ms: 16,
        }
    }
}

impl EditorSettings {
    /// World-unit size of one grid cell.
    pub fn cell_size(&self) -> f32 {
        self.grid_columns as f32 / self.grid_rows as f32
    }

    pub fn stroke_interval(&self) -> Duration {
        Duration::from_millis(self.stroke_interval_ms)
    }

    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                info!("Loaded editor settings from {path}");
                settings
            }
            Err(err) if !std::path::Path::new(path).exists() => {
                debug!("No {path}, using default settings ({err})");
                Self::default()
            }
            Err(err) => {
                warn!("Failed to load {path}, using defaults: {err:#}");
                Self::default()
            }
        }
    }

    fn load(path: &str) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file '{path}'"))?;
        let settings: Self =
            serde_json::from_str(&json).with_context(|| format!("parsing '{path}'"))?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_shipped_world() {
        let settings = EditorSettings::default();
        assert_eq!(settings.grid_columns, 100);
        assert_eq!(settings.cell_size(), 1.0);
        assert_eq!(settings.brush_radius, 3);
        assert_eq!(settings.edit_step, 0.02);
        assert_eq!(settings.stroke_interval(), Duration::from_millis(16));
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let settings: EditorSettings =
            serde_json::from_str(r#"{ "brush_radius": 5, "edit_step": 0.1 }"#).unwrap();
        assert_eq!(settings.brush_radius, 5);
        assert_eq!(settings.edit_step, 0.1);
        assert_eq!(settings.grid_columns, 100);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join("landshaper_settings_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let settings = EditorSettings::load_or_default(path.to_str().unwrap());
        assert_eq!(settings.grid_columns, 100);
    }
}
