// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::Color;

/// File name used inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Width of a blank editing canvas in pixels.
    pub canvas_width: u32,
    /// Height of a blank editing canvas in pixels.
    pub canvas_height: u32,
    /// Stroke width for shape annotations, in pixels.
    pub stroke_width: u32,
    /// Colour selected when an editor session opens.
    pub default_color: Color,
    /// Font size selected when an editor session opens.
    pub default_font_size: f32,
    /// TrueType/OpenType font used to draw text annotations.
    pub font_path: Option<PathBuf>,
    /// Origin prefixed to issued share URLs.
    pub share_origin: String,
    /// Expiry applied when a share request does not override it.
    pub default_expiry_days: u32,
    /// Multiplier applied to the remote stub's simulated latencies.
    pub latency_scale: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 1000,
            stroke_width: 2,
            default_color: Color::BLACK,
            default_font_size: 16.0,
            font_path: None,
            share_origin: "http://localhost:5173".into(),
            default_expiry_days: 7,
            latency_scale: 1.0,
        }
    }
}

impl AppConfig {
    /// Load the config stored in `data_dir`, falling back to defaults when
    /// the file is missing or unreadable.
    pub fn load_or_default(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        let Ok(data) = std::fs::read_to_string(&path) else {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        };
        match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "config unreadable, using defaults");
                Self::default()
            }
        }
    }

    /// Write the config as pretty JSON into `data_dir`.
    pub fn persist(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(AppConfig::load_or_default(dir.path()), AppConfig::default());
    }

    #[test]
    fn persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            stroke_width: 4,
            default_color: Color::BLUE,
            share_origin: "https://docs.example".into(),
            ..Default::default()
        };
        config.persist(dir.path()).unwrap();
        assert_eq!(AppConfig::load_or_default(dir.path()), config);
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{"canvas_width": 640}"#).unwrap();
        let config = AppConfig::load_or_default(dir.path());
        assert_eq!(config.canvas_width, 640);
        assert_eq!(config.canvas_height, 1000);
    }

    #[test]
    fn garbage_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "not json").unwrap();
        assert_eq!(AppConfig::load_or_default(dir.path()), AppConfig::default());
    }
}
