//! Render settings loaded from JSON.

use std::path::{Path, PathBuf};

use lux_math::DEFAULT_RAY_DISTANCE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything a render session needs besides the scene itself.
///
/// Missing fields in a settings file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    // Image
    pub width: u32,
    pub height: u32,

    // Sampling
    pub total_samples: u32,
    pub max_bounces: u32,
    /// 2x2 jittered sub-pixel rays per sample when on
    pub antialiasing: bool,
    pub ray_distance: f32,
    /// Render a flat base-color pass before sampling starts
    pub preview_pass: bool,

    // Execution
    /// Worker threads; `None` uses the detected hardware concurrency
    pub thread_count: Option<usize>,
    /// Fixed seed for reproducible output
    pub seed: Option<u64>,
    /// Stop sampling after this many seconds
    pub time_limit_secs: Option<u64>,

    // Output
    pub output_path: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            total_samples: 500,
            max_bounces: 4,
            antialiasing: true,
            ray_distance: DEFAULT_RAY_DISTANCE,
            preview_pass: true,
            thread_count: None,
            seed: None,
            time_limit_secs: None,
            output_path: Some(PathBuf::from("render.png")),
        }
    }
}

impl RenderSettings {
    /// Load settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_string(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Worker count to spawn: the configured value, else the available
    /// parallelism, never less than one.
    pub fn resolved_thread_count(&self) -> usize {
        self.thread_count
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
