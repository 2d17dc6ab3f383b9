// Settings for camera, gestures and the landmark helper.
// Visual: nothing on screen; decides what the first frame looks like.
// Read from `<config dir>/air-sketch/config.toml` (missing file = defaults);
// command-line flags are applied on top in `main`.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::error::Error;
use crate::gesture::{GestureSettings, StrokeColors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    /// Flip frames left-right so the window behaves like a mirror.
    pub mirror: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { index: 0, width: 640, height: 480, mirror: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub threshold: u32,
    pub eraser_radius: u32,
    pub thickness: u32,
    pub stroke_colors: StrokeColors,
}

impl Default for GestureConfig {
    fn default() -> Self {
        let d = GestureSettings::default();
        Self {
            threshold: d.threshold,
            eraser_radius: d.eraser_radius,
            thickness: d.thickness,
            stroke_colors: d.colors,
        }
    }
}

impl GestureConfig {
    pub fn settings(&self) -> GestureSettings {
        GestureSettings {
            threshold: self.threshold,
            eraser_radius: self.eraser_radius,
            thickness: self.thickness,
            colors: self.stroke_colors,
        }
    }
}

/// External landmark helper. Without one the mouse stands in for a hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
}

fn default_min_confidence() -> f32 {
    0.8
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub gesture: GestureConfig,
    pub detector: Option<DetectorConfig>,
}

impl AppConfig {
    /// `<config dir>/air-sketch/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("air-sketch").join("config.toml"))
    }

    /// Load from `path`, or the default location when None. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => {
                    log::info!("no config directory on this platform, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        match fs::read_to_string(&path) {
            Ok(text) => {
                let config = Self::parse(&text)
                    .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
                log::info!("loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::Config(format!("{}: {e}", path.display()))),
        }
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
