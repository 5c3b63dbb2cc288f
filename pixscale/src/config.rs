//! Batch scale jobs described in TOML.
//!
//! ```toml
//! [defaults]
//! method = "bilinear"
//!
//! [[jobs]]
//! input = "photo.png"
//! output = "thumb.png"
//! factor = 0.25
//!
//! [[jobs]]
//! input = "sprite.png"
//! output = "sprite@2x.png"
//! method = "nearest"
//! width = 64
//! height = 64
//! rect = { left = 0, top = 0, width = 32, height = 32 }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::Rect;
use crate::scale::{ScaleSize, ScaleType};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Parse(String),

    #[error("job '{0}': give either width and height or factor, not both")]
    AmbiguousSize(String),

    #[error("job '{0}': needs width and height, or factor")]
    MissingSize(String),
}

/// Settings applied to every job that does not override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDefaults {
    #[serde(default = "default_method")]
    pub method: ScaleType,
}

impl Default for JobDefaults {
    fn default() -> Self {
        Self {
            method: default_method(),
        }
    }
}

fn default_method() -> ScaleType {
    ScaleType::Bilinear
}

/// One image to scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleJob {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub method: Option<ScaleType>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub factor: Option<f64>,
    #[serde(default)]
    pub rect: Option<Rect>,
}

impl ScaleJob {
    /// The sizing mode; exactly one of `width`+`height` or `factor` must be set.
    pub fn size(&self) -> Result<ScaleSize, ConfigError> {
        match (self.width, self.height, self.factor) {
            (Some(width), Some(height), None) => Ok(ScaleSize::Explicit { width, height }),
            (None, None, Some(f)) => Ok(ScaleSize::Factor(f)),
            (_, _, Some(_)) => Err(ConfigError::AmbiguousSize(self.input.clone())),
            _ => Err(ConfigError::MissingSize(self.input.clone())),
        }
    }

    pub fn method_or(&self, defaults: &JobDefaults) -> ScaleType {
        self.method.unwrap_or(defaults.method)
    }
}

/// A parsed job file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobFile {
    #[serde(default)]
    pub defaults: JobDefaults,
    #[serde(default)]
    pub jobs: Vec<ScaleJob>,
}

impl JobFile {
    /// Parse a TOML job file and check that every job has a usable size.
    pub fn from_toml(toml_str: &str) -> Result<JobFile, ConfigError> {
        let file: JobFile =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        for job in &file.jobs {
            job.size()?;
        }
        Ok(file)
    }
}
