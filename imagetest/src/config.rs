use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::canonical::DEFAULT_MEAN_ABS_TOLERANCE;
use crate::error::{Error, Result};

/// Settings for an [`ImageTester`](crate::ImageTester), usually read from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageTestConfig {
    /// Builtin backends to discover. Empty means all available ones.
    pub backends: Vec<String>,
    pub default_backend: Option<String>,
    pub default_image_file: Option<PathBuf>,
    pub mean_abs_tolerance: f64,
}

impl Default for ImageTestConfig {
    fn default() -> Self {
        Self {
            backends: Vec::new(),
            default_backend: None,
            default_image_file: None,
            mean_abs_tolerance: DEFAULT_MEAN_ABS_TOLERANCE,
        }
    }
}

impl ImageTestConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yml::from_str(yaml).map_err(|e| Error::Configuration(e.to_string()))
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Reads `path`, or falls back to defaults if it is missing or invalid.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::from_yaml_file(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    "Using default image test config, {} not loaded: {}",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self).map_err(|e| Error::Configuration(e.to_string()))
    }
}
