//! Application configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `AUTOLABEL_*` environment variables, then command-line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_DETECTOR: &str = "AUTOLABEL_DETECTOR";
pub const ENV_MODEL_WEIGHTS: &str = "AUTOLABEL_MODEL_WEIGHTS";
pub const ENV_CLASSES_FILE: &str = "AUTOLABEL_CLASSES_FILE";
pub const ENV_ANNOTATOR: &str = "AUTOLABEL_ANNOTATOR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Detector executable, resolved through `PATH` when not absolute
    pub detector: PathBuf,
    /// Model weights passed to the detector as `model=`
    pub model_weights: PathBuf,
    /// Reference class list copied into the folder as `classes.txt`
    pub classes_file: PathBuf,
    /// Annotation editor executable
    pub annotator: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            detector: PathBuf::from("yolo"),
            model_weights: PathBuf::from("yolo11n.pt"),
            classes_file: PathBuf::from("classes.txt"),
            annotator: PathBuf::from("labelImg"),
        }
    }
}

/// Per-field overrides, used for both environment variables and CLI flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub detector: Option<PathBuf>,
    pub model_weights: Option<PathBuf>,
    pub classes_file: Option<PathBuf>,
    pub annotator: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Read overrides from `AUTOLABEL_*` variables. Empty values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var_os(k))
    }

    fn from_lookup(get: impl Fn(&str) -> Option<std::ffi::OsString>) -> Self {
        let var = |k: &str| get(k).filter(|v| !v.is_empty()).map(PathBuf::from);
        Self {
            detector: var(ENV_DETECTOR),
            model_weights: var(ENV_MODEL_WEIGHTS),
            classes_file: var(ENV_CLASSES_FILE),
            annotator: var(ENV_ANNOTATOR),
        }
    }
}

impl AppConfig {
    pub fn apply(mut self, o: &ConfigOverrides) -> Self {
        if let Some(v) = &o.detector {
            self.detector = v.clone();
        }
        if let Some(v) = &o.model_weights {
            self.model_weights = v.clone();
        }
        if let Some(v) = &o.classes_file {
            self.classes_file = v.clone();
        }
        if let Some(v) = &o.annotator {
            self.annotator = v.clone();
        }
        self
    }

    /// Parse a TOML config file. Missing keys fall back to defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    /// Load the file layer: an explicit path must exist; the default location
    /// is optional.
    pub fn load_file_layer(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            return Self::from_toml_file(p);
        }
        match default_config_path() {
            Some(p) if p.is_file() => Self::from_toml_file(&p),
            _ => Ok(Self::default()),
        }
    }

    /// Resolve the effective configuration from every layer.
    pub fn resolve(explicit: Option<&Path>, flags: &ConfigOverrides) -> Result<Self> {
        let cfg = Self::load_file_layer(explicit)?
            .apply(&ConfigOverrides::from_env())
            .apply(flags);
        tracing::debug!(?cfg, "resolved configuration");
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize config")
    }
}

/// `<config_dir>/autolabel/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("autolabel").join("config.toml"))
}
