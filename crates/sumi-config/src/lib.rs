//! Sumi configuration system
//!
//! Renderer-level settings (font discovery, cache sizes, canvas limits)
//! loaded from `sumi.toml`, with environment variables as overrides.
//! Per-render styling lives in the style record, not here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "sumi.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SumiConfig {
    pub fonts: FontConfig,
    pub cache: CacheConfig,
    pub limits: LimitsConfig,
}

/// Font discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Family used when a style names a family that is not installed.
    /// Generic names (`sans-serif`, `serif`, `monospace`) are accepted.
    pub default_family: String,
    /// Directories scanned in addition to the system font locations
    pub extra_font_dirs: Vec<PathBuf>,
    pub load_system_fonts: bool,
}

/// Cache capacities, in entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub glyph_capacity: usize,
    pub blur_capacity: usize,
    pub render_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted canvas side in pixels
    pub max_canvas_side: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            default_family: "sans-serif".to_string(),
            extra_font_dirs: Vec::new(),
            load_system_fonts: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            glyph_capacity: 512,
            blur_capacity: 32,
            render_capacity: 32,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_canvas_side: 16384,
        }
    }
}

impl SumiConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `sumi.toml` from the current directory, or the defaults if it
    /// is missing or unreadable.
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// Values that fail to parse are ignored.
    pub fn merge_with_env(&mut self) {
        self.merge_with(|key| std::env::var(key).ok());
    }

    fn merge_with(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Font settings
        if let Some(family) = var("SUMI_FONT_FAMILY") {
            if !family.trim().is_empty() {
                self.fonts.default_family = family;
            }
        }
        if let Some(dirs) = var("SUMI_FONT_DIRS") {
            self.fonts.extra_font_dirs = std::env::split_paths(&dirs)
                .filter(|dir| !dir.as_os_str().is_empty())
                .collect();
        }
        if let Some(val) = var("SUMI_SYSTEM_FONTS") {
            self.fonts.load_system_fonts = val == "1" || val.eq_ignore_ascii_case("true");
        }

        // Cache settings
        if let Some(cap) = var("SUMI_GLYPH_CACHE").and_then(|v| v.parse().ok()) {
            self.cache.glyph_capacity = cap;
        }
        if let Some(cap) = var("SUMI_BLUR_CACHE").and_then(|v| v.parse().ok()) {
            self.cache.blur_capacity = cap;
        }
        if let Some(cap) = var("SUMI_RENDER_CACHE").and_then(|v| v.parse().ok()) {
            self.cache.render_capacity = cap;
        }

        if let Some(side) = var("SUMI_MAX_CANVAS").and_then(|v| v.parse().ok()) {
            self.limits.max_canvas_side = side;
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from sumi.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
