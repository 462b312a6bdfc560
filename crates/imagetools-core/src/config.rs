// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tool configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Environment variable overriding [`ToolsConfig::cache_dir`].
pub const CACHE_DIR_ENV: &str = "IMAGETOOLS_CACHE_DIR";

/// Decoded images larger than this many pixels are downsampled (240*8 x 500*8).
pub const DEFAULT_MAX_DECODE_AREA: u64 = 240 * 8 * 500 * 8;

/// Settings for the native image module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Directory that receives generated images.
    pub cache_dir: PathBuf,
    /// Pixel area above which sources are downsampled while decoding.
    pub max_decode_area: u64,
    /// Neighbourhood radius for adaptive (type 3) binarization.
    pub adaptive_block_radius: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            cache_dir: std::env::temp_dir().join("imagetools"),
            max_decode_area: DEFAULT_MAX_DECODE_AREA,
            adaptive_block_radius: 15,
        }
    }
}

impl ToolsConfig {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Defaults, with the cache directory taken from `IMAGETOOLS_CACHE_DIR` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
            config.cache_dir = PathBuf::from(dir);
        }
        config
    }

    /// Builder-style override of the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Create the cache directory if needed and return it.
    pub fn ensure_cache_dir(&self) -> Result<&Path> {
        std::fs::create_dir_all(&self.cache_dir)?;
        Ok(&self.cache_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ToolsConfig::load(dir.path().join("absent.json")).expect("load");
        assert_eq!(config, ToolsConfig::default());
        assert_eq!(config.max_decode_area, 7_680_000);
    }

    #[test]
    fn written_settings_load_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        let config = ToolsConfig {
            max_decode_area: 1_000,
            adaptive_block_radius: 4,
            ..ToolsConfig::default().with_cache_dir(dir.path().join("cache"))
        };
        std::fs::write(&path, serde_json::to_string_pretty(&config).expect("json")).expect("write");
        assert_eq!(ToolsConfig::load(&path).expect("load"), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"adaptive_block_radius": 7}"#).expect("write");
        let config = ToolsConfig::load(&path).expect("load");
        assert_eq!(config.adaptive_block_radius, 7);
        assert_eq!(config.max_decode_area, DEFAULT_MAX_DECODE_AREA);
    }

    #[test]
    fn ensure_cache_dir_creates_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ToolsConfig::default().with_cache_dir(dir.path().join("a").join("b"));
        let created = config.ensure_cache_dir().expect("create");
        assert!(created.is_dir());
    }
}
