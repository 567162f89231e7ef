use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use voxcraft_world::{WorldConfig, MAX_RENDER_RADIUS};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings RON: {0}")]
    Parse(String),
    #[error("render radius {0} exceeds the maximum of {MAX_RENDER_RADIUS}")]
    RenderRadius(u32),
}

/// Process-level settings, loaded from an optional RON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Store file. Empty means a throwaway in-memory store.
    pub db_path: PathBuf,
    pub world: WorldConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("voxcraft.db"),
            world: WorldConfig::default(),
        }
    }
}

impl Settings {
    /// Parse settings from a RON string. Missing fields keep their defaults.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, SettingsError> {
        let options = ron::Options::default();
        let settings: Settings = options
            .from_str(ron_str)
            .map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the world cannot be built with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.world.render_radius > MAX_RENDER_RADIUS {
            return Err(SettingsError::RenderRadius(self.world.render_radius));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    pub fn in_memory(&self) -> bool {
        self.db_path.as_os_str().is_empty()
    }
}
