use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    render::RenderSettings,
    vhs::{RandomKind, VhsConfig},
};

/// Main configuration for retro-vhs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Effect parameters
    pub vhs: VhsConfig,

    /// Random stream and noise model
    pub engine: EngineSettings,

    /// Frame sequence rendering
    pub render: RenderSettings,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: EngineConfig = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    ///
    /// Effect parameters are never rejected here; they are clamped when a
    /// frame is processed.
    pub fn validate(&self) -> Result<()> {
        self.render.validate()?;
        Ok(())
    }
}

/// Engine construction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Seed for the engine random stream
    pub seed: u64,

    /// Random stream implementation
    pub random: RandomKind,

    /// Use the exact running-noise recurrence (slower)
    pub precise_noise: bool,

    /// Flip the scanline phase offset between 0 and 2 on alternate frames
    pub alternate_chroma_phase: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            seed: 31374242,
            random: RandomKind::XorWow,
            precise_noise: false,
            alternate_chroma_phase: false,
        }
    }
}
