//! # Cloud Configuration
//!
//! TOML-backed settings, loaded once at startup.
//!
//! ```toml
//! seed = 1337
//! cache_capacity = 64
//!
//! [synthesis]
//! frequency = 0.1
//! layer_count = 2
//!
//! [appearance]
//! transition_speed = 0.01
//! initial_weather = "cloudy"
//! ```
//!
//! Every field is optional; missing ones take the defaults below.

use std::path::Path;

use cirrus_procedural::{AppearanceSettings, CloudError, NoiseSeed, SynthesisSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {reason}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        reason: String,
    },

    /// The file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// The values parsed but are unusable.
    #[error(transparent)]
    Invalid(#[from] CloudError),
}

/// Complete configuration for one cloud system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Seed for the permutation table.
    pub seed: u64,
    /// Maximum number of memoized tiles.
    pub cache_capacity: usize,
    /// Tile synthesis settings.
    pub synthesis: SynthesisSettings,
    /// Weather and day/night settings.
    pub appearance: AppearanceSettings,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            seed: NoiseSeed::default().value(),
            cache_capacity: 64,
            synthesis: SynthesisSettings::default(),
            appearance: AppearanceSettings::default(),
        }
    }
}

impl CloudConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and
    /// `ConfigError::Invalid` for values that fail validation.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, otherwise the
    /// errors of [`CloudConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!("loaded cloud config from {}", path.display());
        Ok(config)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns `CloudError::InvalidConfig` describing the first bad value.
    pub fn validate(&self) -> Result<(), CloudError> {
        self.synthesis.validate()?;
        self.appearance.validate()?;
        if self.cache_capacity == 0 {
            return Err(CloudError::InvalidConfig(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The configured seed.
    #[must_use]
    pub const fn noise_seed(&self) -> NoiseSeed {
        NoiseSeed::new(self.seed)
    }
}
