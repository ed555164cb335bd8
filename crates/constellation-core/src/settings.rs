//! # Settings
//!
//! The configuration provider: compiled-in defaults, optionally overridden
//! by a TOML file.
//!
//! ```toml
//! public_frequency = 0
//! default_public_name = "Public"
//! default_public_color = [0.0, 0.8, 1.0, 1.0]
//!
//! [[constellations]]
//! frequency = 0
//! name = "Public"
//! color = [0.0, 0.8, 1.0, 1.0]
//! ```
//!
//! Missing keys keep their compiled-in values; unknown keys are rejected.

use crate::{Color, Constellation, ConstellationError, Frequency};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum settings file size (1 MB).
const MAX_SETTINGS_FILE_SIZE: u64 = 1024 * 1024;

/// Fallback values and the default constellation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Frequency every vessel starts on; its constellation cannot be removed.
    pub public_frequency: Frequency,
    /// Colour returned for frequencies with no constellation.
    pub default_public_color: Color,
    /// Name returned when even the public frequency has no constellation.
    pub default_public_name: String,
    /// List used when the save file has no usable constellation section.
    ///
    /// Registries hold it in ascending-frequency order; `from_toml_str`
    /// sorts it the same way (stable), so a loaded list is returned
    /// unchanged by a registry built from it.
    pub constellations: Vec<Constellation>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            public_frequency: Frequency::MIN,
            default_public_color: Color::PUBLIC,
            default_public_name: "Public".to_string(),
            constellations: vec![Constellation::new(Frequency::MIN, "Public", Color::PUBLIC)],
        }
    }
}

impl Settings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConstellationError> {
        let mut settings: Self =
            toml::from_str(text).map_err(|e| ConstellationError::SettingsError(e.to_string()))?;
        settings.validate()?;
        settings.constellations.sort_by_key(|c| c.frequency);
        Ok(settings)
    }

    /// Read, parse and validate a TOML settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConstellationError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| {
            ConstellationError::IoError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_SETTINGS_FILE_SIZE {
            return Err(ConstellationError::SettingsError(format!(
                "Settings file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_SETTINGS_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            ConstellationError::IoError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        let settings = Self::from_toml_str(&text)?;
        tracing::debug!(
            "Settings loaded from {:?}: {} default constellation(s)",
            path,
            settings.constellations.len()
        );
        Ok(settings)
    }

    /// Check the invariants the registry relies on.
    ///
    /// The default list must be non-empty and contain the public frequency.
    pub fn validate(&self) -> Result<(), ConstellationError> {
        if self.constellations.is_empty() {
            return Err(ConstellationError::SettingsError(
                "the default constellation list is empty".to_string(),
            ));
        }
        if !self
            .constellations
            .iter()
            .any(|c| c.frequency == self.public_frequency)
        {
            return Err(ConstellationError::SettingsError(format!(
                "public frequency {} has no default constellation",
                self.public_frequency
            )));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
