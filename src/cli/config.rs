//! TOML configuration for instrument constants and the EPU mirror folder.
//!
//! Values that no metadata file carries are kept per user:
//!
//! ```toml
//! # ~/.config/emharvest/emharvest.toml
//! [instrument]
//! cs = "2.7"
//! gainref_flip_rotate = "flipy"
//!
//! [paths]
//! mirror_folder = "/mnt/epu_mirror"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use emharvest::convert::InstrumentConstants;

/// Root configuration structure for emharvest.toml files.
#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Instrument constants.
    #[serde(default)]
    pub instrument: InstrumentSection,

    /// Filesystem locations.
    #[serde(default)]
    pub paths: PathsSection,
}

/// Constants of the microscope the data was taken on.
#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct InstrumentSection {
    /// Spherical aberration (mm).
    pub cs: Option<String>,

    /// Flip/rotation to apply to the gain reference on import.
    pub gainref_flip_rotate: Option<String>,
}

/// Filesystem locations.
#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PathsSection {
    /// Folder where EPU mirrors its per-dataset metadata.
    pub mirror_folder: Option<PathBuf>,
}

impl Config {
    /// Default location below the user's config directory.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "emharvest")
            .context("Could not determine the user config directory")?;
        Ok(dirs.config_dir().join("emharvest.toml"))
    }

    /// `explicit` if given, the default location otherwise.
    pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path),
            None => Self::default_path(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Load the file at `path`, or `None` when there is none yet.
    pub fn load_if_present(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::from_file(path).map(Some)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Write the file, creating its directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Constants with unset values left empty.
    pub fn instrument_constants(&self) -> InstrumentConstants {
        InstrumentConstants {
            cs: self.instrument.cs.clone().unwrap_or_default(),
            gain_flip_rotate: self.instrument.gainref_flip_rotate.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [instrument]
            cs = "2.7"
            gainref_flip_rotate = "flipy"

            [paths]
            mirror_folder = "/mnt/epu_mirror"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.instrument.cs.as_deref(), Some("2.7"));
        assert_eq!(
            config.instrument.gainref_flip_rotate.as_deref(),
            Some("flipy")
        );
        assert_eq!(
            config.paths.mirror_folder,
            Some(PathBuf::from("/mnt/epu_mirror"))
        );

        let constants = config.instrument_constants();
        assert_eq!(constants.cs, "2.7");
        assert_eq!(constants.gain_flip_rotate, "flipy");
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [instrument]
            cs = "2.7"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.instrument.gainref_flip_rotate, None);
        assert_eq!(config.paths.mirror_folder, None);
        assert_eq!(config.instrument_constants().gain_flip_rotate, "");
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("emharvest.toml");
        assert!(Config::load_if_present(&path).unwrap().is_none());

        let mut config = Config::default();
        config.instrument.cs = Some("2.7".to_string());
        config.paths.mirror_folder = Some(PathBuf::from("/mnt/epu"));
        config.save(&path).unwrap();

        assert_eq!(Config::load_if_present(&path).unwrap(), Some(config));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_str("[instrument\ncs = ").is_err());
    }
}
