//! User configuration
//!
//! Stored as YAML at `$TRACEMAT_CONFIG`, or `<config dir>/tracemat/config.yaml`. A missing file
//! means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::list::DisplayMode;
use crate::serializer::DEFAULT_BANNER;

/// Settings shared by the parsers, the layout and the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// How header elements are printed
    pub display_mode: DisplayMode,
    /// First line written to table files
    pub banner: String,
    /// Extension of list files, without the dot
    pub list_extension: String,
    /// Extension of table files, without the dot
    pub table_extension: String,
    /// Directory used when none is given on the command line
    pub default_dir: Option<PathBuf>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::Label,
            banner: DEFAULT_BANNER.to_string(),
            list_extension: "list".to_string(),
            table_extension: "table".to_string(),
            default_dir: None,
        }
    }
}

impl TraceConfig {
    /// Loads the config from `path`, falling back to defaults when the file does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Saves the config, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path.as_ref()))?;

        Ok(())
    }
}

/// Gets the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("TRACEMAT_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let config_dir = dirs::config_dir().context("Failed to determine config directory")?;

    Ok(config_dir.join("tracemat").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = TraceConfig::load(dir.path().join("none.yaml"))?;
        assert_eq!(config, TraceConfig::default());
        assert_eq!(config.banner, "' list files");
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.yaml");

        let config = TraceConfig {
            display_mode: DisplayMode::Qualified,
            default_dir: Some(PathBuf::from("/data/trace")),
            ..TraceConfig::default()
        };
        config.save(&path)?;

        assert_eq!(TraceConfig::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.yaml");
        fs::write(&path, "display_mode: debug\n")?;

        let config = TraceConfig::load(&path)?;
        assert_eq!(config.display_mode, DisplayMode::Debug);
        assert_eq!(config.list_extension, "list");
        Ok(())
    }

    #[test]
    fn test_invalid_yaml_is_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.yaml");
        fs::write(&path, "display_mode: [sideways\n")?;

        assert!(TraceConfig::load(&path).is_err());
        Ok(())
    }
}
