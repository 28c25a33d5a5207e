//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/sixml/sixml.toml`
//! 3. Local config: `<dir>/.sixml.toml` (working directory by default)
//! 4. Environment variables: `SIXML_*` prefix
//!
//! Command line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

pub const LOCAL_CONFIG_FILE: &str = ".sixml.toml";

/// Unified configuration for sixml.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Store file (default: punches.xml)
    pub store_path: PathBuf,
    /// Expected competition name; None adopts the stored one
    pub competition_name: Option<String>,
    /// Indent the XML for humans
    pub pretty_print: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("punches.xml"),
            competition_name: None,
            pretty_print: true,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub store_path: Option<PathBuf>,
    pub competition_name: Option<String>,
    pub pretty_print: Option<bool>,
}

/// Get the XDG config directory for sixml.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sixml").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("sixml.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            store_path: overlay
                .store_path
                .clone()
                .unwrap_or_else(|| self.store_path.clone()),
            competition_name: overlay
                .competition_name
                .clone()
                .or_else(|| self.competition_name.clone()),
            pretty_print: overlay.pretty_print.unwrap_or(self.pretty_print),
        }
    }

    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.store_path.to_string_lossy().as_ref());
        self.store_path = PathBuf::from(expanded);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory holding `.sixml.toml`; None uses the working directory
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        let local_dir = match local_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().map_err(|e| ApplicationError::Config {
                message: format!("current directory: {}", e),
            })?,
        };
        let local_path = local_config_path(&local_dir);
        if local_path.exists() {
            let raw = load_raw_settings(&local_path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply SIXML_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("SIXML").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("store_path") {
            settings.store_path = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("competition_name") {
            settings.competition_name = Some(val);
        }
        if let Ok(val) = config.get_bool("pretty_print") {
            settings.pretty_print = val;
        }

        Ok(settings)
    }

    /// Effective settings rendered as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.store_path, PathBuf::from("punches.xml"));
        assert_eq!(settings.competition_name, None);
        assert!(settings.pretty_print);
    }

    #[test]
    fn test_merge_with_overrides_only_specified_fields() {
        let base = Settings {
            competition_name: Some("Base Race".into()),
            ..Settings::default()
        };
        let overlay = RawSettings {
            pretty_print: Some(false),
            ..RawSettings::default()
        };

        let result = base.merge_with(&overlay);

        assert_eq!(result.competition_name, Some("Base Race".to_string()));
        assert_eq!(result.store_path, PathBuf::from("punches.xml"));
        assert!(!result.pretty_print);
    }

    #[test]
    fn test_raw_settings_parse_partial_toml() {
        let raw: RawSettings = toml::from_str("competition_name = \"Testlöpning\"\n").unwrap();
        assert_eq!(raw.competition_name.as_deref(), Some("Testlöpning"));
        assert!(raw.store_path.is_none());
        assert!(raw.pretty_print.is_none());
    }

    #[test]
    fn test_to_toml_skips_missing_name() {
        let out = Settings::default().to_toml().unwrap();
        assert!(out.contains("store_path = \"punches.xml\""));
        assert!(out.contains("pretty_print = true"));
        assert!(!out.contains("competition_name"));
    }
}
