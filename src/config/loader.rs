//! Settings File Loading
//!
//! Finds and loads the optional settings file. Search order:
//!
//! 1. Path given with `--config`
//! 2. `$SMUX_CONFIG`
//! 3. `$XDG_CONFIG_HOME/smux/config.toml`
//! 4. `~/.config/smux/config.toml`
//! 5. `~/.smux.toml`
//! 6. Built-in defaults

use super::Settings;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a settings file
pub const CONFIG_ENV_VAR: &str = "SMUX_CONFIG";

/// Settings file loader
pub struct SettingsLoader {
    /// Candidate files, most specific first
    search_paths: Vec<PathBuf>,
    /// File the settings came from, if any
    loaded_from: Option<PathBuf>,
}

impl SettingsLoader {
    /// Create a loader using the default search paths
    pub fn new() -> Self {
        Self {
            search_paths: Self::get_search_paths(),
            loaded_from: None,
        }
    }

    /// Create a loader that only looks at the given paths
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            loaded_from: None,
        }
    }

    /// Candidate paths in search order
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// File the last [`load`](Self::load) read, `None` for built-in defaults
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }

    /// Load settings from an explicit path or the search paths.
    ///
    /// An explicit path must exist and parse. Files found while searching are
    /// skipped with a warning when they fail to parse.
    pub fn load(&mut self, explicit: Option<&Path>) -> Result<Settings> {
        if let Some(path) = explicit {
            let settings = Self::load_file(path)?;
            self.loaded_from = Some(path.to_path_buf());
            return Ok(settings);
        }

        for path in &self.search_paths {
            if !path.is_file() {
                continue;
            }
            match Self::load_file(path) {
                Ok(settings) => {
                    debug!("Loaded settings from {}", path.display());
                    self.loaded_from = Some(path.clone());
                    return Ok(settings);
                }
                Err(e) => {
                    warn!("Skipping settings file {}: {}", path.display(), e);
                }
            }
        }

        debug!("No settings file found, using defaults");
        self.loaded_from = None;
        Ok(Settings::default())
    }

    /// Load and validate a single settings file
    pub fn load_file(path: &Path) -> Result<Settings> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Get default search paths for the settings file
    fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(explicit) = env::var(CONFIG_ENV_VAR) {
            if !explicit.is_empty() {
                paths.push(PathBuf::from(explicit));
            }
        }

        if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_config).join("smux").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("smux").join("config.toml"));
            paths.push(home.join(".smux.toml"));
        }

        paths
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}
