//! XDG Base Directory Support
//!
//! Locates the user configuration file following XDG Base Directory
//! conventions.

use std::env;
use std::path::PathBuf;

/// Application directory name under the XDG config home
const APP_DIR: &str = "komodo";

/// XDG directory structure for Komodo
#[derive(Debug, Clone)]
pub struct XdgDirs {
    pub config_dir: PathBuf,
}

impl XdgDirs {
    /// Resolve directories.
    ///
    /// Priority order (highest to lowest):
    /// 1. `KOMODO_CONFIG_DIR`
    /// 2. `XDG_CONFIG_HOME`
    /// 3. Platform config directory (`~/.config` on Linux)
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Use an explicit config directory
    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(dir) = env::var("KOMODO_CONFIG_DIR") {
            return PathBuf::from(dir);
        }

        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR);
        }

        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Get config file path
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}
