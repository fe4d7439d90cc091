//! Calculator configuration
//!
//! Settings come from an optional TOML file and can be overridden with
//! builder methods (the binary maps its CLI flags onto these).
//!
//! # Example
//!
//! ```toml
//! # ~/.config/progcalc/config.toml
//! data_dir = "/home/me/.progcalc"
//! builtin_defs = "/home/me/my-builtins.pcalc"
//! max_call_depth = 512
//! history = false
//! ```

use crate::dispatcher::DEFAULT_MAX_CALL_DEPTH;
use crate::store::JsonFileStore;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "progcalc";
const HISTORY_FILE: &str = "history";

/// Data directory: $XDG_DATA_HOME/progcalc/ or ~/.local/share/progcalc/
pub fn default_data_dir() -> PathBuf {
    // Try XDG_DATA_HOME first
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        let path = PathBuf::from(xdg_data);
        if path.is_absolute() {
            return path.join(APP_DIR);
        }
    }

    match home::home_dir() {
        Some(home) => home.join(".local").join("share").join(APP_DIR),
        None => PathBuf::from(".").join(format!(".{}", APP_DIR)),
    }
}

/// Error reading a configuration file
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        error: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, error } => {
                write!(f, "Failed to read config {}: {}", path.display(), error)
            }
            ConfigError::Parse {
                path: Some(path),
                error,
            } => write!(f, "Invalid config {}: {}", path.display(), error),
            ConfigError::Parse { path: None, error } => write!(f, "Invalid config: {}", error),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { error, .. } => Some(error),
            ConfigError::Parse { error, .. } => Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalcConfig {
    /// Directory holding saved user words and line history
    pub data_dir: PathBuf,

    /// Annotated definitions file replacing the embedded builtin library
    pub builtin_defs: Option<PathBuf>,

    /// Nesting limit for composite words
    pub max_call_depth: usize,

    /// Keep line history between sessions
    pub history: bool,
}

impl Default for CalcConfig {
    fn default() -> Self {
        CalcConfig {
            data_dir: default_data_dir(),
            builtin_defs: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            history: true,
        }
    }
}

impl CalcConfig {
    pub fn new() -> Self {
        CalcConfig::default()
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|error| ConfigError::Parse { path: None, error })
    }

    /// Read a TOML configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        toml::from_str(&source).map_err(|error| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            error,
        })
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_builtin_defs(mut self, path: impl AsRef<Path>) -> Self {
        self.builtin_defs = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_history(mut self, enabled: bool) -> Self {
        self.history = enabled;
        self
    }

    /// File-backed store for user words inside the data directory
    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::in_dir(&self.data_dir)
    }

    /// Line history file, if history is enabled
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history.then(|| self.data_dir.join(HISTORY_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_builder() {
        let config = CalcConfig::new()
            .with_data_dir("/tmp/pc")
            .with_builtin_defs("/tmp/defs.pcalc")
            .with_max_call_depth(8)
            .with_history(false);

        assert_eq!(config.data_dir, PathBuf::from("/tmp/pc"));
        assert_eq!(config.builtin_defs, Some(PathBuf::from("/tmp/defs.pcalc")));
        assert_eq!(config.max_call_depth, 8);
        assert_eq!(config.history_path(), None);
        assert_eq!(config.store().path(), Path::new("/tmp/pc/program.json"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CalcConfig::from_toml_str("max_call_depth = 32\n").unwrap();
        assert_eq!(config.max_call_depth, 32);
        assert!(config.history);
        assert!(config.builtin_defs.is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = CalcConfig::from_toml_str("colour = \"red\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "history = false\ndata_dir = \"/srv/pc\"\n").unwrap();

        let config = CalcConfig::load(&path).unwrap();
        assert!(!config.history);
        assert_eq!(config.data_dir, PathBuf::from("/srv/pc"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CalcConfig::load(Path::new("/nonexistent/progcalc.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    #[serial]
    fn test_xdg_data_home() {
        let previous = std::env::var_os("XDG_DATA_HOME");
        unsafe { std::env::set_var("XDG_DATA_HOME", "/xdg/data") };
        assert_eq!(default_data_dir(), PathBuf::from("/xdg/data/progcalc"));

        unsafe { std::env::set_var("XDG_DATA_HOME", "relative/dir") };
        assert_ne!(default_data_dir(), PathBuf::from("relative/dir/progcalc"));

        match previous {
            Some(value) => unsafe { std::env::set_var("XDG_DATA_HOME", value) },
            None => unsafe { std::env::remove_var("XDG_DATA_HOME") },
        }
    }
}
