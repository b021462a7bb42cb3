//! src/config.rs
//! ============================================================================
//! # Config: bfmrc Loader
//!
//! Loads the user's key bindings, plugin registry and display substitutions
//! from TOML at the platform config path, found through the
//! [`directories`](https://docs.rs/directories) crate (`~/.config/bfm/bfmrc`
//! on Linux).
//!
//! A missing or unparsable file is not an error: the built-in bindings are
//! used and no plugins are registered.
//!
//! ## Example
//! ```rust,ignore
//! let paths = AppPaths::discover()?;
//! let config = Config::load(&paths.config_file).await;
//! ```

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tokio::fs as TokioFs;

use crate::error::{AppError, AppResult};

/// One `key -> command` entry of the binding table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub key: String,
    pub command: String,
}

/// Plugin registry entry; only used to build the help text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEntry {
    pub section: String,
    pub command: String,
    pub help: String,
}

impl PluginEntry {
    fn new(section: &str, command: &str, help: &str) -> Self {
        Self {
            section: section.to_string(),
            command: command.to_string(),
            help: help.to_string(),
        }
    }
}

/// Display substitution for the working directory shown in the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WdReplacement {
    pub real: String,
    pub repl: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Never,
    #[default]
    Daily,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub rotation: LogRotation,
    pub max_log_files: usize,

    /// Defaults to `~/.local/state/bfm/logs`.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            rotation: LogRotation::Daily,
            max_log_files: 10,
            dir: None,
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Install the built-in bindings before the user's.
    pub default_bindings: bool,

    /// Prepend the built-in plugin registry to the user's.
    pub default_plugins: bool,

    pub bindings: Vec<Binding>,

    pub plugins: Vec<PluginEntry>,

    pub wd_replacements: Vec<WdReplacement>,

    pub plugins_dir: Option<PathBuf>,

    pub editor: Option<String>,

    pub pager: Option<String>,

    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_bindings: true,
            default_plugins: false,
            bindings: Vec::new(),
            plugins: Vec::new(),
            wd_replacements: Vec::new(),
            plugins_dir: None,
            editor: None,
            pager: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is missing
    /// or cannot be parsed.
    pub async fn load(path: &Path) -> Self {
        match Self::try_load(path).await {
            Ok(Some(config)) => config,
            Ok(None) => {
                info!("No config file found at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Error parsing {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// `Ok(None)` when the file does not exist.
    pub async fn try_load(path: &Path) -> AppResult<Option<Self>> {
        if !TokioFs::try_exists(path).await.unwrap_or(false) {
            return Ok(None);
        }

        info!("Loading config from {}", path.display());
        let text = TokioFs::read_to_string(path)
            .await
            .map_err(|source| AppError::ConfigIo {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Some(Self::from_toml(&text)?))
    }

    pub fn from_toml(text: &str) -> AppResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Registry used for help: built-in entries first when enabled.
    pub fn plugin_registry(&self) -> Vec<PluginEntry> {
        let mut registry = if self.default_plugins {
            default_plugins()
        } else {
            Vec::new()
        };
        registry.extend(self.plugins.iter().cloned());
        registry
    }

    pub fn editor_command(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.is_empty()))
            .unwrap_or_else(|| "vim".to_string())
    }

    pub fn pager_command(&self) -> String {
        self.pager.clone().unwrap_or_else(|| "less".to_string())
    }

    /// Working directory as shown to the user.
    pub fn display_directory(&self, dir: &Path) -> String {
        let mut shown = dir.display().to_string();
        for r in &self.wd_replacements {
            shown = shown.replace(&r.real, &r.repl);
        }
        shown
    }
}

pub fn default_plugins() -> Vec<PluginEntry> {
    vec![
        PluginEntry::new("Navigation", "iplugin fzcd", "Select directory from .paths with FZF"),
        PluginEntry::new("Navigation", "iplugin fzjump", "Jump to sub file/dir by FZF selection"),
        PluginEntry::new("Navigation", "iplugin autojump", "autojump (I'm feeling lucky)"),
        PluginEntry::new("Navigation", "iplugin autojump FZF", "FZF on autojump results"),
        PluginEntry::new("Operations", "plugin compress", "Compress file"),
        PluginEntry::new("Operations", "plugin uncompress", "Uncompress (extract) file"),
        PluginEntry::new("Operations", "plugin preview", "Open file(s) with Preview.app"),
        PluginEntry::new("Operations", "plugin acrobat", "Open file(s) with Acrobat.app"),
        PluginEntry::new("Operations", "plugin quicklook", "Open file(s) with Quicklook"),
        PluginEntry::new("Operations", "plugin image_compress", "Compress file(s) with magick"),
    ]
}

/// Every filesystem location the program reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub home: PathBuf,
    pub config_file: PathBuf,
    pub plugins_dir: PathBuf,
    pub help_file: PathBuf,
    pub lastd_file: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    /// Platform locations via `directories`.
    pub fn discover() -> AppResult<Self> {
        let base = BaseDirs::new()
            .ok_or_else(|| AppError::Other("Could not determine home directory".into()))?;
        let proj_dirs = ProjectDirs::from("", "", "bfm")
            .ok_or_else(|| AppError::Other("Could not determine config directory".into()))?;

        let home = base.home_dir().to_path_buf();
        let state = home.join(".local").join("state");

        Ok(Self {
            config_file: proj_dirs.config_dir().join("bfmrc"),
            plugins_dir: proj_dirs.config_dir().join("plugins"),
            help_file: proj_dirs.data_dir().join("help.txt"),
            lastd_file: state.join("bfm.lastd"),
            log_dir: state.join("bfm").join("logs"),
            home,
        })
    }

    /// Apply the overrides a loaded config carries.
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        if let Some(dir) = &config.plugins_dir {
            self.plugins_dir.clone_from(dir);
        }
        if let Some(dir) = &config.logging.dir {
            self.log_dir.clone_from(dir);
        }
        self
    }

    /// All locations under one root; used by tests.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            home: root.to_path_buf(),
            config_file: root.join("bfmrc"),
            plugins_dir: root.join("plugins"),
            help_file: root.join("help.txt"),
            lastd_file: root.join("bfm.lastd"),
            log_dir: root.join("logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_gives_default_bindings_no_plugins() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&temp_dir.path().join("bfmrc")).await;
        assert!(config.default_bindings);
        assert!(config.plugin_registry().is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_file_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bfmrc");
        std::fs::write(&path, "bindings = [[[").unwrap();

        assert!(Config::try_load(&path).await.is_err());
        assert_eq!(Config::load(&path).await, Config::default());
    }

    #[tokio::test]
    async fn test_load_full_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bfmrc");
        std::fs::write(
            &path,
            r#"
default_bindings = false
default_plugins = true
editor = "nvim"

[[bindings]]
key = "x"
command = "plugin compress"

[[plugins]]
section = "Operations"
command = "plugin mine"
help = "Mine"

[[wd_replacements]]
real = "/Users/me/Library/CloudStorage/OneDrive"
repl = "~OneDrive"

[logging]
level = "debug"
rotation = "never"
"#,
        )
        .unwrap();

        let config = Config::load(&path).await;
        assert!(!config.default_bindings);
        assert_eq!(config.bindings[0].command, "plugin compress");
        assert_eq!(config.editor_command(), "nvim");
        assert_eq!(config.logging.rotation, LogRotation::Never);
        assert_eq!(config.logging.max_log_files, 10);

        let registry = config.plugin_registry();
        assert_eq!(registry.len(), default_plugins().len() + 1);
        assert_eq!(registry.last().unwrap().command, "plugin mine");

        assert_eq!(
            config.display_directory(Path::new(
                "/Users/me/Library/CloudStorage/OneDrive/docs"
            )),
            "~OneDrive/docs"
        );
    }

    #[test]
    fn test_paths_follow_config_overrides() {
        let config = Config {
            plugins_dir: Some(PathBuf::from("/opt/plugins")),
            ..Config::default()
        };
        let paths = AppPaths::rooted_at(Path::new("/r")).with_config(&config);
        assert_eq!(paths.plugins_dir, PathBuf::from("/opt/plugins"));
        assert_eq!(paths.log_dir, PathBuf::from("/r/logs"));
    }
}
