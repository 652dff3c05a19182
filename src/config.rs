//! Renderer configuration.
//!
//! Loaded from `$TERMCORE_CONFIG` if set, otherwise `~/.termcore/config.toml`:
//!
//! ```toml
//! [screen]
//! alternate_screen = true
//! hide_cursor = true
//! mouse_capture = false
//! bracketed_paste = true
//! focus_reporting = false
//!
//! [paint]
//! # "full" repaints every frame, "diff" rewrites changed lines only
//! strategy = "diff"
//! synchronized_output = true
//!
//! [input]
//! # "blocking", "non-blocking" or "timeout"
//! policy = "timeout"
//! timeout_ms = 50
//! ```
//!
//! Missing keys take their defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::InputPolicy;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "TERMCORE_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub screen: ScreenConfig,
    pub paint: PaintConfig,
    pub input: InputConfig,
}

/// Screen setup applied when a session opens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub alternate_screen: bool,
    pub hide_cursor: bool,
    pub mouse_capture: bool,
    pub bracketed_paste: bool,
    pub focus_reporting: bool,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            hide_cursor: true,
            mouse_capture: false,
            bracketed_paste: true,
            focus_reporting: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaintStrategy {
    /// Clear and repaint the whole frame
    Full,
    /// Rewrite only the lines that changed since the last frame
    #[default]
    Diff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    pub strategy: PaintStrategy,
    /// Bracket each frame with `ESC[?2026h` / `ESC[?2026l`
    pub synchronized_output: bool,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            strategy: PaintStrategy::Diff,
            synchronized_output: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    Blocking,
    NonBlocking,
    #[default]
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub policy: PolicyKind,
    /// Wait used by the `timeout` policy
    pub timeout_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Timeout,
            timeout_ms: 50,
        }
    }
}

impl InputConfig {
    pub fn policy(&self) -> InputPolicy {
        match self.policy {
            PolicyKind::Blocking => InputPolicy::Blocking,
            PolicyKind::NonBlocking => InputPolicy::NonBlocking,
            PolicyKind::Timeout => InputPolicy::Timeout(Duration::from_millis(self.timeout_ms)),
        }
    }
}

impl RendererConfig {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::get_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(explicit));
        }
        home_dir().map(|home| home.join(".termcore").join("config.toml"))
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}
