use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::alert::Platform;

/// Defaults applied to every alert built from config.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertDefaults {
    /// Whether clicking the backdrop dismisses the alert
    pub enable_backdrop_dismiss: bool,
    /// Render with a translucent background
    pub translucent: bool,
    /// Platform look: "ios" or "md"
    pub mode: Platform,
}

impl Default for AlertDefaults {
    fn default() -> Self {
        Self {
            enable_backdrop_dismiss: true,
            translucent: false,
            mode: Platform::Md,
        }
    }
}

/// Animation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Built-in builder for the enter animation ("ios-enter", "md-enter", ...)
    pub alert_enter: Option<String>,
    /// Built-in builder for the leave animation ("ios-leave", "md-leave", ...)
    pub alert_leave: Option<String>,
    /// Give up on an animation step after this many milliseconds (unset = wait forever)
    pub timeout_ms: Option<u64>,
    /// Animation frame duration in milliseconds
    pub frame_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            alert_enter: None,
            alert_leave: None,
            timeout_ms: None,
            frame_ms: 16, // ~60 FPS
        }
    }
}

/// Behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Buffered notifications per subscriber before the oldest are dropped
    pub notification_capacity: usize,
    /// Idle polling interval in milliseconds
    pub idle_poll_ms: u64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            notification_capacity: 32,
            idle_poll_ms: 50,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directives, overridden by RUST_LOG
    pub filter: String,
    /// Log file; defaults to ~/.cache/scry-alert/alert.log
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "scry_alert=info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// The configured log file, else the default under the cache dir.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file
            .clone()
            .or_else(|| dirs::cache_dir().map(|p| p.join("scry-alert").join("alert.log")))
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub alert: AlertDefaults,
    pub animation: AnimationConfig,
    pub behavior: BehaviorConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Returns the default config file path: ~/.config/scry-alert/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("scry-alert").join("config.toml"))
    }

    /// Load configuration from the default path, falling back to defaults.
    pub fn load() -> Self {
        Self::default_path()
            .and_then(|path| Self::load_from_path(&path).ok())
            .unwrap_or_default()
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::default_path() {
            self.save_to_path(&path)
        } else {
            Err(anyhow::anyhow!("Could not determine config directory"))
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
