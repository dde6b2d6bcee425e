//! Configuration management for StreamView
//!
//! This module handles loading and managing application configuration
//! from various sources including config files and environment variables.

use crate::utils::error::{Result, StreamViewError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window configuration
    pub window: WindowConfig,

    /// Network stream configuration
    pub network: NetworkConfig,

    /// Snapshot configuration
    pub snapshot: SnapshotConfig,

    /// General application settings
    pub general: GeneralConfig,
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial window width
    pub width: u32,

    /// Initial window height
    pub height: u32,

    /// Window title
    pub title: String,

    /// Start in fullscreen mode
    pub fullscreen: bool,
}

/// Network stream configuration
///
/// These map directly onto per-source options the engine applies when the
/// input is an RTSP (or other network) address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Force the reliable TCP lower transport for RTSP sources
    pub force_tcp: bool,

    /// Network buffering duration in milliseconds
    pub caching_ms: u64,
}

/// Snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Output format
    pub format: SnapshotFormat,

    /// JPEG quality (1-100, ignored for PNG)
    pub quality: u8,

    /// Output directory; defaults to the platform pictures folder
    pub directory: Option<PathBuf>,
}

/// Snapshot output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    Png,
    Jpeg,
}

impl SnapshotFormat {
    /// File extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            SnapshotFormat::Png => "png",
            SnapshotFormat::Jpeg => "jpg",
        }
    }
}

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Initial volume (0.0 - 1.0)
    pub volume: f64,

    /// Start playback as soon as a source is opened
    pub auto_play: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Number of recently played inputs to remember
    pub recent_inputs_limit: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 700,
            title: "StreamView".to_string(),
            fullscreen: false,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            force_tcp: true,
            caching_ms: 1500,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            format: SnapshotFormat::Png,
            quality: 90,
            directory: None,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            volume: 0.7,
            auto_play: true,
            log_level: "info".to_string(),
            recent_inputs_limit: 10,
        }
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. User config file (~/.config/streamview/config.toml on Linux)
    /// 3. Environment variables (STREAMVIEW_* prefix)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config.merge_from_file(&user_path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the user config file
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()
            .ok_or_else(|| StreamViewError::Config("Cannot determine user config path".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StreamViewError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let toml = toml::to_string_pretty(self)
            .map_err(|e| StreamViewError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&path, toml)
            .map_err(|e| StreamViewError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Merge configuration from a TOML file
    pub fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StreamViewError::Config(format!("Failed to read config file: {}", e)))?;

        let file_config: Config = toml::from_str(&contents)
            .map_err(|e| StreamViewError::Config(format!("Failed to parse config file: {}", e)))?;

        *self = file_config;

        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // Example: STREAMVIEW_WINDOW_WIDTH=1920
        if let Ok(width) = std::env::var("STREAMVIEW_WINDOW_WIDTH") {
            self.window.width = width.parse()
                .map_err(|_| StreamViewError::Config("Invalid STREAMVIEW_WINDOW_WIDTH".to_string()))?;
        }

        if let Ok(height) = std::env::var("STREAMVIEW_WINDOW_HEIGHT") {
            self.window.height = height.parse()
                .map_err(|_| StreamViewError::Config("Invalid STREAMVIEW_WINDOW_HEIGHT".to_string()))?;
        }

        if let Ok(volume) = std::env::var("STREAMVIEW_VOLUME") {
            self.general.volume = volume.parse()
                .map_err(|_| StreamViewError::Config("Invalid STREAMVIEW_VOLUME".to_string()))?;
        }

        if let Ok(caching) = std::env::var("STREAMVIEW_NETWORK_CACHING") {
            self.network.caching_ms = caching.parse()
                .map_err(|_| StreamViewError::Config("Invalid STREAMVIEW_NETWORK_CACHING".to_string()))?;
        }

        if let Ok(log_level) = std::env::var("STREAMVIEW_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(StreamViewError::Config("Window dimensions must be non-zero".to_string()));
        }

        if !(0.0..=1.0).contains(&self.general.volume) {
            return Err(StreamViewError::Config("Volume must be between 0.0 and 1.0".to_string()));
        }

        if !(1..=100).contains(&self.snapshot.quality) {
            return Err(StreamViewError::Config("Snapshot quality must be between 1 and 100".to_string()));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(StreamViewError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level, valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get user config file path
    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("streamview").join("config.toml"))
    }

    /// Resolve the snapshot output directory
    pub fn snapshot_dir(&self) -> PathBuf {
        self.snapshot
            .directory
            .clone()
            .or_else(dirs::picture_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
