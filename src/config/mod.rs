use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the TalkToText REST API.
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum accepted recording size in megabytes.
    pub max_file_size_mb: u64,
    /// Accepted recording extensions (lowercase, no dot).
    pub allowed_extensions: Vec<String>,
    /// Interval between processing-status polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Pause between upload completion and the first poll, so the
    /// "upload finished" state is visible before processing updates land.
    pub post_upload_delay_ms: u64,
    /// Pause between a completed status and opening the meeting,
    /// so the 100% state gets a moment on screen.
    pub navigate_delay_ms: u64,
    /// Tick rate of the displayed-progress smoother, in milliseconds.
    pub smoother_tick_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.talktotext.pro/api/v1".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            allowed_extensions: ["mp3", "wav", "m4a", "aac", "mp4", "mov", "avi"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            poll_interval_ms: 2500,
            post_upload_delay_ms: 1000,
            navigate_delay_ms: 1500,
            smoother_tick_ms: 20,
        }
    }
}

impl UploadConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn post_upload_delay(&self) -> Duration {
        Duration::from_millis(self.post_upload_delay_ms)
    }

    pub fn navigate_delay(&self) -> Duration {
        Duration::from_millis(self.navigate_delay_ms)
    }

    pub fn smoother_tick(&self) -> Duration {
        Duration::from_millis(self.smoother_tick_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
            info!("Loaded config from {:?}", config_path);
            config
        } else {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            config
        };

        // Environment override, for pointing at staging backends.
        if let Ok(url) = std::env::var("TTT_API_URL") {
            if !url.is_empty() {
                config.api.base_url = url;
            }
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}
