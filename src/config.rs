//! Client configuration loaded from a TOML file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub playback: PlaybackConfig,
    pub ads: AdConfig,
}

/// Backend endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST backend, without a trailing slash.
    pub base_url: String,
    /// Bearer token for authenticated calls. Absent means anonymous:
    /// resume and persistence are skipped silently.
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            token: None,
            timeout_secs: 10,
        }
    }
}

/// Timing knobs for the playback session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Interval between processing polls while a video has zero sources.
    pub poll_interval_secs: u64,
    /// Minimum elapsed video time between two progress saves.
    pub persist_window_secs: u64,
    /// Grace window for reapplying the position after a source switch.
    pub reapply_grace_ms: u64,
    /// Fraction of the duration past which a save is marked completed.
    pub completed_threshold: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            persist_window_secs: 10,
            reapply_grace_ms: 2000,
            completed_threshold: 0.9,
        }
    }
}

/// Ad gating flags. Best-effort; never required for playback correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdConfig {
    /// Global ad enable flag. Admin sessions run with this off.
    pub enabled: bool,
    /// Smartlink URL opened on click-through.
    pub url: Option<String>,
    /// Minimum wall-clock time between two ad opens.
    pub cooldown_secs: u64,
}

impl Default for AdConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: None,
            cooldown_secs: 60,
        }
    }
}

impl PlaybackConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn reapply_grace(&self) -> Duration {
        Duration::from_millis(self.reapply_grace_ms)
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./vplyer.toml", "./config.toml"];
    for path_str in default_paths {
        let path = Path::new(path_str);
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration.
fn validate_config(config: &Config) -> Result<()> {
    if config.api.base_url.is_empty() {
        anyhow::bail!("api.base_url cannot be empty");
    }

    if config.playback.persist_window_secs == 0 {
        anyhow::bail!("playback.persist_window_secs cannot be 0");
    }

    if config.playback.poll_interval_secs == 0 {
        anyhow::bail!("playback.poll_interval_secs cannot be 0");
    }

    if !(0.0..=1.0).contains(&config.playback.completed_threshold) {
        anyhow::bail!("playback.completed_threshold must be within 0..=1");
    }

    if config.ads.enabled && config.ads.url.is_none() {
        tracing::warn!("Ads enabled but ads.url is not set; ad opens will be skipped");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.playback.poll_interval_secs, 5);
        assert_eq!(config.playback.persist_window_secs, 10);
        assert_eq!(config.ads.cooldown_secs, 60);
    }

    #[test]
    fn rejects_zero_persist_window() {
        let mut config = Config::default();
        config.playback.persist_window_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_empty_base_url() {
        let mut config = Config::default();
        config.api.base_url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://stream.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://stream.example.com");
        assert_eq!(config.playback.poll_interval_secs, 5);
        assert!(config.ads.enabled);
    }
}
