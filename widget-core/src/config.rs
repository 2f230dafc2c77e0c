use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::mode::DisplayMode;

pub const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org/";
pub const DEFAULT_IMAGE_API_URL: &str = "https://openweathermap.org/";

/// Widget configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// weather_api_url = "https://api.openweathermap.org/"
/// image_api_url = "https://openweathermap.org/"
/// api_key = "..."
/// view_mode = "compact"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Root of the weather service, with trailing slash.
    pub weather_api_url: String,

    /// Root of the icon service, with trailing slash.
    pub image_api_url: String,

    pub api_key: Option<String>,

    /// One of "compact", "halfscreen" or "fullscreen".
    pub view_mode: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            weather_api_url: DEFAULT_WEATHER_API_URL.to_string(),
            image_api_url: DEFAULT_IMAGE_API_URL.to_string(),
            api_key: None,
            view_mode: DisplayMode::default().as_str().to_string(),
        }
    }
}

impl WidgetConfig {
    /// Returns the weather API key, or an error with a configuration hint.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured for the weather service.\n\
                     Hint: run `weather-widget configure` and enter your API key."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    /// Mode to start in. An unrecognized name falls back to compact.
    pub fn initial_mode(&self) -> DisplayMode {
        DisplayMode::parse(&self.view_mode).unwrap_or_else(|| {
            tracing::warn!(
                view_mode = %self.view_mode,
                "unknown view mode in config; using compact"
            );
            DisplayMode::Compact
        })
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: WidgetConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self)
            .context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-widget", "weather-widget")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
