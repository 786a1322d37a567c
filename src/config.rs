use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub player: PlayerConfig,
    pub ui: UiConfig,
}

/// Embed player URL templates.
///
/// Placeholders: `{id}`, `{episode_id}`, `{season}`, `{episode}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub anime_url: String,
    pub movie_url: String,
    pub tv_url: String,
    /// Command that receives the player URL as its only argument, e.g. `xdg-open`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opener: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            anime_url: "https://vidsrc.cc/v2/embed/anime/{id}/{episode}/sub".to_string(),
            movie_url: "https://vidsrc.cc/v2/embed/movie/{id}".to_string(),
            tv_url: "https://vidsrc.cc/v2/embed/tv/{id}/{season}/{episode}".to_string(),
            opener: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub carousel_interval_ms: u64,
    pub toast_ms: u64,
    pub highlight_count: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            carousel_interval_ms: 5000,
            toast_ms: 2500,
            highlight_count: 8,
        }
    }
}

impl UiConfig {
    pub fn carousel_interval(&self) -> Duration {
        Duration::from_millis(self.carousel_interval_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }
}

impl Config {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(test)]
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.ui.carousel_interval_ms < 500 {
            return Err(anyhow!("ui.carousel_interval_ms must be at least 500"));
        }
        if self.ui.highlight_count == 0 {
            return Err(anyhow!("ui.highlight_count must be greater than zero"));
        }
        for (name, template) in [
            ("player.anime_url", &self.player.anime_url),
            ("player.movie_url", &self.player.movie_url),
            ("player.tv_url", &self.player.tv_url),
        ] {
            if template.trim().is_empty() {
                return Err(anyhow!("{name} cannot be empty"));
            }
        }
        if let Some(opener) = &self.player.opener
            && opener.trim().is_empty()
        {
            return Err(anyhow!("player.opener cannot be empty when set"));
        }
        Ok(())
    }
}
