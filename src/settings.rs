use crate::tween::Ease;
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub globe: GlobeSettings,
}

/// Optional overrides read from the `[globe]` table
#[derive(Debug, Default, Deserialize)]
pub struct GlobeSettings {
    pub texture_url: Option<String>,
    pub arc_count: Option<usize>,
    pub seed: Option<u64>,
    pub pixel_ratio: Option<f32>,
    pub rotation_speed: Option<f32>,
    /// Easing names such as `"power1.inOut"` or `"linear"`
    pub reveal_ease: Option<Ease>,
    pub fade_ease: Option<Ease>,
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                warn!("ignoring {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                warn!("could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("globearc")
            .join("config.toml")
    }
}
