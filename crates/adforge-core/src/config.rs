use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ad::RenderMode;
use crate::error::{AdError, AdResult};

/// Weight of a registered font face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Font family every layout draws with. `sans` is always available.
    pub font_family: String,
    pub default_mode: RenderMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_family: "sans".to_string(),
            default_mode: RenderMode::Export,
        }
    }
}

/// A TrueType/OpenType face to register under a family name.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FontAsset {
    pub family: String,
    pub path: PathBuf,
    #[serde(default)]
    pub weight: FontWeight,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: "ad-design.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Contents of `adforge.toml`. Every section is optional.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AdforgeConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub fonts: Vec<FontAsset>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl AdforgeConfig {
    pub fn from_toml_str(contents: &str) -> AdResult<Self> {
        toml::from_str(contents).map_err(|e| AdError::Config(e.to_string()))
    }

    pub fn load_from_file(path: &Path) -> AdResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AdError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&contents)?;
        // Font paths are relative to the config file.
        if let Some(dir) = path.parent() {
            for font in &mut config.fonts {
                if font.path.is_relative() {
                    font.path = dir.join(&font.path);
                }
            }
        }
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> AdResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| AdError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
