use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::item::VarDir;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "GALLERIA_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Root of the `albums/`, `thumbs/` and `resizes/` trees.
    #[serde(default = "default_var_path")]
    pub var_path: PathBuf,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub thumbnails: ThumbnailConfig,

    #[serde(default)]
    pub resizes: ResizeConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub display_context: DisplayContextConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Longest edge in pixels.
    #[serde(default = "default_thumb_size")]
    pub size: u32,
}

fn default_thumb_size() -> u32 {
    200
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            size: default_thumb_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeConfig {
    #[serde(default = "default_resize_size")]
    pub size: u32,
}

fn default_resize_size() -> u32 {
    640
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            size: default_resize_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    #[serde(default = "default_movie_extensions")]
    pub movie_extensions: Vec<String>,
}

fn default_image_extensions() -> Vec<String> {
    vec![
        "jpg".to_string(),
        "jpeg".to_string(),
        "png".to_string(),
        "gif".to_string(),
        "webp".to_string(),
    ]
}

fn default_movie_extensions() -> Vec<String> {
    vec![
        "flv".to_string(),
        "mp4".to_string(),
        "m4v".to_string(),
        "mov".to_string(),
    ]
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            image_extensions: default_image_extensions(),
            movie_extensions: default_movie_extensions(),
        }
    }
}

impl ImportConfig {
    fn has_extension(list: &[String], path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| list.iter().any(|known| known.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    pub fn is_image(&self, path: &Path) -> bool {
        Self::has_extension(&self.image_extensions, path)
    }

    pub fn is_movie(&self, path: &Path) -> bool {
        Self::has_extension(&self.movie_extensions, path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayContextConfig {
    /// Lifetime of a stored display context. `None` keeps it until cleared.
    #[serde(default = "default_display_context_ttl")]
    pub ttl_secs: Option<i64>,
}

fn default_display_context_ttl() -> Option<i64> {
    Some(24 * 60 * 60)
}

impl Default for DisplayContextConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_display_context_ttl(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("galleria")
        .join("galleria.db")
}

fn default_var_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("galleria")
        .join("var")
}

fn default_base_url() -> String {
    "/".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            var_path: default_var_path(),
            base_url: default_base_url(),
            thumbnails: ThumbnailConfig::default(),
            resizes: ResizeConfig::default(),
            import: ImportConfig::default(),
            display_context: DisplayContextConfig::default(),
        }
    }
}

impl Config {
    /// Load from `$GALLERIA_CONFIG` if set, otherwise the default location.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from(Path::new(&path)),
            None => Self::load_from(&Self::config_path()),
        }
    }

    /// Load `path`, writing the defaults there first when it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("galleria")
            .join("config.toml")
    }

    /// Directory holding one of the var trees.
    pub fn var_dir(&self, kind: VarDir) -> PathBuf {
        self.var_path.join(kind.as_str())
    }

    pub fn albums_dir(&self) -> PathBuf {
        self.var_dir(VarDir::Albums)
    }

    pub fn thumbs_dir(&self) -> PathBuf {
        self.var_dir(VarDir::Thumbs)
    }

    pub fn resizes_dir(&self) -> PathBuf {
        self.var_dir(VarDir::Resizes)
    }

    /// Log files go next to the var trees.
    pub fn log_dir(&self) -> PathBuf {
        self.var_path.join("logs")
    }
}
