use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "site.toml";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub content_dir: PathBuf,
    pub port: u16,
    pub is_development: bool,
    /// Render `$..$` and `\(..\)` math with KaTeX.
    pub math: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            port: 8080,
            is_development: false,
            math: true,
        }
    }
}

impl SiteConfig {
    /// Reads `SITE_CONFIG` (or `site.toml`), falling back to defaults when the file is absent,
    /// then applies the `PORT` and `RUST_ENV` overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SITE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env(
            std::env::var("PORT").ok().as_deref(),
            std::env::var("RUST_ENV").ok().as_deref(),
        );
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self, port: Option<&str>, rust_env: Option<&str>) {
        if let Some(port) = port.and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(env) = rust_env {
            self.is_development = env == "development";
        }
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.content_dir.join("posts")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.content_dir.join("static")
    }
}
