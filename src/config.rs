use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metadata::kitsu::KITSU_API_BASE;
use crate::streams::animeflv::ANIMEFLV_BASE_URL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub streams: StreamsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_base_url")]
    pub base_url: String,
    /// Default `Accept-Language` value for metadata requests.
    #[serde(default = "default_locale")]
    pub locale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamsConfig {
    #[serde(default = "default_streams_base_url")]
    pub base_url: String,
}

fn default_metadata_base_url() -> String {
    KITSU_API_BASE.to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_streams_base_url() -> String {
    ANIMEFLV_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metadata: MetadataConfig::default(),
            streams: StreamsConfig::default(),
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: default_metadata_base_url(),
            locale: default_locale(),
        }
    }
}

impl Default for StreamsConfig {
    fn default() -> Self {
        Self {
            base_url: default_streams_base_url(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "mitai").ok_or(Error::NoConfigDir)
}

pub fn config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = config_path()?;

        if !path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.metadata.base_url, KITSU_API_BASE);
        assert_eq!(config.metadata.locale, "en");
        assert_eq!(config.streams.base_url, ANIMEFLV_BASE_URL);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [metadata]
            locale = "es"
            "#,
        )
        .unwrap();
        assert_eq!(config.metadata.locale, "es");
        assert_eq!(config.metadata.base_url, KITSU_API_BASE);
        assert_eq!(config.streams.base_url, ANIMEFLV_BASE_URL);
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = Config::default();
        config.streams.base_url = "http://localhost:9999".to_string();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.streams.base_url, "http://localhost:9999");
        assert_eq!(parsed.metadata.locale, config.metadata.locale);
    }
}
