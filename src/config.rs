use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::swisseph::EphemerisSource;

/// Crate configuration. Every field has a working default so the pipeline
/// runs with no config file at all; a TOML file overrides selectively.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ephemeris: EphemerisConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EphemerisConfig {
    /// Directory holding the binary `.se1` ephemeris files.
    #[serde(default = "default_ephe_dir")]
    pub data_dir: PathBuf,
    /// Base URL the essential ephemeris files are fetched from when absent.
    #[serde(default = "default_ephe_base_url")]
    pub download_base_url: String,
    #[serde(default)]
    pub source: EphemerisSource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderConfig {
    /// Nominatim-compatible search endpoint.
    #[serde(default = "default_geocoder_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// OpenAI-compatible chat completions endpoint.
    #[serde(default = "default_chat_url")]
    pub api_url: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    /// Bearer token; left unset, chat is unavailable but the chart pipeline
    /// is unaffected.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_persona")]
    pub persona: String,
    #[serde(default = "default_chat_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ephe_dir() -> PathBuf {
    PathBuf::from("ephe")
}

fn default_ephe_base_url() -> String {
    "https://raw.githubusercontent.com/aloistr/swisseph/master/ephe".to_string()
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("natal_core/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_chat_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_chat_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_chat_timeout_secs() -> u64 {
    60
}

fn default_persona() -> String {
    "You are Luna, a warm and mystical astrologer. Answer questions about \
     the user's natal chart in a gentle, encouraging tone, grounded in the \
     chart data you are given."
        .to_string()
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        EphemerisConfig {
            data_dir: default_ephe_dir(),
            download_base_url: default_ephe_base_url(),
            source: EphemerisSource::default(),
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        GeocoderConfig {
            base_url: default_geocoder_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            api_url: default_chat_url(),
            model: default_chat_model(),
            api_key: None,
            persona: default_persona(),
            timeout_secs: default_chat_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = Config::default();
        assert_eq!(config.ephemeris.data_dir, PathBuf::from("ephe"));
        assert_eq!(config.ephemeris.source, EphemerisSource::Swiss);
        assert!(config.geocoder.base_url.starts_with("https://"));
        assert!(config.chat.api_key.is_none());
    }

    #[test]
    fn partial_toml_overrides_selectively() {
        let config: Config = toml::from_str(
            r#"
            [ephemeris]
            source = "moshier"

            [geocoder]
            base_url = "http://localhost:8080"
            "#,
        )
        .unwrap();
        assert_eq!(config.ephemeris.source, EphemerisSource::Moshier);
        assert_eq!(config.geocoder.base_url, "http://localhost:8080");
        // untouched sections keep their defaults
        assert_eq!(config.geocoder.timeout_secs, 10);
        assert_eq!(config.chat.timeout_secs, 60);
        assert_eq!(config.ephemeris.data_dir, PathBuf::from("ephe"));
    }
}
