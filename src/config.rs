// ABOUTME: Configuration loading for adib.
// ABOUTME: Reads ~/.adib/config.toml; backend endpoint, API key, and fixed coordinates.

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::Location;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini: GeminiConfig,
    /// Fixed coordinates used as the retrieval bias for map lookups, the CLI
    /// analog of browser geolocation.
    pub location: Option<Location>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            location: None,
        }
    }
}

/// Generation backend configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,
    /// Overrides the GEMINI_API_KEY environment variable when set.
    pub api_key: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load config from ~/.adib/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".adib")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(
            config.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert!(config.gemini.api_key.is_none());
        assert!(config.location.is_none());
    }

    #[test]
    fn parse_config_toml() {
        let toml_str = r#"
[gemini]
base_url = "http://localhost:8080/v1beta"
api_key = "test-key"

[location]
latitude = 41.3111
longitude = 69.2797
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gemini.base_url, "http://localhost:8080/v1beta");
        assert_eq!(config.gemini.api_key.as_deref(), Some("test-key"));
        let location = config.location.unwrap();
        assert_eq!(location.latitude, 41.3111);
        assert_eq!(location.longitude, 69.2797);
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let toml_str = r#"
[gemini]
api_key = "only-key"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gemini.api_key.as_deref(), Some("only-key"));
        assert_eq!(
            config.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert!(config.location.is_none());
    }
}
