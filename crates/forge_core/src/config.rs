use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::paths::config_json_path;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "gpt-4o";

const CONFIG_FILE_PATH: &str = "config.toml";

/// Read-only settings snapshot handed to the provider factory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default)]
    pub http_proxy: String,
    #[serde(default)]
    pub https_proxy: String,
}

fn default_ollama_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            gemini_api_key: None,
            ollama_url: default_ollama_url(),
            default_model: default_model(),
            http_proxy: String::new(),
            https_proxy: String::new(),
        }
    }
}

impl Config {
    /// Load from `~/.promptforge/config.json`, else `./config.toml`, then
    /// apply environment overrides.
    pub fn new() -> Self {
        let mut config = Self::load_from(&config_json_path(), Path::new(CONFIG_FILE_PATH));
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// File layer only. The JSON file wins over the TOML file; unreadable or
    /// malformed files fall through to defaults.
    pub fn load_from(json_path: &Path, toml_path: &Path) -> Self {
        if json_path.exists() {
            match std::fs::read_to_string(json_path)
                .map_err(|e| e.to_string())
                .and_then(|c| serde_json::from_str::<Config>(&c).map_err(|e| e.to_string()))
            {
                Ok(config) => return config,
                Err(e) => log::warn!("Ignoring {}: {}", json_path.display(), e),
            }
        }

        if toml_path.exists() {
            match std::fs::read_to_string(toml_path)
                .map_err(|e| e.to_string())
                .and_then(|c| toml::from_str::<Config>(&c).map_err(|e| e.to_string()))
            {
                Ok(config) => return config,
                Err(e) => log::warn!("Ignoring {}: {}", toml_path.display(), e),
            }
        }

        Self::default()
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.anthropic_api_key = Some(key);
        }
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key);
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            self.ollama_url = url;
        }
        if let Some(model) = lookup("FORGE_MODEL") {
            self.default_model = model;
        }
        if let Some(proxy) = lookup("HTTP_PROXY") {
            self.http_proxy = proxy;
        }
        if let Some(proxy) = lookup("HTTPS_PROXY") {
            self.https_proxy = proxy;
        }
    }
}
