//! Configuration loading, validation, and management for echomind.
//!
//! Loads configuration from `~/.echomind/config.toml` with environment
//! variable overrides. Validates all settings at startup. Every operator
//! knob here is also adjustable at runtime through the orchestrator; the
//! file provides the startup values.

use echomind_core::persona::Persona;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.echomind/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation endpoint host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Generation endpoint port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Default LLM model.
    #[serde(default = "default_model")]
    pub model: String,

    /// Generation temperature (0.0–1.0).
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// GPU layers to offload (99 = all available).
    #[serde(default = "default_num_gpu")]
    pub num_gpu: i32,

    /// Timeout for simple requests, in seconds. Streaming generation gets a
    /// multiple of this, since generation is long-running.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Short-term memory capacity, in interactions.
    #[serde(default = "default_stm_capacity")]
    pub stm_capacity: usize,

    /// Long-term memories retrieved per turn.
    #[serde(default = "default_recall_limit")]
    pub recall_limit: usize,

    /// Long-term memory store configuration.
    #[serde(default)]
    pub memory: MemoryStoreConfig,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    11434
}
fn default_model() -> String {
    "gemma3:27b".into()
}
fn default_temperature() -> f32 {
    0.8
}
fn default_num_gpu() -> i32 {
    99
}
fn default_request_timeout() -> u64 {
    10
}
fn default_stm_capacity() -> usize {
    10
}
fn default_recall_limit() -> usize {
    3
}

/// Configuration of the external long-term memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStoreConfig {
    /// Vector-store provider the sidecar should use (e.g., "chroma"), or
    /// "in_memory" to run without the sidecar (testing, demos).
    #[serde(default = "default_memory_provider")]
    pub provider: String,

    /// Base URL of the REST sidecar.
    #[serde(default = "default_memory_base_url")]
    pub base_url: String,

    /// Collection (namespace) name inside the store.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Storage path the store persists vectors under.
    #[serde(default = "default_memory_path")]
    pub path: String,

    /// Embedding model identifier the store should use.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// LLM the store may use internally (fact extraction etc.).
    #[serde(default = "default_memory_llm")]
    pub llm_model: String,

    /// Base URL of the endpoint serving the store's embedder/LLM.
    #[serde(default = "default_memory_llm_url")]
    pub llm_url: String,

    /// The single fixed memory namespace for this assistant.
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_memory_provider() -> String {
    "chroma".into()
}
fn default_memory_base_url() -> String {
    "http://127.0.0.1:8765".into()
}
fn default_collection() -> String {
    "assistant_memory".into()
}
fn default_memory_path() -> String {
    "./memory_db".into()
}
fn default_embedding_model() -> String {
    "bge-m3".into()
}
fn default_memory_llm() -> String {
    "llama3.1:8b".into()
}
fn default_memory_llm_url() -> String {
    "http://127.0.0.1:11434".into()
}
fn default_user_id() -> String {
    "default_user".into()
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            provider: default_memory_provider(),
            base_url: default_memory_base_url(),
            collection: default_collection(),
            path: default_memory_path(),
            embedding_model: default_embedding_model(),
            llm_model: default_memory_llm(),
            llm_url: default_memory_llm_url(),
            user_id: default_user_id(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.echomind/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `ECHOMIND_HOST` — generation endpoint host
    /// - `ECHOMIND_MODEL` — model identifier
    /// - `ECHOMIND_TEMPERATURE` — generation temperature
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(host) = std::env::var("ECHOMIND_HOST") {
            config.host = host;
        }
        if let Ok(model) = std::env::var("ECHOMIND_MODEL") {
            config.model = model;
        }
        if let Ok(temp) = std::env::var("ECHOMIND_TEMPERATURE") {
            config.temperature = temp.parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "ECHOMIND_TEMPERATURE is not a number: {temp}"
                ))
            })?;
            config.validate()?;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".echomind")
    }

    /// Base URL of the generation endpoint.
    pub fn endpoint_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// The simple-request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The built-in persona. Persona text is opaque template data; a future
    /// persona file would be loaded here.
    pub fn persona(&self) -> Persona {
        Persona::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 1.0".into(),
            ));
        }

        if self.stm_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "stm_capacity must be at least 1".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be at least 1".into(),
            ));
        }

        if self.recall_limit == 0 {
            return Err(ConfigError::ValidationError(
                "recall_limit must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            model: default_model(),
            temperature: default_temperature(),
            num_gpu: default_num_gpu(),
            request_timeout_secs: default_request_timeout(),
            stm_capacity: default_stm_capacity(),
            recall_limit: default_recall_limit(),
            memory: MemoryStoreConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 11434);
        assert_eq!(config.stm_capacity, 10);
        assert_eq!(config.memory.user_id, "default_user");
    }

    #[test]
    fn endpoint_url_formatting() {
        let config = AppConfig {
            host: "192.168.1.20".into(),
            port: 11434,
            ..AppConfig::default()
        };
        assert_eq!(config.endpoint_url(), "http://192.168.1.20:11434");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.memory.collection, config.memory.collection);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: 1.5,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_stm_capacity_rejected() {
        let config = AppConfig {
            stm_capacity: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().model, default_model());
    }

    #[test]
    fn partial_config_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "model = \"mistral:7b\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "mistral:7b");
        assert_eq!(config.port, default_port());
        assert_eq!(config.memory.provider, "chroma");
    }

    #[test]
    fn invalid_file_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "temperature = 7.0\n").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("11434"));
        assert!(toml_str.contains("assistant_memory"));
    }
}
