//! Configuration System
//!
//! Hierarchical configuration for the dashboard: optional `vigil.toml` with
//! `VIGIL_*` environment overrides. Holds the data directory, assist provider
//! table, simulated-source candidates, and the logging section.

use crate::assist::AssistProvider;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VigilConfig {
    /// Directory holding the monitor database (defaults to the platform
    /// data dir, e.g. ~/.local/share/vigil)
    pub data_dir: Option<PathBuf>,

    /// Assist backend settings
    #[serde(default)]
    pub assist: AssistSettings,

    /// Simulated observation source settings
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Assist backend settings: a named provider table plus a default selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistSettings {
    /// Name of the provider to use when none is given on the command line
    pub provider: Option<String>,

    /// Provider configurations by name
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Simulated observation source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Candidate values the simulated source draws from. Empty means the
    /// built-in list.
    #[serde(default)]
    pub candidates: Vec<String>,
}

/// Provider type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    Anthropic,
    Ollama,
}

/// One assist provider entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    pub model: String,
    pub api_key: Option<String>,
    /// Endpoint override (custom OpenAI-compatible servers, non-default Ollama)
    pub endpoint: Option<String>,
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model cannot be empty".to_string());
        }
        if let Some(ref endpoint) = self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!(
                    "endpoint must be an http(s) URL, got: {}",
                    endpoint
                ));
            }
        }
        Ok(())
    }

    /// Resolve into a concrete assist provider. A missing API key is not an
    /// error here; the client factory turns it into a displayable result.
    pub fn to_provider(&self) -> AssistProvider {
        match self.provider_type {
            ProviderType::OpenAI => AssistProvider::OpenAI {
                model: self.model.clone(),
                api_key: self.api_key.clone(),
                base_url: self.endpoint.clone(),
            },
            ProviderType::Anthropic => AssistProvider::Anthropic {
                model: self.model.clone(),
                api_key: self.api_key.clone(),
            },
            ProviderType::Ollama => AssistProvider::Ollama {
                model: self.model.clone(),
                base_url: self.endpoint.clone(),
            },
        }
    }
}

impl VigilConfig {
    /// Validate the whole configuration, collecting per-provider errors.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        for (name, provider) in &self.assist.providers {
            if let Err(e) = provider.validate() {
                errors.push(format!("Provider '{}': {}", name, e));
            }
        }
        if let Some(ref default) = self.assist.provider {
            if !self.assist.providers.contains_key(default) {
                errors.push(format!(
                    "Default assist provider '{}' is not defined",
                    default
                ));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Resolve the assist provider to use: explicit name, configured default,
    /// or the sole configured provider.
    pub fn resolve_provider(&self, name: Option<&str>) -> Result<AssistProvider, ApiError> {
        let lookup = |n: &str| {
            self.assist.providers.get(n).ok_or_else(|| {
                ApiError::ProviderNotConfigured(format!("Provider not found: {}", n))
            })
        };

        let config = if let Some(n) = name {
            lookup(n)?
        } else if let Some(ref default) = self.assist.provider {
            lookup(default)?
        } else if self.assist.providers.len() == 1 {
            self.assist.providers.values().next().ok_or_else(|| {
                ApiError::ProviderNotConfigured("No assist provider configured".to_string())
            })?
        } else {
            return Err(ApiError::ProviderNotConfigured(
                "No assist provider configured; add one under [assist.providers] in vigil.toml"
                    .to_string(),
            ));
        };

        config
            .validate()
            .map_err(ApiError::ConfigError)?;
        Ok(config.to_provider())
    }

    /// Directory for the monitor database.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.data_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("dev", "vigil", "vigil")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".vigil"))
    }
}

/// Loader layering file, environment, and defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from an explicit file plus `VIGIL_*` overrides.
    pub fn load_from_file(path: &Path) -> Result<VigilConfig, ApiError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("VIGIL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Load configuration from the default locations: `./vigil.toml` if
    /// present, otherwise the platform config dir, otherwise defaults. The
    /// environment is layered on in every case.
    pub fn load() -> Result<VigilConfig, ApiError> {
        let mut builder = config::Config::builder();

        let local = PathBuf::from("vigil.toml");
        let platform = directories::ProjectDirs::from("dev", "vigil", "vigil")
            .map(|dirs| dirs.config_dir().join("vigil.toml"));

        if local.exists() {
            builder = builder.add_source(config::File::from(local));
        } else if let Some(path) = platform.filter(|p| p.exists()) {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("VIGIL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
