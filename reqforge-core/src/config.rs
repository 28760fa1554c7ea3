//! Configuration for generation and the refinement pipelines
//!
//! Settings are an explicit value: built from defaults, an optional TOML
//! file and the process environment, validated once, then passed to
//! whatever needs them. Nothing here is cached globally.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variables that may carry the API key, in lookup order
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Environment variable overriding the model name
pub const MODEL_NAME_VAR: &str = "MODEL_NAME";

/// Environment variable overriding the endpoint base URL
pub const BASE_URL_VAR: &str = "REQFORGE_BASE_URL";

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing credential: set one of {}", .names.join(", "))]
    MissingCredential { names: Vec<String> },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid setting '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Generation endpoint and model
    pub generation: GenerationSettings,

    /// Loop bounds for each pipeline
    pub pipeline: PipelineConfig,
}

/// Settings for the generation capability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// API key; usually supplied through the environment rather than the file
    pub api_key: Option<String>,

    /// Model identifier
    pub model_name: String,

    /// Base URL of an OpenAI-compatible endpoint
    pub base_url: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens per response
    pub max_tokens: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.2,
            max_tokens: 8192,
            timeout_secs: 120,
        }
    }
}

/// Maximum review/refine cycles per pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Cycles for requirement extraction
    pub requirement_iterations: usize,

    /// Cycles for test-case generation
    pub test_case_iterations: usize,

    /// Cycles for human-feedback refinement (0 = single refine pass)
    pub refine_iterations: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { requirement_iterations: 5, test_case_iterations: 4, refine_iterations: 0 }
    }
}

impl Settings {
    /// Load settings: defaults, then the optional file, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(settings.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        toml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Apply environment-style overrides from an arbitrary lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = API_KEY_VARS.iter().find_map(|var| non_empty(*var)) {
            self.generation.api_key = Some(key);
        }
        if let Some(model) = non_empty(MODEL_NAME_VAR) {
            self.generation.model_name = model;
        }
        if let Some(url) = non_empty(BASE_URL_VAR) {
            self.generation.base_url = url;
        }

        self
    }

    /// Check required fields, failing fast on a missing credential
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_key = self.generation.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());
        if !has_key {
            return Err(ConfigError::MissingCredential {
                names: API_KEY_VARS.iter().map(|s| s.to_string()).collect(),
            });
        }

        if self.generation.model_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "generation.model_name",
                message: "must not be empty".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::Invalid {
                field: "generation.temperature",
                message: format!("{} is outside 0.0..=2.0", self.generation.temperature),
            });
        }

        Ok(())
    }
}
