//! OpenAI-compatible provider for Gemini and other services
//!
//! Gemini, Groq, Together and most local servers expose the same
//! `/chat/completions` shape with different base URLs.

use super::errors::LLMError;
use super::traits::{GenerationProvider, ProviderBuilder};
use super::types::{ChatCompletionRequest, ChatCompletionResponse, Message};
use crate::config::{DEFAULT_BASE_URL, DEFAULT_MODEL, GenerationSettings};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// OpenAI-compatible provider that can work with multiple services
pub struct OpenAICompatProvider {
    client: Client,
    config: OpenAICompatConfig,
}

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    pub provider: String,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl OpenAICompatProvider {
    pub fn new(config: OpenAICompatConfig) -> Result<Self, LLMError> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::config(format!("{} API key is empty", config.provider)));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LLMError::config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create a provider from validated generation settings
    pub fn from_settings(settings: &GenerationSettings) -> Result<Self, LLMError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| LLMError::config("no API key configured"))?;

        OpenAICompatBuilder::new()
            .provider(provider_label(&settings.base_url))
            .api_key(api_key)
            .base_url(settings.base_url.clone())
            .model(settings.model_name.clone())
            .temperature(settings.temperature)
            .max_tokens(settings.max_tokens)
            .timeout(settings.timeout_secs)
            .build()
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn chat_completion(&self, messages: Vec<Message>) -> Result<String, LLMError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::timeout(Duration::from_secs(self.config.timeout_secs))
                } else {
                    LLMError::from(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(&self.config, status.as_u16(), body, retry_after));
        }

        let result: ChatCompletionResponse = response.json().await?;
        if let Some(usage) = result.usage {
            debug!(
                provider = %self.config.provider,
                model = result.model.as_deref().unwrap_or(&self.config.model),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion usage"
            );
        }

        Ok(result.first_text())
    }
}

#[async_trait]
impl GenerationProvider for OpenAICompatProvider {
    fn name(&self) -> &str {
        &self.config.provider
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn invoke(&self, role_instruction: &str, prompt: &str) -> Result<String, LLMError> {
        let messages = vec![Message::system(role_instruction), Message::user(prompt)];
        self.chat_completion(messages).await
    }
}

/// Builder for [`OpenAICompatProvider`]
#[derive(Debug, Clone)]
pub struct OpenAICompatBuilder {
    config: OpenAICompatConfig,
}

impl OpenAICompatBuilder {
    pub fn new() -> Self {
        Self {
            config: OpenAICompatConfig {
                provider: "gemini".to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
                api_key: String::new(),
                model: DEFAULT_MODEL.to_string(),
                max_tokens: 8192,
                temperature: 0.2,
                timeout_secs: 120,
            },
        }
    }

    /// Label used in logs and error messages
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.config.provider = provider.into();
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }
}

impl Default for OpenAICompatBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderBuilder for OpenAICompatBuilder {
    type Provider = OpenAICompatProvider;
    type Error = LLMError;

    fn build(self) -> Result<Self::Provider, Self::Error> {
        OpenAICompatProvider::new(self.config)
    }

    fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    fn timeout(mut self, seconds: u64) -> Self {
        self.config.timeout_secs = seconds;
        self
    }
}

/// Map a non-2xx response; 404 means the configured model is unknown to the endpoint
fn status_error(
    config: &OpenAICompatConfig,
    status: u16,
    body: String,
    retry_after: Option<Duration>,
) -> LLMError {
    if status == 404 {
        return LLMError::model_not_found(&config.model);
    }
    LLMError::from_status(status, format!("{} API error: {}", config.provider, body), retry_after)
}

/// Guess a readable provider label from the endpoint host
fn provider_label(base_url: &str) -> &'static str {
    let url = base_url.to_lowercase();
    if url.contains("googleapis.com") {
        "gemini"
    } else if url.contains("groq.com") {
        "groq"
    } else if url.contains("together.xyz") {
        "together"
    } else if url.contains("localhost") || url.contains("127.0.0.1") {
        "local"
    } else {
        "openai-compatible"
    }
}
