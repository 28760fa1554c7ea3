//! Traits for generation capability implementations
//!
//! The pipeline only ever needs one thing from a model: given a role
//! instruction and a prompt, return text. Everything else (transport,
//! auth, retries) lives behind this trait.

use crate::llm::errors::LLMError;
use async_trait::async_trait;

/// Core trait for text-generation providers
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Get the name of this provider
    fn name(&self) -> &str;

    /// Get the model ID being used
    fn model(&self) -> &str;

    /// Run one role invocation.
    ///
    /// The returned text may be empty and must never be assumed well-formed.
    async fn invoke(&self, role_instruction: &str, prompt: &str) -> Result<String, LLMError>;
}

/// Builder trait for creating provider instances
pub trait ProviderBuilder {
    type Provider: GenerationProvider;
    type Error;

    /// Build a provider instance
    fn build(self) -> Result<Self::Provider, Self::Error>;

    /// Set the API key
    fn api_key(self, key: impl Into<String>) -> Self;

    /// Set the base URL
    fn base_url(self, url: impl Into<String>) -> Self;

    /// Set the model to use
    fn model(self, model: impl Into<String>) -> Self;

    /// Set timeout in seconds
    fn timeout(self, seconds: u64) -> Self;
}
