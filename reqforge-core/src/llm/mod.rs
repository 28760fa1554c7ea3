//! Text-generation capability
//!
//! A single async trait, [`GenerationProvider`], with an HTTP implementation
//! for OpenAI-compatible endpoints (Gemini by default).

pub mod errors;
pub mod openai_compat;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use errors::LLMError;
pub use openai_compat::{OpenAICompatBuilder, OpenAICompatConfig, OpenAICompatProvider};
pub use traits::{GenerationProvider, ProviderBuilder};
