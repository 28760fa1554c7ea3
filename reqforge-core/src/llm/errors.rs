//! Error types for generation calls
//!
//! Strongly-typed errors for every way a call into the text-generation
//! capability can fail, using thiserror for the trait implementations.

use std::time::Duration;
use thiserror::Error;

/// Main error type for generation calls
#[derive(Debug, Error)]
pub enum LLMError {
    /// API key is missing or was rejected
    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },

    /// Rate limit has been exceeded
    #[error("Rate limit exceeded: {message}. Retry after {retry_after:?}")]
    RateLimitExceeded { message: String, retry_after: Option<Duration> },

    /// Request timed out
    #[error("Request timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Network error occurred
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// API returned an error
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Model not found or not available
    #[error("Model '{model}' not found or not available")]
    ModelNotFound { model: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Parsing or serialization error
    #[error("Parsing error: {message}")]
    ParseError { message: String },

}

impl LLMError {
    /// Create an authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthenticationError { message: message.into() }
    }

    /// Create a rate limit error
    pub fn rate_limit(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::RateLimitExceeded { message: message.into(), retry_after }
    }

    /// Create a timeout error
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError { message: message.into() }
    }

    /// Create an API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError { status, message: message.into() }
    }

    /// Create a model not found error
    pub fn model_not_found(model: impl Into<String>) -> Self {
        Self::ModelNotFound { model: model.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigurationError { message: message.into() }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError { message: message.into() }
    }

    /// Map an HTTP status and body to the matching error kind
    pub fn from_status(
        status: u16,
        body: impl Into<String>,
        retry_after: Option<Duration>,
    ) -> Self {
        let body = body.into();
        match status {
            401 | 403 => Self::auth(body),
            429 => Self::rate_limit(body, retry_after),
            _ => Self::api(status, body),
        }
    }
}

/// Convert from JSON errors
impl From<serde_json::Error> for LLMError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError { message: err.to_string() }
    }
}

/// Convert from HTTP client errors
impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not report the configured duration
            Self::Timeout { duration: Duration::ZERO }
        } else if err.is_decode() {
            Self::ParseError { message: err.to_string() }
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), err.to_string(), None)
        } else {
            Self::NetworkError { message: err.to_string() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LLMError::auth("Invalid API key");
        assert_eq!(err.to_string(), "Authentication failed: Invalid API key");

        let err = LLMError::rate_limit("Too many requests", Some(Duration::from_secs(60)));
        assert!(err.to_string().contains("Rate limit exceeded"));

        let err = LLMError::model_not_found("gemini-0");
        assert_eq!(err.to_string(), "Model 'gemini-0' not found or not available");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            LLMError::from_status(401, "no", None),
            LLMError::AuthenticationError { .. }
        ));
        assert!(matches!(
            LLMError::from_status(403, "no", None),
            LLMError::AuthenticationError { .. }
        ));
        assert!(matches!(
            LLMError::from_status(429, "slow down", Some(Duration::from_secs(2))),
            LLMError::RateLimitExceeded { retry_after: Some(_), .. }
        ));
        assert!(matches!(
            LLMError::from_status(500, "boom", None),
            LLMError::ApiError { status: 500, .. }
        ));
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let llm_err: LLMError = json_err.into();
        assert!(matches!(llm_err, LLMError::ParseError { .. }));
    }
}
