//! Mock generation provider for testing
//!
//! Scripted responses are returned in order; once the script runs out every
//! further call returns an empty string. Only available in unit tests.

#![cfg(test)]

use super::errors::LLMError;
use super::traits::GenerationProvider;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock provider recording every (instruction, prompt) pair it receives
#[derive(Clone, Default)]
pub struct MockGenerationProvider {
    responses: Arc<Mutex<VecDeque<Result<String, LLMError>>>>,
    call_history: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockGenerationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that answers with each text in turn
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for response in responses {
            mock.push_response(response);
        }
        mock
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(response.into()));
    }

    pub fn push_error(&self, error: LLMError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.call_history.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.call_history.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for MockGenerationProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn invoke(&self, role_instruction: &str, prompt: &str) -> Result<String, LLMError> {
        self.call_history
            .lock()
            .unwrap()
            .push((role_instruction.to_string(), prompt.to_string()));

        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| Ok(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_then_empty() {
        let mock = MockGenerationProvider::with_responses(["one"]);
        mock.push_error(LLMError::network("down"));

        assert_eq!(mock.invoke("sys", "a").await.unwrap(), "one");
        assert!(mock.invoke("sys", "b").await.is_err());
        assert_eq!(mock.invoke("sys", "c").await.unwrap(), "");
        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.calls()[1].1, "b");
    }
}
