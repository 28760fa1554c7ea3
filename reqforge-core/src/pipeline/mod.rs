//! Bounded generate → review → refine pipeline
//!
//! A generator stage runs once, then reviewer and refiner stages alternate
//! for at most N cycles. The reviewer either critiques the current items or
//! answers with [`APPROVAL_TOKEN`]; the refiner then either rewrites the
//! items or reports `should_terminate`. Termination is plain data in
//! [`StageOutcome`], never a side effect.

pub mod prompts;
pub mod runner;
pub mod stages;
pub mod tasks;

use crate::llm::{GenerationProvider, LLMError};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

pub use runner::{LoopReport, RefinementLoop};
pub use stages::{GenerateStage, RefineStage, ReviewStage};

/// Sentinel a reviewer answers with when the items need no further work
pub const APPROVAL_TOKEN: &str = "APPROVED";

/// State key holding the working item list as JSON
pub const ITEMS_KEY: &str = "current_items";

/// State key holding the latest review
pub const FEEDBACK_KEY: &str = "review_feedback";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("Invalid regex pattern"));

/// Whether a review is exactly the approval token
pub fn is_approval(feedback: &str) -> bool {
    feedback.trim() == APPROVAL_TOKEN
}

/// Request-scoped state threaded through every stage of one run
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Correlates log lines of a single run
    pub run_id: Uuid,
    /// Name of the task being run, for logs
    pub task: &'static str,
    values: HashMap<String, String>,
}

impl PipelineState {
    /// Fresh state with an empty item list and no feedback
    pub fn new(task: &'static str) -> Self {
        let mut values = HashMap::new();
        values.insert(ITEMS_KEY.to_string(), "[]".to_string());
        values.insert(FEEDBACK_KEY.to_string(), String::new());
        Self { run_id: Uuid::new_v4(), task, values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn items(&self) -> &str {
        self.get(ITEMS_KEY).unwrap_or("[]")
    }

    pub fn feedback(&self) -> &str {
        self.get(FEEDBACK_KEY).unwrap_or_default()
    }

    /// Store an item list as pretty-printed JSON
    pub fn set_items(&mut self, items: &[Map<String, Value>]) {
        let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
        self.set(ITEMS_KEY, json);
    }

    /// Substitute `{key}` placeholders with state values; unknown keys stay as-is
    pub fn render(&self, template: &str) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &regex::Captures<'_>| match self.get(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Role a stage plays in the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageRole {
    Generator,
    Reviewer,
    Refiner,
}

impl std::fmt::Display for StageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageRole::Generator => write!(f, "generator"),
            StageRole::Reviewer => write!(f, "reviewer"),
            StageRole::Refiner => write!(f, "refiner"),
        }
    }
}

/// What a stage produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageOutcome {
    /// Items decoded from the stage output; empty when nothing usable came back
    pub items: Vec<Map<String, Value>>,
    /// Review text, for reviewer stages
    pub feedback: Option<String>,
    /// The loop should stop after this stage
    pub should_terminate: bool,
}

impl StageOutcome {
    pub fn items(items: Vec<Map<String, Value>>) -> Self {
        Self { items, ..Self::default() }
    }

    pub fn feedback(feedback: impl Into<String>) -> Self {
        Self { feedback: Some(feedback.into()), ..Self::default() }
    }

    pub fn terminate() -> Self {
        Self { should_terminate: true, ..Self::default() }
    }
}

/// One role invocation in the pipeline
#[async_trait]
pub trait Stage: Send + Sync {
    /// Name of the stage
    fn name(&self) -> &str;

    fn role(&self) -> StageRole;

    /// Execute the stage against the current state
    async fn execute(
        &self,
        state: &PipelineState,
        provider: &dyn GenerationProvider,
    ) -> Result<StageOutcome, LLMError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = PipelineState::new("requirements");
        assert_eq!(state.items(), "[]");
        assert_eq!(state.feedback(), "");
        assert_ne!(state.run_id, PipelineState::new("requirements").run_id);
    }

    #[test]
    fn test_render_placeholders() {
        let mut state = PipelineState::new("requirements");
        state.set(FEEDBACK_KEY, "Split REQ-002 into two.");

        let template = "Items:\n{current_items}\nFeedback: {review_feedback}\n\
                        Keep {unknown} and {\"json\": 1}";
        let rendered = state.render(template);
        assert_eq!(
            rendered,
            "Items:\n[]\nFeedback: Split REQ-002 into two.\nKeep {unknown} and {\"json\": 1}"
        );
    }

    #[test]
    fn test_render_does_not_recurse_into_values() {
        let mut state = PipelineState::new("requirements");
        state.set(ITEMS_KEY, "{review_feedback}");
        state.set(FEEDBACK_KEY, "x");
        assert_eq!(state.render("{current_items}"), "{review_feedback}");
    }

    #[test]
    fn test_approval_detection() {
        assert!(is_approval("APPROVED"));
        assert!(is_approval("  APPROVED\n"));
        assert!(!is_approval("approved"));
        assert!(!is_approval("APPROVED, but fix REQ-003"));
    }

    #[test]
    fn test_set_items_round_trips() {
        let mut state = PipelineState::new("requirements");
        let mut item = Map::new();
        item.insert("id".to_string(), Value::from("REQ-001"));
        item.insert("text".to_string(), Value::from("The system shall log in users."));
        state.set_items(&[item]);

        let parsed: Vec<Map<String, Value>> = serde_json::from_str(state.items()).unwrap();
        assert_eq!(parsed[0]["id"], "REQ-001");
    }
}
