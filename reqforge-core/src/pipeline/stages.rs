//! The three stage kinds: generate, review, refine

use super::{APPROVAL_TOKEN, PipelineState, Stage, StageOutcome, StageRole, is_approval};
use crate::llm::{GenerationProvider, LLMError};
use crate::parser::structured::{ItemShape, decode_items};
use async_trait::async_trait;
use tracing::debug;

/// Produces an item list from the task input
///
/// Also used as a one-shot refiner when seeded with existing items and
/// human feedback.
#[derive(Debug, Clone)]
pub struct GenerateStage {
    pub name: &'static str,
    pub instruction: String,
    /// Prompt template rendered against the state
    pub prompt: String,
    pub shape: ItemShape,
}

#[async_trait]
impl Stage for GenerateStage {
    fn name(&self) -> &str {
        self.name
    }

    fn role(&self) -> StageRole {
        StageRole::Generator
    }

    async fn execute(
        &self,
        state: &PipelineState,
        provider: &dyn GenerationProvider,
    ) -> Result<StageOutcome, LLMError> {
        let output = provider.invoke(&self.instruction, &state.render(&self.prompt)).await?;
        let items = decode_items(&output, self.shape);
        debug!(
            run_id = %state.run_id,
            stage = self.name,
            items = items.len(),
            "Generator output decoded"
        );
        Ok(StageOutcome::items(items))
    }
}

/// Critiques the current items or approves them
#[derive(Debug, Clone)]
pub struct ReviewStage {
    pub name: &'static str,
    pub instruction: String,
    pub prompt: String,
}

#[async_trait]
impl Stage for ReviewStage {
    fn name(&self) -> &str {
        self.name
    }

    fn role(&self) -> StageRole {
        StageRole::Reviewer
    }

    async fn execute(
        &self,
        state: &PipelineState,
        provider: &dyn GenerationProvider,
    ) -> Result<StageOutcome, LLMError> {
        let output = provider.invoke(&self.instruction, &state.render(&self.prompt)).await?;
        let feedback = if is_approval(&output) {
            APPROVAL_TOKEN.to_string()
        } else {
            output.trim().to_string()
        };
        Ok(StageOutcome::feedback(feedback))
    }
}

/// Applies the latest review, or ends the loop when it was an approval
#[derive(Debug, Clone)]
pub struct RefineStage {
    pub name: &'static str,
    pub instruction: String,
    pub prompt: String,
    pub shape: ItemShape,
}

#[async_trait]
impl Stage for RefineStage {
    fn name(&self) -> &str {
        self.name
    }

    fn role(&self) -> StageRole {
        StageRole::Refiner
    }

    async fn execute(
        &self,
        state: &PipelineState,
        provider: &dyn GenerationProvider,
    ) -> Result<StageOutcome, LLMError> {
        if is_approval(state.feedback()) {
            return Ok(StageOutcome::terminate());
        }

        let output = provider.invoke(&self.instruction, &state.render(&self.prompt)).await?;
        Ok(StageOutcome::items(decode_items(&output, self.shape)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockGenerationProvider;
    use crate::pipeline::FEEDBACK_KEY;

    fn refine_stage() -> RefineStage {
        RefineStage {
            name: "refiner",
            instruction: "refine".to_string(),
            prompt: "Items: {current_items}\nFeedback: {review_feedback}".to_string(),
            shape: ItemShape::REQUIREMENTS,
        }
    }

    #[tokio::test]
    async fn test_refiner_terminates_on_approval_without_calling_model() {
        let mock = MockGenerationProvider::new();
        let mut state = PipelineState::new("requirements");
        state.set(FEEDBACK_KEY, " APPROVED ");

        let outcome = refine_stage().execute(&state, &mock).await.unwrap();
        assert!(outcome.should_terminate);
        assert!(outcome.items.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_refiner_renders_state_into_prompt() {
        let mock = MockGenerationProvider::with_responses([
            r#"[{"id": "REQ-001", "text": "The system shall export reports."}]"#,
        ]);
        let mut state = PipelineState::new("requirements");
        state.set(FEEDBACK_KEY, "Be more specific.");

        let outcome = refine_stage().execute(&state, &mock).await.unwrap();
        assert!(!outcome.should_terminate);
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(mock.calls()[0].1, "Items: []\nFeedback: Be more specific.");
    }

    #[tokio::test]
    async fn test_reviewer_normalizes_approval() {
        let mock = MockGenerationProvider::with_responses([
            "\nAPPROVED\n",
            "  Merge REQ-001 and REQ-002.  ",
        ]);
        let stage = ReviewStage {
            name: "reviewer",
            instruction: "review".to_string(),
            prompt: "{current_items}".to_string(),
        };
        let state = PipelineState::new("requirements");

        let first = stage.execute(&state, &mock).await.unwrap();
        assert_eq!(first.feedback.as_deref(), Some(APPROVAL_TOKEN));

        let second = stage.execute(&state, &mock).await.unwrap();
        assert_eq!(second.feedback.as_deref(), Some("Merge REQ-001 and REQ-002."));
    }

    #[tokio::test]
    async fn test_generator_tolerates_malformed_output() {
        let mock = MockGenerationProvider::with_responses(["Sorry, I cannot help with that."]);
        let stage = GenerateStage {
            name: "generator",
            instruction: "extract".to_string(),
            prompt: "doc".to_string(),
            shape: ItemShape::REQUIREMENTS,
        };

        let outcome = stage.execute(&PipelineState::new("requirements"), &mock).await.unwrap();
        assert_eq!(outcome, StageOutcome::items(Vec::new()));
    }
}
