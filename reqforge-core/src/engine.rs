//! Public entry points: requirement extraction, refinement and test-case generation
//!
//! Every operation degrades instead of failing: a pipeline that errors or
//! yields nothing falls back to the heuristic extractor, the existing
//! records, or placeholder test cases.

use crate::config::{ConfigError, PipelineConfig, Settings};
use crate::llm::{GenerationProvider, LLMError, OpenAICompatProvider};
use crate::normalize::{
    normalize_requirements, normalize_statements, normalize_test_cases, placeholder_test_cases,
};
use crate::parser::heuristic::heuristic_extract;
use crate::parser::model::{GenerateTestCasesInput, Requirement, TestCase};
use crate::pipeline::PipelineState;
use crate::pipeline::tasks::{self, PipelineTask};
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors raised while setting up the engine or its runtime
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] LLMError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Drives the generation pipelines against one provider
#[derive(Clone)]
pub struct ExtractionEngine {
    provider: Arc<dyn GenerationProvider>,
    config: PipelineConfig,
}

impl ExtractionEngine {
    pub fn new(provider: Arc<dyn GenerationProvider>, config: PipelineConfig) -> Self {
        Self { provider, config }
    }

    /// Validate settings and build an engine backed by the HTTP provider
    pub fn from_settings(settings: &Settings) -> Result<Self, EngineError> {
        settings.validate()?;
        let provider = OpenAICompatProvider::from_settings(&settings.generation)?;
        info!(provider = provider.name(), model = provider.model(), "Generation provider ready");
        Ok(Self::new(Arc::new(provider), settings.pipeline.clone()))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract requirements from a document
    pub async fn extract(&self, document_text: &str) -> Vec<Requirement> {
        if document_text.trim().is_empty() {
            return Vec::new();
        }

        let mut state = tasks::extraction_state(document_text);
        let items = self
            .run(
                PipelineTask::RequirementExtraction,
                self.config.requirement_iterations,
                &mut state,
            )
            .await;

        let requirements = normalize_requirements(&items);
        if !requirements.is_empty() {
            info!(run_id = %state.run_id, count = requirements.len(), "Requirements extracted");
            return requirements;
        }

        warn!(
            run_id = %state.run_id,
            "Pipeline produced no requirements; using heuristic fallback"
        );
        let requirements = normalize_statements(heuristic_extract(document_text));
        info!(run_id = %state.run_id, count = requirements.len(), "Heuristic fallback finished");
        requirements
    }

    /// Revise existing requirements according to human feedback
    pub async fn refine(&self, existing: &[Requirement], feedback: &str) -> Vec<Requirement> {
        let mut state = tasks::refinement_state(existing, feedback);
        info!(
            run_id = %state.run_id,
            existing = existing.len(),
            feedback = %feedback.chars().take(100).collect::<String>(),
            "Refining requirements"
        );

        let items = self
            .run(PipelineTask::RequirementRefinement, self.config.refine_iterations, &mut state)
            .await;

        let requirements = normalize_requirements(&items);
        if !requirements.is_empty() {
            return requirements;
        }

        warn!(
            run_id = %state.run_id,
            "Refinement produced nothing; returning existing requirements"
        );
        normalize_statements(existing.iter().map(|r| r.text.as_str()))
    }

    /// Generate test cases for a set of requirements
    pub async fn generate_test_cases(&self, input: &GenerateTestCasesInput) -> Vec<TestCase> {
        if input.requirements.is_empty() {
            return Vec::new();
        }

        let mut state = tasks::test_case_state(input);
        let items = self
            .run(PipelineTask::TestCaseGeneration, self.config.test_case_iterations, &mut state)
            .await;

        let cases = normalize_test_cases(&items);
        if !cases.is_empty() {
            info!(run_id = %state.run_id, count = cases.len(), "Test cases generated");
            return cases;
        }

        warn!(run_id = %state.run_id, "Pipeline produced no test cases; using placeholders");
        placeholder_test_cases(&input.requirements, input.context.as_ref())
    }

    /// Blocking form of [`extract`](Self::extract)
    pub fn extract_blocking(&self, document_text: &str) -> Result<Vec<Requirement>, EngineError> {
        block_on(self.extract(document_text))
    }

    /// Blocking form of [`refine`](Self::refine)
    pub fn refine_blocking(
        &self,
        existing: &[Requirement],
        feedback: &str,
    ) -> Result<Vec<Requirement>, EngineError> {
        block_on(self.refine(existing, feedback))
    }

    /// Blocking form of [`generate_test_cases`](Self::generate_test_cases)
    pub fn generate_test_cases_blocking(
        &self,
        input: &GenerateTestCasesInput,
    ) -> Result<Vec<TestCase>, EngineError> {
        block_on(self.generate_test_cases(input))
    }

    async fn run(
        &self,
        task: PipelineTask,
        max_iterations: usize,
        state: &mut PipelineState,
    ) -> Vec<Map<String, Value>> {
        match task.build(max_iterations).run(state, self.provider.as_ref()).await {
            Ok(report) => report.items,
            Err(e) => {
                error!(run_id = %state.run_id, task = task.name(), error = %e, "Pipeline failed");
                Vec::new()
            }
        }
    }
}

/// Run a future to completion from synchronous code
///
/// Inside a Tokio runtime the future runs on a scoped helper thread with its
/// own runtime, since nesting `block_on` on the caller's runtime panics.
fn block_on<F>(future: F) -> Result<F::Output, EngineError>
where
    F: Future + Send,
    F::Output: Send,
{
    let run = move || -> Result<F::Output, EngineError> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        Ok(runtime.block_on(future))
    };

    if tokio::runtime::Handle::try_current().is_err() {
        return run();
    }

    std::thread::scope(|scope| match scope.spawn(run).join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    })
}
