//! Bounded loop driver

use super::{FEEDBACK_KEY, PipelineState, Stage, StageOutcome};
use crate::llm::{GenerationProvider, LLMError};
use crate::parser::structured::{ItemShape, decode_items};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Result of one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopReport {
    /// Best available item list, possibly empty
    pub items: Vec<Map<String, Value>>,
    /// Review cycles started
    pub iterations: usize,
    /// The reviewer approved before the budget ran out
    pub approved: bool,
}

/// Generator once, then up to `max_iterations` reviewer/refiner cycles
pub struct RefinementLoop {
    pub generator: Box<dyn Stage>,
    pub reviewer: Box<dyn Stage>,
    pub refiner: Box<dyn Stage>,
    pub max_iterations: usize,
    pub shape: ItemShape,
}

impl RefinementLoop {
    /// Run the loop over `state`
    ///
    /// Malformed stage output leaves the items unchanged. A provider error
    /// aborts the run and is returned to the caller.
    pub async fn run(
        &self,
        state: &mut PipelineState,
        provider: &dyn GenerationProvider,
    ) -> Result<LoopReport, LLMError> {
        info!(
            run_id = %state.run_id,
            task = state.task,
            max_iterations = self.max_iterations,
            "Pipeline started"
        );

        let mut observed: Option<Vec<Map<String, Value>>> = None;
        let mut report = LoopReport::default();

        let outcome = self.generator.execute(state, provider).await?;
        self.apply(self.generator.as_ref(), outcome, state, &mut observed);

        for iteration in 1..=self.max_iterations {
            report.iterations = iteration;

            let review = self.reviewer.execute(state, provider).await?;
            self.apply(self.reviewer.as_ref(), review, state, &mut observed);

            let refined = self.refiner.execute(state, provider).await?;
            if refined.should_terminate {
                info!(run_id = %state.run_id, task = state.task, iteration, "Items approved");
                report.approved = true;
                break;
            }
            self.apply(self.refiner.as_ref(), refined, state, &mut observed);
        }

        if !report.approved {
            info!(
                run_id = %state.run_id,
                task = state.task,
                iterations = report.iterations,
                "Iteration budget exhausted without approval"
            );
        }

        // Most recent decoded stage output first, then whatever the state holds
        report.items = match observed {
            Some(items) => items,
            None => decode_items(state.items(), self.shape),
        };

        info!(
            run_id = %state.run_id,
            task = state.task,
            items = report.items.len(),
            "Pipeline finished"
        );
        Ok(report)
    }

    fn apply(
        &self,
        stage: &dyn Stage,
        outcome: StageOutcome,
        state: &mut PipelineState,
        observed: &mut Option<Vec<Map<String, Value>>>,
    ) {
        debug!(
            run_id = %state.run_id,
            stage = stage.name(),
            role = %stage.role(),
            items = outcome.items.len(),
            "Stage completed"
        );

        if let Some(feedback) = outcome.feedback {
            state.set(FEEDBACK_KEY, feedback);
        }

        if !outcome.items.is_empty() {
            state.set_items(&outcome.items);
            *observed = Some(outcome.items);
        }
    }
}
