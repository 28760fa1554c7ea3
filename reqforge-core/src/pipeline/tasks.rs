//! The concrete pipelines: requirement extraction, requirement refinement
//! and test-case generation share one loop with different stages

use super::prompts::*;
use super::{ITEMS_KEY, PipelineState, RefinementLoop};
use crate::parser::model::{GenerateTestCasesInput, Requirement, TestCaseTemplate};
use crate::parser::structured::ItemShape;
use super::stages::{GenerateStage, RefineStage, ReviewStage};

/// Which pipeline to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineTask {
    RequirementExtraction,
    RequirementRefinement,
    TestCaseGeneration,
}

impl PipelineTask {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineTask::RequirementExtraction => "requirement_extraction",
            PipelineTask::RequirementRefinement => "requirement_refinement",
            PipelineTask::TestCaseGeneration => "test_case_generation",
        }
    }

    pub fn shape(&self) -> ItemShape {
        match self {
            PipelineTask::TestCaseGeneration => ItemShape::TEST_CASES,
            _ => ItemShape::REQUIREMENTS,
        }
    }

    /// Build the loop for this task with the given review/refine budget
    pub fn build(&self, max_iterations: usize) -> RefinementLoop {
        let shape = self.shape();

        let (generator, reviewer, refiner) = match self {
            PipelineTask::RequirementExtraction | PipelineTask::RequirementRefinement => {
                let generator = if *self == PipelineTask::RequirementExtraction {
                    GenerateStage {
                        name: "requirement_extractor",
                        instruction: REQUIREMENT_EXTRACTOR_INSTRUCTION.to_string(),
                        prompt: REQUIREMENT_EXTRACTOR_PROMPT.to_string(),
                        shape,
                    }
                } else {
                    GenerateStage {
                        name: "feedback_refiner",
                        instruction: FEEDBACK_REFINER_INSTRUCTION.to_string(),
                        prompt: FEEDBACK_REFINE_PROMPT.to_string(),
                        shape,
                    }
                };
                let reviewer = ReviewStage {
                    name: "requirement_reviewer",
                    instruction: REQUIREMENT_REVIEWER_INSTRUCTION.to_string(),
                    prompt: REQUIREMENT_REVIEW_PROMPT.to_string(),
                };
                let refiner = RefineStage {
                    name: "requirement_refiner",
                    instruction: REQUIREMENT_REFINER_INSTRUCTION.to_string(),
                    prompt: REQUIREMENT_REFINE_PROMPT.to_string(),
                    shape,
                };
                (generator, reviewer, refiner)
            }
            PipelineTask::TestCaseGeneration => (
                GenerateStage {
                    name: "test_case_generator",
                    instruction: TEST_CASE_GENERATOR_INSTRUCTION.to_string(),
                    prompt: TEST_CASE_GENERATOR_PROMPT.to_string(),
                    shape,
                },
                ReviewStage {
                    name: "test_case_validator",
                    instruction: TEST_CASE_VALIDATOR_INSTRUCTION.to_string(),
                    prompt: TEST_CASE_VALIDATION_PROMPT.to_string(),
                },
                RefineStage {
                    name: "test_case_refiner",
                    instruction: TEST_CASE_REFINER_INSTRUCTION.to_string(),
                    prompt: TEST_CASE_REFINE_PROMPT.to_string(),
                    shape,
                },
            ),
        };

        RefinementLoop {
            generator: Box::new(generator),
            reviewer: Box::new(reviewer),
            refiner: Box::new(refiner),
            max_iterations,
            shape,
        }
    }
}

/// State for extracting requirements from a document
pub fn extraction_state(document_text: &str) -> PipelineState {
    let mut state = PipelineState::new(PipelineTask::RequirementExtraction.name());
    state.set(DOCUMENT_KEY, document_text);
    state
}

/// State seeded with existing requirements and the human feedback to apply
pub fn refinement_state(existing: &[Requirement], feedback: &str) -> PipelineState {
    let mut state = PipelineState::new(PipelineTask::RequirementRefinement.name());
    let json = serde_json::to_string_pretty(existing).unwrap_or_else(|_| "[]".to_string());
    state.set(ITEMS_KEY, json);
    state.set(HUMAN_FEEDBACK_KEY, feedback);
    state
}

/// State for generating test cases from requirements
pub fn test_case_state(input: &GenerateTestCasesInput) -> PipelineState {
    let mut state = PipelineState::new(PipelineTask::TestCaseGeneration.name());

    let context = input
        .context
        .as_ref()
        .and_then(|c| c.render())
        .unwrap_or_else(|| "No additional context provided.".to_string());

    state.set(REQUIREMENTS_KEY, requirements_text(&input.requirements));
    state.set(CONTEXT_KEY, context);
    state.set(TEMPLATE_KEY, template_text(&input.template));
    state.set(FEEDBACK_SECTION_KEY, feedback_section(input.feedback.as_deref()));
    state
}

/// One `- REQ-001: text` line per requirement
pub fn requirements_text(requirements: &[Requirement]) -> String {
    requirements
        .iter()
        .map(|r| format!("- {}: {}", r.id, r.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn template_text(template: &TestCaseTemplate) -> String {
    format!(
        "Name: {}, Format: {}, Fields: {}",
        template.name,
        template.format,
        template.fields.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockGenerationProvider;
    use crate::parser::model::GenerationContext;
    use crate::pipeline::APPROVAL_TOKEN;

    fn input() -> GenerateTestCasesInput {
        GenerateTestCasesInput {
            requirements: vec![
                Requirement::new("REQ-001", "The system shall allow users to upload documents."),
                Requirement::new("REQ-002", "The system shall export test cases to Excel."),
            ],
            template: TestCaseTemplate {
                name: "Xray".to_string(),
                format: "steps".to_string(),
                fields: vec!["title".to_string(), "steps".to_string()],
            },
            context: None,
            feedback: Some("Add negative cases".to_string()),
        }
    }

    #[test]
    fn test_requirement_and_template_text() {
        let input = input();
        assert_eq!(
            requirements_text(&input.requirements),
            "- REQ-001: The system shall allow users to upload documents.\n\
             - REQ-002: The system shall export test cases to Excel."
        );
        assert_eq!(
            template_text(&input.template),
            "Name: Xray, Format: steps, Fields: title, steps"
        );
    }

    #[test]
    fn test_test_case_state_defaults_context() {
        let state = test_case_state(&input());
        assert_eq!(state.get(CONTEXT_KEY), Some("No additional context provided."));
        assert!(state.get(FEEDBACK_SECTION_KEY).unwrap().contains("Add negative cases"));

        let mut with_context = input();
        with_context.context = Some(GenerationContext {
            notes: Some("Staging only".to_string()),
            ..Default::default()
        });
        let state = test_case_state(&with_context);
        assert_eq!(state.get(CONTEXT_KEY), Some("Notes: Staging only"));
    }

    #[test]
    fn test_refinement_state_seeds_items() {
        let existing = vec![Requirement::new("REQ-001", "The system shall log in users.")];
        let state = refinement_state(&existing, "Mention SSO");
        assert!(state.items().contains("The system shall log in users."));
        assert_eq!(state.get(HUMAN_FEEDBACK_KEY), Some("Mention SSO"));
    }

    #[tokio::test]
    async fn test_extraction_prompts_carry_document_and_items() {
        let items = r#"[{"id": "REQ-001", "text": "The system shall parse uploaded documents."}]"#;
        let mock = MockGenerationProvider::with_responses([items, APPROVAL_TOKEN]);

        let mut state = extraction_state("Parse uploaded documents.");
        let report =
            PipelineTask::RequirementExtraction.build(5).run(&mut state, &mock).await.unwrap();
        assert!(report.approved);

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, REQUIREMENT_EXTRACTOR_INSTRUCTION);
        let framed = "---DOCUMENT START---\nParse uploaded documents.\n---DOCUMENT END---";
        assert!(calls[0].1.contains(framed));
        assert_eq!(calls[1].0, REQUIREMENT_REVIEWER_INSTRUCTION);
        assert!(calls[1].1.contains("The system shall parse uploaded documents."));
    }

    #[tokio::test]
    async fn test_test_case_prompts_carry_feedback() {
        let mock = MockGenerationProvider::new();
        let mut state = test_case_state(&input());
        PipelineTask::TestCaseGeneration.build(1).run(&mut state, &mock).await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 3);
        assert!(
            calls[0].1.starts_with("IMPORTANT - human feedback to address:\nAdd negative cases")
        );
        assert!(calls[0].1.contains("Name: Xray, Format: steps, Fields: title, steps"));
        assert!(calls[1].1.contains("Original requirements:\n- REQ-001"));
        assert_eq!(calls[2].0, TEST_CASE_REFINER_INSTRUCTION);
    }
}
