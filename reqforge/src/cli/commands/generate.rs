//! Generate test cases command

use super::{build_engine, read_requirements, write_json};
use crate::cli::app::GenerateArgs;
use anyhow::Result;
use reqforge_core::{GenerateTestCasesInput, GenerationContext, Requirement, TestCaseTemplate};
use serde_json::json;
use std::path::Path;
use tracing::info;

/// Execute the generate command
pub async fn execute(args: GenerateArgs, config: Option<&Path>) -> Result<()> {
    let requirements = read_requirements(&args.requirements).await?;
    let input = build_input(requirements, &args);

    let engine = build_engine(config)?;
    let test_cases = engine.generate_test_cases(&input).await;
    info!(
        requirements = input.requirements.len(),
        test_cases = test_cases.len(),
        "Generation finished"
    );

    write_json(&json!({ "test_cases": test_cases }), args.output.as_deref()).await
}

fn build_input(requirements: Vec<Requirement>, args: &GenerateArgs) -> GenerateTestCasesInput {
    let context = GenerationContext {
        app_link: args.app_link.clone(),
        prototype_link: args.prototype_link.clone(),
        notes: args.notes.clone(),
        ..GenerationContext::default()
    };
    let has_context = context.render().is_some();

    GenerateTestCasesInput {
        requirements,
        template: TestCaseTemplate {
            name: args.template_name.clone(),
            format: args.template_format.clone(),
            fields: args
                .fields
                .iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
        },
        context: has_context.then_some(context),
        feedback: args.feedback.clone().filter(|f| !f.trim().is_empty()),
    }
}
