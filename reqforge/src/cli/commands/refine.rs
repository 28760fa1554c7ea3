//! Refine requirements command

use super::{build_engine, read_requirements, write_json};
use crate::cli::app::RefineArgs;
use anyhow::{Result, bail};
use serde_json::json;
use std::path::Path;
use tracing::info;

/// Execute the refine command
pub async fn execute(args: RefineArgs, config: Option<&Path>) -> Result<()> {
    if args.feedback.trim().is_empty() {
        bail!("Feedback must not be empty");
    }

    let existing = read_requirements(&args.requirements).await?;
    let engine = build_engine(config)?;

    let refined = engine.refine(&existing, &args.feedback).await;
    info!(before = existing.len(), after = refined.len(), "Refinement finished");

    write_json(&json!({ "requirements": refined }), args.output.as_deref()).await
}
