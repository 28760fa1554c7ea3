//! Extract requirements command

use super::{build_engine, write_json};
use crate::cli::app::ExtractArgs;
use anyhow::{Context, Result};
use reqforge_core::normalize::normalize_statements;
use reqforge_core::{Requirement, heuristic_extract};
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct ExtractOutput {
    pub source_name: String,
    pub requirements: Vec<Requirement>,
}

/// Execute the extract command
pub async fn execute(args: ExtractArgs, config: Option<&Path>) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {} as UTF-8 text", args.file.display()))?;

    let requirements = if args.offline {
        info!("Offline mode: heuristic extraction only");
        normalize_statements(heuristic_extract(&text))
    } else {
        build_engine(config)?.extract(&text).await
    };

    info!(count = requirements.len(), "Extraction finished");

    let source_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());

    write_json(&ExtractOutput { source_name, requirements }, args.output.as_deref()).await
}
