pub mod extract;
pub mod generate;
pub mod refine;

use anyhow::{Context, Result};
use reqforge_core::{ExtractionEngine, Requirement, Settings};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Requirements file: a bare array or `{"requirements": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum RequirementsFile {
    List(Vec<Requirement>),
    Wrapped { requirements: Vec<Requirement> },
}

/// Load settings from the optional config file and the environment
pub fn load_settings(config: Option<&Path>) -> Result<Settings> {
    let settings = Settings::load(config).context("Failed to load configuration")?;
    Ok(settings)
}

/// Build an engine, failing fast when credentials are missing
pub fn build_engine(config: Option<&Path>) -> Result<ExtractionEngine> {
    let settings = load_settings(config)?;
    let engine = ExtractionEngine::from_settings(&settings)
        .context("Failed to initialize generation provider")?;
    Ok(engine)
}

pub async fn read_requirements(path: &Path) -> Result<Vec<Requirement>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let parsed: RequirementsFile = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a requirements JSON file", path.display()))?;

    Ok(match parsed {
        RequirementsFile::List(list) => list,
        RequirementsFile::Wrapped { requirements } => requirements,
    })
}

/// Print JSON to stdout or write it to `output`
pub async fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, json + "\n")
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
