use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "reqforge",
    version,
    about = "Reqforge - extract testable requirements and test cases from documents",
    long_about = "Reqforge reads plain-text or markdown documents, extracts testable requirements through a bounded generate/review/refine loop against a text-generation model, and turns requirements into test cases. Output is JSON on stdout."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract requirements from a document
    #[command(about = "Extract testable requirements from a text or markdown document")]
    Extract(ExtractArgs),

    /// Refine requirements with human feedback
    #[command(about = "Revise existing requirements according to human feedback")]
    Refine(RefineArgs),

    /// Generate test cases
    #[command(about = "Generate test cases from a requirements file")]
    Generate(GenerateArgs),
}

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Document to extract from
    #[arg(help = "Path to a plain-text or markdown document")]
    pub file: PathBuf,

    /// Skip the model and use only the heuristic extractor
    #[arg(long, help = "Use the rule-based extractor only; no credentials needed")]
    pub offline: bool,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct RefineArgs {
    /// Requirements JSON (array or {"requirements": [...]})
    #[arg(short, long)]
    pub requirements: PathBuf,

    /// Feedback to apply
    #[arg(short, long)]
    pub feedback: String,

    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Requirements JSON (array or {"requirements": [...]})
    #[arg(short, long)]
    pub requirements: PathBuf,

    #[arg(long, default_value = "Standard")]
    pub template_name: String,

    #[arg(long, default_value = "steps")]
    pub template_format: String,

    /// Template fields, comma separated
    #[arg(long, value_delimiter = ',', default_value = "title,preconditions,steps,expected_result")]
    pub fields: Vec<String>,

    /// Free-form notes; also used as placeholder preconditions
    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long)]
    pub app_link: Option<String>,

    #[arg(long)]
    pub prototype_link: Option<String>,

    /// Human feedback from a previous round
    #[arg(long)]
    pub feedback: Option<String>,

    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
