//! Core functionality for reqforge
//!
//! This crate turns unstructured documents into validated requirements and
//! test cases by driving a bounded generate → review → refine loop against a
//! text-generation model, with a deterministic heuristic fallback when the
//! model yields nothing usable.

pub mod config;
pub mod engine;
pub mod llm;
pub mod normalize;
pub mod parser;
pub mod pipeline;

pub use config::{ConfigError, GenerationSettings, PipelineConfig, Settings};
pub use engine::{EngineError, ExtractionEngine};
pub use llm::{GenerationProvider, LLMError, OpenAICompatProvider};
pub use parser::heuristic::heuristic_extract;
pub use parser::model::{
    AutomationStatus, GenerateTestCasesInput, GenerationContext, Priority, RecordError, Requirement,
    TestCase, TestCaseTemplate, TestStatus, TestStep, TestType,
};
