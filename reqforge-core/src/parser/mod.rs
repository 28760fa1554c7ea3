//! Parsing of documents and generation output
//!
//! - [`structured`] recovers JSON record lists from noisy model output
//! - [`heuristic`] extracts requirement statements from raw text without a model
//! - [`model`] holds the domain records both paths feed into

pub mod heuristic;
pub mod model;
pub mod structured;

pub use heuristic::{HeuristicExtractor, ScoredCandidate, format_statement, heuristic_extract};
pub use model::*;
pub use structured::{ExtractError, ItemShape, decode_items, extract_json_slice};
