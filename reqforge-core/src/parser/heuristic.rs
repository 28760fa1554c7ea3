//! Rule-based requirement extraction
//!
//! Used when the generative pipeline produces nothing usable. Lines are
//! filtered against the noise tables, scored against the signal tables and
//! rewritten into "The system shall ..." form. No model calls, fully
//! deterministic.

use regex_utils::cleaning::clean_statement;
use regex_utils::requirement::{
    self, ACTION_REWRITE, ANY_HEADING, ARTICLE_LED, CANONICAL_FORM, CAPABILITY_MENTION,
    COMPILED_SCORE_RULES, FEATURES_HEADING, MIN_SCORE, Signal,
};
use std::collections::HashSet;
use tracing::trace;

/// A statement that survived filtering, with its accumulated score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub text: String,
    pub score: i32,
}

/// Extracts requirement-shaped statements from raw document text
#[derive(Debug, Clone)]
pub struct HeuristicExtractor {
    min_line_len: usize,
    max_line_len: usize,
    max_results: usize,
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self { min_line_len: 15, max_line_len: 300, max_results: 15 }
    }
}

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract up to `max_results` formatted requirement statements
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut candidates = self.score_lines(text);

        // sort_by is stable, so ties keep document order
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates.truncate(self.max_results);

        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|c| seen.insert(c.text.to_lowercase()))
            .map(|c| c.text)
            .collect()
    }

    /// Score every line in document order, keeping formatted survivors
    pub fn score_lines(&self, text: &str) -> Vec<ScoredCandidate> {
        let mut candidates = Vec::new();
        let mut in_features = false;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if FEATURES_HEADING.is_match(&line.to_lowercase()) {
                in_features = true;
                continue;
            }
            if ANY_HEADING.is_match(line) {
                in_features = false;
                continue;
            }

            if requirement::LINE_NOISE_SET.is_match(line) {
                let rules = requirement::line_noise_matches(line);
                trace!(line, ?rules, "Discarded noise line");
                continue;
            }

            let len = line.chars().count();
            if len < self.min_line_len || len > self.max_line_len {
                continue;
            }

            let cleaned = clean_statement(line);
            if cleaned.chars().count() < self.min_line_len
                || requirement::is_statement_noise(&cleaned)
            {
                continue;
            }

            let score = score(line, &cleaned, in_features);
            if score < MIN_SCORE {
                continue;
            }

            if let Some(text) = format_statement(&cleaned) {
                candidates.push(ScoredCandidate { text, score });
            }
        }

        candidates
    }
}

fn score(raw_line: &str, cleaned: &str, in_features: bool) -> i32 {
    COMPILED_SCORE_RULES
        .iter()
        .filter(|(rule, regex)| match (rule.signal, regex) {
            (Signal::FeaturesSection, _) => in_features,
            (Signal::Statement(_), Some(re)) => re.is_match(cleaned),
            (Signal::FeatureBullet(_), Some(re)) => in_features && re.is_match(raw_line),
            _ => false,
        })
        .map(|(rule, _)| rule.weight)
        .sum()
}

/// Rewrite a statement into canonical requirement form, if it has a usable shape
pub fn format_statement(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    if CANONICAL_FORM.is_match(text) {
        return Some(text.to_string());
    }

    if let Some(caps) = ACTION_REWRITE.captures(text) {
        let verb = caps[1].to_lowercase();
        return Some(format!("The system shall {verb} {}", &caps[2]));
    }

    let mut chars = text.chars();
    let first = chars.next()?;
    if first.is_uppercase() && !ARTICLE_LED.is_match(text) && CAPABILITY_MENTION.is_match(text) {
        let lowered: String = first.to_lowercase().chain(chars).collect();
        return Some(format!("The system shall provide {lowered}"));
    }

    None
}

/// Extract requirement statements with the default extractor
pub fn heuristic_extract(text: &str) -> Vec<String> {
    HeuristicExtractor::default().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = r#"# Requirements Parser

Author: QA lead
2024-01-10: updated by QA lead

## Features
- Upload requirement documents in .md and .docx formats
- Multi-format document support for Word and Markdown
- **Edit** extracted requirements before generating test cases

## Setup
Install the dependencies with `npm install` first.
Run the server using uvicorn on port 8000.

## Behaviour
The system shall validate uploaded documents before parsing them.
Export test cases to Excel format with formatting.
Users enjoy a clean and friendly interface overall.
"#;

    #[test]
    fn test_export_line_example() {
        let result = heuristic_extract("Export test cases to Excel format with formatting.");
        assert_eq!(
            result,
            vec!["The system shall export test cases to Excel format with formatting."]
        );
    }

    #[test]
    fn test_inflected_action_verbs_score() {
        assert_eq!(
            heuristic_extract("Added support for bulk export of reports"),
            vec!["The system shall provide added support for bulk export of reports"]
        );
        assert!(heuristic_extract("Generates a weekly digest of failures").is_empty());
    }

    #[test]
    fn test_tool_mentions_inside_words_are_noise() {
        assert!(heuristic_extract("Export pipeline results to the shared dashboard").is_empty());
        assert_eq!(
            heuristic_extract("Export build results to the shared dashboard"),
            vec!["The system shall export build results to the shared dashboard"]
        );
    }

    #[test]
    fn test_metadata_line_is_noise() {
        assert!(heuristic_extract("2024-01-10: updated by QA lead").is_empty());
        assert!(heuristic_extract("## Features\n2024-01-10: updated by QA lead").is_empty());
    }

    #[test]
    fn test_sample_document() {
        let result = heuristic_extract(SAMPLE);
        assert_eq!(
            result,
            vec![
                "The system shall provide multi-format document support for Word and Markdown",
                "The system shall validate uploaded documents before parsing them.",
                "The system shall export test cases to Excel format with formatting.",
            ]
        );
    }

    #[test]
    fn test_scores_and_sections() {
        let extractor = HeuristicExtractor::new();
        let scored = extractor.score_lines(SAMPLE);

        let support = scored.iter().find(|c| c.text.contains("multi-format")).unwrap();
        assert_eq!(support.score, 5);

        let validate = scored.iter().find(|c| c.text.contains("validate uploaded")).unwrap();
        assert_eq!(validate.score, 4);

        // "Edit" is not an action verb and mentions no capability
        assert!(scored.iter().all(|c| !c.text.contains("Edit")));
    }

    #[test]
    fn test_features_section_reset_by_heading() {
        let text = "## Capabilities\n- Reliable sync support across devices\n\
                    ## Notes\n- Reliable sync support across devices again";
        let scored = HeuristicExtractor::new().score_lines(text);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].score, 5);
    }

    #[test]
    fn test_format_statement() {
        assert_eq!(
            format_statement("The system must log every failed login."),
            Some("The system must log every failed login.".to_string())
        );
        assert_eq!(
            format_statement("GENERATE reports nightly for managers"),
            Some("The system shall generate reports nightly for managers".to_string())
        );
        assert_eq!(format_statement("A feature for reporting"), None);
        assert_eq!(format_statement("lowercase feature text"), None);
        assert_eq!(format_statement(""), None);
    }

    #[test]
    fn test_ranking_cap() {
        let mut doc = String::from("## Features\n");
        for i in 0..20 {
            doc.push_str(&format!("- Export report number {i} to PDF\n"));
        }
        doc.push_str("- EXPORT REPORT NUMBER 0 TO PDF\n");

        let result = heuristic_extract(&doc);
        assert_eq!(result.len(), 15);
        assert_eq!(result[0], "The system shall export report number 0 to PDF");
        assert_eq!(result[14], "The system shall export report number 14 to PDF");
    }

    #[test]
    fn test_duplicates_removed_after_cap() {
        let doc = "Export the audit log to CSV files\n\
                   export the audit log to csv files\n\
                   Validate every uploaded file size";
        let result = heuristic_extract(doc);
        assert_eq!(
            result,
            vec![
                "The system shall export the audit log to CSV files",
                "The system shall validate every uploaded file size"
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_heuristic_is_deterministic_capped_and_unique(
            lines in prop::collection::vec(
                prop_oneof![
                    "(Export|Upload|Validate|Generate) [a-z ]{10,40}",
                    "The system (shall|must) [a-z ]{10,40}",
                    "## (Features|Overview|Setup)",
                    "- [A-Za-z ]{10,40} support",
                    "[A-Za-z0-9 ,.:]{0,60}",
                ],
                0..40,
            )
        ) {
            let doc = lines.join("\n");
            let first = heuristic_extract(&doc);
            let second = heuristic_extract(&doc);
            prop_assert_eq!(&first, &second);
            prop_assert!(first.len() <= 15);

            let lowered: HashSet<String> = first.iter().map(|s| s.to_lowercase()).collect();
            prop_assert_eq!(lowered.len(), first.len());
        }
    }
}
