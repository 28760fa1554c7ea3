//! Regex utilities for reqforge
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet, RegexSetBuilder};

/// A pattern with a stable name, so matches can be reported and tested one by one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedPattern {
    pub name: &'static str,
    pub pattern: &'static str,
}

const fn named(name: &'static str, pattern: &'static str) -> NamedPattern {
    NamedPattern { name, pattern }
}

/// Build a case-insensitive set from a pattern table
fn build_set(table: &[NamedPattern]) -> RegexSet {
    RegexSetBuilder::new(table.iter().map(|p| p.pattern))
        .case_insensitive(true)
        .build()
        .expect("Invalid regex pattern")
}

/// Pattern tables used by the heuristic requirement extractor
pub mod requirement {
    use super::*;

    /// Lines that are definitely not requirements, tested against the raw line.
    ///
    /// Any single match discards the line.
    pub const LINE_NOISE: &[NamedPattern] = &[
        named("markdown_heading", r"^#+\s"),
        named("numbered_step", r"^\d+\)\s*"),
        named("admonition", r"^(note|notes|tip|warning|important|caution):"),
        named("inline_code", r"`[^`]+`"),
        named("url", r"^(http|https)://"),
        named("box_drawing", r"[│├└─┌┐┘┴┬]+"),
        // Evaluated case-sensitively even though the set is not.
        named("constant_token", r"(?-i:^[A-Z][A-Z0-9_]{2,})"),
        named("file_extension", r"\.(py|js|ts|md|json|txt|yml|yaml|env|sh)"),
        named("metadata", r"^(created|updated|author|version|date|last\s+modified):"),
        named("iso_date", r"^\d{4}[-/]\d{2}[-/]\d{2}"),
        named(
            "month_date",
            r"^(january|february|march|april|may|june|july|august|september|october|november|december)\s+\d",
        ),
        named("bold_heading", r"^\*\*[^*]+\*\*:?\s*$"),
        named("section_label", r"^(purpose|overview|introduction|scope|background|context):?\s*$"),
        named("secret", r"api[_-]?key|secret|password|credential"),
        named("config_default", r"\(default:"),
        named("stub_note", r"is a stub"),
        named("code_comment", r"^\s*(#|//|/\*)"),
        named(
            "setup_instruction",
            r"^(install|setup|configure|run|start|build|deploy)\s+(the|a|your)",
        ),
        named("path", r"reports?/|src/|lib/|dist/|node_modules|__pycache__"),
        // Substring match: "pipeline" and "nodes" count as tool mentions too.
        named("tool_name", r"uvicorn|npm|pip|python|node"),
        named("implementation_detail", r"in-memory|processed|stored"),
    ];

    /// Statements that still look like noise after cleaning
    pub const STATEMENT_NOISE: &[NamedPattern] = &[
        named("metadata", r"^(created|updated|author|version|date):?\s"),
        named("iso_date", r"^\d{4}[-/]\d{2}[-/]\d{2}"),
        named(
            "month_date",
            r"^(january|february|march|april|may|june|july|august|september|october|november|december)\s+\d",
        ),
        named("box_drawing", r"[│├└─]+"),
        named("markdown_heading", r"^#\s"),
        named("file_name", r"\.(py|js|md|json)$"),
        named("directory", r"^[a-z_]+/$"),
        named("section_label", r"^(purpose|overview|introduction|scope):?\s*$"),
        named("bold_heading", r"^\*\*[^*]+\*\*:?\s*$"),
        named("admonition", r"^(note|notes|tip|warning):"),
        named("configuration", r"api[_-]?key|environment|config"),
        named("numbered_bold_heading", r"^\d+\.\s*\*\*[^:]+\*\*:"),
    ];

    /// What a scoring rule looks at
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Signal {
        /// The line sits under a features/capabilities heading
        FeaturesSection,
        /// Pattern tested against the cleaned statement
        Statement(&'static str),
        /// Pattern tested against the raw line, only inside a features section
        FeatureBullet(&'static str),
    }

    /// One additive scoring rule
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ScoreRule {
        pub name: &'static str,
        pub signal: Signal,
        pub weight: i32,
    }

    pub const MODAL_REQUIREMENT: &str = concat!(
        r"\b(shall|should|must|will|can|may)\s+(be\s+able\s+to|allow|enable|support|provide",
        r"|display|show|generate|create|delete|update|save|load|send|receive|validate|verify",
        r"|authenticate|authorize)",
        r"|\buser\s+(can|shall|should|must|will)\b",
        r"|\bsystem\s+(shall|should|must|will)\b",
    );

    /// Prefix match, so inflected forms ("Added", "Generates") score as well
    pub const ACTION_VERB_START: &str = concat!(
        r"^(upload|download|export|import|parse|extract|process|generate|create|add",
        r"|view|display|show|save|load|send|validate|authenticate)",
    );

    pub const BULLET_ITEM: &str = r"^[-*•]";

    pub const SCORE_RULES: &[ScoreRule] = &[
        ScoreRule { name: "features_section", signal: Signal::FeaturesSection, weight: 3 },
        ScoreRule {
            name: "modal_requirement",
            signal: Signal::Statement(MODAL_REQUIREMENT),
            weight: 4,
        },
        ScoreRule {
            name: "action_verb_start",
            signal: Signal::Statement(ACTION_VERB_START),
            weight: 3,
        },
        ScoreRule { name: "feature_bullet", signal: Signal::FeatureBullet(BULLET_ITEM), weight: 2 },
    ];

    /// Minimum total score for a candidate to be formatted
    pub const MIN_SCORE: i32 = 3;

    pub static LINE_NOISE_SET: Lazy<RegexSet> = Lazy::new(|| build_set(LINE_NOISE));

    pub static STATEMENT_NOISE_SET: Lazy<RegexSet> = Lazy::new(|| build_set(STATEMENT_NOISE));

    /// Scoring rules paired with their compiled pattern (if any)
    pub static COMPILED_SCORE_RULES: Lazy<Vec<(ScoreRule, Option<Regex>)>> = Lazy::new(|| {
        SCORE_RULES
            .iter()
            .map(|rule| {
                let regex = match rule.signal {
                    Signal::FeaturesSection => None,
                    Signal::Statement(p) => Some(case_insensitive(p)),
                    Signal::FeatureBullet(p) => Some(Regex::new(p).expect("Invalid regex pattern")),
                };
                (*rule, regex)
            })
            .collect()
    });

    pub static FEATURES_HEADING: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^#+\s*(features?|capabilities|functionality)").expect("Invalid regex pattern")
    });

    pub static ANY_HEADING: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^#+\s").expect("Invalid regex pattern"));

    /// Statements already in canonical requirement form
    pub static CANONICAL_FORM: Lazy<Regex> = Lazy::new(|| {
        case_insensitive(
            r"^(the\s+system\s+(shall|should|must|will)|user\s+(can|shall|should|must))",
        )
    });

    /// Verb-led statements that can be rewritten as "The system shall ..."
    pub static ACTION_REWRITE: Lazy<Regex> = Lazy::new(|| {
        case_insensitive(
            concat!(
                r"^(upload|download|export|import|parse|extract|process|generate|create|add|view",
                r"|display|show|save|load|send|validate|authenticate|allow|enable|support|provide)",
                r"\s+(.+)",
            ),
        )
    });

    pub static ARTICLE_LED: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(The|A|An)\s").expect("Invalid regex pattern"));

    pub static CAPABILITY_MENTION: Lazy<Regex> =
        Lazy::new(|| case_insensitive(r"\b(support|capability|feature|function|ability)\b"));

    fn case_insensitive(pattern: &str) -> Regex {
        regex::RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("Invalid regex pattern")
    }

    /// Names of the raw-line noise patterns that match
    pub fn line_noise_matches(line: &str) -> Vec<&'static str> {
        LINE_NOISE_SET.matches(line).into_iter().map(|i| LINE_NOISE[i].name).collect()
    }

    /// Whether a cleaned statement still looks like noise
    pub fn is_statement_noise(statement: &str) -> bool {
        STATEMENT_NOISE_SET.is_match(statement)
    }
}

/// Formatting-artifact removal shared by the heuristic extractor and the normalizer
pub mod cleaning {
    use super::*;

    static BOLD_STARS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("Invalid regex pattern"));
    static ITALIC_STAR: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\*([^*]+)\*").expect("Invalid regex pattern"));
    static BOLD_UNDERSCORES: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"__([^_]+)__").expect("Invalid regex pattern"));
    static ITALIC_UNDERSCORE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"_([^_]+)_").expect("Invalid regex pattern"));
    static LEADING_MARKER: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[-*•│├└]\s*").expect("Invalid regex pattern"));
    static LEADING_NUMBER: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^\d+\.\s*").expect("Invalid regex pattern"));

    /// Strip emphasis, bullet/tree/number markers, "(stub)" and stray colons
    pub fn clean_statement(text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = BOLD_STARS.replace_all(text, "$1");
        let text = ITALIC_STAR.replace_all(&text, "$1");
        let text = BOLD_UNDERSCORES.replace_all(&text, "$1");
        let text = ITALIC_UNDERSCORE.replace_all(&text, "$1");

        let text = LEADING_MARKER.replace(&text, "");
        let text = LEADING_NUMBER.replace(&text, "");

        let text = text.replace(" (stub)", "").replace("(stub)", "");

        text.trim().trim_matches(':').trim().to_string()
    }
}
