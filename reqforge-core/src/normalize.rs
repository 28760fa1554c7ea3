//! Conversion of loosely-typed stage output into validated records
//!
//! Whatever the source (pipeline or heuristic fallback), records are
//! cleaned, deduplicated case-insensitively with the first occurrence
//! winning, and renumbered sequentially so IDs are unique and ordered.

use crate::parser::model::{
    AutomationStatus, GenerationContext, Priority, RecordError, Requirement, TestCase, TestStatus,
    TestStep, TestType,
};
use regex_utils::cleaning::clean_statement;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::warn;

/// Requirements shorter than this after cleaning are dropped
pub const MIN_REQUIREMENT_LEN: usize = 20;

pub const REQUIREMENT_PREFIX: &str = "REQ";
pub const TEST_CASE_PREFIX: &str = "TC";

/// `PREFIX-001` style identifier for a 1-based position
pub fn sequential_id(prefix: &str, position: usize) -> String {
    format!("{prefix}-{position:03}")
}

/// Normalize decoded requirement records
pub fn normalize_requirements(items: &[Map<String, Value>]) -> Vec<Requirement> {
    normalize_statements(items.iter().filter_map(|item| {
        ["text", "content"].iter().find_map(|field| item.get(*field).and_then(scalar_text))
    }))
}

/// Normalize plain requirement statements
pub fn normalize_statements<I, S>(statements: I) -> Vec<Requirement>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut requirements = Vec::new();

    for statement in statements {
        let text = clean_statement(statement.as_ref());
        if text.chars().count() < MIN_REQUIREMENT_LEN {
            continue;
        }
        if !seen.insert(text.to_lowercase()) {
            continue;
        }
        let id = sequential_id(REQUIREMENT_PREFIX, requirements.len() + 1);
        requirements.push(Requirement::new(id, text));
    }

    requirements
}

/// Normalize decoded test-case records, skipping invalid ones with a warning
pub fn normalize_test_cases(items: &[Map<String, Value>]) -> Vec<TestCase> {
    let mut seen = HashSet::new();
    let mut cases = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let mut case = match parse_test_case(item) {
            Ok(case) => case,
            Err(e) => {
                warn!(index, error = %e, "Skipping invalid test case");
                continue;
            }
        };

        let description = case.description.as_deref().unwrap_or_default();
        let key = format!("{}\n{}", case.title, description).to_lowercase();
        if !seen.insert(key) {
            continue;
        }

        case.id = sequential_id(TEST_CASE_PREFIX, cases.len() + 1);
        cases.push(case);
    }

    cases
}

/// Build a test case from one raw record, filling defaults for missing fields
pub fn parse_test_case(item: &Map<String, Value>) -> Result<TestCase, RecordError> {
    let title = item
        .get("title")
        .and_then(scalar_text)
        .map(|t| clean_statement(&t))
        .filter(|t| !t.is_empty())
        .ok_or(RecordError::MissingField("title"))?;

    let description = optional_text(item, "description")
        .map(|d| clean_statement(&d))
        .filter(|d| !d.is_empty());

    let steps: Vec<TestStep> = match item.get("steps") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(raw)) => {
            raw.iter().enumerate().map(|(i, s)| parse_step(s, i)).collect::<Result<_, _>>()?
        }
        Some(other) => return Err(invalid("steps", other)),
    };

    let tags = match item.get("tags") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(raw)) => raw.iter().filter_map(scalar_text).collect(),
        Some(other) => return Err(invalid("tags", other)),
    };

    Ok(TestCase {
        id: String::new(),
        title,
        description,
        priority: enum_field::<Priority>(item, "priority")?,
        test_type: enum_field::<TestType>(item, "type")?,
        status: enum_field::<TestStatus>(item, "status")?,
        preconditions: optional_text(item, "preconditions"),
        steps,
        expected_result: optional_text(item, "expected_result"),
        test_data: optional_text(item, "test_data"),
        estimated_time: optional_text(item, "estimated_time"),
        automation_status: enum_field::<AutomationStatus>(item, "automation_status")?,
        component: optional_text(item, "component"),
        tags,
    })
}

fn parse_step(raw: &Value, position: usize) -> Result<TestStep, RecordError> {
    let Value::Object(step) = raw else {
        return Err(invalid("steps", raw));
    };

    let number = step
        .get("step")
        .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
        .filter(|n| *n >= 1)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(position as u32 + 1);

    Ok(TestStep {
        step: number,
        action: optional_text(step, "action").unwrap_or_default(),
        expected: optional_text(step, "expected").unwrap_or_default(),
        test_data: optional_text(step, "test_data"),
    })
}

fn enum_field<T>(item: &Map<String, Value>, field: &'static str) -> Result<T, RecordError>
where
    T: FromStr<Err = RecordError> + Default,
{
    match item.get(field) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(Value::String(s)) => s.parse(),
        Some(other) => Err(invalid(field, other)),
    }
}

fn invalid(field: &'static str, value: &Value) -> RecordError {
    RecordError::InvalidValue { field, value: value.to_string() }
}

/// String form of a scalar; objects, arrays and null have none
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn optional_text(item: &Map<String, Value>, field: &str) -> Option<String> {
    item.get(field).and_then(scalar_text).map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Deterministic stand-in test cases, one per requirement
pub fn placeholder_test_cases(
    requirements: &[Requirement],
    context: Option<&GenerationContext>,
) -> Vec<TestCase> {
    let preconditions = context.and_then(|c| c.notes.clone());

    requirements
        .iter()
        .enumerate()
        .map(|(index, req)| TestCase {
            id: sequential_id(TEST_CASE_PREFIX, index + 1),
            title: format!("Validate {}", truncate_chars(&req.text, 60)),
            description: Some(format!("Verify that {}", truncate_chars(&req.text, 100))),
            priority: Priority::Medium,
            test_type: TestType::Functional,
            status: TestStatus::Draft,
            preconditions: preconditions.clone(),
            steps: vec![
                TestStep::new(1, format!("Navigate to feature for {}", req.id), "Page loads"),
                TestStep::new(2, format!("Perform action for {}", req.id), "Expected outcome"),
            ],
            expected_result: Some("Feature works as expected per requirement".to_string()),
            test_data: None,
            estimated_time: Some("5 mins".to_string()),
            automation_status: AutomationStatus::ToBeAutomated,
            component: Some("General".to_string()),
            tags: vec![req.id.clone(), "generated".to_string()],
        })
        .collect()
}
