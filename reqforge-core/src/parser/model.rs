//! Domain records produced by extraction and test-case generation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Validation failure for a single record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: &'static str, value: String },
}

/// A single testable requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Sequential identifier, e.g. `REQ-001`
    pub id: String,

    /// Requirement statement
    pub text: String,
}

impl Requirement {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// Closed string enumerations with a fixed wire spelling
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal, default = $default:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = RecordError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| RecordError::InvalidValue {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }
    };
}

closed_enum! {
    /// Business impact of a test case
    Priority, "priority", default = Medium {
        Critical => "Critical",
        High => "High",
        Medium => "Medium",
        Low => "Low",
    }
}

closed_enum! {
    /// Kind of testing a case belongs to
    TestType, "type", default = Functional {
        Functional => "Functional",
        Integration => "Integration",
        E2E => "E2E",
        Regression => "Regression",
        Smoke => "Smoke",
        Security => "Security",
        Performance => "Performance",
        Usability => "Usability",
    }
}

closed_enum! {
    TestStatus, "status", default = Draft {
        Draft => "Draft",
        Ready => "Ready",
        InReview => "In Review",
        Approved => "Approved",
        Deprecated => "Deprecated",
    }
}

closed_enum! {
    AutomationStatus, "automation_status", default = Manual {
        Manual => "Manual",
        Automated => "Automated",
        ToBeAutomated => "To Be Automated",
    }
}

/// One numbered step of a test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    /// 1-based step number
    pub step: u32,
    pub action: String,
    pub expected: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_data: Option<String>,
}

impl TestStep {
    pub fn new(step: u32, action: impl Into<String>, expected: impl Into<String>) -> Self {
        Self { step, action: action.into(), expected: expected.into(), test_data: None }
    }
}

/// A test case in the usual JIRA/Xray/TestRail shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "type", default)]
    pub test_type: TestType,
    #[serde(default)]
    pub status: TestStatus,
    #[serde(default)]
    pub preconditions: Option<String>,
    #[serde(default)]
    pub steps: Vec<TestStep>,
    #[serde(default)]
    pub expected_result: Option<String>,
    #[serde(default)]
    pub test_data: Option<String>,
    /// Free text such as "5 mins"
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub automation_status: AutomationStatus,
    #[serde(default)]
    pub component: Option<String>,
    /// Linked requirement IDs plus free-form labels
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Output template the generated test cases should follow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseTemplate {
    pub name: String,
    pub format: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl Default for TestCaseTemplate {
    fn default() -> Self {
        Self {
            name: "Standard".to_string(),
            format: "steps".to_string(),
            fields: vec![
                "title".to_string(),
                "preconditions".to_string(),
                "steps".to_string(),
                "expected_result".to_string(),
            ],
        }
    }
}

/// Extra context handed to the test-case generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    #[serde(default)]
    pub app_link: Option<String>,
    #[serde(default)]
    pub prototype_link: Option<String>,
    #[serde(default)]
    pub diagram_links: Vec<String>,
    #[serde(default)]
    pub image_links: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl GenerationContext {
    /// Render as prompt text, one labelled line per present field
    pub fn render(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(link) = &self.app_link {
            parts.push(format!("Application URL: {link}"));
        }
        if let Some(link) = &self.prototype_link {
            parts.push(format!("Prototype URL: {link}"));
        }
        if !self.diagram_links.is_empty() {
            parts.push(format!("Diagrams: {}", self.diagram_links.join(", ")));
        }
        if !self.image_links.is_empty() {
            parts.push(format!("Images: {}", self.image_links.join(", ")));
        }
        if let Some(notes) = &self.notes {
            parts.push(format!("Notes: {notes}"));
        }

        if parts.is_empty() { None } else { Some(parts.join("\n")) }
    }
}

/// Everything needed for one test-case generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateTestCasesInput {
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub template: TestCaseTemplate,
    #[serde(default)]
    pub context: Option<GenerationContext>,
    /// Human feedback to address in this round
    #[serde(default)]
    pub feedback: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parsing() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("In Review".parse::<TestStatus>().unwrap(), TestStatus::InReview);
        assert_eq!(
            "to be automated".parse::<AutomationStatus>().unwrap(),
            AutomationStatus::ToBeAutomated
        );
        assert_eq!("E2E".parse::<TestType>().unwrap(), TestType::E2E);

        let err = "Urgent".parse::<Priority>().unwrap_err();
        assert_eq!(
            err,
            RecordError::InvalidValue { field: "priority", value: "Urgent".to_string() }
        );
    }

    #[test]
    fn test_enum_defaults() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(TestType::default(), TestType::Functional);
        assert_eq!(TestStatus::default(), TestStatus::Draft);
        assert_eq!(AutomationStatus::default(), AutomationStatus::Manual);
    }

    #[test]
    fn test_test_case_serialization() {
        let case = TestCase {
            id: "TC-001".to_string(),
            title: "Upload a document".to_string(),
            description: None,
            priority: Priority::High,
            test_type: TestType::Smoke,
            status: TestStatus::InReview,
            preconditions: None,
            steps: vec![TestStep::new(1, "Open page", "Page loads")],
            expected_result: None,
            test_data: None,
            estimated_time: Some("5 mins".to_string()),
            automation_status: AutomationStatus::ToBeAutomated,
            component: None,
            tags: vec!["REQ-001".to_string()],
        };

        let value = serde_json::to_value(&case).unwrap();
        assert_eq!(value["type"], "Smoke");
        assert_eq!(value["status"], "In Review");
        assert_eq!(value["automation_status"], "To Be Automated");
        assert!(value["steps"][0].get("test_data").is_none());
    }

    #[test]
    fn test_context_render() {
        assert_eq!(GenerationContext::default().render(), None);

        let context = GenerationContext {
            app_link: Some("https://app.example.com".to_string()),
            diagram_links: vec!["a.png".to_string(), "b.png".to_string()],
            notes: Some("Use staging".to_string()),
            ..GenerationContext::default()
        };
        assert_eq!(
            context.render().unwrap(),
            "Application URL: https://app.example.com\nDiagrams: a.png, b.png\nNotes: Use staging"
        );
    }
}
