//! Role instructions and prompt templates
//!
//! Prompts are rendered against [`PipelineState`](super::PipelineState);
//! `{key}` placeholders name state keys.

/// State key holding the source document
pub const DOCUMENT_KEY: &str = "document";
/// State key holding the requirement list as `- REQ-001: ...` lines
pub const REQUIREMENTS_KEY: &str = "requirements";
/// State key holding rendered context (links, notes)
pub const CONTEXT_KEY: &str = "context";
/// State key holding the rendered template description
pub const TEMPLATE_KEY: &str = "template";
/// State key holding human feedback for a refinement request
pub const HUMAN_FEEDBACK_KEY: &str = "human_feedback";
/// State key holding the optional human-feedback block of test-case prompts
pub const FEEDBACK_SECTION_KEY: &str = "feedback_section";

pub const REQUIREMENT_EXTRACTOR_INSTRUCTION: &str = r#"You are a Senior Business Analyst specializing in requirements engineering.

Analyze the document in the user message and extract TESTABLE functional requirements.

Rules:
1. Each requirement must be a complete, testable statement.
2. Use the "The system shall..." form consistently.
3. Be specific and measurable; include acceptance criteria where possible.
4. No code snippets, file paths, directory structures or implementation details.
5. No markdown formatting inside requirement text.
6. Each requirement must describe a verifiable behavior or capability.
7. Combine closely related items into one requirement.

Return ONLY a JSON array:
[
  {"id": "REQ-001", "text": "The system shall allow users to upload requirement documents in .md and .docx formats."},
  {"id": "REQ-002", "text": "The system shall parse uploaded documents and extract testable requirements."}
]

Extract 5-15 high-quality requirements. Output the JSON array and nothing else."#;

pub const REQUIREMENT_EXTRACTOR_PROMPT: &str = "Please extract testable requirements from this document:

---DOCUMENT START---
{document}
---DOCUMENT END---

Focus on the features and functionality it describes.";

pub const REQUIREMENT_REVIEWER_INSTRUCTION: &str = r#"You are a Quality Assurance Lead reviewing software requirements for testability.

Checklist:
1. Is every requirement testable and verifiable by a specific test case?
2. Is every requirement written as "The system shall..."?
3. Are any requirements vague or ambiguous?
4. Do any contain code, file paths or implementation details? These must be removed.
5. Is each requirement specific enough to write acceptance criteria for?
6. Is each requirement atomic (one behavior)?

If ALL requirements pass, respond with exactly: APPROVED
Otherwise respond with a 1-3 sentence critique of what must improve. Be strict but fair."#;

pub const REQUIREMENT_REVIEW_PROMPT: &str = "Current requirements to review:
```
{current_items}
```";

pub const REQUIREMENT_REFINER_INSTRUCTION: &str = r#"You are a Business Analyst refining requirements after review.

Apply every point of the reviewer's feedback to the current requirements.
Keep the same JSON array format ({"id": ..., "text": ...}) and output ONLY the refined array, with no explanation."#;

pub const REQUIREMENT_REFINE_PROMPT: &str = "Current requirements:
```
{current_items}
```

Reviewer feedback:
{review_feedback}";

pub const FEEDBACK_REFINER_INSTRUCTION: &str = r#"You are a Senior Business Analyst revising requirements based on human feedback.

Rules:
1. Apply ALL feedback points.
2. Keep requirements in "The system shall..." form.
3. Add requirements when the feedback asks for them.
4. Remove or merge requirements when the feedback suggests it.
5. Keep every requirement testable and specific.
6. Keep REQ-XXX numbering, renumbering when needed.

Return ONLY a JSON array:
[
  {"id": "REQ-001", "text": "The system shall..."}
]"#;

pub const FEEDBACK_REFINE_PROMPT: &str = "Existing requirements:
```json
{current_items}
```

Human feedback to implement:
{human_feedback}

Refine the requirements according to this feedback.";

pub const TEST_CASE_GENERATOR_INSTRUCTION: &str = r#"You are a Senior QA Engineer designing test cases to JIRA/Xray/TestRail conventions.

Rules:
1. Every test case must trace to at least one requirement; put the requirement IDs in tags.
2. Test cases are atomic: one behavior per case.
3. Steps are clear and actionable, each with a specific expected result.
4. Include test data where needed.
5. Cover positive, negative and edge cases where applicable.
6. Assign priority by business impact and the correct type.
7. Estimate execution time realistically.

Return ONLY a JSON object:
{
  "test_cases": [
    {
      "id": "TC-001",
      "title": "Verify user can upload a .docx requirements file",
      "description": "Validates that Word documents are accepted for requirement extraction",
      "priority": "High",
      "type": "Functional",
      "status": "Draft",
      "preconditions": "User is on the Upload page",
      "steps": [
        {"step": 1, "action": "Click 'Choose File'", "expected": "File picker opens", "test_data": null},
        {"step": 2, "action": "Select test_requirements.docx", "expected": "File name is shown", "test_data": "test_requirements.docx"}
      ],
      "expected_result": "Requirements are extracted and listed",
      "test_data": "A .docx file with 5 requirement statements",
      "estimated_time": "5 mins",
      "automation_status": "To Be Automated",
      "component": "Upload Module",
      "tags": ["REQ-001", "upload", "smoke"]
    }
  ]
}

Field values:
- priority: Critical, High, Medium, Low
- type: Functional, Integration, E2E, Regression, Smoke, Security, Performance, Usability
- status: always "Draft" for new test cases
- estimated_time: "2 mins", "5 mins", "10 mins", "15 mins", "30 mins"
- automation_status: Manual, To Be Automated, Automated

Generate 1-3 test cases per requirement. Output the JSON and nothing else."#;

pub const TEST_CASE_GENERATOR_PROMPT: &str = "{feedback_section}Requirements to test:
{requirements}

Context:
{context}

Template configuration:
{template}";

pub const TEST_CASE_VALIDATOR_INSTRUCTION: &str = r#"You are a QA Lead reviewing test cases for quality and completeness.

Checklist:
1. Clear, descriptive title?
2. Meaningful description of what is tested?
3. Specific, complete preconditions?
4. Steps clear, actionable and numbered correctly?
5. Every step has a specific expected result (not "works correctly")?
6. Test data given where needed?
7. Every case traceable to a requirement through its tags?
8. Priority and type assigned sensibly?
9. Realistic estimated_time?
10. Enough cases to cover the requirements?
11. Valid JSON with ALL fields present?

If ALL test cases pass, respond with exactly: APPROVED
Otherwise respond with a 2-4 sentence critique of what must improve."#;

pub const TEST_CASE_VALIDATION_PROMPT: &str = "{feedback_section}Test cases to review:
```
{current_items}
```

Original requirements:
{requirements}";

pub const TEST_CASE_REFINER_INSTRUCTION: &str = r#"You are a QA Engineer refining test cases after validation.

Apply every point of the validator's feedback. Output ONLY the refined JSON object in the same {"test_cases": [...]} format, keeping ALL fields: id, title, description, priority, type, status, preconditions, steps, expected_result, test_data, estimated_time, automation_status, component, tags."#;

pub const TEST_CASE_REFINE_PROMPT: &str = "Current test cases:
```
{current_items}
```

Validator feedback:
{review_feedback}";

/// Human-feedback block prepended to test-case prompts
pub fn feedback_section(feedback: Option<&str>) -> String {
    match feedback.map(str::trim).filter(|f| !f.is_empty()) {
        Some(feedback) => format!(
            "IMPORTANT - human feedback to address:\n{feedback}\n\nYou MUST address every point of this feedback.\n\n"
        ),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::APPROVAL_TOKEN;

    #[test]
    fn test_reviewers_ask_for_the_approval_token() {
        assert!(REQUIREMENT_REVIEWER_INSTRUCTION.contains(&format!("exactly: {APPROVAL_TOKEN}")));
        assert!(TEST_CASE_VALIDATOR_INSTRUCTION.contains(&format!("exactly: {APPROVAL_TOKEN}")));
    }

    #[test]
    fn test_feedback_section() {
        assert_eq!(feedback_section(None), "");
        assert_eq!(feedback_section(Some("   ")), "");
        assert!(feedback_section(Some("Add negative cases")).contains("Add negative cases"));
    }
}
