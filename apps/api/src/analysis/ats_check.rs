//! ATS check: scans one CV for applicant-tracking-system compatibility.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::prompt::fenced;
use crate::analysis::prompts::ATS_CHECK_PROMPT;
use crate::analysis::{render_prompt, Workflow};
use crate::errors::ATS_UNAVAILABLE_MESSAGE;
use crate::schema::{Field, ResponseModel, Schema, SCORE, TEXT};

#[derive(Debug, Clone, Deserialize)]
pub struct AtsCheckRequest {
    pub cv_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum IssueType {
    Formatting,
    Keywords,
    #[serde(rename = "Parsing Risk")]
    ParsingRisk,
    #[serde(rename = "Contact Info")]
    ContactInfo,
    Structure,
}

impl IssueType {
    pub const NAMES: &'static [&'static str] = &[
        "Formatting",
        "Keywords",
        "Parsing Risk",
        "Contact Info",
        "Structure",
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AtsIssue {
    pub issue_type: IssueType,
    pub description: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AtsCheckResult {
    pub ats_score: u8,
    pub summary: String,
    pub issues: Vec<AtsIssue>,
}

/// Top-level reply: `{"ats_check": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AtsCheckResponse {
    pub ats_check: AtsCheckResult,
}

const ISSUE_FIELDS: &[Field] = &[
    Field::required("issue_type", Schema::Enum(IssueType::NAMES), ""),
    Field::required("description", TEXT, "clear explanation of the potential problem"),
    Field::required("suggestion", TEXT, "actionable fix"),
];
const ISSUE: Schema = Schema::Object(ISSUE_FIELDS);

const ATS_RESULT_FIELDS: &[Field] = &[
    Field::required("ats_score", SCORE, "overall ATS compatibility"),
    Field::required("summary", TEXT, "how the CV performs against ATS standards"),
    Field::required("issues", Schema::Array(&ISSUE), "specific issues that could harm parsing"),
];

const ATS_CHECK_FIELDS: &[Field] = &[Field::required(
    "ats_check",
    Schema::Object(ATS_RESULT_FIELDS),
    "",
)];
const ATS_CHECK_SCHEMA: Schema = Schema::Object(ATS_CHECK_FIELDS);

impl ResponseModel for AtsCheckResponse {
    const NAME: &'static str = "ats_check";

    fn schema() -> &'static Schema {
        &ATS_CHECK_SCHEMA
    }

    fn example() -> Self {
        AtsCheckResponse {
            ats_check: AtsCheckResult {
                ats_score: 85,
                summary: "Standard headings and a clear skills list; achievements need numbers and the contact block is incomplete."
                    .to_string(),
                issues: vec![
                    AtsIssue {
                        issue_type: IssueType::ParsingRisk,
                        description: "The portfolio link appears to sit in a page header, which many parsers skip."
                            .to_string(),
                        suggestion: "Move links and contact details into the main body of the document."
                            .to_string(),
                    },
                    AtsIssue {
                        issue_type: IssueType::Keywords,
                        description: "Achievements at Acme Corp describe tasks but give no measurable results."
                            .to_string(),
                        suggestion: "Rewrite bullets with metrics, e.g. 'Shipped 3 features that lifted engagement by 15%'."
                            .to_string(),
                    },
                ],
            },
        }
    }
}

/// Wires the ATS prompt to the ATS response model.
pub struct AtsCheck;

impl Workflow for AtsCheck {
    const NAME: &'static str = "ats_check";
    type Input = AtsCheckRequest;
    type Output = AtsCheckResponse;
    const UNAVAILABLE_MESSAGE: &'static str = ATS_UNAVAILABLE_MESSAGE;

    fn build_prompt(input: &AtsCheckRequest) -> String {
        render_prompt::<AtsCheckResponse>(
            &ATS_CHECK_PROMPT,
            &[("cv_block", fenced("CV_TEXT", &input.cv_text))],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::drift_from_generated;
    use crate::llm_client::structured::decode_reply;
    use serde_json::json;

    #[test]
    fn test_declared_schema_matches_derived_json_schema() {
        let drift =
            drift_from_generated(AtsCheckResponse::schema(), &AtsCheckResponse::response_schema());
        assert!(drift.is_empty(), "schema drift: {drift:?}");
    }

    #[test]
    fn test_example_satisfies_its_own_schema() {
        let value = serde_json::to_value(AtsCheckResponse::example()).unwrap();
        assert_eq!(AtsCheckResponse::schema().validate(&value), Ok(()));
    }

    #[test]
    fn test_multi_word_categories_use_spaced_names() {
        assert_eq!(
            serde_json::to_value(IssueType::ParsingRisk).unwrap(),
            json!("Parsing Risk")
        );
        assert_eq!(
            serde_json::to_value(IssueType::ContactInfo).unwrap(),
            json!("Contact Info")
        );
        for variant in [
            IssueType::Formatting,
            IssueType::Keywords,
            IssueType::ParsingRisk,
            IssueType::ContactInfo,
            IssueType::Structure,
        ] {
            let name = serde_json::to_value(variant).unwrap();
            assert!(IssueType::NAMES.contains(&name.as_str().unwrap()));
        }
    }

    #[test]
    fn test_decodes_valid_reply_with_no_issues() {
        let reply = json!({
            "ats_check": {"ats_score": 100, "summary": "Passes every check.", "issues": []}
        })
        .to_string();
        let decoded: AtsCheckResponse = decode_reply(&reply).unwrap();
        assert_eq!(decoded.ats_check.ats_score, 100);
        assert!(decoded.ats_check.issues.is_empty());
    }

    #[test]
    fn test_decodes_score_sent_as_whole_float() {
        let reply = r#"{"ats_check":{"ats_score":80.0,"summary":"s","issues":[]}}"#;
        let decoded: AtsCheckResponse = decode_reply(reply).unwrap();
        assert_eq!(decoded.ats_check.ats_score, 80);
    }

    #[test]
    fn test_unknown_category_and_score_overflow_are_rejected() {
        let reply = json!({
            "ats_check": {
                "ats_score": 300,
                "summary": "s",
                "issues": [
                    {"issue_type": "Design", "description": "d", "suggestion": "s"},
                    {"issue_type": "ParsingRisk", "description": "d", "suggestion": "s"}
                ]
            }
        });
        let violations = AtsCheckResponse::schema().validate(&reply).unwrap_err();
        let paths: Vec<&str> = violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "ats_check.ats_score",
                "ats_check.issues[0].issue_type",
                "ats_check.issues[1].issue_type",
            ]
        );
    }

    #[test]
    fn test_prompt_embeds_cv_and_lists_categories() {
        let prompt = AtsCheck::build_prompt(&AtsCheckRequest {
            cv_text: "Jane Doe\njane@example.com\nSkills: Rust, SQL".to_string(),
        });
        assert!(prompt.contains("```CV_TEXT\nJane Doe\njane@example.com\nSkills: Rust, SQL\n```"));
        assert!(prompt.contains(
            "- issue_type (one of 'Formatting', 'Keywords', 'Parsing Risk', 'Contact Info', 'Structure', required)"
        ));
        assert!(prompt.contains("\"ats_check\": {"));
        assert!(!prompt.contains("{cv_block}"));
    }

    #[test]
    fn test_response_round_trips_field_for_field() {
        let original = AtsCheckResponse::example();
        let parsed: AtsCheckResponse =
            serde_json::from_str(&serde_json::to_string(&original).unwrap()).unwrap();
        assert_eq!(parsed, original);
    }
}
