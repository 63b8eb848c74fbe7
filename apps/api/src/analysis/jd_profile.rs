//! JD profile analysis: decides whether a job description is a hybrid
//! ("unicorn") role and breaks it down into the profiles it combines.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analysis::prompt::fenced;
use crate::analysis::prompts::JD_PROFILE_PROMPT;
use crate::analysis::{render_prompt, Workflow};
use crate::schema::{Field, ResponseModel, Schema, TEXT, TEXT_LIST};

#[derive(Debug, Clone, Deserialize)]
pub struct JdAnalysisRequest {
    pub jd_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IdentifiedProfile {
    pub profile_title: String,
    pub key_responsibilities: Vec<String>,
    pub core_requirements: Vec<String>,
    pub desirable_skills: Vec<String>,
}

/// How likely a single candidate can be found. The rating is free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HiringRealism {
    pub rating: String,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JdAnalysisResult {
    pub is_hybrid_role: bool,
    pub primary_focus: String,
    pub identified_profiles: Vec<IdentifiedProfile>,
    pub conflict_summary: String,
    pub hiring_realism: HiringRealism,
    pub recommendations: Vec<String>,
}

/// Top-level reply: `{"jd_analysis": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JdAnalysisResponse {
    pub jd_analysis: JdAnalysisResult,
}

const PROFILE_FIELDS: &[Field] = &[
    Field::required("profile_title", TEXT, "e.g. 'Data Scientist'"),
    Field::required("key_responsibilities", TEXT_LIST, ""),
    Field::required("core_requirements", TEXT_LIST, "mandatory skills"),
    Field::required(
        "desirable_skills",
        TEXT_LIST,
        "skills described as nice to have, preferred or bonus",
    ),
];
const PROFILE: Schema = Schema::Object(PROFILE_FIELDS);

const HIRING_REALISM_FIELDS: &[Field] = &[
    Field::required("rating", TEXT, "'High', 'Medium' or 'Low'"),
    Field::required("justification", TEXT, "reasoning based on market reality"),
];

const JD_RESULT_FIELDS: &[Field] = &[
    Field::required(
        "is_hybrid_role",
        Schema::Boolean,
        "true if the JD combines multiple distinct roles",
    ),
    Field::required("primary_focus", TEXT, "main functional area of the job"),
    Field::required("identified_profiles", Schema::Array(&PROFILE), ""),
    Field::required(
        "conflict_summary",
        TEXT,
        "why the combination of profiles is challenging",
    ),
    Field::required("hiring_realism", Schema::Object(HIRING_REALISM_FIELDS), ""),
    Field::required("recommendations", TEXT_LIST, "actions for the hiring manager"),
];

const JD_ANALYSIS_FIELDS: &[Field] = &[Field::required(
    "jd_analysis",
    Schema::Object(JD_RESULT_FIELDS),
    "",
)];
const JD_ANALYSIS_SCHEMA: Schema = Schema::Object(JD_ANALYSIS_FIELDS);

impl ResponseModel for JdAnalysisResponse {
    const NAME: &'static str = "jd_analysis";

    fn schema() -> &'static Schema {
        &JD_ANALYSIS_SCHEMA
    }

    fn example() -> Self {
        JdAnalysisResponse {
            jd_analysis: JdAnalysisResult {
                is_hybrid_role: true,
                primary_focus: "Senior backend development with data science expectations"
                    .to_string(),
                identified_profiles: vec![
                    IdentifiedProfile {
                        profile_title: "Backend Developer".to_string(),
                        key_responsibilities: strings(&[
                            "Develop and maintain microservices.",
                            "Optimise application performance and database queries.",
                        ]),
                        core_requirements: strings(&["Python", "FastAPI or Django", "PostgreSQL", "Docker"]),
                        desirable_skills: strings(&["Kubernetes", "React"]),
                    },
                    IdentifiedProfile {
                        profile_title: "Data Scientist (implied by desirable skills)".to_string(),
                        key_responsibilities: strings(&[
                            "Analyse user data to generate insights.",
                            "Build predictive models.",
                        ]),
                        core_requirements: strings(&["Complex SQL queries"]),
                        desirable_skills: strings(&["Pandas", "Scikit-learn", "ML pipelines"]),
                    },
                ],
                conflict_summary: "The core role is backend development, but the nice-to-have list describes a separate data science career track."
                    .to_string(),
                hiring_realism: HiringRealism {
                    rating: "Low".to_string(),
                    justification: "Senior backend engineers are available; those who also bring production machine learning are rare and expensive."
                        .to_string(),
                },
                recommendations: strings(&[
                    "Drop the data science nice-to-haves to widen the backend candidate pool.",
                    "If data science matters, open a separate part-time analyst role.",
                ]),
            },
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Wires the JD prompt to the JD response model.
pub struct JdProfileAnalysis;

impl Workflow for JdProfileAnalysis {
    const NAME: &'static str = "jd_profile_analysis";
    type Input = JdAnalysisRequest;
    type Output = JdAnalysisResponse;

    fn build_prompt(input: &JdAnalysisRequest) -> String {
        render_prompt::<JdAnalysisResponse>(
            &JD_PROFILE_PROMPT,
            &[("jd_block", fenced("JOB_DESCRIPTION_TEXT", &input.jd_text))],
        )
    }

    fn review(output: &JdAnalysisResponse) {
        let analysis = &output.jd_analysis;
        if analysis.is_hybrid_role && analysis.identified_profiles.is_empty() {
            warn!("hybrid role reported without any identified profiles");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::drift_from_generated;
    use crate::analysis::run_workflow;
    use crate::llm_client::testing::{Scripted, ScriptedProvider};
    use crate::llm_client::{RetryPolicy, StructuredClient};
    use serde_json::json;

    const HYBRID_JD: &str = "Senior Backend Engineer. You will design APIs and own our Go services. \
        Required: Go, PostgreSQL. Nice to have: Kubernetes, Data Science, Machine Learning.";

    fn hybrid_reply() -> String {
        json!({
            "jd_analysis": {
                "is_hybrid_role": true,
                "primary_focus": "Backend engineering",
                "identified_profiles": [
                    {
                        "profile_title": "Backend Engineer",
                        "key_responsibilities": ["Design APIs"],
                        "core_requirements": ["Go", "PostgreSQL"],
                        "desirable_skills": ["Kubernetes"]
                    },
                    {
                        "profile_title": "Data Scientist",
                        "key_responsibilities": ["Build ML models"],
                        "core_requirements": [],
                        "desirable_skills": ["Data Science", "Machine Learning"]
                    }
                ],
                "conflict_summary": "Two career tracks in one role.",
                "hiring_realism": {"rating": "Medium", "justification": "Rare but possible."},
                "recommendations": ["Split the role."]
            }
        })
        .to_string()
    }

    #[test]
    fn test_declared_schema_matches_derived_json_schema() {
        let drift =
            drift_from_generated(JdAnalysisResponse::schema(), &JdAnalysisResponse::response_schema());
        assert!(drift.is_empty(), "schema drift: {drift:?}");
    }

    #[test]
    fn test_example_satisfies_its_own_schema() {
        let value = serde_json::to_value(JdAnalysisResponse::example()).unwrap();
        assert_eq!(JdAnalysisResponse::schema().validate(&value), Ok(()));
    }

    #[test]
    fn test_response_round_trips_field_for_field() {
        let original = JdAnalysisResponse::example();
        let parsed: JdAnalysisResponse =
            serde_json::from_str(&serde_json::to_string(&original).unwrap()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_hybrid_flag_must_be_boolean_and_profiles_complete() {
        let reply = json!({
            "jd_analysis": {
                "is_hybrid_role": "yes",
                "primary_focus": "Backend",
                "identified_profiles": [{"profile_title": "Backend Engineer"}],
                "conflict_summary": "",
                "hiring_realism": {"rating": "Low"},
                "recommendations": []
            }
        });
        let violations = JdAnalysisResponse::schema().validate(&reply).unwrap_err();
        let paths: Vec<&str> = violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "jd_analysis.is_hybrid_role",
                "jd_analysis.identified_profiles[0].key_responsibilities",
                "jd_analysis.identified_profiles[0].core_requirements",
                "jd_analysis.identified_profiles[0].desirable_skills",
                "jd_analysis.hiring_realism.justification",
            ]
        );
    }

    #[test]
    fn test_hybrid_without_profiles_is_still_accepted() {
        let reply = json!({
            "jd_analysis": {
                "is_hybrid_role": true,
                "primary_focus": "Unclear",
                "identified_profiles": [],
                "conflict_summary": "",
                "hiring_realism": {"rating": "Low", "justification": "j"},
                "recommendations": []
            }
        });
        assert!(JdAnalysisResponse::schema().validate(&reply).is_ok());
    }

    #[test]
    fn test_prompt_embeds_jd_verbatim() {
        let prompt = JdProfileAnalysis::build_prompt(&JdAnalysisRequest {
            jd_text: HYBRID_JD.to_string(),
        });
        assert!(prompt.contains(&format!("```JOB_DESCRIPTION_TEXT\n{HYBRID_JD}\n```")));
        assert!(prompt.contains("- is_hybrid_role (boolean, required)"));
        assert!(prompt.contains("\"profile_title\": \"Backend Developer\""));
    }

    #[tokio::test]
    async fn test_hybrid_role_scenario() {
        let provider = ScriptedProvider::new(vec![Scripted::reply(hybrid_reply())]);
        let client = StructuredClient::new(provider.clone(), RetryPolicy::default());

        let response = run_workflow::<JdProfileAnalysis>(
            &client,
            &JdAnalysisRequest {
                jd_text: HYBRID_JD.to_string(),
            },
        )
        .await
        .unwrap();

        assert!(response.jd_analysis.is_hybrid_role);
        assert!(response.jd_analysis.identified_profiles.len() >= 2);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_then_valid_reply_recovers() {
        let provider = ScriptedProvider::new(vec![
            Scripted::reply("Sure! Here is the analysis you asked for."),
            Scripted::reply(format!("```json\n{}\n```", hybrid_reply())),
        ]);
        let client = StructuredClient::new(provider.clone(), RetryPolicy::default());

        let response = run_workflow::<JdProfileAnalysis>(
            &client,
            &JdAnalysisRequest {
                jd_text: HYBRID_JD.to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(response.jd_analysis.identified_profiles.len(), 2);
        assert_eq!(provider.calls(), 2);
    }
}
