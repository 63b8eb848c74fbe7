//! Match analysis. Scores one CV against one job description.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::prompt::fenced;
use crate::analysis::prompts::MATCH_ANALYSIS_PROMPT;
use crate::analysis::{render_prompt, Workflow};
use crate::schema::{Field, ResponseModel, Schema, SCORE, TEXT, TEXT_LIST};

/// Longest executive summary the service will return.
pub const EXECUTIVE_SUMMARY_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub cv_text: String,
    pub jd_text: String,
}

/// How much a missing skill matters for the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Importance {
    Critical,
    Important,
    Desirable,
}

impl Importance {
    pub const NAMES: &'static [&'static str] = &["Critical", "Important", "Desirable"];
}

/// How quickly the candidate is expected to pick up new skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum LearningRating {
    High,
    Medium,
    Low,
}

impl LearningRating {
    pub const NAMES: &'static [&'static str] = &["High", "Medium", "Low"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreBreakdown {
    pub technical_skills: u8,
    pub experience: u8,
    pub soft_skills: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchScore {
    pub overall_score: u8,
    pub breakdown: ScoreBreakdown,
    pub summary: String,
}

/// A CV skill or experience that satisfies the JD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Strength {
    pub skill: String,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SkillGap {
    pub skill: String,
    pub importance: Importance,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LearningStep {
    pub skill_to_develop: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LearningPotential {
    pub rating: LearningRating,
    pub summary: String,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchAnalysisResult {
    pub match_score: MatchScore,
    pub strengths: Vec<Strength>,
    pub skill_gaps: Vec<SkillGap>,
    #[serde(default)]
    pub learning_path: Option<Vec<LearningStep>>,
    pub executive_summary: String,
    #[serde(default)]
    pub learning_potential: Option<LearningPotential>,
}

impl MatchAnalysisResult {
    pub fn gaps_with(&self, importance: Importance) -> impl Iterator<Item = &SkillGap> {
        self.skill_gaps
            .iter()
            .filter(move |gap| gap.importance == importance)
    }
}

/// Top-level reply: `{"analysis": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchAnalysisResponse {
    pub analysis: MatchAnalysisResult,
}

const BREAKDOWN_FIELDS: &[Field] = &[
    Field::required(
        "technical_skills",
        SCORE,
        "match on required technologies, frameworks and tools",
    ),
    Field::required(
        "experience",
        SCORE,
        "alignment of years of experience and responsibilities",
    ),
    Field::required(
        "soft_skills",
        SCORE,
        "match on communication, leadership and similar skills",
    ),
];

const MATCH_SCORE_FIELDS: &[Field] = &[
    Field::required("overall_score", SCORE, "final weighted match score"),
    Field::required("breakdown", Schema::Object(BREAKDOWN_FIELDS), ""),
    Field::required("summary", TEXT, "concise justification of the overall score"),
];

const STRENGTH_FIELDS: &[Field] = &[
    Field::required("skill", TEXT, "skill or experience from the CV that matches the JD"),
    Field::required("evidence", TEXT, "brief quote or reference from the CV"),
];
const STRENGTH: Schema = Schema::Object(STRENGTH_FIELDS);

const SKILL_GAP_FIELDS: &[Field] = &[
    Field::required("skill", TEXT, "skill required by the JD but missing from the CV"),
    Field::required("importance", Schema::Enum(Importance::NAMES), ""),
    Field::required("reason", TEXT, "why the JD makes this skill matter"),
];
const SKILL_GAP: Schema = Schema::Object(SKILL_GAP_FIELDS);

const LEARNING_STEP_FIELDS: &[Field] = &[
    Field::required("skill_to_develop", TEXT, ""),
    Field::required("recommendation", TEXT, "concrete course, book or project"),
];
const LEARNING_STEP: Schema = Schema::Object(LEARNING_STEP_FIELDS);

const LEARNING_POTENTIAL_FIELDS: &[Field] = &[
    Field::required("rating", Schema::Enum(LearningRating::NAMES), ""),
    Field::required("summary", TEXT, "justification based on CV evidence"),
    Field::required("evidence", TEXT_LIST, "specific CV examples supporting the rating"),
];

const ANALYSIS_FIELDS: &[Field] = &[
    Field::required("match_score", Schema::Object(MATCH_SCORE_FIELDS), ""),
    Field::required("strengths", Schema::Array(&STRENGTH), ""),
    Field::required("skill_gaps", Schema::Array(&SKILL_GAP), ""),
    Field::optional("learning_path", Schema::Array(&LEARNING_STEP), ""),
    Field::required(
        "executive_summary",
        Schema::String {
            max_len: Some(EXECUTIVE_SUMMARY_MAX_CHARS),
        },
        "summary for the candidate of their fit for the role",
    ),
    Field::optional(
        "learning_potential",
        Schema::Object(LEARNING_POTENTIAL_FIELDS),
        "",
    ),
];

const MATCH_ANALYSIS_FIELDS: &[Field] = &[Field::required(
    "analysis",
    Schema::Object(ANALYSIS_FIELDS),
    "",
)];
const MATCH_ANALYSIS_SCHEMA: Schema = Schema::Object(MATCH_ANALYSIS_FIELDS);

impl ResponseModel for MatchAnalysisResponse {
    const NAME: &'static str = "match_analysis";

    fn schema() -> &'static Schema {
        &MATCH_ANALYSIS_SCHEMA
    }

    fn example() -> Self {
        MatchAnalysisResponse {
            analysis: MatchAnalysisResult {
                match_score: MatchScore {
                    overall_score: 72,
                    breakdown: ScoreBreakdown {
                        technical_skills: 75,
                        experience: 70,
                        soft_skills: 68,
                    },
                    summary: "Solid backend match; container orchestration experience is thin."
                        .to_string(),
                },
                strengths: vec![Strength {
                    skill: "REST API development with Python".to_string(),
                    evidence: "Built and maintained 12 FastAPI microservices in production."
                        .to_string(),
                }],
                skill_gaps: vec![SkillGap {
                    skill: "Kubernetes".to_string(),
                    importance: Importance::Critical,
                    reason: "The JD lists running services on Kubernetes as a core duty."
                        .to_string(),
                }],
                learning_path: Some(vec![LearningStep {
                    skill_to_develop: "Kubernetes".to_string(),
                    recommendation: "Deploy a personal project to a managed cluster and work towards the CKAD certification."
                        .to_string(),
                }]),
                executive_summary: "You are a strong fit on backend fundamentals. Closing the Kubernetes gap would make you an ideal candidate."
                    .to_string(),
                learning_potential: Some(LearningPotential {
                    rating: LearningRating::High,
                    summary: "A track record of adopting new stacks suggests the missing skills can be learned quickly."
                        .to_string(),
                    evidence: vec![
                        "Migrated a legacy service from Java to Go.".to_string(),
                        "Holds both AWS and GCP certifications.".to_string(),
                    ],
                }),
            },
        }
    }
}

/// Wires the match prompt to the match response model.
pub struct MatchAnalysis;

impl Workflow for MatchAnalysis {
    const NAME: &'static str = "match_analysis";
    type Input = AnalysisRequest;
    type Output = MatchAnalysisResponse;

    fn build_prompt(input: &AnalysisRequest) -> String {
        render_prompt::<MatchAnalysisResponse>(
            &MATCH_ANALYSIS_PROMPT,
            &[
                ("cv_block", fenced("CV_TEXT", &input.cv_text)),
                ("jd_block", fenced("JOB_DESCRIPTION_TEXT", &input.jd_text)),
            ],
        )
    }

    fn review(output: &MatchAnalysisResponse) {
        let analysis = &output.analysis;
        debug!(
            overall_score = analysis.match_score.overall_score,
            critical_gaps = analysis.gaps_with(Importance::Critical).count(),
            strengths = analysis.strengths.len(),
            "match analysis scored"
        );
    }
}
