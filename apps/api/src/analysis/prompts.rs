// All LLM prompt templates for the analysis workflows.
// Reuses cross-cutting fragments from llm_client::prompts.
//
// Shared variables:
//   {payload_directive}   - llm_client::prompts::PAYLOAD_DIRECTIVE
//   {snake_case_directive} - llm_client::prompts::SNAKE_CASE_DIRECTIVE
//   {schema}              - field listing rendered from the response schema
//   {example}             - the response model's example, pretty-printed JSON

use crate::analysis::prompt::PromptTemplate;

/// Résumé vs. job description match analysis.
/// Replace: {cv_block}, {jd_block} plus the shared variables.
pub const MATCH_ANALYSIS_PROMPT: PromptTemplate = PromptTemplate {
    text: r#"# ROLE & GOAL
You are a senior IT recruitment expert with more than 15 years of experience. Critically compare a candidate's CV against a job description (JD) and produce a data-driven, actionable assessment.

{payload_directive}

# CONTEXT
CV_TEXT:
{cv_block}

JOB_DESCRIPTION_TEXT:
{jd_block}

# TASKS
1. Match score: rate technical skills, experience and soft skills from 0 to 100 each, derive a weighted 'overall_score' (0-100) and justify it in a short 'summary'.
2. Strengths: list the CV skills or experiences that most directly satisfy the JD's core requirements, each with a short 'evidence' quote from the CV.
3. Skill gaps: list skills the JD asks for that are absent or underdeveloped in the CV. Set 'importance' to exactly one of Critical, Important or Desirable (skills the JD mentions as familiarity or additional knowledge are Desirable) and explain the 'reason' using the JD.
4. Learning path: for the most significant gaps, give a concrete 'recommendation' (a course, book or project).
5. Executive summary: at most 150 words addressed to the candidate covering overall fit, main selling points and the most important area to improve.
6. Learning potential: judge how quickly the candidate could acquire the missing skills from career progression, breadth of technologies and evidence of continuous learning. Give a 'rating' of High, Medium or Low, a 'summary', and the CV 'evidence' behind it.

# MANDATORY OUTPUT FORMAT
Return one JSON object containing every section listed below.
{snake_case_directive}

Required fields:
{schema}
Example of the required structure (replace every value with your analysis):
{example}"#,
    variables: &[
        "payload_directive",
        "cv_block",
        "jd_block",
        "snake_case_directive",
        "schema",
        "example",
    ],
};

/// Applicant-tracking-system friendliness scan.
/// Replace: {cv_block} plus the shared variables.
pub const ATS_CHECK_PROMPT: PromptTemplate = PromptTemplate {
    text: r#"# ROLE & GOAL
You simulate an Applicant Tracking System (ATS) parser. Assess how machine-readable and keyword-optimised a CV is, and identify anything that could cause parsing errors or lower the candidate's ranking in automated screening.

{payload_directive}

# CONTEXT
CV_TEXT:
{cv_block}

# TASKS
1. Parsing risks: infer layout problems from the text (two-column layouts, tables, images or icons, text in headers or footers) that an ATS would likely misread.
2. Contact information: check that email, phone and LinkedIn are present near the top in a standard, parsable form.
3. Keywords and skills: check for a clear skills section using common industry keywords, and flag skills that appear only in prose.
4. Structure and headings: check for conventional headings such as "Work Experience", "Education" and "Skills".
5. Action verbs and quantification: check that achievements start with strong verbs and include measurable results.

Give an overall 'ats_score' from 0 to 100 and a 'summary'. Report each problem as an issue whose 'issue_type' is exactly one of Formatting, Keywords, Parsing Risk, Contact Info or Structure, with a 'description' and an actionable 'suggestion'. If a category passes, say so in the summary instead of inventing an issue.

# MANDATORY OUTPUT FORMAT
Return one JSON object.
{snake_case_directive}

Required fields:
{schema}
Example of the required structure (replace every value with your analysis):
{example}"#,
    variables: &[
        "payload_directive",
        "cv_block",
        "snake_case_directive",
        "schema",
        "example",
    ],
};

/// Job-description hybrid-role decomposition.
/// Replace: {jd_block} plus the shared variables.
pub const JD_PROFILE_PROMPT: PromptTemplate = PromptTemplate {
    text: r#"# ROLE & GOAL
You are a senior recruitment strategist and HR analyst with more than 20 years of experience in organisational design and job-market trends. Decide whether a single job description (JD) is really asking for a "unicorn": one person expected to cover several distinct professional roles. Your audience is the hiring manager.

{payload_directive}

# CONTEXT
JOB_DESCRIPTION_TEXT:
{jd_block}

# TASKS
1. Overall assessment: set 'is_hybrid_role' to true when the JD blends two or more distinct profiles, otherwise false, and state the 'primary_focus' of the position (for example "Backend development with DevOps responsibilities").
2. Profile breakdown: list every distinct profile in 'identified_profiles'. For each, give its 'profile_title' and 'key_responsibilities', and separate mandatory skills ('core_requirements') from skills described as nice to have, a plus, bonus or preferred ('desirable_skills').
3. Conflict summary: explain in 'conflict_summary' why the combination is hard to staff, highlighting the tensions between the profiles or the rarity of the combined skill set.
4. Hiring realism: estimate how likely it is to find one candidate who meets all core requirements at a high level, weighing the volume and diversity of desirable skills. Give a 'rating' of High, Medium or Low and a 'justification'.
5. Recommendations: concrete actions for the hiring manager, such as splitting the role, narrowing the JD to its core needs, or adjusting seniority and compensation.

# MANDATORY OUTPUT FORMAT
Return one JSON object.
{snake_case_directive}

Required fields:
{schema}
Example of the required structure (replace every value with your analysis):
{example}"#,
    variables: &[
        "payload_directive",
        "jd_block",
        "snake_case_directive",
        "schema",
        "example",
    ],
};
