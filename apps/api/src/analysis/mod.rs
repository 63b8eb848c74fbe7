// Analysis workflows: match scoring, ATS check, JD profile decomposition.
// Each workflow is a prompt builder paired with a response model; the
// orchestration below is shared. All LLM calls go through llm_client.

pub mod ats_check;
pub mod handlers;
pub mod jd_profile;
pub mod match_analysis;
pub mod prompt;
pub mod prompts;

use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::prompt::PromptTemplate;
use crate::errors::{AppError, ANALYSIS_UNAVAILABLE_MESSAGE};
use crate::llm_client::prompts::{PAYLOAD_DIRECTIVE, SNAKE_CASE_DIRECTIVE};
use crate::llm_client::StructuredClient;
use crate::schema::ResponseModel;

/// One analysis type: how to phrase the request and what shape to demand.
///
/// Adding an analysis means adding an implementor; orchestration, retries and
/// validation are shared through `run_workflow`.
pub trait Workflow {
    const NAME: &'static str;
    type Input: Sync;
    type Output: ResponseModel;

    /// What the caller is told when no valid result could be obtained.
    const UNAVAILABLE_MESSAGE: &'static str = ANALYSIS_UNAVAILABLE_MESSAGE;

    fn build_prompt(input: &Self::Input) -> String;

    /// Policy checks on an accepted result. Log-only; never rejects.
    fn review(_output: &Self::Output) {}
}

/// build prompt → structured completion → validated result.
///
/// Every failure past the boundary collapses into `AppError::AnalysisUnavailable`;
/// the underlying cause travels in the error for logging, not for the caller.
pub async fn run_workflow<W: Workflow>(
    client: &StructuredClient,
    input: &W::Input,
) -> Result<W::Output, AppError> {
    let analysis_id = Uuid::new_v4();
    let span = info_span!("analysis", workflow = W::NAME, %analysis_id);

    async move {
        let prompt = W::build_prompt(input);
        debug!(prompt_chars = prompt.chars().count(), "prompt built");

        let output = client
            .complete::<W::Output>(&prompt)
            .await
            .map_err(|e| {
                warn!(attempts = e.attempts(), "analysis failed");
                AppError::AnalysisUnavailable {
                    message: W::UNAVAILABLE_MESSAGE,
                    cause: format!("{}: {e}", W::NAME),
                }
            })?;

        W::review(&output);
        info!("analysis completed");
        Ok(output)
    }
    .instrument(span)
    .await
}

/// Renders `template` with the document blocks plus the shared directives,
/// the schema listing and the worked example of `T`.
pub fn render_prompt<T: ResponseModel>(
    template: &PromptTemplate,
    blocks: &[(&str, String)],
) -> String {
    let schema = T::schema().describe();
    let example = serde_json::to_string_pretty(&T::example()).unwrap_or_default();

    let mut values: Vec<(&str, &str)> = vec![
        ("payload_directive", PAYLOAD_DIRECTIVE),
        ("snake_case_directive", SNAKE_CASE_DIRECTIVE),
        ("schema", schema.as_str()),
        ("example", example.as_str()),
    ];
    values.extend(blocks.iter().map(|(name, block)| (*name, block.as_str())));

    template.render(&values)
}
