//! Structured completion: the only path by which model output reaches a
//! workflow. Each attempt is bounded by a timeout; every reply is decoded and
//! checked against the response model's schema before it is returned.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::llm_client::prompts::{corrective_instruction, JSON_ONLY_SYSTEM};
use crate::llm_client::{
    strip_json_fences, ChatMessage, CompletionProvider, CompletionRequest, LlmError,
};
use crate::schema::{ResponseModel, ValidationError};

/// What a retry sends after a rejected reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryFeedback {
    /// Append the rejected reply and a follow-up quoting the validation error.
    Corrective,
    /// Resend the original conversation unchanged.
    Identical,
}

impl FromStr for RetryFeedback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "corrective" => Ok(RetryFeedback::Corrective),
            "identical" => Ok(RetryFeedback::Identical),
            other => Err(format!(
                "unknown retry feedback mode '{other}' (expected 'corrective' or 'identical')"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts allowed after the first.
    pub max_retries: u32,
    pub attempt_timeout: Duration,
    pub feedback: RetryFeedback,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            attempt_timeout: Duration::from_secs(60),
            feedback: RetryFeedback::Corrective,
        }
    }
}

/// Why a single attempt produced no usable value.
#[derive(Debug, Error)]
pub enum AttemptFailure {
    #[error("provider call failed: {0}")]
    Transport(#[source] LlmError),

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid model output: {0}")]
    Validation(#[source] ValidationError),
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no valid {model} reply after {attempts} attempt(s); last failure: {last}")]
    Exhausted {
        model: &'static str,
        attempts: u32,
        #[source]
        last: AttemptFailure,
    },

    #[error("provider rejected the request after {attempts} attempt(s): {source}")]
    Rejected {
        attempts: u32,
        #[source]
        source: LlmError,
    },
}

impl CompletionError {
    /// Number of provider invocations made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            CompletionError::Exhausted { attempts, .. }
            | CompletionError::Rejected { attempts, .. } => *attempts,
        }
    }
}

/// Wraps a `CompletionProvider` with schema validation and a bounded retry
/// budget. Cheap to clone; every clone shares the same provider.
#[derive(Clone)]
pub struct StructuredClient {
    provider: Arc<dyn CompletionProvider>,
    policy: RetryPolicy,
}

impl StructuredClient {
    pub fn new(provider: Arc<dyn CompletionProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sends `prompt` and returns a reply that satisfies `T`'s schema.
    ///
    /// Validation failures, transport failures and timeouts all consume the
    /// same budget: at most `max_retries + 1` provider calls are made, one at a
    /// time. Non-retryable provider errors end the loop immediately.
    pub async fn complete<T: ResponseModel>(&self, prompt: &str) -> Result<T, CompletionError> {
        let budget = self.policy.max_retries.saturating_add(1);
        let response_schema = T::response_schema();
        let mut conversation = vec![ChatMessage::user(prompt)];
        let mut attempt = 0;

        loop {
            attempt += 1;

            let outcome = {
                let request = CompletionRequest {
                    system: JSON_ONLY_SYSTEM,
                    messages: &conversation,
                    schema_name: T::NAME,
                    schema: &response_schema,
                };
                timeout(self.policy.attempt_timeout, self.provider.complete(request)).await
            };

            let failure = match outcome {
                Err(_) => AttemptFailure::Timeout(self.policy.attempt_timeout),
                Ok(Err(e)) if !e.is_retryable() => {
                    return Err(CompletionError::Rejected {
                        attempts: attempt,
                        source: e,
                    });
                }
                Ok(Err(e)) => AttemptFailure::Transport(e),
                Ok(Ok(raw)) => match decode_reply::<T>(&raw) {
                    Ok(value) => {
                        if attempt > 1 {
                            info!(model = T::NAME, attempt, "valid reply after retry");
                        }
                        return Ok(value);
                    }
                    Err(err) => {
                        if self.policy.feedback == RetryFeedback::Corrective {
                            let follow_up = corrective_instruction(&err);
                            conversation.push(ChatMessage::assistant(raw));
                            conversation.push(ChatMessage::user(follow_up));
                        }
                        AttemptFailure::Validation(err)
                    }
                },
            };

            if attempt >= budget {
                return Err(CompletionError::Exhausted {
                    model: T::NAME,
                    attempts: attempt,
                    last: failure,
                });
            }

            warn!(
                model = T::NAME,
                attempt,
                budget,
                error = %failure,
                "structured completion attempt failed, retrying"
            );
        }
    }
}

/// Decodes raw model text into `T`: strip fences, parse JSON, validate the
/// whole document against the schema, then deserialize.
pub fn decode_reply<T: ResponseModel>(raw: &str) -> Result<T, ValidationError> {
    let mut value: serde_json::Value =
        serde_json::from_str(strip_json_fences(raw)).map_err(ValidationError::Syntax)?;
    let schema = T::schema();
    schema.validate(&value).map_err(ValidationError::Schema)?;
    schema.normalize(&mut value);
    serde_json::from_value(value).map_err(ValidationError::Shape)
}
