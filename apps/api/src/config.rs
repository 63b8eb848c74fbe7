use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, ensure, Context, Result};

use crate::llm_client::{RetryFeedback, RetryPolicy, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Upper bound on `LLM_MAX_RETRIES`; each retry is a paid provider call.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_max_retries: u32,
    pub llm_timeout_secs: u64,
    pub llm_retry_feedback: RetryFeedback,
    pub max_body_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            llm_base_url: optional_env("LLM_BASE_URL", DEFAULT_BASE_URL.to_string())?,
            llm_model: optional_env("LLM_MODEL", DEFAULT_MODEL.to_string())?,
            llm_max_retries: bounded_retries(optional_env("LLM_MAX_RETRIES", 2)?)
                .context("LLM_MAX_RETRIES is out of range")?,
            llm_timeout_secs: optional_env("LLM_TIMEOUT_SECS", 60)?,
            llm_retry_feedback: optional_env("LLM_RETRY_FEEDBACK", RetryFeedback::Corrective)?,
            max_body_bytes: optional_env("MAX_BODY_BYTES", 1024 * 1024)?,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.llm_max_retries,
            attempt_timeout: self.llm_timeout(),
            feedback: self.llm_retry_feedback,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    parse_var(key, std::env::var(key).ok(), default)
}

fn parse_var<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{key} has an invalid value '{raw}': {e}")),
    }
}

fn bounded_retries(retries: u32) -> Result<u32> {
    ensure!(
        retries <= MAX_RETRIES_LIMIT,
        "at most {MAX_RETRIES_LIMIT} retries are allowed, got {retries}"
    );
    Ok(retries)
}
