//! Axum route handlers for the Analysis API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::analysis::ats_check::{AtsCheck, AtsCheckRequest, AtsCheckResponse};
use crate::analysis::jd_profile::{JdAnalysisRequest, JdAnalysisResponse, JdProfileAnalysis};
use crate::analysis::match_analysis::{AnalysisRequest, MatchAnalysis, MatchAnalysisResponse};
use crate::analysis::run_workflow;
use crate::errors::AppError;
use crate::state::AppState;

/// Rejects blank input before it reaches the provider.
fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// POST /analyze
///
/// Scores a CV against a job description.
pub async fn handle_match_analysis(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<MatchAnalysisResponse>, AppError> {
    let Json(request) = payload?;
    require_text("cv_text", &request.cv_text)?;
    require_text("jd_text", &request.jd_text)?;

    let response = run_workflow::<MatchAnalysis>(&state.analyzer, &request).await?;
    Ok(Json(response))
}

/// POST /analyze-jd
///
/// Breaks a job description down into the professional profiles it combines.
pub async fn handle_jd_analysis(
    State(state): State<AppState>,
    payload: Result<Json<JdAnalysisRequest>, JsonRejection>,
) -> Result<Json<JdAnalysisResponse>, AppError> {
    let Json(request) = payload?;
    require_text("jd_text", &request.jd_text)?;

    let response = run_workflow::<JdProfileAnalysis>(&state.analyzer, &request).await?;
    Ok(Json(response))
}

/// POST /check-ats
///
/// Scans a CV for applicant-tracking-system compatibility.
pub async fn handle_ats_check(
    State(state): State<AppState>,
    payload: Result<Json<AtsCheckRequest>, JsonRejection>,
) -> Result<Json<AtsCheckResponse>, AppError> {
    let Json(request) = payload?;
    require_text("cv_text", &request.cv_text)?;

    let response = run_workflow::<AtsCheck>(&state.analyzer, &request).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_rejects_blank_values() {
        assert!(require_text("cv_text", "Rust engineer").is_ok());
        for blank in ["", "   ", "\n\t"] {
            match require_text("cv_text", blank) {
                Err(AppError::Validation(msg)) => assert_eq!(msg, "cv_text cannot be empty"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }
}
