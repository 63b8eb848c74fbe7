use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Messages returned for provider-side failures. The cause is logged,
/// never sent to the caller.
pub const ANALYSIS_UNAVAILABLE_MESSAGE: &str = "Failed to get a valid analysis from the AI model.";
pub const ATS_UNAVAILABLE_MESSAGE: &str = "Failed to get a valid ATS analysis from the AI model.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analysis unavailable: {cause}")]
    AnalysisUnavailable {
        /// Caller-facing text, fixed per workflow.
        message: &'static str,
        cause: String,
    },
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::AnalysisUnavailable { message, cause } => {
                tracing::error!("Analysis unavailable: {cause}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ANALYSIS_UNAVAILABLE",
                    message.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_is_bad_request_with_detail() {
        let (status, body) = render(AppError::Validation("cv_text cannot be empty".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "cv_text cannot be empty");
    }

    #[tokio::test]
    async fn test_analysis_unavailable_hides_the_cause() {
        let (status, body) = render(AppError::AnalysisUnavailable {
            message: ANALYSIS_UNAVAILABLE_MESSAGE,
            cause: "match_analysis: provider rejected the request: API error (status 401): bad key"
                .into(),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "ANALYSIS_UNAVAILABLE");
        assert_eq!(body["error"]["message"], ANALYSIS_UNAVAILABLE_MESSAGE);
        assert!(!body.to_string().contains("bad key"));
    }

    #[tokio::test]
    async fn test_analysis_unavailable_uses_the_given_message() {
        let (_, body) = render(AppError::AnalysisUnavailable {
            message: ATS_UNAVAILABLE_MESSAGE,
            cause: "ats_check: timed out".into(),
        })
        .await;
        assert_eq!(
            body["error"]["message"],
            "Failed to get a valid ATS analysis from the AI model."
        );
    }
}
