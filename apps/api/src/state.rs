use crate::llm_client::StructuredClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one provider handle, wrapped with validation and the retry budget.
    /// Built once at startup; handlers only borrow it.
    pub analyzer: StructuredClient,
}
