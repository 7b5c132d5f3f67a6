//! Error types for evaluation, storage, and AI providers.
//!
//! `ProviderError` is defined here rather than in `promptgrade-providers` so
//! the orchestrator can log and absorb provider failures without knowing which
//! backend produced them.

use thiserror::Error;

/// Errors that can occur when asking an AI provider to grade a prompt.
///
/// None of these reach the caller of the orchestrator: every variant is
/// logged and treated as "AI evaluation unavailable".
#[derive(Debug, Error)]
pub enum ProviderError {
    /// AI evaluation is switched off in the host configuration.
    #[error("AI evaluation is disabled")]
    Disabled,

    /// No API credential is configured.
    #[error("no API credential configured")]
    MissingCredential,

    /// The configured provider name is not one this build knows.
    #[error("unknown AI provider: {0}")]
    UnknownProvider(String),

    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The provider answered but produced no text.
    #[error("provider returned an empty response")]
    EmptyResponse,

    /// The response text was not valid JSON.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The JSON parsed but does not match the expected grading schema.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl ProviderError {
    /// Returns `true` if the error comes from configuration rather than the remote call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ProviderError::Disabled
                | ProviderError::MissingCredential
                | ProviderError::UnknownProvider(_)
        )
    }
}

/// Errors raised by collaborator stores.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The user's stats changed between read and write.
    #[error("concurrent stats update for user {user_id}")]
    Conflict { user_id: String },

    /// Any other storage failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors surfaced to callers of the evaluation service.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("challenge not found: {0}")]
    ChallengeNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("attempt not found: {0}")]
    AttemptNotFound(String),

    #[error("invalid submission: {0}")]
    InvalidSubmission(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EvalError {
    /// Returns `true` for the lookup failures a caller should report as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EvalError::ChallengeNotFound(_)
                | EvalError::UserNotFound(_)
                | EvalError::AttemptNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_messages() {
        assert_eq!(
            ProviderError::RateLimited {
                retry_after_ms: 5000
            }
            .to_string(),
            "rate limited, retry after 5000ms"
        );
        assert!(ProviderError::Disabled.is_configuration());
        assert!(ProviderError::UnknownProvider("x".into()).is_configuration());
        assert!(!ProviderError::Timeout(30).is_configuration());
    }

    #[test]
    fn not_found_classification() {
        assert!(EvalError::ChallengeNotFound("c1".into()).is_not_found());
        assert!(EvalError::UserNotFound("u1".into()).is_not_found());
        assert!(!EvalError::Store(StoreError::Backend("boom".into())).is_not_found());
    }
}
