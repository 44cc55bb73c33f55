//! LLM error handling.

use thiserror::Error;

/// Errors raised by LLM clients and the explainer.
#[derive(Error, Debug)]
pub enum LlmError {
    /// No API key was found for the selected provider.
    #[error("No API key found for {provider}. Set one of: {variables}")]
    ApiKeyNotFound {
        /// Provider display name.
        provider: String,
        /// Environment variables that were checked.
        variables: String,
    },

    /// The API answered with a non-success status.
    #[error("LLM API request failed: {0}")]
    ApiRequestFailed(String),

    /// The API answer could not be decoded.
    #[error("Invalid response format from LLM API: {0}")]
    InvalidResponseFormat(String),

    /// The API answered with no text.
    #[error("LLM API returned an empty response")]
    EmptyResponse,

    /// The request could not be sent.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The request did not finish within the configured timeout.
    #[error("LLM request timed out after {0} seconds")]
    Timeout(u64),

    /// No LLM client is configured.
    #[error("No LLM provider configured")]
    Unavailable,
}
