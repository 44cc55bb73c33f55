//! AI client trait and shared HTTP helpers.

pub mod claude;
pub mod gemini;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::llm::error::LlmError;

/// Upper bound for a single HTTP exchange, independent of the caller's timeout.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Maximum tokens requested per response.
pub(crate) const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Metadata about an AI client implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AiClientMetadata {
    /// Service provider name.
    pub provider: String,
    /// Model identifier.
    pub model: String,
}

/// Trait for AI service clients.
pub trait AiClient: Send + Sync {
    /// Sends a request to the AI service and returns the raw text response.
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Returns metadata about the AI client implementation.
    fn get_metadata(&self) -> AiClientMetadata;
}

/// Builds an HTTP client with the standard request timeout.
pub(crate) fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Returns the response unchanged on success, or an [`LlmError::ApiRequestFailed`]
/// carrying the status and body.
pub(crate) async fn check_error_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().await.unwrap_or_else(|e| {
        tracing::debug!("Failed to read error response body: {e}");
        String::new()
    });
    Err(LlmError::ApiRequestFailed(format!("HTTP {status}: {error_text}")).into())
}

/// Rejects blank model output.
pub(crate) fn non_empty(text: String) -> Result<String> {
    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse.into());
    }
    Ok(text)
}
