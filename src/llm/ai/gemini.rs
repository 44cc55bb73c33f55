//! Gemini API client implementation.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{AiClient, AiClientMetadata};
use crate::llm::error::LlmError;

/// Default Generative Language API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: SystemInstruction,
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// Gemini API client implementation.
pub struct GeminiAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiAiClient {
    /// Creates a new Gemini AI client.
    pub fn new(model: String, api_key: String) -> Result<Self> {
        Ok(Self {
            client: super::build_http_client()?,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Points the client at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

impl AiClient for GeminiAiClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            debug!(
                system_prompt_len = system_prompt.len(),
                user_prompt_len = user_prompt.len(),
                model = %self.model,
                "Preparing Gemini API request"
            );

            let request = GeminiRequest {
                system_instruction: SystemInstruction {
                    parts: vec![Part {
                        text: system_prompt.to_string(),
                    }],
                },
                contents: vec![RequestContent {
                    role: "user".to_string(),
                    parts: vec![Part {
                        text: user_prompt.to_string(),
                    }],
                }],
                generation_config: GenerationConfig {
                    max_output_tokens: super::MAX_OUTPUT_TOKENS,
                },
            };

            let url = self.endpoint();
            info!(url = %url, model = %self.model, "Sending request to Gemini API");

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| LlmError::NetworkError(e.to_string()))?;

            let response = super::check_error_response(response).await?;

            let gemini_response: GeminiResponse = response
                .json()
                .await
                .map_err(|e| LlmError::InvalidResponseFormat(e.to_string()))?;

            debug!(
                candidate_count = gemini_response.candidates.len(),
                "Received Gemini API response"
            );

            let text = gemini_response
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .and_then(|c| c.parts.into_iter().next())
                .map(|p| p.text)
                .ok_or_else(|| {
                    LlmError::InvalidResponseFormat("No candidate text in response".to_string())
                })?;

            super::non_empty(text)
        })
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: "Google".to_string(),
            model: self.model.clone(),
        }
    }
}
