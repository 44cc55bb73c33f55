//! Optional LLM explanations.
//!
//! The scoring core never depends on this module; reports opt in through an
//! [`Explainer`].

pub mod ai;
pub mod error;
pub mod explainer;
pub mod prompts;

#[cfg(test)]
pub(crate) mod test_utils;

pub use ai::claude::ClaudeAiClient;
pub use ai::gemini::GeminiAiClient;
pub use ai::{AiClient, AiClientMetadata};
pub use error::LlmError;
pub use explainer::{Explainer, Explanation, ExplanationSource};
