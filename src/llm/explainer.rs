//! Plain-language explanations with rule-based fallbacks.

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ai::claude::{self, ClaudeAiClient};
use super::ai::gemini::{self, GeminiAiClient};
use super::ai::{AiClient, AiClientMetadata};
use super::error::LlmError;
use super::prompts;
use crate::analysis::RiskTier;
use crate::config::{LlmConfig, LlmProvider};
use crate::utils::{detect_llm_provider, excerpt};

/// Characters of the document quoted by the summary fallback.
const SUMMARY_EXCERPT_CHARS: usize = 300;

/// Characters of the clause quoted by the explanation fallback.
const CLAUSE_EXCERPT_CHARS: usize = 200;

/// Where an explanation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationSource {
    /// Produced by the configured LLM.
    Ai,
    /// Produced locally without an LLM.
    RuleBased,
}

impl fmt::Display for ExplanationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ai => write!(f, "AI"),
            Self::RuleBased => write!(f, "Rule-based"),
        }
    }
}

/// Explanation text and its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// Explanation text.
    pub text: String,
    /// Origin of the text.
    pub source: ExplanationSource,
}

impl Explanation {
    fn ai(text: String) -> Self {
        Self {
            text: text.trim().to_string(),
            source: ExplanationSource::Ai,
        }
    }

    fn rule_based(text: String) -> Self {
        Self {
            text,
            source: ExplanationSource::RuleBased,
        }
    }
}

/// Produces explanations through an optional LLM client.
///
/// Every operation always yields an [`Explanation`]; LLM failures degrade to
/// a deterministic rule-based text.
pub struct Explainer {
    client: Option<Box<dyn AiClient>>,
    timeout: Duration,
}

impl Explainer {
    /// Creates an explainer backed by `client`.
    pub fn new(client: Box<dyn AiClient>, timeout: Duration) -> Self {
        Self {
            client: Some(client),
            timeout,
        }
    }

    /// Creates an explainer that never calls an LLM.
    pub fn rule_based() -> Self {
        Self {
            client: None,
            timeout: Duration::from_secs(crate::config::DEFAULT_LLM_TIMEOUT_SECS),
        }
    }

    /// Builds an explainer from configuration and available credentials.
    ///
    /// Credential or client construction problems are logged and yield a
    /// rule-based explainer.
    pub fn from_config(config: &LlmConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        match Self::build_client(config) {
            Ok(Some(client)) => {
                let metadata = client.get_metadata();
                debug!(provider = %metadata.provider, model = %metadata.model, "LLM client ready");
                Self::new(client, timeout)
            }
            Ok(None) => {
                debug!("No LLM provider configured; using rule-based explanations");
                Self {
                    client: None,
                    timeout,
                }
            }
            Err(e) => {
                warn!(error = %e, "LLM unavailable; using rule-based explanations");
                Self {
                    client: None,
                    timeout,
                }
            }
        }
    }

    fn build_client(config: &LlmConfig) -> Result<Option<Box<dyn AiClient>>> {
        let Some(credentials) = detect_llm_provider(config)? else {
            return Ok(None);
        };
        let client: Box<dyn AiClient> = match credentials.provider {
            LlmProvider::Claude => Box::new(ClaudeAiClient::new(
                credentials.model.unwrap_or_else(|| claude::DEFAULT_MODEL.to_string()),
                credentials.api_key,
            )?),
            LlmProvider::Gemini => Box::new(GeminiAiClient::new(
                credentials.model.unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
                credentials.api_key,
            )?),
            LlmProvider::None => return Ok(None),
        };
        Ok(Some(client))
    }

    /// Whether an LLM client is configured.
    pub fn is_ai_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Metadata of the configured client, if any.
    pub fn metadata(&self) -> Option<AiClientMetadata> {
        self.client.as_ref().map(|c| c.get_metadata())
    }

    async fn ask(&self, user_prompt: &str) -> Result<String> {
        let client = self.client.as_ref().ok_or(LlmError::Unavailable)?;
        tokio::time::timeout(
            self.timeout,
            client.send_request(prompts::SYSTEM_PROMPT, user_prompt),
        )
        .await
        .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))?
    }

    /// Runs `user_prompt`, or builds the fallback. The fallback receives
    /// `true` when an LLM was configured but failed.
    async fn resolve(
        &self,
        operation: &str,
        user_prompt: String,
        fallback: impl FnOnce(bool) -> String,
    ) -> Explanation {
        if !self.is_ai_enabled() {
            return Explanation::rule_based(fallback(false));
        }
        match self.ask(&user_prompt).await {
            Ok(text) => Explanation::ai(text),
            Err(e) => {
                warn!(operation, error = %e, "LLM request failed; using rule-based fallback");
                Explanation::rule_based(fallback(true))
            }
        }
    }

    /// Summarizes a document or clause in plain English.
    pub async fn summarize(&self, text: &str) -> Explanation {
        self.resolve("summarize", prompts::summarize_prompt(text), |_| {
            fallback_summary(text)
        })
        .await
    }

    /// Explains one clause in plain English.
    pub async fn explain_clause(&self, clause: &str) -> Explanation {
        self.resolve("explain_clause", prompts::explain_clause_prompt(clause), |_| {
            fallback_explanation(clause)
        })
        .await
    }

    /// Suggests more balanced wording for a clause.
    pub async fn suggest_alternative(&self, clause: &str, risk: RiskTier) -> Explanation {
        self.resolve(
            "suggest_alternative",
            prompts::suggest_alternative_prompt(clause, risk),
            |_| fallback_alternative(risk),
        )
        .await
    }

    /// Explains why a clause is risky.
    pub async fn risk_reasoning(&self, clause: &str) -> Explanation {
        self.resolve("risk_reasoning", prompts::risk_reasoning_prompt(clause), |failed| {
            fallback_risk_reasoning(failed)
        })
        .await
    }
}

impl fmt::Debug for Explainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Explainer")
            .field("client", &self.metadata())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Rule-based summary text.
pub fn fallback_summary(text: &str) -> String {
    format!(
        "Key excerpt: {}\n\nConfigure an LLM provider (GEMINI_API_KEY or CLAUDE_API_KEY) for AI-powered summaries.",
        excerpt(text.trim(), SUMMARY_EXCERPT_CHARS)
    )
}

/// Rule-based clause explanation text.
pub fn fallback_explanation(clause: &str) -> String {
    format!(
        "Clause excerpt: {}\n\nNote: configure an LLM provider for AI explanations.",
        excerpt(clause.trim(), CLAUSE_EXCERPT_CHARS)
    )
}

/// Rule-based alternative wording text.
pub fn fallback_alternative(risk: RiskTier) -> String {
    format!("To get AI-powered alternatives for {risk}-risk clauses, configure an LLM provider.")
}

/// Rule-based risk reasoning text.
pub fn fallback_risk_reasoning(llm_failed: bool) -> String {
    if llm_failed {
        "Risk assessment based on keyword matching (LLM error)".to_string()
    } else {
        "Risk assessment based on keyword matching (LLM unavailable)".to_string()
    }
}
