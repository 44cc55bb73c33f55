//! Preflight credential checks.
//!
//! Resolves which LLM provider to use before any request is built, so
//! misconfiguration surfaces once with a clear message.

use anyhow::Result;

use crate::config::{LlmConfig, LlmProvider};
use crate::llm::LlmError;

/// Environment variable selecting the provider when the configuration does not.
pub const PROVIDER_ENV_VAR: &str = "CONTRACT_LENS_LLM_PROVIDER";

/// Environment variables holding a Gemini API key.
pub const GEMINI_KEY_VARS: &[&str] = &["GEMINI_API_KEY"];

/// Environment variables holding a Claude API key, in lookup order.
pub const CLAUDE_KEY_VARS: &[&str] = &["CLAUDE_API_KEY", "ANTHROPIC_API_KEY"];

/// Resolved provider credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct LlmCredentials {
    /// Provider that will be used.
    pub provider: LlmProvider,
    /// Model override from configuration.
    pub model: Option<String>,
    /// API key for the provider.
    pub api_key: String,
}

impl std::fmt::Debug for LlmCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmCredentials")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Detects the LLM provider from configuration, environment and settings.
///
/// Returns `Ok(None)` when no provider is selected and no key is available.
/// An explicitly selected provider without a key is an error.
pub fn detect_llm_provider(config: &LlmConfig) -> Result<Option<LlmCredentials>> {
    let settings = super::Settings::load().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Ignoring unreadable settings file");
        super::Settings::default()
    });
    detect_llm_provider_with(config, |key| settings.get_env_var(key))
}

/// Detects the LLM provider using `lookup` for environment variables.
pub fn detect_llm_provider_with(
    config: &LlmConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<LlmCredentials>> {
    let first_key = |keys: &[&str]| keys.iter().find_map(|&key| lookup(key));

    let explicit = match config.provider {
        Some(provider) => Some(provider),
        None => lookup(PROVIDER_ENV_VAR)
            .map(|value| value.parse::<LlmProvider>())
            .transpose()
            .map_err(anyhow::Error::msg)?,
    };

    let credentials = |provider: LlmProvider, api_key: String| LlmCredentials {
        provider,
        model: config.model.clone(),
        api_key,
    };

    match explicit {
        Some(LlmProvider::None) => Ok(None),
        Some(provider) => {
            let keys = key_vars(provider);
            let api_key = first_key(keys).ok_or_else(|| LlmError::ApiKeyNotFound {
                provider: provider.to_string(),
                variables: keys.join(", "),
            })?;
            Ok(Some(credentials(provider, api_key)))
        }
        None => {
            if let Some(api_key) = first_key(GEMINI_KEY_VARS) {
                Ok(Some(credentials(LlmProvider::Gemini, api_key)))
            } else if let Some(api_key) = first_key(CLAUDE_KEY_VARS) {
                Ok(Some(credentials(LlmProvider::Claude, api_key)))
            } else {
                Ok(None)
            }
        }
    }
}

fn key_vars(provider: LlmProvider) -> &'static [&'static str] {
    match provider {
        LlmProvider::Claude => CLAUDE_KEY_VARS,
        LlmProvider::Gemini => GEMINI_KEY_VARS,
        LlmProvider::None => &[],
    }
}
