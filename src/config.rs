//! Analysis configuration.
//!
//! Loaded from `--config <file>`, else `$HOME/.contract-lens/config.yaml` when
//! present, else built-in defaults. Every field has a default, so partial files
//! are fine.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the per-user application directory under `$HOME`.
pub const APP_DIR_NAME: &str = ".contract-lens";

/// Default upper bound on a single LLM call, in seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration for the analysis pipeline and its collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Clause segmentation limits.
    pub segmentation: SegmentationConfig,
    /// Structural heuristics used by the clause scorer.
    pub scoring: ScoringConfig,
    /// LLM provider selection for explanations.
    pub llm: LlmConfig,
    /// Audit log location.
    pub audit: AuditConfig,
    /// Replace Hindi legal terms with English equivalents before analysis.
    pub normalize_hindi: bool,
    /// Custom risk rule bank replacing the built-in rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_path: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            segmentation: SegmentationConfig::default(),
            scoring: ScoringConfig::default(),
            llm: LlmConfig::default(),
            audit: AuditConfig::default(),
            normalize_hindi: false,
            rules_path: None,
        }
    }
}

/// Clause segmentation limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Maximum number of clauses kept per document.
    pub max_clauses: usize,
    /// Pieces with this many characters or fewer are dropped.
    pub min_clause_chars: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_clauses: 200,
            min_clause_chars: 20,
        }
    }
}

/// Thresholds of the structural clause heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Clauses longer than this many characters get an "Overly Long Clause" issue.
    pub long_clause_chars: usize,
    /// Clauses with more quoted spans than this get a "Many Quoted Terms" issue.
    pub quoted_terms_threshold: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            long_clause_chars: 1000,
            quoted_terms_threshold: 3,
        }
    }
}

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Anthropic Messages API.
    Claude,
    /// Google Gemini `generateContent` API.
    Gemini,
    /// Rule-based explanations only.
    None,
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claude => write!(f, "Claude API"),
            Self::Gemini => write!(f, "Gemini API"),
            Self::None => write!(f, "rule-based"),
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(Self::Claude),
            "gemini" | "google" => Ok(Self::Gemini),
            "none" | "off" => Ok(Self::None),
            _ => Err(format!("Invalid LLM provider: {s}. Use: claude, gemini, none")),
        }
    }
}

/// LLM provider selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Explicit provider; detected from available credentials when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<LlmProvider>,
    /// Model override for the selected provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Upper bound on a single LLM call, in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

/// Audit log location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Path of the JSON Lines audit file; `$HOME/.contract-lens/audit.jsonl` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl AnalysisConfig {
    /// Loads the configuration from `explicit` if given, else from the default
    /// location when that file exists, else returns the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from_path(&path),
            _ => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Enables Hindi term normalization when `enabled`; a config that
    /// already enables it stays enabled.
    pub fn with_hindi(mut self, enabled: bool) -> Self {
        self.normalize_hindi |= enabled;
        self
    }

    /// Loads and validates a configuration file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parses and validates configuration YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document is an empty mapping, not an error.
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content).context("Invalid configuration YAML")?
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.segmentation.max_clauses == 0 {
            bail!("segmentation.max_clauses must be greater than zero");
        }
        if self.llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Returns the default configuration path (`~/.contract-lens/config.yaml`).
    pub fn default_path() -> Result<PathBuf> {
        Ok(app_dir()?.join("config.yaml"))
    }

    /// Returns the audit log path, falling back to `~/.contract-lens/audit.jsonl`.
    pub fn audit_path(&self) -> Result<PathBuf> {
        match &self.audit.path {
            Some(path) => Ok(path.clone()),
            None => Ok(app_dir()?.join("audit.jsonl")),
        }
    }
}

/// Returns the per-user application directory (`~/.contract-lens`).
pub fn app_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home_dir.join(APP_DIR_NAME))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_documented_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.segmentation.max_clauses, 200);
        assert_eq!(config.segmentation.min_clause_chars, 20);
        assert_eq!(config.scoring.long_clause_chars, 1000);
        assert_eq!(config.scoring.quoted_terms_threshold, 3);
        assert_eq!(config.llm.timeout_secs, 30);
        assert!(!config.normalize_hindi);
        assert!(config.llm.provider.is_none());
    }

    #[test]
    fn hindi_flag_only_enables() {
        assert!(AnalysisConfig::default().with_hindi(true).normalize_hindi);
        assert!(!AnalysisConfig::default().with_hindi(false).normalize_hindi);

        let enabled = AnalysisConfig::from_yaml("normalize_hindi: true\n").unwrap();
        assert!(enabled.with_hindi(false).normalize_hindi);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = AnalysisConfig::from_yaml(
            "segmentation:\n  max_clauses: 50\nllm:\n  provider: gemini\n",
        )
        .unwrap();
        assert_eq!(config.segmentation.max_clauses, 50);
        assert_eq!(config.segmentation.min_clause_chars, 20);
        assert_eq!(config.llm.provider, Some(LlmProvider::Gemini));
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(AnalysisConfig::from_yaml("").unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = AnalysisConfig::from_yaml("llm:\n  timeout_secs: 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn rejects_unknown_provider() {
        assert!(AnalysisConfig::from_yaml("llm:\n  provider: openai\n").is_err());
    }

    #[test]
    fn load_from_path_and_audit_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        let audit = temp_dir.path().join("audit.jsonl");
        std::fs::write(
            &path,
            format!("audit:\n  path: {}\nnormalize_hindi: false\n", audit.display()),
        )
        .unwrap();

        let config = AnalysisConfig::load(Some(&path)).unwrap();
        assert!(!config.normalize_hindi);
        assert_eq!(config.audit_path().unwrap(), audit);
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.yaml");
        let err = AnalysisConfig::load(Some(&missing)).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read config file"));
    }

    #[test]
    fn provider_parsing() {
        assert_eq!("Anthropic".parse::<LlmProvider>().unwrap(), LlmProvider::Claude);
        assert_eq!("gemini".parse::<LlmProvider>().unwrap(), LlmProvider::Gemini);
        assert!("bedrock".parse::<LlmProvider>().is_err());
        assert_eq!(LlmProvider::Gemini.to_string(), "Gemini API");
    }
}
