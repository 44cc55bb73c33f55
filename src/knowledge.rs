//! Knowledge base of contract issues commonly faced by Indian SMEs.

use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::RiskTier;

const KNOWLEDGE_BASE_YAML: &str = include_str!("templates/knowledge_base.yaml");

/// Title words shorter than this are not used for matching.
const MIN_KEYWORD_CHARS: usize = 4;

/// Title words too generic to match on.
const STOP_WORDS: &[&str] = &["clause", "clauses"];

/// How often an issue shows up in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Rarely seen.
    Low,
    /// Seen occasionally.
    Medium,
    /// Seen often.
    High,
    /// Seen in most contracts of the affected kind.
    VeryHigh,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::VeryHigh => write!(f, "Very High"),
        }
    }
}

/// A recurring contract problem and how to fix it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownIssue {
    /// Lookup key.
    pub key: String,
    /// Short title.
    pub title: String,
    /// How often it occurs.
    pub frequency: Frequency,
    /// How much damage it does.
    pub impact: RiskTier,
    /// What the problem looks like.
    pub description: String,
    /// Typical offending wording.
    pub example: String,
    /// Consequence for the SME.
    pub risk: String,
    /// How to negotiate it away.
    pub solution: String,
    /// Replacement wording.
    pub sample_fix: String,
    /// Observed prevalence.
    pub prevalence: String,
}

impl KnownIssue {
    /// Lowercased significant title words used for matching.
    pub fn keywords(&self) -> Vec<String> {
        self.title
            .split_whitespace()
            .map(str::to_lowercase)
            .filter(|word| {
                word.chars().count() >= MIN_KEYWORD_CHARS && !STOP_WORDS.contains(&word.as_str())
            })
            .collect()
    }

    fn matches(&self, lowered_text: &str) -> bool {
        self.keywords()
            .iter()
            .any(|keyword| lowered_text.contains(keyword.as_str()))
    }
}

/// A knowledge-base fix proposed for a clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSuggestion {
    /// Key of the matched issue.
    pub key: String,
    /// Issue title.
    pub issue: String,
    /// Issue description.
    pub description: String,
    /// Recommended solution.
    pub solution: String,
    /// Replacement wording.
    pub sample_fix: String,
}

/// Aggregate figures about the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseStats {
    /// Number of issues.
    pub total_known_issues: usize,
    /// Issues with High impact.
    pub high_impact: usize,
    /// Issues with Very High frequency.
    pub very_high_frequency: usize,
    /// Share of issues with High or Very High frequency, in `[0, 1]`.
    pub frequent_share: f64,
    /// Date the content was last reviewed.
    pub last_updated: String,
}

#[derive(Deserialize)]
struct KnowledgeFile {
    last_updated: String,
    issues: Vec<KnownIssue>,
}

/// Curated list of common contract issues.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    last_updated: String,
    issues: Vec<KnownIssue>,
}

impl KnowledgeBase {
    /// Loads the built-in knowledge base.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(KNOWLEDGE_BASE_YAML).context("Failed to load built-in knowledge base")
    }

    /// Parses a knowledge base from YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: KnowledgeFile =
            serde_yaml::from_str(content).context("Invalid knowledge base YAML")?;
        Ok(Self {
            last_updated: file.last_updated,
            issues: file.issues,
        })
    }

    /// All issues in file order.
    pub fn issues(&self) -> &[KnownIssue] {
        &self.issues
    }

    /// Looks up an issue by key.
    pub fn get(&self, key: &str) -> Option<&KnownIssue> {
        self.issues.iter().find(|issue| issue.key == key)
    }

    /// Issues whose title keywords occur in `pattern`.
    pub fn similar(&self, pattern: &str) -> Vec<&KnownIssue> {
        let lowered = pattern.to_lowercase();
        self.issues
            .iter()
            .filter(|issue| issue.matches(&lowered))
            .collect()
    }

    /// Issues with High impact.
    pub fn high_impact(&self) -> Vec<&KnownIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.impact == RiskTier::High)
            .collect()
    }

    /// Aggregate figures.
    pub fn stats(&self) -> KnowledgeBaseStats {
        let frequent = self
            .issues
            .iter()
            .filter(|issue| issue.frequency >= Frequency::High)
            .count();
        #[allow(clippy::cast_precision_loss)]
        let frequent_share = if self.issues.is_empty() {
            0.0
        } else {
            frequent as f64 / self.issues.len() as f64
        };

        KnowledgeBaseStats {
            total_known_issues: self.issues.len(),
            high_impact: self.high_impact().len(),
            very_high_frequency: self
                .issues
                .iter()
                .filter(|issue| issue.frequency == Frequency::VeryHigh)
                .count(),
            frequent_share,
            last_updated: self.last_updated.clone(),
        }
    }

    /// Fixes for every issue whose title keywords occur in `clause`.
    pub fn suggest_for_clause(&self, clause: &str) -> Vec<KnowledgeSuggestion> {
        self.similar(clause)
            .into_iter()
            .map(|issue| KnowledgeSuggestion {
                key: issue.key.clone(),
                issue: issue.title.clone(),
                description: issue.description.clone(),
                solution: issue.solution.clone(),
                sample_fix: issue.sample_fix.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::builtin().unwrap()
    }

    #[test]
    fn builtin_has_ten_issues() {
        let kb = kb();
        assert_eq!(kb.issues().len(), 10);
        assert_eq!(kb.get("indemnity_overreach").unwrap().frequency, Frequency::VeryHigh);
        assert!(kb.get("missing").is_none());
    }

    #[test]
    fn keywords_skip_short_and_generic_words() {
        let kb = kb();
        let issue = kb.get("indemnity_overreach").unwrap();
        assert_eq!(issue.keywords(), ["broad", "indemnity"]);
        assert_eq!(kb.get("unlimited_liability").unwrap().keywords(), ["liability"]);
        assert_eq!(kb.high_impact().len(), 6);
    }

    #[test]
    fn suggestions_match_title_words() {
        let suggestions =
            kb().suggest_for_clause("The Client shall INDEMNIFY the Vendor under the indemnity terms");
        assert!(suggestions.iter().any(|s| s.key == "indemnity_overreach"));
        assert!(suggestions.iter().all(|s| !s.sample_fix.is_empty()));
    }

    #[test]
    fn unrelated_text_has_no_suggestions() {
        assert!(kb().suggest_for_clause("Goods ship from Pune").is_empty());
    }

    #[test]
    fn stats_are_consistent() {
        let kb = kb();
        let stats = kb.stats();
        assert_eq!(stats.total_known_issues, 10);
        assert_eq!(stats.high_impact, kb.high_impact().len());
        assert_eq!(stats.very_high_frequency, 3);
        assert!((stats.frequent_share - 0.6).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&stats.frequent_share));
        assert_eq!(stats.last_updated, "2026-02-06");
    }
}
