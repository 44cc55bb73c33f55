//! Risk rule bank.
//!
//! Rules are data: an ordered list of case-insensitive patterns with a risk
//! tier and advice, loaded from YAML. The built-in bank is embedded at compile
//! time; custom banks replace it wholesale.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use thiserror::Error;

use super::RiskTier;

/// Embedded default rule bank.
pub const RISK_RULES_YAML: &str = include_str!("../templates/risk_rules.yaml");

/// Errors raised while building a rule bank.
#[derive(Error, Debug)]
pub enum RuleBankError {
    /// The rule file is not valid YAML or does not match the rule schema.
    #[error("Failed to parse rule bank: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A rule pattern is not a valid regular expression.
    #[error("Invalid pattern for rule '{rule}': {source}")]
    InvalidPattern {
        /// Name of the offending rule.
        rule: String,
        /// Underlying regex compilation error.
        source: regex::Error,
    },

    /// Two rules share a name, which would make issue references ambiguous.
    #[error("Duplicate rule name: {0}")]
    DuplicateRule(String),

    /// The rule file declares no rules.
    #[error("Rule bank contains no rules")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    rules: Vec<RuleDefinition>,
}

#[derive(Debug, Deserialize)]
struct RuleDefinition {
    name: String,
    pattern: String,
    risk_tier: RiskTier,
    rationale: String,
    recommendation: String,
}

/// A single risk rule with its compiled matcher.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique rule name, referenced by issues.
    pub name: String,
    /// Source pattern as written in the rule file.
    pub pattern: String,
    /// Tier assigned to clauses matching this rule.
    pub risk_tier: RiskTier,
    /// Why a match is risky.
    pub rationale: String,
    /// How to fix the clause.
    pub recommendation: String,
    matcher: Regex,
}

impl Rule {
    /// Returns true if the rule pattern occurs anywhere in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

/// Ordered, immutable collection of risk rules.
#[derive(Debug, Clone)]
pub struct RuleBank {
    rules: Vec<Rule>,
}

impl RuleBank {
    /// Loads the embedded default rules.
    pub fn builtin() -> Result<Self, RuleBankError> {
        Self::from_yaml(RISK_RULES_YAML)
    }

    /// Parses a rule bank from YAML, compiling every pattern up front.
    pub fn from_yaml(content: &str) -> Result<Self, RuleBankError> {
        let file: RuleFile = serde_yaml::from_str(content)?;
        if file.rules.is_empty() {
            return Err(RuleBankError::Empty);
        }

        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(file.rules.len());
        for definition in file.rules {
            if !seen.insert(definition.name.clone()) {
                return Err(RuleBankError::DuplicateRule(definition.name));
            }

            let matcher = RegexBuilder::new(&definition.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| RuleBankError::InvalidPattern {
                    rule: definition.name.clone(),
                    source,
                })?;

            rules.push(Rule {
                name: definition.name,
                pattern: definition.pattern,
                risk_tier: definition.risk_tier,
                rationale: definition.rationale,
                recommendation: definition.recommendation,
                matcher,
            });
        }

        tracing::debug!(rule_count = rules.len(), "Loaded risk rule bank");
        Ok(Self { rules })
    }

    /// Loads a custom rule bank from a YAML file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to load rule file: {}", path.display()))
    }

    /// Returns the rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Looks up a rule by name.
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Number of rules in the bank.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the bank has no rules. Never true for a loaded bank.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
