//! SME-friendly contract templates and alternative clause wording.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONTRACT_TEMPLATES_YAML: &str = include_str!("templates/contract_templates.yaml");

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\[\]\n]+)\]").unwrap());

/// Lookup failures in the template library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftingError {
    /// No template has the requested key.
    #[error("Template not found: {key}. Available: {available}")]
    TemplateNotFound {
        /// Requested key.
        key: String,
        /// Comma-separated known keys.
        available: String,
    },

    /// No alternative clause has the requested key.
    #[error("Alternative clause not found: {key}. Available: {available}")]
    AlternativeNotFound {
        /// Requested key.
        key: String,
        /// Comma-separated known keys.
        available: String,
    },
}

/// A titled group of template clauses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSection {
    /// Section heading.
    pub heading: String,
    /// Clause lines, possibly containing `[PLACEHOLDER]`s.
    pub clauses: Vec<String>,
}

/// A complete contract template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractTemplate {
    /// Lookup key, e.g. `service_agreement`.
    pub key: String,
    /// Document title.
    pub title: String,
    /// Sections in document order.
    pub sections: Vec<TemplateSection>,
}

impl ContractTemplate {
    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for clause in self.sections.iter().flat_map(|s| &s.clauses) {
            for capture in PLACEHOLDER.captures_iter(clause) {
                let name = &capture[1];
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }
}

/// Balanced wording for a commonly one-sided clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeClause {
    /// Lookup key, e.g. `auto_renewal`.
    pub key: String,
    /// Wording to avoid, if there is a typical bad example.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avoid: Option<String>,
    /// Recommended wording.
    pub prefer: String,
    /// Why the recommended wording is better.
    pub reason: String,
}

#[derive(Deserialize)]
struct TemplateFile {
    templates: Vec<ContractTemplate>,
    #[serde(default)]
    alternatives: Vec<AlternativeClause>,
}

/// Contract templates and alternative clauses.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    templates: Vec<ContractTemplate>,
    alternatives: Vec<AlternativeClause>,
}

impl TemplateLibrary {
    /// Loads the built-in library.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(CONTRACT_TEMPLATES_YAML).context("Failed to load built-in contract templates")
    }

    /// Parses a library from YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: TemplateFile =
            serde_yaml::from_str(content).context("Invalid contract template YAML")?;
        Ok(Self {
            templates: file.templates,
            alternatives: file.alternatives,
        })
    }

    /// All templates in file order.
    pub fn list(&self) -> &[ContractTemplate] {
        &self.templates
    }

    /// All alternative clauses in file order.
    pub fn alternatives(&self) -> &[AlternativeClause] {
        &self.alternatives
    }

    /// Looks up a template by key.
    pub fn get(&self, key: &str) -> Result<&ContractTemplate, DraftingError> {
        self.templates
            .iter()
            .find(|t| t.key == key)
            .ok_or_else(|| DraftingError::TemplateNotFound {
                key: key.to_string(),
                available: join_keys(self.templates.iter().map(|t| t.key.as_str())),
            })
    }

    /// Looks up an alternative clause by key.
    pub fn alternative(&self, key: &str) -> Result<&AlternativeClause, DraftingError> {
        self.alternatives
            .iter()
            .find(|a| a.key == key)
            .ok_or_else(|| DraftingError::AlternativeNotFound {
                key: key.to_string(),
                available: join_keys(self.alternatives.iter().map(|a| a.key.as_str())),
            })
    }

    /// Renders a template as Markdown.
    ///
    /// Each `[NAME]` with an entry `NAME` in `values` is replaced by the value;
    /// other placeholders are left in place for manual completion.
    pub fn render(
        &self,
        key: &str,
        values: &BTreeMap<String, String>,
    ) -> Result<String, DraftingError> {
        let template = self.get(key)?;
        let mut out = format!("# {}\n", template.title);
        for section in &template.sections {
            let _ = write!(out, "\n## {}\n\n", section.heading);
            for clause in &section.clauses {
                let filled = PLACEHOLDER.replace_all(clause, |caps: &regex::Captures<'_>| {
                    values
                        .get(&caps[1])
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                });
                let _ = writeln!(out, "- {filled}");
            }
        }
        Ok(out)
    }
}

fn join_keys<'a>(keys: impl Iterator<Item = &'a str>) -> String {
    keys.collect::<Vec<_>>().join(", ")
}
