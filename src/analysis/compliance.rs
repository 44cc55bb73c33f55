//! Compliance checking against generic and jurisdiction-specific rule sets.
//!
//! A rule is satisfied when any of its keywords occurs in the contract as a
//! case-insensitive substring. The built-in jurisdiction profile is India.

use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::RiskTier;

/// More missing generic rules than this makes a contract High Risk.
const GENERIC_HIGH_RISK_MISSING: usize = 2;

/// More missing jurisdiction rules than this makes a contract High Risk.
const JURISDICTION_HIGH_RISK_MISSING: usize = 3;

#[derive(Debug, Deserialize)]
struct ComplianceFile {
    generic: Vec<ComplianceRule>,
    jurisdiction: JurisdictionProfile,
}

/// A keyword-presence compliance rule.
#[derive(Debug, Clone, Deserialize)]
pub struct ComplianceRule {
    /// Rule name.
    pub name: String,
    /// Keywords whose presence satisfies the rule.
    pub keywords: Vec<String>,
    /// Severity of the rule being unmet.
    pub severity: RiskTier,
    /// What the rule checks.
    pub description: String,
    /// Jurisdiction-specific guidance.
    pub guidance: String,
}

impl ComplianceRule {
    fn is_satisfied_by(&self, lowered: &str) -> bool {
        contains_any(lowered, &self.keywords)
    }
}

/// A statute and the keywords that reference it.
#[derive(Debug, Clone, Deserialize)]
pub struct LawReference {
    /// Statute name.
    pub name: String,
    /// Keywords indicating a reference.
    pub keywords: Vec<String>,
}

/// Jurisdiction-specific rules and statutes.
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionProfile {
    /// Jurisdiction name.
    pub name: String,
    /// Jurisdiction-specific rules.
    pub rules: Vec<ComplianceRule>,
    /// Statutes that may be referenced.
    pub laws: Vec<LawReference>,
}

/// Whether a rule's keywords were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenceStatus {
    /// At least one keyword occurs.
    Present,
    /// No keyword occurs.
    Missing,
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "Present"),
            Self::Missing => write!(f, "Missing"),
        }
    }
}

/// Overall compliance verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    /// Every rule is present.
    Compliant,
    /// Some rules are missing.
    #[serde(rename = "Medium Risk")]
    MediumRisk,
    /// Too many rules are missing.
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compliant => write!(f, "Compliant"),
            Self::MediumRisk => write!(f, "Medium Risk"),
            Self::HighRisk => write!(f, "High Risk"),
        }
    }
}

/// Outcome of one compliance rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceFinding {
    /// Rule name.
    pub rule_name: String,
    /// Present or Missing.
    pub status: PresenceStatus,
    /// Severity of the rule.
    pub severity: RiskTier,
    /// Finding description.
    pub description: String,
    /// Jurisdiction-specific guidance.
    pub guidance: String,
}

impl ComplianceFinding {
    /// Returns true if the rule was not satisfied.
    pub fn is_missing(&self) -> bool {
        self.status == PresenceStatus::Missing
    }
}

/// Combined compliance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Overall verdict.
    pub overall_status: ComplianceStatus,
    /// Jurisdiction the specific rules belong to.
    pub jurisdiction_name: String,
    /// Generic rule findings.
    pub generic: Vec<ComplianceFinding>,
    /// Jurisdiction rule findings.
    pub jurisdiction: Vec<ComplianceFinding>,
    /// Statutes referenced by the contract.
    pub law_references: Vec<String>,
    /// Missing rules across both sets.
    pub missing_count: usize,
    /// Rules checked across both sets.
    pub total_checks: usize,
}

impl ComplianceReport {
    /// Share of satisfied rules, as a percentage.
    pub fn compliance_percentage(&self) -> f64 {
        if self.total_checks == 0 {
            return 100.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let satisfied = (self.total_checks - self.missing_count) as f64;
        #[allow(clippy::cast_precision_loss)]
        let total = self.total_checks as f64;
        satisfied / total * 100.0
    }

    /// Iterates over all missing findings, generic first.
    pub fn missing(&self) -> impl Iterator<Item = &ComplianceFinding> {
        self.generic
            .iter()
            .chain(&self.jurisdiction)
            .filter(|finding| finding.is_missing())
    }
}

/// Checks contracts against the compliance rule sets.
#[derive(Debug, Clone)]
pub struct ComplianceChecker {
    generic: Vec<ComplianceRule>,
    jurisdiction: JurisdictionProfile,
}

impl ComplianceChecker {
    /// Loads the embedded rule sets.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(include_str!("../templates/compliance_rules.yaml"))
            .context("Failed to load built-in compliance rules")
    }

    /// Parses rule sets from YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: ComplianceFile = serde_yaml::from_str(content)?;
        Ok(Self {
            generic: file.generic,
            jurisdiction: file.jurisdiction,
        })
    }

    /// Name of the jurisdiction profile.
    pub fn jurisdiction_name(&self) -> &str {
        &self.jurisdiction.name
    }

    /// Checks the generic rules.
    pub fn check(&self, text: &str) -> Vec<ComplianceFinding> {
        let lowered = text.to_lowercase();
        self.generic
            .iter()
            .map(|rule| {
                let present = rule.is_satisfied_by(&lowered);
                ComplianceFinding {
                    rule_name: rule.name.clone(),
                    status: if present {
                        PresenceStatus::Present
                    } else {
                        PresenceStatus::Missing
                    },
                    severity: rule.severity,
                    description: if present {
                        format!("{} is present in the contract.", rule.name)
                    } else {
                        rule.description.clone()
                    },
                    guidance: rule.guidance.clone(),
                }
            })
            .collect()
    }

    /// Checks the jurisdiction-specific rules.
    pub fn check_jurisdiction(&self, text: &str) -> Vec<ComplianceFinding> {
        let lowered = text.to_lowercase();
        self.jurisdiction
            .rules
            .iter()
            .map(|rule| ComplianceFinding {
                rule_name: rule.name.clone(),
                status: if rule.is_satisfied_by(&lowered) {
                    PresenceStatus::Present
                } else {
                    PresenceStatus::Missing
                },
                severity: rule.severity,
                description: rule.description.clone(),
                guidance: rule.guidance.clone(),
            })
            .collect()
    }

    /// Returns the statutes referenced by `text`, in declaration order.
    pub fn law_references(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.jurisdiction
            .laws
            .iter()
            .filter(|law| contains_any(&lowered, &law.keywords))
            .map(|law| law.name.clone())
            .collect()
    }

    /// Runs every check and derives the overall verdict.
    pub fn report(&self, text: &str) -> ComplianceReport {
        let generic = self.check(text);
        let jurisdiction = self.check_jurisdiction(text);
        let law_references = self.law_references(text);

        let missing_generic = generic.iter().filter(|f| f.is_missing()).count();
        let missing_jurisdiction = jurisdiction.iter().filter(|f| f.is_missing()).count();

        let overall_status = if missing_generic > GENERIC_HIGH_RISK_MISSING
            || missing_jurisdiction > JURISDICTION_HIGH_RISK_MISSING
        {
            ComplianceStatus::HighRisk
        } else if missing_generic > 0 || missing_jurisdiction > 0 {
            ComplianceStatus::MediumRisk
        } else {
            ComplianceStatus::Compliant
        };

        tracing::debug!(
            missing_generic,
            missing_jurisdiction,
            status = %overall_status,
            "Compliance check complete"
        );

        ComplianceReport {
            overall_status,
            jurisdiction_name: self.jurisdiction.name.clone(),
            missing_count: missing_generic + missing_jurisdiction,
            total_checks: generic.len() + jurisdiction.len(),
            generic,
            jurisdiction,
            law_references,
        }
    }
}

fn contains_any(lowered: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|keyword| lowered.contains(&keyword.to_lowercase()))
}
