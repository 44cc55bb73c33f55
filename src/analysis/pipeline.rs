//! End-to-end contract analysis.

use std::borrow::Cow;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    normalize_hindi, CategorySummary, Classification, ClauseCategory, ClauseClassifier,
    ClauseScorer, ClauseSegmenter, ClauseVerdict, ComplianceChecker, ComplianceReport,
    ContractClassifier, ContractVerdict, EntityExtractor, ExtractedEntities, RiskTier, RuleBank,
};
use crate::config::AnalysisConfig;

/// Complete analysis of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAnalysis {
    /// Caller-supplied document identifier, usually a file name.
    pub document_id: String,
    /// When the analysis ran.
    pub analyzed_at: DateTime<Utc>,
    /// Length of the analyzed text in characters.
    pub char_count: usize,
    /// Contract type.
    pub classification: Classification,
    /// Per-clause verdicts in document order.
    pub clauses: Vec<ClauseVerdict>,
    /// Topic of each clause, parallel to `clauses`.
    pub clause_categories: Vec<ClauseCategory>,
    /// Topic counts over all clauses.
    pub category_summary: CategorySummary,
    /// Contract-level risk.
    pub verdict: ContractVerdict,
    /// Compliance findings.
    pub compliance: ComplianceReport,
    /// Extracted entities.
    pub entities: ExtractedEntities,
}

impl ContractAnalysis {
    /// Clauses at exactly `tier`, in document order.
    pub fn clauses_at(&self, tier: RiskTier) -> impl Iterator<Item = &ClauseVerdict> {
        self.clauses.iter().filter(move |c| c.overall_risk == tier)
    }

    /// Clauses ordered from highest to lowest risk; document order within a tier.
    pub fn clauses_by_risk(&self) -> Vec<&ClauseVerdict> {
        let mut clauses: Vec<&ClauseVerdict> = self.clauses.iter().collect();
        clauses.sort_by_key(|c| std::cmp::Reverse(c.overall_risk));
        clauses
    }
}

/// Owns the rule tables and runs the full analysis over documents.
///
/// Build it once from an [`AnalysisConfig`] and share it by reference.
#[derive(Debug, Clone)]
pub struct ContractAnalyzer {
    config: AnalysisConfig,
    rules: RuleBank,
    segmenter: ClauseSegmenter,
    classifier: ContractClassifier,
    clause_classifier: ClauseClassifier,
    compliance: ComplianceChecker,
    extractor: EntityExtractor,
}

impl ContractAnalyzer {
    /// Loads all rule tables for `config`.
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let rules = match &config.rules_path {
            Some(path) => RuleBank::load_from_path(path)?,
            None => RuleBank::builtin().context("Failed to load built-in risk rules")?,
        };

        Ok(Self {
            config: config.clone(),
            rules,
            segmenter: ClauseSegmenter::from_config(&config.segmentation),
            classifier: ContractClassifier::builtin()?,
            clause_classifier: ClauseClassifier::builtin()?,
            compliance: ComplianceChecker::builtin()?,
            extractor: EntityExtractor::new(),
        })
    }

    /// Configuration the analyzer was built from.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Risk rule bank in use.
    pub fn rules(&self) -> &RuleBank {
        &self.rules
    }

    /// Clause scorer over the analyzer's rule bank.
    pub fn scorer(&self) -> ClauseScorer<'_> {
        ClauseScorer::new(&self.rules, self.config.scoring)
    }

    /// Contract type classifier.
    pub fn classifier(&self) -> &ContractClassifier {
        &self.classifier
    }

    /// Compliance checker.
    pub fn compliance(&self) -> &ComplianceChecker {
        &self.compliance
    }

    /// Entity extractor.
    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    /// Applies configured text normalization.
    pub fn prepare<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.config.normalize_hindi {
            Cow::Owned(normalize_hindi(text))
        } else {
            Cow::Borrowed(text)
        }
    }

    /// Analyzes one document. Never fails; empty text yields a Low verdict.
    pub fn analyze(&self, document_id: &str, text: &str) -> ContractAnalysis {
        let text = self.prepare(text);
        let scorer = self.scorer();

        let clauses: Vec<ClauseVerdict> = self
            .segmenter
            .segment(&text)
            .iter()
            .map(|clause| scorer.assess(clause))
            .collect();
        debug!(document_id, clause_count = clauses.len(), "Scored clauses");

        let clause_categories: Vec<ClauseCategory> = clauses
            .iter()
            .map(|clause| self.clause_classifier.classify(&clause.text))
            .collect();
        let category_summary = ClauseClassifier::summarize(&clause_categories);
        let verdict = ContractVerdict::from_verdicts(&clauses);

        let analysis = ContractAnalysis {
            document_id: document_id.to_string(),
            analyzed_at: Utc::now(),
            char_count: text.chars().count(),
            classification: self.classifier.classify(&text),
            clauses,
            clause_categories,
            category_summary,
            verdict,
            compliance: self.compliance.report(&text),
            entities: self.extractor.extract(&text),
        };

        info!(
            document_id,
            overall_risk = %analysis.verdict.overall_risk,
            high = analysis.verdict.high_count,
            medium = analysis.verdict.medium_count,
            contract_type = %analysis.classification.contract_type,
            "Analyzed contract"
        );

        analysis
    }
}
