//! Contract analysis engine.
//!
//! Raw text flows through the [`ClauseSegmenter`], every clause is scored by
//! the [`ClauseScorer`] against a [`RuleBank`], and the clause tiers are
//! folded into one contract tier by [`aggregate_risk`]. Classification,
//! compliance and entity extraction work on the raw text directly.

pub mod aggregate;
pub mod classifier;
pub mod clause_category;
pub mod compliance;
pub mod entities;
pub mod normalize;
pub mod pipeline;
pub mod risk;
pub mod rules;
pub mod scorer;
pub mod segmenter;

pub use aggregate::{aggregate_risk, ContractVerdict};
pub use classifier::{Classification, ContractClassifier};
pub use clause_category::{CategorySummary, ClauseCategory, ClauseClassifier};
pub use compliance::{
    ComplianceChecker, ComplianceFinding, ComplianceReport, ComplianceStatus, PresenceStatus,
};
pub use entities::{EntityExtractor, ExtractedEntities};
pub use normalize::normalize_hindi;
pub use pipeline::{ContractAnalysis, ContractAnalyzer};
pub use risk::RiskTier;
pub use rules::{Rule, RuleBank, RuleBankError};
pub use scorer::{Ambiguity, ClauseScore, ClauseScorer, ClauseVerdict, Issue};
pub use segmenter::{Clause, ClauseSegmenter};
