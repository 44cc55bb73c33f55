//! Clause risk scoring and ambiguity detection.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Clause, RiskTier, RuleBank};
use crate::config::ScoringConfig;

/// Name of the structural issue raised for very long clauses.
pub const LONG_CLAUSE_ISSUE: &str = "Overly Long Clause";

/// Name of the structural issue raised for clauses with many quoted terms.
pub const QUOTED_TERMS_ISSUE: &str = "Many Quoted Terms";

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static QUOTED_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).unwrap());

struct AmbiguityPattern {
    category: &'static str,
    phrase: &'static str,
    problem: &'static str,
    suggestion: &'static str,
    matcher: Regex,
}

#[allow(clippy::unwrap_used)] // Compile-time constant regex patterns
static AMBIGUITY_PATTERNS: LazyLock<Vec<AmbiguityPattern>> = LazyLock::new(|| {
    vec![
        AmbiguityPattern {
            category: "Undefined Standard",
            phrase: "best efforts / commercially reasonable",
            problem: "Not defined; open to interpretation",
            suggestion: "Define explicitly: 'using reasonable efforts consistent with industry standards'",
            matcher: Regex::new(r"(?i)best efforts|commercially reasonable").unwrap(),
        },
        AmbiguityPattern {
            category: "Vague Timeline",
            phrase: "soon / ASAP / promptly",
            problem: "No specific timeframe given",
            suggestion: "Specify: 'within [X] days' or 'within [X] business days'",
            matcher: Regex::new(r"(?i)\bsoon\b|\basap\b|promptly|immediately").unwrap(),
        },
        AmbiguityPattern {
            category: "Conditional Obligation",
            phrase: "if-then / subject to",
            problem: "Conditions may be ambiguous or too flexible",
            suggestion: "Clearly specify all conditions and consequences",
            matcher: Regex::new(r"(?i)if.*then|subject to|depending on|as applicable").unwrap(),
        },
    ]
});

/// A risk finding produced by a rule or a structural heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Name of the rule (or heuristic) that fired.
    pub rule_name: String,
    /// Tier contributed by the finding.
    pub risk_tier: RiskTier,
    /// Why the finding is risky.
    pub rationale: String,
    /// How to address it.
    pub recommendation: String,
}

/// Vague or open-ended phrasing found in a clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ambiguity {
    /// Ambiguity category.
    pub category: String,
    /// Representative phrase of the category.
    pub phrase: String,
    /// What is wrong with the phrasing.
    pub problem: String,
    /// Suggested replacement wording.
    pub suggestion: String,
}

/// Result of scoring a bare clause string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseScore {
    /// Highest tier among the issues, or `Low` if there are none.
    pub overall_risk: RiskTier,
    /// Findings in evaluation order (structural issues first).
    pub issues: Vec<Issue>,
}

impl ClauseScore {
    /// Number of issues found.
    pub fn issues_found(&self) -> usize {
        self.issues.len()
    }
}

/// Full assessment of one clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseVerdict {
    /// Position of the clause in the document.
    pub index: usize,
    /// Clause text.
    pub text: String,
    /// Highest tier among the issues.
    pub overall_risk: RiskTier,
    /// Rule and heuristic findings.
    pub issues: Vec<Issue>,
    /// Ambiguous phrasing found in the clause.
    pub ambiguities: Vec<Ambiguity>,
}

/// Scores clauses against a rule bank.
#[derive(Debug, Clone, Copy)]
pub struct ClauseScorer<'a> {
    rules: &'a RuleBank,
    config: ScoringConfig,
}

impl<'a> ClauseScorer<'a> {
    /// Creates a scorer over `rules` with the given heuristic thresholds.
    pub const fn new(rules: &'a RuleBank, config: ScoringConfig) -> Self {
        Self { rules, config }
    }

    /// Scores a clause. Never fails; empty text scores `Low` with no issues.
    pub fn score(&self, clause: &str) -> ClauseScore {
        let mut overall_risk = RiskTier::Low;
        let mut issues = Vec::new();

        for rule in self.rules.rules() {
            if rule.matches(clause) {
                overall_risk = overall_risk.max(rule.risk_tier);
                issues.push(Issue {
                    rule_name: rule.name.clone(),
                    risk_tier: rule.risk_tier,
                    rationale: rule.rationale.clone(),
                    recommendation: rule.recommendation.clone(),
                });
            }
        }

        if clause.chars().count() > self.config.long_clause_chars {
            issues.insert(
                0,
                Issue {
                    rule_name: LONG_CLAUSE_ISSUE.to_string(),
                    risk_tier: RiskTier::Low,
                    rationale: "Clause is unusually long; may contain multiple obligations"
                        .to_string(),
                    recommendation: "Break into sub-clauses for clarity".to_string(),
                },
            );
        }

        if QUOTED_SPAN.find_iter(clause).count() > self.config.quoted_terms_threshold {
            issues.insert(
                0,
                Issue {
                    rule_name: QUOTED_TERMS_ISSUE.to_string(),
                    risk_tier: RiskTier::Low,
                    rationale: "Multiple quoted terms suggest special definitions needed"
                        .to_string(),
                    recommendation: "Add a definitions section or use defined terms consistently"
                        .to_string(),
                },
            );
        }

        ClauseScore {
            overall_risk,
            issues,
        }
    }

    /// Detects ambiguous phrasing; each category is reported at most once.
    pub fn detect_ambiguities(&self, clause: &str) -> Vec<Ambiguity> {
        AMBIGUITY_PATTERNS
            .iter()
            .filter(|pattern| pattern.matcher.is_match(clause))
            .map(|pattern| Ambiguity {
                category: pattern.category.to_string(),
                phrase: pattern.phrase.to_string(),
                problem: pattern.problem.to_string(),
                suggestion: pattern.suggestion.to_string(),
            })
            .collect()
    }

    /// Scores a segmented clause and attaches its ambiguities.
    pub fn assess(&self, clause: &Clause) -> ClauseVerdict {
        let score = self.score(&clause.text);
        ClauseVerdict {
            index: clause.index,
            text: clause.text.clone(),
            overall_risk: score.overall_risk,
            issues: score.issues,
            ambiguities: self.detect_ambiguities(&clause.text),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn bank() -> RuleBank {
        RuleBank::builtin().unwrap()
    }

    fn names(score: &ClauseScore) -> Vec<&str> {
        score.issues.iter().map(|i| i.rule_name.as_str()).collect()
    }

    #[test]
    fn indemnity_is_high_in_any_case() {
        let bank = bank();
        let scorer = ClauseScorer::new(&bank, ScoringConfig::default());
        for text in [
            "The Vendor shall indemnify the Client for all losses",
            "THE VENDOR SHALL INDEMNIFY THE CLIENT",
            "The Vendor shall Hold Harmless the Client",
        ] {
            let score = scorer.score(text);
            assert_eq!(score.overall_risk, RiskTier::High, "{text}");
            assert_eq!(names(&score)[0], "Broad Indemnity");
        }
    }

    #[test]
    fn plain_clause_is_low_without_issues() {
        let bank = bank();
        let scorer = ClauseScorer::new(&bank, ScoringConfig::default());
        let score = scorer.score("The Supplier shall deliver the goods to the warehouse");
        assert_eq!(score.overall_risk, RiskTier::Low);
        assert_eq!(score.issues_found(), 0);
    }

    #[test]
    fn empty_clause_is_low() {
        let bank = bank();
        let scorer = ClauseScorer::new(&bank, ScoringConfig::default());
        let score = scorer.score("");
        assert_eq!(score.overall_risk, RiskTier::Low);
        assert!(score.issues.is_empty());
        assert!(scorer.detect_ambiguities("").is_empty());
    }

    #[test]
    fn tier_is_max_of_matches_in_rule_order() {
        let bank = bank();
        let scorer = ClauseScorer::new(&bank, ScoringConfig::default());
        let score = scorer
            .score("This agreement shall automatically renew and a late fee applies to the Buyer");
        assert_eq!(score.overall_risk, RiskTier::Medium);
        assert_eq!(names(&score), vec!["Auto-Renewal", "Penalty Clauses"]);

        let score = scorer.score("Confidential data is subject to unlimited liability");
        assert_eq!(score.overall_risk, RiskTier::High);
        assert_eq!(names(&score), vec!["No Liability Cap", "Broad Confidentiality"]);
    }

    #[test]
    fn structural_heuristics_are_prepended() {
        let bank = bank();
        let scorer = ClauseScorer::new(&bank, ScoringConfig::default());
        let quoted = "\"Goods\" and \"Services\" and \"Fees\" and \"Term\" apply to the Buyer";
        let long = format!("{quoted} {}", "x".repeat(1000));

        let score = scorer.score(&long);
        assert_eq!(names(&score), vec![QUOTED_TERMS_ISSUE, LONG_CLAUSE_ISSUE]);
        assert_eq!(score.overall_risk, RiskTier::Low);

        let score = scorer.score(quoted);
        assert_eq!(names(&score), vec![QUOTED_TERMS_ISSUE]);
    }

    #[test]
    fn heuristic_thresholds_are_exclusive() {
        let bank = bank();
        let scorer = ClauseScorer::new(&bank, ScoringConfig::default());
        let three = "'Goods' and 'Services' and 'Fees' apply to the Buyer";
        assert!(scorer.score(three).issues.is_empty());
        assert!(scorer.score(&"x".repeat(1000)).issues.is_empty());
        assert_eq!(names(&scorer.score(&"x".repeat(1001))), vec![LONG_CLAUSE_ISSUE]);
    }

    #[test]
    fn heuristic_thresholds_follow_config() {
        let bank = bank();
        let config = ScoringConfig {
            long_clause_chars: 10,
            quoted_terms_threshold: 0,
        };
        let scorer = ClauseScorer::new(&bank, config);
        let score = scorer.score("The 'Buyer' pays the Seller");
        assert_eq!(names(&score), vec![QUOTED_TERMS_ISSUE, LONG_CLAUSE_ISSUE]);
    }

    #[test]
    fn ambiguity_categories_reported_once_each() {
        let bank = bank();
        let scorer = ClauseScorer::new(&bank, ScoringConfig::default());
        let found = scorer.detect_ambiguities(
            "Vendor uses best efforts and commercially reasonable care, promptly and ASAP, subject to approval",
        );
        let categories: Vec<&str> = found.iter().map(|a| a.category.as_str()).collect();
        assert_eq!(
            categories,
            vec!["Undefined Standard", "Vague Timeline", "Conditional Obligation"]
        );
        assert_eq!(found[1].phrase, "soon / ASAP / promptly");
    }

    #[test]
    fn vague_timeline_needs_word_boundaries_for_soon() {
        let bank = bank();
        let scorer = ClauseScorer::new(&bank, ScoringConfig::default());
        assert!(scorer.detect_ambiguities("Deliveries pause during the monsoon season").is_empty());
        assert_eq!(scorer.detect_ambiguities("Payment follows soon after delivery").len(), 1);
    }

    #[test]
    fn assess_combines_score_and_ambiguities() {
        let bank = bank();
        let scorer = ClauseScorer::new(&bank, ScoringConfig::default());
        let clause = Clause {
            index: 3,
            offset: 120,
            text: "The Supplier shall indemnify the Buyer promptly".to_string(),
        };
        let verdict = scorer.assess(&clause);
        assert_eq!(verdict.index, 3);
        assert_eq!(verdict.overall_risk, RiskTier::High);
        assert_eq!(verdict.issues.len(), 1);
        assert_eq!(verdict.ambiguities[0].category, "Vague Timeline");
    }
}
