//! Clause topic classification.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Category assigned when no keyword matches.
pub const GENERAL_CATEGORY: &str = "general";

/// Distinct keyword matches needed for full confidence.
const FULL_CONFIDENCE_MATCHES: f64 = 4.0;

#[derive(Debug, Deserialize)]
struct CategoryFile {
    categories: Vec<CategoryDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryDefinition {
    name: String,
    description: String,
    keywords: Vec<String>,
}

/// Topic assigned to one clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseCategory {
    /// Category name, or `general`.
    pub category: String,
    /// `min(matches / 4, 1)`.
    pub confidence: f64,
    /// Keywords found in the clause, in table order.
    pub matched_keywords: Vec<String>,
    /// Human-readable category description.
    pub description: String,
}

/// Category counts over a set of clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Number of classified clauses.
    pub total_clauses: usize,
    /// Clause count per category.
    pub categories_found: BTreeMap<String, usize>,
    /// Most frequent category; ties go to the alphabetically first name.
    pub most_common: Option<String>,
}

/// Classifies clauses into topic categories by keyword presence.
#[derive(Debug, Clone)]
pub struct ClauseClassifier {
    categories: Vec<CategoryDefinition>,
}

impl ClauseClassifier {
    /// Loads the embedded category table.
    pub fn builtin() -> Result<Self> {
        let file: CategoryFile =
            serde_yaml::from_str(include_str!("../templates/clause_categories.yaml"))
                .context("Failed to load built-in clause categories")?;
        Ok(Self {
            categories: file.categories,
        })
    }

    /// Number of known categories.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Classifies one clause.
    pub fn classify(&self, clause: &str) -> ClauseCategory {
        let lowered = clause.to_lowercase();
        let mut best: Option<(&CategoryDefinition, Vec<String>)> = None;

        for category in &self.categories {
            let matched: Vec<String> = category
                .keywords
                .iter()
                .filter(|keyword| lowered.contains(&keyword.to_lowercase()))
                .cloned()
                .collect();
            if matched.is_empty() {
                continue;
            }
            let better = best
                .as_ref()
                .map_or(true, |(_, best_matched)| matched.len() > best_matched.len());
            if better {
                best = Some((category, matched));
            }
        }

        match best {
            Some((category, matched_keywords)) => {
                #[allow(clippy::cast_precision_loss)]
                let confidence = (matched_keywords.len() as f64 / FULL_CONFIDENCE_MATCHES).min(1.0);
                ClauseCategory {
                    category: category.name.clone(),
                    confidence,
                    matched_keywords,
                    description: category.description.clone(),
                }
            }
            None => ClauseCategory {
                category: GENERAL_CATEGORY.to_string(),
                confidence: 0.0,
                matched_keywords: Vec::new(),
                description: "General clause (no specific category matched)".to_string(),
            },
        }
    }

    /// Counts categories over classified clauses.
    pub fn summarize(categories: &[ClauseCategory]) -> CategorySummary {
        let mut categories_found = BTreeMap::new();
        for category in categories {
            *categories_found.entry(category.category.clone()).or_insert(0) += 1;
        }

        CategorySummary {
            total_clauses: categories.len(),
            most_common: most_common(&categories_found),
            categories_found,
        }
    }
}

/// Returns the key with the highest count; ties go to the smallest key.
pub(crate) fn most_common(counts: &BTreeMap<String, usize>) -> Option<String> {
    let mut best: Option<(&String, usize)> = None;
    for (name, &count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn classifier() -> ClauseClassifier {
        ClauseClassifier::builtin().unwrap()
    }

    #[test]
    fn builtin_has_fifteen_categories() {
        assert_eq!(classifier().category_count(), 15);
    }

    #[test]
    fn payment_clause() {
        let result = classifier().classify("Payment of each invoice is due within 30 days with interest");
        assert_eq!(result.category, "payment_terms");
        assert_eq!(result.matched_keywords, vec!["payment", "invoice", "interest"]);
        assert!((result.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn confidence_is_capped() {
        let result = classifier().classify(
            "Payment by invoice on the due date, net of advance installment with interest",
        );
        assert_eq!(result.category, "payment_terms");
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unmatched_clause_is_general() {
        let result = classifier().classify("The parties met in Pune");
        assert_eq!(result.category, GENERAL_CATEGORY);
        assert_eq!(result.confidence, 0.0);
        assert!(result.matched_keywords.is_empty());
    }

    #[test]
    fn summary_counts_and_breaks_ties_by_name() {
        let classifier = classifier();
        let categories: Vec<ClauseCategory> = [
            "The parties met in Pune",
            "Payment of each invoice is due within 30 days",
            "Nothing further to add here",
            "Payment and invoice terms",
        ]
        .iter()
        .map(|text| classifier.classify(text))
        .collect();

        let summary = ClauseClassifier::summarize(&categories);
        assert_eq!(summary.total_clauses, 4);
        assert_eq!(summary.categories_found["general"], 2);
        assert_eq!(summary.categories_found["payment_terms"], 2);
        assert_eq!(summary.most_common.as_deref(), Some("general"));
    }

    #[test]
    fn empty_summary() {
        let summary = ClauseClassifier::summarize(&[]);
        assert_eq!(summary.total_clauses, 0);
        assert!(summary.most_common.is_none());
    }
}
