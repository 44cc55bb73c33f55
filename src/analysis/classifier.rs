//! Contract type classification by keyword frequency.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Contract type reported when no keyword occurs in the text.
pub const UNKNOWN_CONTRACT_TYPE: &str = "unknown";

#[derive(Debug, Deserialize)]
struct ContractTypeFile {
    types: Vec<ContractType>,
}

/// A contract type and the keywords that indicate it.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractType {
    /// Type name, e.g. `employment`.
    pub name: String,
    /// Lowercase indicator keywords.
    pub keywords: Vec<String>,
}

/// Keyword score of one contract type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeScore {
    /// Contract type name.
    pub contract_type: String,
    /// Total keyword occurrences.
    pub score: usize,
}

/// Result of classifying a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Winning type name, or `unknown`.
    pub contract_type: String,
    /// Share of the winning score in the total score, in `[0, 1]`.
    pub confidence: f64,
    /// Per-type scores in declaration order.
    pub scores: Vec<TypeScore>,
}

impl Classification {
    /// Returns true when no type keyword was found.
    pub fn is_unknown(&self) -> bool {
        self.contract_type == UNKNOWN_CONTRACT_TYPE
    }
}

/// Classifies contracts into a fixed, ordered set of types.
#[derive(Debug, Clone)]
pub struct ContractClassifier {
    types: Vec<ContractType>,
}

impl ContractClassifier {
    /// Loads the embedded contract type table.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(include_str!("../templates/contract_types.yaml"))
            .context("Failed to load built-in contract types")
    }

    /// Parses a contract type table from YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: ContractTypeFile = serde_yaml::from_str(content)?;
        let types = file
            .types
            .into_iter()
            .map(|t| ContractType {
                name: t.name,
                keywords: t.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Ok(Self { types })
    }

    /// Returns the contract types in declaration order.
    pub fn types(&self) -> &[ContractType] {
        &self.types
    }

    /// Classifies `text`.
    ///
    /// Each type scores the number of non-overlapping, case-insensitive
    /// keyword occurrences. The first-declared type with the highest score
    /// wins.
    pub fn classify(&self, text: &str) -> Classification {
        let lowered = text.to_lowercase();
        let scores: Vec<TypeScore> = self
            .types
            .iter()
            .map(|t| TypeScore {
                contract_type: t.name.clone(),
                score: t.keywords.iter().map(|k| lowered.matches(k.as_str()).count()).sum(),
            })
            .collect();

        let total: usize = scores.iter().map(|s| s.score).sum();
        if total == 0 {
            return Classification {
                contract_type: UNKNOWN_CONTRACT_TYPE.to_string(),
                confidence: 0.0,
                scores,
            };
        }

        // Strictly greater keeps the earliest type on ties.
        let mut best = &scores[0];
        for candidate in &scores[1..] {
            if candidate.score > best.score {
                best = candidate;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let confidence = (best.score as f64 / total as f64).min(1.0);

        tracing::debug!(
            contract_type = %best.contract_type,
            confidence,
            "Classified contract"
        );

        Classification {
            contract_type: best.contract_type.clone(),
            confidence,
            scores,
        }
    }
}
