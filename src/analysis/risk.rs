//! Risk tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Risk tier of a clause, rule or contract.
///
/// Variants are declared in ascending severity so the derived `Ord` gives
/// `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum RiskTier {
    /// Informational findings.
    #[default]
    #[serde(alias = "low")]
    Low,
    /// Findings worth negotiating.
    #[serde(alias = "medium")]
    Medium,
    /// Findings that need review before signing.
    #[serde(alias = "high")]
    High,
}

impl RiskTier {
    /// All tiers in ascending order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Returns the tier name as used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Invalid risk tier: {s}. Use: low, medium, high")),
        }
    }
}
