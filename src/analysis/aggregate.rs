//! Contract-level risk aggregation.

use serde::{Deserialize, Serialize};

use super::{ClauseVerdict, RiskTier};

/// Number of Medium clauses a contract tolerates before it escalates to High.
pub const MEDIUM_ESCALATION_THRESHOLD: usize = 2;

/// Folds clause tiers into one contract tier.
///
/// Any High clause makes the contract High, as do more than
/// [`MEDIUM_ESCALATION_THRESHOLD`] Medium clauses. Otherwise any Medium clause
/// makes it Medium. An empty slice is Low. The result depends only on the
/// multiset of tiers, never on their order.
pub fn aggregate_risk(tiers: &[RiskTier]) -> RiskTier {
    let counts = TierCounts::from_tiers(tiers.iter().copied());
    counts.overall()
}

#[derive(Debug, Default, Clone, Copy)]
struct TierCounts {
    high: usize,
    medium: usize,
    low: usize,
}

impl TierCounts {
    fn from_tiers(tiers: impl IntoIterator<Item = RiskTier>) -> Self {
        tiers.into_iter().fold(Self::default(), |mut counts, tier| {
            match tier {
                RiskTier::High => counts.high += 1,
                RiskTier::Medium => counts.medium += 1,
                RiskTier::Low => counts.low += 1,
            }
            counts
        })
    }

    fn overall(self) -> RiskTier {
        if self.high > 0 || self.medium > MEDIUM_ESCALATION_THRESHOLD {
            RiskTier::High
        } else if self.medium > 0 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }
}

/// Aggregated risk of a whole contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractVerdict {
    /// Contract-level tier.
    pub overall_risk: RiskTier,
    /// Number of High clauses.
    pub high_count: usize,
    /// Number of Medium clauses.
    pub medium_count: usize,
    /// Number of Low clauses.
    pub low_count: usize,
}

impl ContractVerdict {
    /// Builds a verdict from clause tiers.
    pub fn from_tiers(tiers: &[RiskTier]) -> Self {
        Self::from_counts(TierCounts::from_tiers(tiers.iter().copied()))
    }

    /// Builds a verdict from clause verdicts.
    pub fn from_verdicts(verdicts: &[ClauseVerdict]) -> Self {
        Self::from_counts(TierCounts::from_tiers(
            verdicts.iter().map(|verdict| verdict.overall_risk),
        ))
    }

    fn from_counts(counts: TierCounts) -> Self {
        Self {
            overall_risk: counts.overall(),
            high_count: counts.high,
            medium_count: counts.medium,
            low_count: counts.low,
        }
    }

    /// Total number of clauses counted.
    pub const fn clause_count(&self) -> usize {
        self.high_count + self.medium_count + self.low_count
    }
}
