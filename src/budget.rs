//! Budget evaluation: where a category's spend sits relative to its limit.

use serde::{Deserialize, Serialize};

/// Budget health tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Ok,
    /// At or above 80% of the limit
    Warning,
    /// Strictly above the limit
    Exceeded,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Warning => write!(f, "warning"),
            Self::Exceeded => write!(f, "exceeded"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub tier: Tier,
    /// Display percentage, capped at 100
    pub percent: u8,
}

/// Classify `spent` against `limit`. A zero limit is treated as unset and
/// always classifies as `(Ok, 0)`.
pub fn classify(spent: u64, limit: u64) -> BudgetStatus {
    if limit == 0 {
        return BudgetStatus {
            tier: Tier::Ok,
            percent: 0,
        };
    }

    let spent = u128::from(spent);
    let limit = u128::from(limit);

    let percent = (spent * 100 / limit).min(100) as u8;
    let tier = if spent > limit {
        Tier::Exceeded
    } else if spent * 5 >= limit * 4 {
        Tier::Warning
    } else {
        Tier::Ok
    };

    BudgetStatus { tier, percent }
}
