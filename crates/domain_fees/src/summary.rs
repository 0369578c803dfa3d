//! Roster-level aggregates

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::money::{checked_sum, round_to_currency};
use core_kernel::MoneyError;

use crate::balance::{FeeBalance, FeeStatus};
use crate::roster::RosterEntry;

/// Counts and totals over a computed roster
///
/// Failed entries count toward `learner_count` and `failed_count` only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RosterSummary {
    pub learner_count: usize,
    pub computed_count: usize,
    pub failed_count: usize,
    pub paid_count: usize,
    pub partial_count: usize,
    pub pending_count: usize,
    pub total_expected: Decimal,
    pub total_collected: Decimal,
    pub total_outstanding: Decimal,
    pub total_overpayment: Decimal,
}

impl RosterSummary {
    pub fn from_entries(entries: &[RosterEntry]) -> Result<Self, MoneyError> {
        let balances: Vec<&FeeBalance> = entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().ok())
            .collect();

        let count = |status: FeeStatus| balances.iter().filter(|b| b.status == status).count();

        Ok(Self {
            learner_count: entries.len(),
            computed_count: balances.len(),
            failed_count: entries.len() - balances.len(),
            paid_count: count(FeeStatus::Paid),
            partial_count: count(FeeStatus::Partial),
            pending_count: count(FeeStatus::Pending),
            total_expected: checked_sum(balances.iter().map(|b| b.total_fees))?,
            total_collected: checked_sum(balances.iter().map(|b| b.amount_paid))?,
            total_outstanding: checked_sum(balances.iter().map(|b| b.balance))?,
            total_overpayment: checked_sum(balances.iter().map(|b| b.overpayment))?,
        })
    }

    /// Share of the expected total that has been collected, as a percentage
    ///
    /// `None` when nothing is expected.
    pub fn collection_rate(&self) -> Option<Decimal> {
        if self.total_expected.is_zero() {
            return None;
        }
        let collected = self.total_collected.min(self.total_expected);
        let ratio = collected.checked_div(self.total_expected)?;
        ratio.checked_mul(Decimal::ONE_HUNDRED).map(round_to_currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_collection_rate_undefined_without_expected_fees() {
        assert_eq!(RosterSummary::default().collection_rate(), None);
    }

    #[test]
    fn test_collection_rate_caps_at_hundred() {
        let summary = RosterSummary {
            total_expected: dec!(1000),
            total_collected: dec!(1500),
            ..Default::default()
        };
        assert_eq!(summary.collection_rate(), Some(dec!(100)));
    }

    #[test]
    fn test_collection_rate_rounds() {
        let summary = RosterSummary {
            total_expected: dec!(3000),
            total_collected: dec!(1000),
            ..Default::default()
        };
        assert_eq!(summary.collection_rate(), Some(dec!(33.33)));
    }
}
