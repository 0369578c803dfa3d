//! Custom Test Assertions
//!
//! Checks that give descriptive failures for balances and roster reports.

use rust_decimal::Decimal;

use core_kernel::money::clamp_non_negative;
use domain_fees::{FeeBalance, FeeStatus, RosterReport};

use crate::fixtures::ExpectedBalance;

/// Asserts the arithmetic and status rules every computed balance obeys
///
/// A zero balance with no fee and no payment may be either `paid` or
/// `pending`, depending on the zero-balance policy.
pub fn assert_balance_invariants(balance: &FeeBalance) {
    assert!(
        balance.balance >= Decimal::ZERO,
        "Balance is negative: {}",
        balance.balance
    );
    assert_eq!(
        balance.amount_paid,
        balance.direct_payments + balance.invoice_transactions,
        "amount_paid is not the sum of both channels"
    );
    assert_eq!(
        balance.balance,
        clamp_non_negative(balance.total_fees - balance.amount_paid),
        "balance is not max(0, total_fees - amount_paid)"
    );
    assert_eq!(
        balance.overpayment,
        clamp_non_negative(balance.amount_paid - balance.total_fees),
        "overpayment is not max(0, amount_paid - total_fees)"
    );

    let unbilled = balance.total_fees.is_zero() && balance.amount_paid.is_zero();
    match balance.status {
        FeeStatus::Paid => assert!(balance.balance.is_zero(), "paid with balance {}", balance.balance),
        FeeStatus::Partial => {
            assert!(balance.balance > Decimal::ZERO, "partial with zero balance");
            assert!(balance.amount_paid > Decimal::ZERO, "partial with nothing paid");
        }
        FeeStatus::Pending => {
            assert!(balance.amount_paid.is_zero(), "pending with {} paid", balance.amount_paid);
            assert!(
                balance.balance > Decimal::ZERO || unbilled,
                "pending with zero balance on a billed account"
            );
        }
    }
}

/// Asserts a balance matches an expected outcome
pub fn assert_balance_matches(balance: &FeeBalance, expected: &ExpectedBalance) {
    assert_eq!(balance.total_fees, expected.total_fees, "total_fees");
    assert_eq!(balance.amount_paid, expected.amount_paid, "amount_paid");
    assert_eq!(balance.balance, expected.balance, "balance");
    assert_eq!(balance.status, expected.status, "status");
}

/// Asserts a roster summary agrees with its entries
pub fn assert_summary_consistent(report: &RosterReport) {
    let summary = &report.summary;
    let balances: Vec<&FeeBalance> = report.entries.iter().filter_map(|e| e.balance()).collect();

    assert_eq!(summary.learner_count, report.entries.len());
    assert_eq!(summary.computed_count, balances.len());
    assert_eq!(summary.failed_count, report.entries.len() - balances.len());
    assert_eq!(
        summary.paid_count + summary.partial_count + summary.pending_count,
        summary.computed_count,
        "status counts do not add up"
    );
    assert_eq!(
        summary.total_expected,
        balances.iter().map(|b| b.total_fees).sum::<Decimal>()
    );
    assert_eq!(
        summary.total_collected,
        balances.iter().map(|b| b.amount_paid).sum::<Decimal>()
    );
    assert_eq!(
        summary.total_outstanding,
        balances.iter().map(|b| b.balance).sum::<Decimal>()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ScenarioFixtures;
    use domain_fees::compute_balance;

    #[test]
    fn test_reference_scenarios_satisfy_invariants() {
        for scenario in ScenarioFixtures::all() {
            let account = &scenario.account;
            let balance = compute_balance(&account.learner, &account.scope, &account.records).unwrap();
            assert_balance_invariants(&balance);
            assert_balance_matches(&balance, &scenario.expected);
        }
    }

    #[test]
    #[should_panic(expected = "status")]
    fn test_assert_balance_matches_reports_status() {
        let scenario = ScenarioFixtures::partial_payment();
        let account = &scenario.account;
        let balance = compute_balance(&account.learner, &account.scope, &account.records).unwrap();
        let mut expected = scenario.expected.clone();
        expected.status = FeeStatus::Paid;
        assert_balance_matches(&balance, &expected);
    }
}
