//! Pre-built Test Fixtures
//!
//! Fixed scopes and amounts, plus the reference balance scenarios every
//! implementation of the calculator is expected to reproduce.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_fees::{AcademicYear, FeeScope, FeeStatus, Term};

use crate::builders::{FeeAccount, FeeAccountBuilder};

/// Fixture for academic scopes
pub struct ScopeFixtures;

impl ScopeFixtures {
    pub fn year() -> AcademicYear {
        AcademicYear::new("2024").unwrap()
    }

    /// 2024, term 1
    pub fn term_one() -> FeeScope {
        FeeScope::new(Self::year(), Term::Term1)
    }

    /// 2024, term 2
    pub fn term_two() -> FeeScope {
        FeeScope::new(Self::year(), Term::Term2)
    }

    /// 2025, term 1
    pub fn next_year() -> FeeScope {
        FeeScope::new(AcademicYear::new("2025").unwrap(), Term::Term1)
    }
}

/// Expected outcome of a reference scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedBalance {
    pub total_fees: Decimal,
    pub amount_paid: Decimal,
    pub balance: Decimal,
    pub status: FeeStatus,
}

/// A reference scenario: an account and the balance it must produce
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub account: FeeAccount,
    pub expected: ExpectedBalance,
}

/// The reference balance scenarios
pub struct ScenarioFixtures;

impl ScenarioFixtures {
    /// Partial direct payment
    pub fn partial_payment() -> Scenario {
        Scenario {
            name: "partial_payment",
            account: FeeAccountBuilder::new(ScopeFixtures::term_one())
                .fee(dec!(5000))
                .direct_payment(dec!(2000))
                .build(),
            expected: ExpectedBalance {
                total_fees: dec!(5000),
                amount_paid: dec!(2000),
                balance: dec!(3000),
                status: FeeStatus::Partial,
            },
        }
    }

    /// Paid in full through direct payments
    pub fn paid_in_full() -> Scenario {
        Scenario {
            name: "paid_in_full",
            account: FeeAccountBuilder::new(ScopeFixtures::term_one())
                .fee(dec!(5000))
                .direct_payment(dec!(5000))
                .build(),
            expected: ExpectedBalance {
                total_fees: dec!(5000),
                amount_paid: dec!(5000),
                balance: dec!(0),
                status: FeeStatus::Paid,
            },
        }
    }

    /// Both channels together exceed the fee; balance is clamped
    pub fn overpaid_across_channels() -> Scenario {
        Scenario {
            name: "overpaid_across_channels",
            account: FeeAccountBuilder::new(ScopeFixtures::term_one())
                .fee(dec!(5000))
                .direct_payment(dec!(3000))
                .invoice_payment(dec!(2500))
                .build(),
            expected: ExpectedBalance {
                total_fees: dec!(5000),
                amount_paid: dec!(5500),
                balance: dec!(0),
                status: FeeStatus::Paid,
            },
        }
    }

    /// No fee structure and nothing paid
    pub fn unbilled() -> Scenario {
        Scenario {
            name: "unbilled",
            account: FeeAccountBuilder::new(ScopeFixtures::term_one()).build(),
            expected: ExpectedBalance {
                total_fees: dec!(0),
                amount_paid: dec!(0),
                balance: dec!(0),
                status: FeeStatus::Paid,
            },
        }
    }

    /// The only payment sits on an invoice for another term
    pub fn out_of_scope_invoice() -> Scenario {
        Scenario {
            name: "out_of_scope_invoice",
            account: FeeAccountBuilder::new(ScopeFixtures::term_one())
                .fee(dec!(4000))
                .out_of_scope_payment(dec!(1000))
                .build(),
            expected: ExpectedBalance {
                total_fees: dec!(4000),
                amount_paid: dec!(0),
                balance: dec!(4000),
                status: FeeStatus::Pending,
            },
        }
    }

    pub fn all() -> Vec<Scenario> {
        vec![
            Self::partial_payment(),
            Self::paid_in_full(),
            Self::overpaid_across_channels(),
            Self::unbilled(),
            Self::out_of_scope_invoice(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_differ() {
        assert_ne!(ScopeFixtures::term_one(), ScopeFixtures::term_two());
        assert_ne!(ScopeFixtures::term_one(), ScopeFixtures::next_year());
    }

    #[test]
    fn test_scenario_names_are_unique() {
        let mut names: Vec<_> = ScenarioFixtures::all().iter().map(|s| s.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 5);
    }
}
