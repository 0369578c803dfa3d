//! Property-Based Test Generators
//!
//! Proptest strategies for scopes, amounts and whole fee accounts.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_fees::{AcademicYear, FeeScope, Term};

use crate::builders::{FeeAccount, FeeAccountBuilder};

/// Non-negative amounts with two decimal places, up to one million
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strictly positive amounts with two decimal places
pub fn positive_amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

pub fn term_strategy() -> impl Strategy<Value = Term> {
    prop_oneof![Just(Term::Term1), Just(Term::Term2), Just(Term::Term3)]
}

pub fn academic_year_strategy() -> impl Strategy<Value = AcademicYear> {
    (2000u32..2100u32).prop_map(|year| AcademicYear::new(year.to_string()).unwrap())
}

pub fn fee_scope_strategy() -> impl Strategy<Value = FeeScope> {
    (academic_year_strategy(), term_strategy()).prop_map(|(year, term)| FeeScope::new(year, term))
}

/// Shape of a generated fee account
#[derive(Debug, Clone)]
pub struct AccountSpec {
    pub scope: FeeScope,
    pub fee: Option<Decimal>,
    pub direct: Vec<Decimal>,
    pub invoiced: Vec<Decimal>,
    pub out_of_scope: Vec<Decimal>,
}

impl AccountSpec {
    pub fn build(&self) -> FeeAccount {
        let mut builder = FeeAccountBuilder::new(self.scope.clone());
        if let Some(fee) = self.fee {
            builder = builder.fee(fee);
        }
        for amount in &self.direct {
            builder = builder.direct_payment(*amount);
        }
        for amount in &self.invoiced {
            builder = builder.invoice_payment(*amount);
        }
        for amount in &self.out_of_scope {
            builder = builder.out_of_scope_payment(*amount);
        }
        builder.build()
    }

    /// Sum of the payments that count toward the balance
    ///
    /// Direct payments only count when their fee structure was supplied.
    pub fn expected_paid(&self) -> Decimal {
        let direct: Decimal = if self.fee.is_some() {
            self.direct.iter().copied().sum()
        } else {
            Decimal::ZERO
        };
        direct + self.invoiced.iter().copied().sum::<Decimal>()
    }
}

/// Accounts with an optional fee and up to four payments per channel
pub fn account_spec_strategy() -> impl Strategy<Value = AccountSpec> {
    (
        fee_scope_strategy(),
        proptest::option::weighted(0.9, amount_strategy()),
        proptest::collection::vec(amount_strategy(), 0..4),
        proptest::collection::vec(amount_strategy(), 0..4),
        proptest::collection::vec(positive_amount_strategy(), 0..2),
    )
        .prop_map(|(scope, fee, direct, invoiced, out_of_scope)| AccountSpec {
            scope,
            fee,
            direct,
            invoiced,
            out_of_scope,
        })
}
