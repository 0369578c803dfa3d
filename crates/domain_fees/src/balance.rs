//! Fee balance calculation
//!
//! Computes, for one learner and scope, the expected fee, the amount paid
//! across both payment channels, the outstanding balance and a tri-state
//! status.
//!
//! # Rules
//!
//! - `total_fees` is the amount of the first fee structure matching the
//!   learner's current grade, academic year and term; zero when none exists.
//! - `amount_paid` is channel A (direct payments) plus channel B (invoice
//!   transactions). The channels are summed independently and never
//!   deduplicated against each other.
//! - `balance = max(0, total_fees - amount_paid)`.
//! - Status, first match wins: zero balance is `paid`, any payment is
//!   `partial`, otherwise `pending`. A learner without a grade is `pending`.
//!
//! Under [`ZeroBalancePolicy::Literal`] a scope with no fee configured and
//! nothing paid is `paid`, since its balance is literally zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use core_kernel::money::{checked_sum, clamp_non_negative};
use core_kernel::{CoreError, FeeStructureId, LearnerId, MoneyError};

use crate::academic::FeeScope;
use crate::error::FeeError;
use crate::learner::Learner;
use crate::reconciliation::shared_references;
use crate::records::FeeRecords;

/// Payment completeness for a learner in a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeStatus {
    Paid,
    Partial,
    Pending,
}

impl FeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeStatus::Paid => "paid",
            FeeStatus::Partial => "partial",
            FeeStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status given to a zero balance when no fee was configured and nothing paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroBalancePolicy {
    /// Zero balance is always `paid`
    #[default]
    Literal,
    /// No fee and no payment is `pending`
    PendingWhenUnbilled,
}

impl FromStr for ZeroBalancePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(ZeroBalancePolicy::Literal),
            "pending_when_unbilled" => Ok(ZeroBalancePolicy::PendingWhenUnbilled),
            other => Err(CoreError::configuration(format!(
                "unknown zero balance policy '{}'",
                other
            ))),
        }
    }
}

/// Treatment of a payment reference found in both channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPolicy {
    /// Sum both channels as they are
    #[default]
    Additive,
    /// Refuse to compute when a reference is shared between channels
    RejectOverlap,
}

/// The computed balance for one learner in one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBalance {
    pub learner_id: LearnerId,
    pub scope: FeeScope,
    /// Structure that set `total_fees`, if one matched
    pub fee_structure_id: Option<FeeStructureId>,
    /// Expected fee
    pub total_fees: Decimal,
    /// Channel A sum
    pub direct_payments: Decimal,
    /// Channel B sum
    pub invoice_transactions: Decimal,
    /// Channel A + channel B
    pub amount_paid: Decimal,
    /// Outstanding amount, never negative
    pub balance: Decimal,
    /// Amount paid beyond `total_fees`
    pub overpayment: Decimal,
    pub status: FeeStatus,
}

impl FeeBalance {
    /// Balance for a learner with no grade placement: nothing owed, nothing paid
    fn ungraded(learner_id: LearnerId, scope: &FeeScope) -> Self {
        Self {
            learner_id,
            scope: scope.clone(),
            fee_structure_id: None,
            total_fees: Decimal::ZERO,
            direct_payments: Decimal::ZERO,
            invoice_transactions: Decimal::ZERO,
            amount_paid: Decimal::ZERO,
            balance: Decimal::ZERO,
            overpayment: Decimal::ZERO,
            status: FeeStatus::Pending,
        }
    }
}

/// Configurable fee balance calculator
///
/// The default configuration applies the literal rules described in the
/// module docs.
///
/// # Example
///
/// ```rust
/// use domain_fees::{BalanceCalculator, FeeRecords, FeeScope, FeeStatus, Learner};
/// use core_kernel::GradeId;
///
/// let learner = Learner::new("ADM-001", "Amani Otieno").with_grade(GradeId::new());
/// let scope = FeeScope::parse("2024", "term_1").unwrap();
///
/// let balance = BalanceCalculator::new()
///     .compute(&learner, &scope, &FeeRecords::new())
///     .unwrap();
/// assert_eq!(balance.status, FeeStatus::Paid);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceCalculator {
    pub zero_balance_policy: ZeroBalancePolicy,
    pub channel_policy: ChannelPolicy,
}

impl BalanceCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zero_balance_policy(mut self, policy: ZeroBalancePolicy) -> Self {
        self.zero_balance_policy = policy;
        self
    }

    pub fn with_channel_policy(mut self, policy: ChannelPolicy) -> Self {
        self.channel_policy = policy;
        self
    }

    /// Computes the balance for `learner` in `scope` from already-fetched records
    ///
    /// # Errors
    ///
    /// - `FeeError::DataIntegrity` if the matching fee structure or an in-scope
    ///   payment has a negative amount
    /// - `FeeError::Money` if a channel sum overflows
    /// - `FeeError::ChannelOverlap` under [`ChannelPolicy::RejectOverlap`]
    pub fn compute(
        &self,
        learner: &Learner,
        scope: &FeeScope,
        records: &FeeRecords,
    ) -> Result<FeeBalance, FeeError> {
        if learner.current_grade_id.is_none() {
            debug!(learner_id = %learner.id, "Learner has no current grade; balance not scoped");
            return Ok(FeeBalance::ungraded(learner.id, scope));
        }

        let scoped = records.select(learner, scope);

        if scoped.structures.len() > 1 {
            warn!(
                learner_id = %learner.id,
                scope = %scope,
                matches = scoped.structures.len(),
                "Multiple fee structures match scope; using the first"
            );
        }

        let structure = scoped.fee_structure();
        let total_fees = match structure {
            Some(s) => {
                s.validate()?;
                s.amount
            }
            None => Decimal::ZERO,
        };

        if self.channel_policy == ChannelPolicy::RejectOverlap {
            if let Some(overlap) = shared_references(&scoped.payments, &scoped.transactions).into_iter().next() {
                return Err(FeeError::ChannelOverlap {
                    reference: overlap.reference,
                });
            }
        }

        for payment in &scoped.payments {
            payment.validate()?;
        }
        for transaction in &scoped.transactions {
            transaction.validate()?;
        }

        let direct_payments = checked_sum(scoped.payments.iter().map(|p| p.amount_paid))?;
        let invoice_transactions = checked_sum(scoped.transactions.iter().map(|t| t.amount_paid))?;
        let amount_paid = direct_payments
            .checked_add(invoice_transactions)
            .ok_or(MoneyError::Overflow)?;

        let outstanding = total_fees
            .checked_sub(amount_paid)
            .ok_or(MoneyError::Overflow)?;
        let balance = clamp_non_negative(outstanding);
        let overpayment = clamp_non_negative(-outstanding);
        let status = self.derive_status(total_fees, amount_paid, balance);

        debug!(
            learner_id = %learner.id,
            scope = %scope,
            %total_fees,
            %amount_paid,
            %balance,
            status = %status,
            "Computed fee balance"
        );

        Ok(FeeBalance {
            learner_id: learner.id,
            scope: scope.clone(),
            fee_structure_id: structure.map(|s| s.id),
            total_fees,
            direct_payments,
            invoice_transactions,
            amount_paid,
            balance,
            overpayment,
            status,
        })
    }

    fn derive_status(&self, total_fees: Decimal, amount_paid: Decimal, balance: Decimal) -> FeeStatus {
        if balance.is_zero() {
            let unbilled = total_fees.is_zero() && amount_paid.is_zero();
            if unbilled && self.zero_balance_policy == ZeroBalancePolicy::PendingWhenUnbilled {
                return FeeStatus::Pending;
            }
            return FeeStatus::Paid;
        }
        if amount_paid > Decimal::ZERO {
            return FeeStatus::Partial;
        }
        FeeStatus::Pending
    }
}

/// Computes a balance with the default calculator
pub fn compute_balance(
    learner: &Learner,
    scope: &FeeScope,
    records: &FeeRecords,
) -> Result<FeeBalance, FeeError> {
    BalanceCalculator::default().compute(learner, scope, records)
}
