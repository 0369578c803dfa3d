//! Reconciliation checks over fee records
//!
//! The calculator is deliberately tolerant: it takes the first of several
//! matching fee structures and sums both payment channels without
//! deduplication. This module reports the conditions under which those
//! choices would miscount, so they can be corrected at the source.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use core_kernel::{FeePaymentId, FeeStructureId, FeeTransactionId, GradeId, LearnerId};

use crate::academic::{AcademicYear, FeeScope, Term};
use crate::learner::Learner;
use crate::payment::FeePayment;
use crate::records::FeeRecords;
use crate::transaction::FeeTransaction;

/// A single reconciliation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconciliationIssue {
    /// More than one fee structure configured for the same grade and scope
    DuplicateFeeStructure {
        grade_id: GradeId,
        academic_year: AcademicYear,
        term: Term,
        structure_ids: Vec<FeeStructureId>,
    },
    /// A direct payment row was supplied more than once
    DuplicatePaymentRow {
        payment_id: FeePaymentId,
    },
    /// An invoice transaction row was supplied more than once
    DuplicateTransactionRow {
        transaction_id: FeeTransactionId,
    },
    /// The same external reference is counted in both channels
    CrossChannelReference {
        reference: String,
        payment_id: FeePaymentId,
        transaction_id: FeeTransactionId,
    },
}

/// Findings for one learner and scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub learner_id: LearnerId,
    pub scope: FeeScope,
    pub issues: Vec<ReconciliationIssue>,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_channel_overlap(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, ReconciliationIssue::CrossChannelReference { .. }))
    }
}

/// A reference shared by an in-scope payment and an in-scope transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SharedReference {
    pub reference: String,
    pub payment_id: FeePaymentId,
    pub transaction_id: FeeTransactionId,
}

/// Finds references present in both channels, paired first-seen to first-seen
pub(crate) fn shared_references(
    payments: &[&FeePayment],
    transactions: &[&FeeTransaction],
) -> Vec<SharedReference> {
    let mut by_reference: HashMap<String, FeePaymentId> = HashMap::new();
    for payment in payments {
        if let Some(reference) = payment.normalized_reference() {
            by_reference.entry(reference).or_insert(payment.id);
        }
    }

    let mut seen = HashSet::new();
    let mut shared = Vec::new();
    for transaction in transactions {
        let Some(reference) = transaction.normalized_reference() else {
            continue;
        };
        if let Some(payment_id) = by_reference.get(&reference) {
            if seen.insert(reference.clone()) {
                shared.push(SharedReference {
                    reference,
                    payment_id: *payment_id,
                    transaction_id: transaction.id,
                });
            }
        }
    }
    shared
}

fn repeated<T, I>(ids: I) -> Vec<T>
where
    T: Eq + std::hash::Hash + Copy,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut out = Vec::new();
    for id in ids {
        if !seen.insert(id) && reported.insert(id) {
            out.push(id);
        }
    }
    out
}

/// Checks the records for `learner` in `scope`
///
/// Only rows that would count toward the learner's balance are inspected.
pub fn reconcile(learner: &Learner, scope: &FeeScope, records: &FeeRecords) -> ReconciliationReport {
    let scoped = records.select(learner, scope);
    let mut issues = Vec::new();

    if let (Some(grade_id), true) = (scoped.grade_id, scoped.structures.len() > 1) {
        issues.push(ReconciliationIssue::DuplicateFeeStructure {
            grade_id,
            academic_year: scope.academic_year.clone(),
            term: scope.term,
            structure_ids: scoped.structures.iter().map(|s| s.id).collect(),
        });
    }

    issues.extend(
        repeated(scoped.payments.iter().map(|p| p.id))
            .into_iter()
            .map(|payment_id| ReconciliationIssue::DuplicatePaymentRow { payment_id }),
    );
    issues.extend(
        repeated(scoped.transactions.iter().map(|t| t.id))
            .into_iter()
            .map(|transaction_id| ReconciliationIssue::DuplicateTransactionRow { transaction_id }),
    );
    issues.extend(
        shared_references(&scoped.payments, &scoped.transactions)
            .into_iter()
            .map(|s| ReconciliationIssue::CrossChannelReference {
                reference: s.reference,
                payment_id: s.payment_id,
                transaction_id: s.transaction_id,
            }),
    );

    if !issues.is_empty() {
        warn!(
            learner_id = %learner.id,
            scope = %scope,
            issues = issues.len(),
            "Fee records failed reconciliation"
        );
    }

    ReconciliationReport {
        learner_id: learner.id,
        scope: scope.clone(),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::PaymentMethod;
    use core_kernel::{FeeStructureId, InvoiceId, LearnerId};
    use rust_decimal_macros::dec;

    #[test]
    fn test_shared_references_case_insensitive() {
        let payment = FeePayment::new(LearnerId::new(), FeeStructureId::new(), dec!(100), PaymentMethod::MobileMoney)
            .with_reference("qhx12");
        let transaction = FeeTransaction::new(InvoiceId::new(), dec!(100), PaymentMethod::MobileMoney)
            .with_reference(" QHX12 ");

        let shared = shared_references(&[&payment], &[&transaction]);
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].reference, "QHX12");
        assert_eq!(shared[0].payment_id, payment.id);
        assert_eq!(shared[0].transaction_id, transaction.id);
    }

    #[test]
    fn test_missing_references_never_overlap() {
        let payment = FeePayment::new(LearnerId::new(), FeeStructureId::new(), dec!(100), PaymentMethod::Cash);
        let transaction = FeeTransaction::new(InvoiceId::new(), dec!(100), PaymentMethod::Cash);
        assert!(shared_references(&[&payment], &[&transaction]).is_empty());
    }

    #[test]
    fn test_repeated_reports_each_id_once() {
        assert_eq!(repeated(vec![1, 2, 1, 1, 3, 2]), vec![1, 2]);
        assert!(repeated(vec![1, 2, 3]).is_empty());
    }
}
