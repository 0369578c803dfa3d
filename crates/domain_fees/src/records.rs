//! Fee records supplied to the calculator
//!
//! [`FeeRecords`] bundles the four collections the data layer fetches for a
//! learner and scope. [`FeeRecords::select`] narrows them to the rows that
//! actually count toward a learner's balance; both the calculator and the
//! reconciliation checker work from that selection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use core_kernel::{FeeStructureId, GradeId, InvoiceId};

use crate::academic::FeeScope;
use crate::fee_structure::FeeStructure;
use crate::invoice::StudentInvoice;
use crate::learner::Learner;
use crate::payment::FeePayment;
use crate::transaction::FeeTransaction;

/// Already-fetched fee collections for one learner and scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRecords {
    #[serde(default)]
    pub structures: Vec<FeeStructure>,
    #[serde(default)]
    pub payments: Vec<FeePayment>,
    #[serde(default)]
    pub transactions: Vec<FeeTransaction>,
    #[serde(default)]
    pub invoices: Vec<StudentInvoice>,
}

impl FeeRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_structure(mut self, structure: FeeStructure) -> Self {
        self.structures.push(structure);
        self
    }

    pub fn with_payment(mut self, payment: FeePayment) -> Self {
        self.payments.push(payment);
        self
    }

    pub fn with_transaction(mut self, transaction: FeeTransaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    pub fn with_invoice(mut self, invoice: StudentInvoice) -> Self {
        self.invoices.push(invoice);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
            && self.payments.is_empty()
            && self.transactions.is_empty()
            && self.invoices.is_empty()
    }

    /// Selects the rows that count toward `learner`'s balance in `scope`
    ///
    /// A learner without a current grade selects nothing.
    pub fn select<'a>(&'a self, learner: &Learner, scope: &FeeScope) -> ScopedRecords<'a> {
        let Some(grade_id) = learner.current_grade_id else {
            return ScopedRecords::default();
        };

        let structures: Vec<&FeeStructure> = self
            .structures
            .iter()
            .filter(|s| s.matches(grade_id, scope))
            .collect();

        let structure_ids: HashSet<FeeStructureId> = structures.iter().map(|s| s.id).collect();
        let payments = self
            .payments
            .iter()
            .filter(|p| p.learner_id == learner.id && structure_ids.contains(&p.fee_structure_id))
            .collect();

        let invoice_ids: HashSet<InvoiceId> = self
            .invoices
            .iter()
            .filter(|i| i.matches(learner.id, grade_id, scope))
            .map(|i| i.id)
            .collect();
        let transactions = self
            .transactions
            .iter()
            .filter(|t| invoice_ids.contains(&t.invoice_id))
            .collect();

        ScopedRecords {
            grade_id: Some(grade_id),
            structures,
            payments,
            transactions,
        }
    }
}

/// Rows of a [`FeeRecords`] that fall within one learner's scope
#[derive(Debug, Clone, Default)]
pub struct ScopedRecords<'a> {
    /// Grade the selection was made under; `None` for an ungraded learner
    pub grade_id: Option<GradeId>,
    /// Matching fee structures, in input order
    pub structures: Vec<&'a FeeStructure>,
    /// Channel A: direct payments against a matching structure
    pub payments: Vec<&'a FeePayment>,
    /// Channel B: transactions against a matching invoice
    pub transactions: Vec<&'a FeeTransaction>,
}

impl<'a> ScopedRecords<'a> {
    /// The structure that sets the expected fee (first match wins)
    pub fn fee_structure(&self) -> Option<&'a FeeStructure> {
        self.structures.first().copied()
    }
}
