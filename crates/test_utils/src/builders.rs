//! Test Data Builders
//!
//! Builders for constructing learners and fee records with sensible
//! defaults, so tests only spell out the amounts they care about.

use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;

use core_kernel::{FeeStructureId, GradeId, StreamId};
use domain_fees::ports::mock::InMemoryFeeLedger;
use domain_fees::{
    FeePayment, FeeRecords, FeeScope, FeeStructure, FeeTransaction, InvoiceStatus, Learner,
    LearnerStatus, PaymentMethod, StudentInvoice, Term,
};

/// Builder for a learner with a generated name and admission number
pub struct LearnerBuilder {
    admission_number: String,
    full_name: String,
    grade_id: Option<GradeId>,
    stream_id: Option<StreamId>,
    status: LearnerStatus,
}

impl Default for LearnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LearnerBuilder {
    pub fn new() -> Self {
        Self {
            admission_number: format!("ADM-{:05}", (1..100_000).fake::<u32>()),
            full_name: Name().fake(),
            grade_id: None,
            stream_id: None,
            status: LearnerStatus::Active,
        }
    }

    pub fn with_admission_number(mut self, admission_number: impl Into<String>) -> Self {
        self.admission_number = admission_number.into();
        self
    }

    pub fn with_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    pub fn in_grade(mut self, grade_id: GradeId) -> Self {
        self.grade_id = Some(grade_id);
        self
    }

    pub fn in_stream(mut self, stream_id: StreamId) -> Self {
        self.stream_id = Some(stream_id);
        self
    }

    pub fn with_status(mut self, status: LearnerStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> Learner {
        let mut learner = Learner::new(self.admission_number, self.full_name).with_status(self.status);
        learner.current_grade_id = self.grade_id;
        learner.current_stream_id = self.stream_id;
        learner
    }
}

/// One learner together with the records that make up their balance
#[derive(Debug, Clone)]
pub struct FeeAccount {
    pub learner: Learner,
    pub scope: FeeScope,
    pub records: FeeRecords,
}

/// Builder for a single learner's fee account in one scope
///
/// ```rust,ignore
/// let account = FeeAccountBuilder::new(ScopeFixtures::term_one())
///     .fee(dec!(5000))
///     .direct_payment(dec!(3000))
///     .invoice_payment(dec!(2500))
///     .build();
/// ```
pub struct FeeAccountBuilder {
    learner: Learner,
    scope: FeeScope,
    fees: Vec<Decimal>,
    direct: Vec<(Decimal, Option<String>)>,
    invoiced: Vec<(Decimal, Option<String>)>,
    out_of_scope: Vec<Decimal>,
    cancelled: Vec<Decimal>,
}

impl FeeAccountBuilder {
    /// Account for a fresh learner placed in a new grade
    pub fn new(scope: FeeScope) -> Self {
        Self::for_learner(LearnerBuilder::new().in_grade(GradeId::new()).build(), scope)
    }

    pub fn for_learner(learner: Learner, scope: FeeScope) -> Self {
        Self {
            learner,
            scope,
            fees: Vec::new(),
            direct: Vec::new(),
            invoiced: Vec::new(),
            out_of_scope: Vec::new(),
            cancelled: Vec::new(),
        }
    }

    /// Adds a fee structure for the learner's grade; the first one added sets the fee
    pub fn fee(mut self, amount: Decimal) -> Self {
        self.fees.push(amount);
        self
    }

    /// Adds a direct payment against the first fee structure
    pub fn direct_payment(mut self, amount: Decimal) -> Self {
        self.direct.push((amount, None));
        self
    }

    pub fn direct_payment_with_reference(mut self, amount: Decimal, reference: &str) -> Self {
        self.direct.push((amount, Some(reference.to_string())));
        self
    }

    /// Adds a transaction against an in-scope invoice
    pub fn invoice_payment(mut self, amount: Decimal) -> Self {
        self.invoiced.push((amount, None));
        self
    }

    pub fn invoice_payment_with_reference(mut self, amount: Decimal, reference: &str) -> Self {
        self.invoiced.push((amount, Some(reference.to_string())));
        self
    }

    /// Adds a transaction against an invoice for another term of the same year
    pub fn out_of_scope_payment(mut self, amount: Decimal) -> Self {
        self.out_of_scope.push(amount);
        self
    }

    /// Adds a transaction against a cancelled in-scope invoice
    pub fn cancelled_invoice_payment(mut self, amount: Decimal) -> Self {
        self.cancelled.push(amount);
        self
    }

    pub fn build(self) -> FeeAccount {
        let learner = self.learner;
        let scope = self.scope;
        let mut records = FeeRecords::new();

        // A learner without a grade still gets rows, keyed to a grade they are not in.
        let grade_id = learner.current_grade_id.unwrap_or_else(GradeId::new);

        for amount in &self.fees {
            records.structures.push(FeeStructure::new(grade_id, &scope, *amount));
        }
        let structure_id = records
            .structures
            .first()
            .map(|s| s.id)
            .unwrap_or_else(FeeStructureId::new);

        for (amount, reference) in self.direct {
            let mut payment = FeePayment::new(learner.id, structure_id, amount, PaymentMethod::Cash);
            payment.transaction_reference = reference;
            records.payments.push(payment);
        }

        if !self.invoiced.is_empty() {
            let invoice = StudentInvoice::new(learner.id, grade_id, &scope);
            for (amount, reference) in self.invoiced {
                let mut transaction = FeeTransaction::new(invoice.id, amount, PaymentMethod::MobileMoney);
                transaction.transaction_reference = reference;
                records.transactions.push(transaction);
            }
            records.invoices.push(invoice);
        }

        if !self.out_of_scope.is_empty() {
            let other = FeeScope::new(scope.academic_year.clone(), other_term(scope.term));
            let invoice = StudentInvoice::new(learner.id, grade_id, &other);
            for amount in self.out_of_scope {
                records
                    .transactions
                    .push(FeeTransaction::new(invoice.id, amount, PaymentMethod::BankTransfer));
            }
            records.invoices.push(invoice);
        }

        if !self.cancelled.is_empty() {
            let invoice = StudentInvoice::new(learner.id, grade_id, &scope).with_status(InvoiceStatus::Cancelled);
            for amount in self.cancelled {
                records
                    .transactions
                    .push(FeeTransaction::new(invoice.id, amount, PaymentMethod::MobileMoney));
            }
            records.invoices.push(invoice);
        }

        FeeAccount {
            learner,
            scope,
            records,
        }
    }
}

fn other_term(term: Term) -> Term {
    match term {
        Term::Term1 => Term::Term2,
        Term::Term2 => Term::Term3,
        Term::Term3 => Term::Term1,
    }
}

/// Builder for a grade's roster sharing one fee structure
///
/// Admission numbers are assigned in insertion order (`ADM-0001`, ...).
pub struct RosterBuilder {
    grade_id: GradeId,
    scope: FeeScope,
    structure: Option<FeeStructure>,
    learners: Vec<Learner>,
    records: FeeRecords,
}

impl RosterBuilder {
    pub fn new(scope: FeeScope) -> Self {
        Self {
            grade_id: GradeId::new(),
            scope,
            structure: None,
            learners: Vec::new(),
            records: FeeRecords::new(),
        }
    }

    pub fn grade_id(&self) -> GradeId {
        self.grade_id
    }

    pub fn scope(&self) -> &FeeScope {
        &self.scope
    }

    /// Sets the grade's fee for the scope
    pub fn fee(mut self, amount: Decimal) -> Self {
        let structure = FeeStructure::new(self.grade_id, &self.scope, amount);
        self.records.structures.push(structure.clone());
        self.structure = Some(structure);
        self
    }

    /// Adds an active learner in the grade with the given payments
    pub fn learner(self, name: &str, direct: &[Decimal], invoiced: &[Decimal]) -> Self {
        let learner = LearnerBuilder::new()
            .with_name(name)
            .in_grade(self.grade_id)
            .build();
        self.with_learner(learner, direct, invoiced)
    }

    /// Adds an arbitrary learner with the given payments
    pub fn with_learner(mut self, mut learner: Learner, direct: &[Decimal], invoiced: &[Decimal]) -> Self {
        learner.admission_number = format!("ADM-{:04}", self.learners.len() + 1);

        let structure_id = self
            .structure
            .as_ref()
            .map(|s| s.id)
            .unwrap_or_else(FeeStructureId::new);
        for amount in direct {
            self.records
                .payments
                .push(FeePayment::new(learner.id, structure_id, *amount, PaymentMethod::Cash));
        }

        if !invoiced.is_empty() {
            let invoice = StudentInvoice::new(learner.id, self.grade_id, &self.scope);
            for amount in invoiced {
                self.records
                    .transactions
                    .push(FeeTransaction::new(invoice.id, *amount, PaymentMethod::MobileMoney));
            }
            self.records.invoices.push(invoice);
        }

        self.learners.push(learner);
        self
    }

    pub fn learners(&self) -> &[Learner] {
        &self.learners
    }

    pub fn build(self) -> (Vec<Learner>, FeeRecords) {
        (self.learners, self.records)
    }

    pub fn into_ledger(self) -> InMemoryFeeLedger {
        let (learners, records) = self.build();
        InMemoryFeeLedger::new(learners, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ScopeFixtures;
    use rust_decimal_macros::dec;

    #[test]
    fn test_learner_builder_defaults() {
        let learner = LearnerBuilder::new().build();
        assert!(learner.admission_number.starts_with("ADM-"));
        assert!(!learner.full_name.is_empty());
        assert!(learner.current_grade_id.is_none());
        assert!(learner.is_active());
    }

    #[test]
    fn test_account_builder_links_payments_to_first_structure() {
        let account = FeeAccountBuilder::new(ScopeFixtures::term_one())
            .fee(dec!(5000))
            .fee(dec!(9000))
            .direct_payment(dec!(100))
            .build();

        assert_eq!(account.records.structures.len(), 2);
        assert_eq!(account.records.payments[0].fee_structure_id, account.records.structures[0].id);
    }

    #[test]
    fn test_account_builder_out_of_scope_invoice_uses_other_term() {
        let scope = ScopeFixtures::term_one();
        let account = FeeAccountBuilder::new(scope.clone()).out_of_scope_payment(dec!(10)).build();

        let invoice = &account.records.invoices[0];
        assert_eq!(invoice.academic_year, scope.academic_year);
        assert_ne!(invoice.term, scope.term);
    }

    #[test]
    fn test_roster_builder_numbers_learners_in_order() {
        let (learners, records) = RosterBuilder::new(ScopeFixtures::term_one())
            .fee(dec!(1000))
            .learner("Amani", &[dec!(100)], &[])
            .learner("Baraka", &[], &[dec!(200)])
            .build();

        assert_eq!(learners[0].admission_number, "ADM-0001");
        assert_eq!(learners[1].admission_number, "ADM-0002");
        assert_eq!(records.structures.len(), 1);
        assert_eq!(records.payments.len(), 1);
        assert_eq!(records.invoices.len(), 1);
    }
}
