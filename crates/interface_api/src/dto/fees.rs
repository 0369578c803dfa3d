//! Fee balance DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{GradeId, LearnerId, RawAmount, StreamId};
use domain_fees::{
    AcademicYear, FeeBalance, FeeError, FeePayment, FeeRecords, FeeScope, FeeStatus, FeeStructure,
    FeeTransaction, InvoiceStatus, Learner, PaymentMethod, ReconciliationReport, RosterOrder,
    RosterSummary, StudentInvoice, Term, ZeroBalancePolicy,
};

use crate::error::ErrorResponse;

/// Query parameters selecting a scope
#[derive(Debug, Deserialize, Validate)]
pub struct ScopeParams {
    #[validate(length(min = 1, max = 16))]
    pub academic_year: String,
    pub term: Term,
}

impl ScopeParams {
    pub fn scope(&self) -> Result<FeeScope, FeeError> {
        Ok(FeeScope::new(AcademicYear::new(self.academic_year.as_str())?, self.term))
    }
}

/// Query parameters for a grade roster
#[derive(Debug, Deserialize, Validate)]
pub struct RosterParams {
    #[validate(length(min = 1, max = 16))]
    pub academic_year: String,
    pub term: Term,
    /// Narrows the roster to one stream
    pub stream_id: Option<String>,
    pub order: Option<RosterOrder>,
    /// Only return entries with this status; the summary still covers the whole roster
    pub status: Option<FeeStatus>,
}

impl RosterParams {
    pub fn scope(&self) -> Result<FeeScope, FeeError> {
        Ok(FeeScope::new(AcademicYear::new(self.academic_year.as_str())?, self.term))
    }
}

/// Learner fields echoed in balance responses
#[derive(Debug, Serialize)]
pub struct LearnerView {
    pub learner_id: LearnerId,
    pub admission_number: String,
    pub full_name: String,
    pub grade_id: Option<GradeId>,
    pub stream_id: Option<StreamId>,
}

impl From<&Learner> for LearnerView {
    fn from(learner: &Learner) -> Self {
        Self {
            learner_id: learner.id,
            admission_number: learner.admission_number.clone(),
            full_name: learner.full_name.clone(),
            grade_id: learner.current_grade_id,
            stream_id: learner.current_stream_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LearnerBalanceResponse {
    pub learner: LearnerView,
    pub balance: FeeBalance,
}

/// One learner's line in a roster; exactly one of `balance` and `error` is set
#[derive(Debug, Serialize)]
pub struct RosterEntryResponse {
    pub learner: LearnerView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<FeeBalance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub grade_id: GradeId,
    pub stream_id: Option<StreamId>,
    pub scope: FeeScope,
    pub order: RosterOrder,
    pub status_filter: Option<FeeStatus>,
    pub summary: RosterSummary,
    /// Percentage of the expected total collected
    pub collection_rate: Option<Decimal>,
    pub entries: Vec<RosterEntryResponse>,
}

/// Records supplied inline for a one-off balance computation
///
/// Amounts may be JSON numbers or numeric strings. Payments and invoices
/// without a `learner_id` belong to the request's learner.
#[derive(Debug, Deserialize, Validate)]
pub struct ComputeBalanceRequest {
    pub learner_id: Option<Uuid>,
    pub grade_id: Option<Uuid>,
    #[validate(length(min = 1, max = 16))]
    pub academic_year: String,
    pub term: Term,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub fee_structures: Vec<FeeStructureInput>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub payments: Vec<PaymentInput>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub invoices: Vec<InvoiceInput>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub transactions: Vec<TransactionInput>,
    /// Overrides the server's zero balance policy
    pub zero_balance_policy: Option<ZeroBalancePolicy>,
    /// Overrides the server's channel policy
    pub strict_channels: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeeStructureInput {
    pub id: Option<Uuid>,
    pub grade_id: Uuid,
    pub academic_year: String,
    pub term: Term,
    pub amount: RawAmount,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentInput {
    pub id: Option<Uuid>,
    pub learner_id: Option<Uuid>,
    pub fee_structure_id: Uuid,
    pub amount_paid: RawAmount,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_reference: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceInput {
    pub id: Uuid,
    pub learner_id: Option<Uuid>,
    pub grade_id: Uuid,
    pub academic_year: String,
    pub term: Term,
    pub status: Option<InvoiceStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionInput {
    pub id: Option<Uuid>,
    pub invoice_id: Uuid,
    pub amount_paid: RawAmount,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_reference: Option<String>,
}

/// Domain values decoded from a [`ComputeBalanceRequest`]
#[derive(Debug)]
pub struct BalanceInput {
    pub learner: Learner,
    pub scope: FeeScope,
    pub records: FeeRecords,
}

impl ComputeBalanceRequest {
    /// Decodes the request into domain records
    ///
    /// # Errors
    ///
    /// `FeeError::InvalidScope` for a blank academic year and
    /// `FeeError::Money` for a non-numeric amount.
    pub fn into_input(self) -> Result<BalanceInput, FeeError> {
        let scope = FeeScope::new(AcademicYear::new(self.academic_year)?, self.term);
        let learner_id: LearnerId = self.learner_id.map(Into::into).unwrap_or_default();
        let mut learner = Learner::new("", "").with_id(learner_id);
        learner.current_grade_id = self.grade_id.map(Into::into);

        let mut records = FeeRecords::new();

        for input in self.fee_structures {
            let structure_scope = FeeScope::new(AcademicYear::new(input.academic_year)?, input.term);
            let mut structure =
                FeeStructure::new(input.grade_id.into(), &structure_scope, input.amount.to_decimal()?);
            if let Some(id) = input.id {
                structure = structure.with_id(id.into());
            }
            records.structures.push(structure);
        }

        for input in self.payments {
            let mut payment = FeePayment::new(
                input.learner_id.map(Into::into).unwrap_or(learner_id),
                input.fee_structure_id.into(),
                input.amount_paid.to_decimal()?,
                input.payment_method.unwrap_or(PaymentMethod::Other),
            );
            if let Some(id) = input.id {
                payment.id = id.into();
            }
            payment.transaction_reference = input.transaction_reference;
            records.payments.push(payment);
        }

        for input in self.invoices {
            let invoice_scope = FeeScope::new(AcademicYear::new(input.academic_year)?, input.term);
            let mut invoice = StudentInvoice::new(
                input.learner_id.map(Into::into).unwrap_or(learner_id),
                input.grade_id.into(),
                &invoice_scope,
            )
            .with_status(input.status.unwrap_or(InvoiceStatus::Pending));
            invoice.id = input.id.into();
            records.invoices.push(invoice);
        }

        for input in self.transactions {
            let mut transaction = FeeTransaction::new(
                input.invoice_id.into(),
                input.amount_paid.to_decimal()?,
                input.payment_method.unwrap_or(PaymentMethod::Other),
            );
            if let Some(id) = input.id {
                transaction.id = id.into();
            }
            transaction.transaction_reference = input.transaction_reference;
            records.transactions.push(transaction);
        }

        Ok(BalanceInput {
            learner,
            scope,
            records,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ComputeBalanceResponse {
    pub balance: FeeBalance,
    pub reconciliation: ReconciliationReport,
}
