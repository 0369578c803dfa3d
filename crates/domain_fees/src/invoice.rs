//! Student invoices
//!
//! An invoice scopes a learner to a grade, academic year and term. Fee
//! transactions are brought into a scope through the invoice they reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{GradeId, InvoiceId, LearnerId, PortError};

use crate::academic::{AcademicYear, FeeScope, Term};

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Issued, nothing paid yet
    Pending,
    /// Partial payment received
    Partial,
    /// Fully paid
    Paid,
    /// Voided; never brings transactions into scope
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(InvoiceStatus::Pending),
            "partial" => Ok(InvoiceStatus::Partial),
            "paid" => Ok(InvoiceStatus::Paid),
            "cancelled" | "canceled" => Ok(InvoiceStatus::Cancelled),
            other => Err(PortError::transformation(format!("unknown invoice status '{}'", other))),
        }
    }
}

/// A billing document for one learner in one grade, year and term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInvoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Invoice number (human-readable)
    pub invoice_number: String,
    /// Learner being billed
    pub learner_id: LearnerId,
    /// Grade the learner was billed under
    pub grade_id: GradeId,
    /// Academic year
    pub academic_year: AcademicYear,
    /// Term within the year
    pub term: Term,
    /// Status
    pub status: InvoiceStatus,
    /// Issue timestamp
    pub issued_at: DateTime<Utc>,
}

impl StudentInvoice {
    /// Creates a new pending invoice
    ///
    /// # Arguments
    ///
    /// * `learner_id` - Learner being billed
    /// * `grade_id` - Grade the learner is billed under
    /// * `scope` - Academic year and term
    pub fn new(learner_id: LearnerId, grade_id: GradeId, scope: &FeeScope) -> Self {
        Self {
            id: InvoiceId::new_v7(),
            invoice_number: generate_invoice_number(),
            learner_id,
            grade_id,
            academic_year: scope.academic_year.clone(),
            term: scope.term,
            status: InvoiceStatus::Pending,
            issued_at: Utc::now(),
        }
    }

    pub fn with_invoice_number(mut self, invoice_number: impl Into<String>) -> Self {
        self.invoice_number = invoice_number.into();
        self
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == InvoiceStatus::Cancelled
    }

    /// Returns true if this invoice places transactions in the learner's scope
    pub fn matches(&self, learner_id: LearnerId, grade_id: GradeId, scope: &FeeScope) -> bool {
        !self.is_cancelled()
            && self.learner_id == learner_id
            && self.grade_id == grade_id
            && scope.contains(&self.academic_year, self.term)
    }
}

/// Generates an invoice number of the form `INV-` followed by a year and a random suffix
fn generate_invoice_number() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("INV-{}-{}", Utc::now().format("%Y"), suffix[..8].to_uppercase())
}
