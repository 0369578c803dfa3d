//! Invoice-backed fee transactions
//!
//! The newer payment channel: money recorded against a student invoice.
//! Whether a transaction counts toward a scope is decided by the invoice it
//! references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{FeeTransactionId, InvoiceId};

use crate::error::FeeError;
use crate::payment::{normalize_reference, PaymentMethod};

/// A payment recorded against a student invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTransaction {
    pub id: FeeTransactionId,
    /// Invoice the money was applied to
    pub invoice_id: InvoiceId,
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
    /// External reference (receipt number, mobile-money code)
    pub transaction_reference: Option<String>,
    pub paid_at: DateTime<Utc>,
}

impl FeeTransaction {
    pub fn new(invoice_id: InvoiceId, amount_paid: Decimal, payment_method: PaymentMethod) -> Self {
        Self {
            id: FeeTransactionId::new_v7(),
            invoice_id,
            amount_paid,
            payment_method,
            transaction_reference: None,
            paid_at: Utc::now(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.transaction_reference = Some(reference.into());
        self
    }

    pub fn with_paid_at(mut self, paid_at: DateTime<Utc>) -> Self {
        self.paid_at = paid_at;
        self
    }

    /// Reference normalised for cross-channel comparison
    pub fn normalized_reference(&self) -> Option<String> {
        normalize_reference(self.transaction_reference.as_deref())
    }

    pub fn validate(&self) -> Result<(), FeeError> {
        if self.amount_paid < Decimal::ZERO {
            return Err(FeeError::data_integrity(format!(
                "fee transaction {} has negative amount {}",
                self.id, self.amount_paid
            )));
        }
        Ok(())
    }
}
