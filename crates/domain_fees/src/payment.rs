//! Direct fee payments
//!
//! The original payment channel: a payment recorded straight against a fee
//! structure.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{FeePaymentId, FeeStructureId, LearnerId, PortError};

use crate::error::FeeError;

/// How money reached the school
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
    BankTransfer,
    Cheque,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::MobileMoney => "mobile_money",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "mobile_money" | "mpesa" => Ok(PaymentMethod::MobileMoney),
            "bank_transfer" | "bank" => Ok(PaymentMethod::BankTransfer),
            "cheque" | "check" => Ok(PaymentMethod::Cheque),
            "other" => Ok(PaymentMethod::Other),
            other => Err(PortError::transformation(format!("unknown payment method '{}'", other))),
        }
    }
}

/// A payment applied directly against a fee structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePayment {
    /// Unique identifier
    pub id: FeePaymentId,
    /// Learner the payment was made for
    pub learner_id: LearnerId,
    /// Fee structure the payment was applied against
    pub fee_structure_id: FeeStructureId,
    /// Amount received
    pub amount_paid: Decimal,
    /// Payment method
    pub payment_method: PaymentMethod,
    /// External reference (receipt number, mobile-money code)
    pub transaction_reference: Option<String>,
    /// When the payment was received
    pub paid_at: DateTime<Utc>,
}

impl FeePayment {
    pub fn new(
        learner_id: LearnerId,
        fee_structure_id: FeeStructureId,
        amount_paid: Decimal,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            id: FeePaymentId::new_v7(),
            learner_id,
            fee_structure_id,
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

    /// Checks the recorded amount can be counted toward a balance
    pub fn validate(&self) -> Result<(), FeeError> {
        if self.amount_paid < Decimal::ZERO {
            return Err(FeeError::data_integrity(format!(
                "fee payment {} has negative amount {}",
                self.id, self.amount_paid
            )));
        }
        Ok(())
    }
}

/// Trims and upper-cases a reference; blank references compare as absent
pub(crate) fn normalize_reference(reference: Option<&str>) -> Option<String> {
    reference
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_ascii_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_reference() {
        assert_eq!(normalize_reference(Some("  qk71abc ")), Some("QK71ABC".to_string()));
        assert_eq!(normalize_reference(Some("   ")), None);
        assert_eq!(normalize_reference(None), None);
    }

    #[test]
    fn test_payment_method_aliases() {
        assert_eq!("MPESA".parse::<PaymentMethod>().unwrap(), PaymentMethod::MobileMoney);
        assert!("barter".parse::<PaymentMethod>().is_err());
    }
}
