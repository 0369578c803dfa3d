//! Fees domain errors

use core_kernel::{MoneyError, PortError};
use thiserror::Error;

/// Errors that can occur in the fees domain
#[derive(Debug, Error)]
pub enum FeeError {
    /// Scope values (academic year, term) were malformed
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    /// Stored records violate a bookkeeping invariant
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// The same external payment reference was counted in both payment channels
    #[error("Payment reference '{reference}' appears in both direct payments and invoice transactions")]
    ChannelOverlap {
        reference: String,
    },

    /// Amount parsing or arithmetic failed
    #[error("Amount error: {0}")]
    Money(#[from] MoneyError),

    /// The fee ledger could not be read
    #[error("Ledger error: {0}")]
    Port(#[from] PortError),
}

impl FeeError {
    pub fn data_integrity(message: impl Into<String>) -> Self {
        FeeError::DataIntegrity(message.into())
    }

    /// Returns true if the underlying ledger reported a missing record
    pub fn is_not_found(&self) -> bool {
        matches!(self, FeeError::Port(e) if e.is_not_found())
    }

    /// Returns true if the failure came from the ledger and may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, FeeError::Port(e) if e.is_transient())
    }
}
