//! Fees Domain - Learner Fee Balance Reconciliation
//!
//! This crate answers one question for a learner in an academic year and
//! term: how much was expected, how much has been paid, what is still owed,
//! and whether the account is paid, partially paid or pending.
//!
//! # Payment Channels
//!
//! Money reaches a learner's account through two independent channels:
//! - **Direct payments**: recorded against a fee structure
//! - **Invoice transactions**: recorded against a student invoice
//!
//! Both channels count toward the amount paid. [`reconcile`] reports
//! references that appear in both, and [`ChannelPolicy::RejectOverlap`]
//! refuses to compute such a balance.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_fees::{compute_balance, FeeRecords, FeeScope, FeeStructure, Learner};
//!
//! let scope = FeeScope::parse("2024", "term_1")?;
//! let learner = Learner::new("ADM-001", "Amani Otieno").with_grade(grade_id);
//! let records = FeeRecords::new().with_structure(FeeStructure::new(grade_id, &scope, dec!(15000)));
//!
//! let balance = compute_balance(&learner, &scope, &records)?;
//! assert_eq!(balance.balance, dec!(15000));
//! ```

pub mod academic;
pub mod learner;
pub mod fee_structure;
pub mod payment;
pub mod transaction;
pub mod invoice;
pub mod records;
pub mod balance;
pub mod reconciliation;
pub mod ports;
pub mod roster;
pub mod summary;
pub mod error;

pub use academic::{AcademicYear, FeeScope, Term};
pub use learner::{Learner, LearnerStatus};
pub use fee_structure::FeeStructure;
pub use payment::{FeePayment, PaymentMethod};
pub use transaction::FeeTransaction;
pub use invoice::{InvoiceStatus, StudentInvoice};
pub use records::{FeeRecords, ScopedRecords};
pub use balance::{compute_balance, BalanceCalculator, ChannelPolicy, FeeBalance, FeeStatus, ZeroBalancePolicy};
pub use reconciliation::{reconcile, ReconciliationIssue, ReconciliationReport};
pub use ports::FeeLedgerPort;
pub use roster::{RosterEntry, RosterOrder, RosterQuery, RosterReport, RosterService, RosterSettings};
pub use summary::RosterSummary;
pub use error::FeeError;
