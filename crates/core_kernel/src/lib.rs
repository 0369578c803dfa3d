//! Core Kernel - Foundational types for the school fees workspace
//!
//! This crate provides the building blocks shared by every other crate:
//! - Decimal amount handling that refuses to coerce malformed values
//! - Strongly-typed identifiers
//! - Port traits and the common port error type

pub mod money;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{MoneyError, RawAmount};
pub use identifiers::{
    LearnerId, GradeId, StreamId,
    FeeStructureId, FeePaymentId, FeeTransactionId, InvoiceId,
};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use error::CoreError;
