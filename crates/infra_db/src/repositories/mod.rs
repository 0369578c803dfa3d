//! Repository implementations
//!
//! Repositories own the SQL and map rows to plain row structs. Mapping to
//! domain types is left to the adapters.

pub mod fees;

pub use fees::FeeRepository;
