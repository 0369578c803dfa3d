//! Domain Adapters
//!
//! Implementations of domain ports on top of the repository layer.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresFeeLedger;
//! use domain_fees::FeeLedgerPort;
//!
//! let ledger = PostgresFeeLedger::new(pool);
//! let learner = ledger.get_learner(learner_id).await?;
//! ```

pub mod fees;

pub use fees::PostgresFeeLedger;
