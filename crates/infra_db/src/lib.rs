//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the school fees system using SQLx.
//!
//! # Architecture
//!
//! - `repositories`: row types and SQL, one repository per table group
//! - `adapters`: domain port implementations built on the repositories
//!
//! Queries are checked at runtime (`query_as` with `FromRow` rows), so the
//! crate builds without a live database.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PostgresFeeLedger};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/school_fees")).await?;
//! let ledger = PostgresFeeLedger::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use repositories::FeeRepository;
pub use adapters::PostgresFeeLedger;
