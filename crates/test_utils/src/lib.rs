//! Test Utilities Crate
//!
//! Shared test infrastructure for the school fees workspace.
//!
//! # Modules
//!
//! - `fixtures`: Fixed scopes, amounts and the reference balance scenarios
//! - `builders`: Builders for learners, single fee accounts and whole rosters
//! - `database`: PostgreSQL test containers with the workspace schema
//! - `assertions`: Balance and roster consistency checks
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
