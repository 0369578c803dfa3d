//! Fee structures
//!
//! A fee structure is the configured expected amount for a grade in one
//! (academic year, term) scope.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{FeeStructureId, GradeId};

use crate::academic::{AcademicYear, FeeScope, Term};
use crate::error::FeeError;

/// The expected fee for a grade in a given year and term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStructure {
    /// Unique identifier
    pub id: FeeStructureId,
    /// Grade the fee applies to
    pub grade_id: GradeId,
    /// Academic year
    pub academic_year: AcademicYear,
    /// Term within the year
    pub term: Term,
    /// Expected amount (never negative)
    pub amount: Decimal,
    /// Optional description (e.g. "Tuition and lunch")
    pub description: Option<String>,
}

impl FeeStructure {
    /// Creates a new fee structure
    ///
    /// # Arguments
    ///
    /// * `grade_id` - Grade being billed
    /// * `scope` - Academic year and term
    /// * `amount` - Expected fee amount
    pub fn new(grade_id: GradeId, scope: &FeeScope, amount: Decimal) -> Self {
        Self {
            id: FeeStructureId::new_v7(),
            grade_id,
            academic_year: scope.academic_year.clone(),
            term: scope.term,
            amount,
            description: None,
        }
    }

    pub fn with_id(mut self, id: FeeStructureId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true if this structure applies to the grade in the given scope
    pub fn matches(&self, grade_id: GradeId, scope: &FeeScope) -> bool {
        self.grade_id == grade_id && scope.contains(&self.academic_year, self.term)
    }

    /// Checks the stored amount is usable as an expected fee
    pub fn validate(&self) -> Result<(), FeeError> {
        if self.amount < Decimal::ZERO {
            return Err(FeeError::data_integrity(format!(
                "fee structure {} has negative amount {}",
                self.id, self.amount
            )));
        }
        Ok(())
    }
}
