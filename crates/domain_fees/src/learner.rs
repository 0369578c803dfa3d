//! Learner records as seen by the fees domain

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{GradeId, LearnerId, PortError, StreamId};

/// Enrolment status of a learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnerStatus {
    Active,
    Transferred,
    Alumni,
}

impl LearnerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearnerStatus::Active => "active",
            LearnerStatus::Transferred => "transferred",
            LearnerStatus::Alumni => "alumni",
        }
    }
}

impl fmt::Display for LearnerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearnerStatus {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(LearnerStatus::Active),
            "transferred" => Ok(LearnerStatus::Transferred),
            "alumni" => Ok(LearnerStatus::Alumni),
            other => Err(PortError::transformation(format!("unknown learner status '{}'", other))),
        }
    }
}

/// A learner enrolled (or formerly enrolled) at the school
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Learner {
    /// Unique identifier
    pub id: LearnerId,
    /// School-issued admission number
    pub admission_number: String,
    /// Display name
    pub full_name: String,
    /// Grade the learner is currently placed in, if any
    pub current_grade_id: Option<GradeId>,
    /// Stream (class section) within the grade, if any
    pub current_stream_id: Option<StreamId>,
    /// Enrolment status
    pub status: LearnerStatus,
}

impl Learner {
    /// Creates an active learner without a grade placement
    pub fn new(admission_number: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: LearnerId::new_v7(),
            admission_number: admission_number.into(),
            full_name: full_name.into(),
            current_grade_id: None,
            current_stream_id: None,
            status: LearnerStatus::Active,
        }
    }

    pub fn with_id(mut self, id: LearnerId) -> Self {
        self.id = id;
        self
    }

    pub fn with_grade(mut self, grade_id: GradeId) -> Self {
        self.current_grade_id = Some(grade_id);
        self
    }

    pub fn with_stream(mut self, stream_id: StreamId) -> Self {
        self.current_stream_id = Some(stream_id);
        self
    }

    pub fn with_status(mut self, status: LearnerStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == LearnerStatus::Active
    }
}
