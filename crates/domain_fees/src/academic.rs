//! Academic calendar dimensions used to scope fees
//!
//! A fee scope is an academic year paired with one of the three school terms.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FeeError;

/// One of the three terms of a school year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    #[serde(rename = "term_1")]
    Term1,
    #[serde(rename = "term_2")]
    Term2,
    #[serde(rename = "term_3")]
    Term3,
}

impl Term {
    /// Returns the stored form (`term_1`, `term_2`, `term_3`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Term::Term1 => "term_1",
            Term::Term2 => "term_2",
            Term::Term3 => "term_3",
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Term {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "term_1" => Ok(Term::Term1),
            "term_2" => Ok(Term::Term2),
            "term_3" => Ok(Term::Term3),
            other => Err(FeeError::InvalidScope(format!("unknown term '{}'", other))),
        }
    }
}

/// An academic year label such as `"2024"`
///
/// The label is free-form but never empty; surrounding whitespace is dropped
/// so that `" 2024"` and `"2024"` scope the same records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AcademicYear(String);

impl AcademicYear {
    pub fn new(value: impl Into<String>) -> Result<Self, FeeError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(FeeError::InvalidScope("academic year must not be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AcademicYear {
    type Error = FeeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AcademicYear> for String {
    fn from(year: AcademicYear) -> String {
        year.0
    }
}

impl FromStr for AcademicYear {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The (academic year, term) pair a balance is computed for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeScope {
    pub academic_year: AcademicYear,
    pub term: Term,
}

impl FeeScope {
    pub fn new(academic_year: AcademicYear, term: Term) -> Self {
        Self { academic_year, term }
    }

    /// Builds a scope from its stored string forms
    pub fn parse(academic_year: &str, term: &str) -> Result<Self, FeeError> {
        Ok(Self::new(academic_year.parse()?, term.parse()?))
    }

    /// Returns true if the given year and term fall in this scope
    pub fn contains(&self, academic_year: &AcademicYear, term: Term) -> bool {
        self.academic_year == *academic_year && self.term == term
    }
}

impl fmt::Display for FeeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.academic_year, self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_wire_form() {
        assert_eq!(serde_json::to_string(&Term::Term2).unwrap(), "\"term_2\"");
        let parsed: Term = serde_json::from_str("\"term_3\"").unwrap();
        assert_eq!(parsed, Term::Term3);
    }

    #[test]
    fn test_term_parse_rejects_unknown() {
        assert!("term_4".parse::<Term>().is_err());
        assert!("1".parse::<Term>().is_err());
        assert_eq!(" TERM_1 ".parse::<Term>().unwrap(), Term::Term1);
    }

    #[test]
    fn test_academic_year_trims_and_rejects_empty() {
        assert_eq!(AcademicYear::new(" 2024 ").unwrap().as_str(), "2024");
        assert!(AcademicYear::new("   ").is_err());
        assert!(serde_json::from_str::<AcademicYear>("\"\"").is_err());
    }

    #[test]
    fn test_scope_contains() {
        let scope = FeeScope::parse("2024", "term_1").unwrap();
        assert!(scope.contains(&AcademicYear::new("2024").unwrap(), Term::Term1));
        assert!(!scope.contains(&AcademicYear::new("2024").unwrap(), Term::Term2));
        assert!(!scope.contains(&AcademicYear::new("2025").unwrap(), Term::Term1));
    }
}
