use serde::{Deserialize, Serialize};

use super::chart::ChartRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The record must not be trusted downstream.
    Error,
    /// Suspicious but not disqualifying.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation observation. Returned as data, never raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub severity: Severity,

    /// Path of the offending field, e.g. `categories` or `series[Revenue]`.
    pub field: String,

    pub message: String,
}

impl ValidationFinding {
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.field, self.message)
    }
}

/// A normalized record together with everything the validator found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub record: ChartRecord,
    pub findings: Vec<ValidationFinding>,
    /// True iff no finding has `Severity::Error`.
    pub is_valid: bool,
}

impl ValidationResult {
    /// Build a result, deriving `is_valid` from the findings.
    pub fn new(record: ChartRecord, findings: Vec<ValidationFinding>) -> Self {
        let is_valid = !findings.iter().any(ValidationFinding::is_error);
        Self {
            record,
            findings,
            is_valid,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }
}
