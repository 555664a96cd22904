use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::analytics::ChartSummary;
use super::detection::DetectionResult;
use super::validation::{ValidationFinding, ValidationResult};

/// Everything produced for one analysis request: the optional type
/// detection, the validated extraction and its summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: Uuid,

    pub generated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection: Option<DetectionResult>,

    /// Findings about the detection itself and its agreement with the
    /// extraction
    #[serde(default)]
    pub detection_findings: Vec<ValidationFinding>,

    pub result: ValidationResult,

    pub summary: ChartSummary,
}

impl AnalysisReport {
    /// True iff neither the extraction nor the detection carries an error.
    pub fn is_valid(&self) -> bool {
        self.result.is_valid && !self.detection_findings.iter().any(ValidationFinding::is_error)
    }

    pub fn all_findings(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.detection_findings.iter().chain(self.result.findings.iter())
    }
}
