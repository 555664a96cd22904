use serde::{Deserialize, Serialize};

use super::chart::ChartKind;

/// What the model said about the chart's type, before any extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Classified kind; `Unknown` when missing or unrecognized.
    pub kind: ChartKind,

    /// The type string exactly as the model wrote it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_kind: Option<String>,

    /// Model-reported confidence, if it could be read as a number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// e.g. "vertical" / "horizontal" for bar charts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl DetectionResult {
    pub fn unknown() -> Self {
        Self {
            kind: ChartKind::Unknown,
            raw_kind: None,
            confidence: None,
            orientation: None,
            reasoning: None,
        }
    }
}
