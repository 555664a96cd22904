use serde_json::Value;
use tracing::debug;

use crate::models::chart::{ChartKind, ChartRecord};
use crate::models::detection::DetectionResult;
use crate::models::field::{coerce_number, scalar_label};
use crate::models::raw::RawResponse;
use crate::models::settings::ValidatorSettings;
use crate::models::validation::ValidationFinding;

const TYPE_KEYS: &[&str] = &["chart_type", "kind", "type"];
/// Legitimate answers that are not one of the chart kinds.
const NON_CHART_TYPES: &[&str] = &["other", "unknown", "table"];

/// Normalizes and checks chart-type detection responses.
pub struct DetectionService {
    settings: ValidatorSettings,
}

impl DetectionService {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self { settings }
    }

    /// Read a detection response. Never fails: anything unreadable is left
    /// empty and shows up in [`DetectionService::validate`].
    pub fn normalize(&self, raw: &RawResponse) -> DetectionResult {
        let Some(map) = raw.as_object() else {
            return DetectionResult::unknown();
        };

        let raw_kind = TYPE_KEYS
            .iter()
            .find_map(|k| map.get(*k))
            .and_then(scalar_label)
            .filter(|s| !s.is_empty());
        let kind = raw_kind
            .as_deref()
            .and_then(ChartKind::parse_loose)
            .unwrap_or(ChartKind::Unknown);
        let text = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let detection = DetectionResult {
            kind,
            raw_kind,
            confidence: map.get("confidence").and_then(coerce_number),
            orientation: text("orientation"),
            reasoning: text("reasoning"),
        };
        debug!(kind = %detection.kind, confidence = ?detection.confidence, "normalized detection");
        detection
    }

    /// Check a detection for completeness and plausibility.
    pub fn validate(&self, detection: &DetectionResult) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        match &detection.raw_kind {
            None => findings.push(ValidationFinding::error("chart_type", "missing chart type")),
            Some(raw) if detection.kind == ChartKind::Unknown => {
                let lower = raw.trim().to_lowercase();
                if !NON_CHART_TYPES.contains(&lower.as_str()) {
                    findings.push(ValidationFinding::warning(
                        "chart_type",
                        format!("unrecognized chart type '{raw}'"),
                    ));
                }
            }
            Some(_) => {}
        }

        match detection.confidence {
            None => findings.push(ValidationFinding::error("confidence", "missing confidence")),
            Some(c) if !(0.0..=1.0).contains(&c) => findings.push(ValidationFinding::error(
                "confidence",
                format!("confidence {c} is not between 0 and 1"),
            )),
            Some(c) if c < self.settings.min_confidence => {
                findings.push(ValidationFinding::warning(
                    "confidence",
                    format!(
                        "confidence {c} below threshold {}",
                        self.settings.min_confidence
                    ),
                ))
            }
            Some(_) => {}
        }

        findings
    }

    /// Compare the detected kind with the kind of the extracted record.
    /// Only flags a mismatch when both sides are classified.
    pub fn check_consistency(
        &self,
        detection: &DetectionResult,
        record: &ChartRecord,
    ) -> Option<ValidationFinding> {
        let (detected, extracted) = (detection.kind, record.kind);
        if detected == ChartKind::Unknown || extracted == ChartKind::Unknown || detected == extracted {
            return None;
        }
        Some(ValidationFinding::warning(
            "kind",
            format!("chart type mismatch: detected={detected}, extracted={extracted}"),
        ))
    }
}

impl Default for DetectionService {
    fn default() -> Self {
        Self::new(ValidatorSettings::default())
    }
}
