pub mod errors;
pub mod models;
pub mod services;

use chrono::Utc;
use models::{
    analytics::ChartSummary,
    answer::QuestionAnswer,
    chart::{ChartKind, ChartRecord},
    detection::DetectionResult,
    raw::RawResponse,
    report::AnalysisReport,
    settings::ValidatorSettings,
    validation::{ValidationFinding, ValidationResult},
};
use services::{
    analytics_service::AnalyticsService, detection_service::DetectionService,
    export::ExportAdapter, normalizer::ResponseNormalizer, validator::ConsistencyValidator,
};
use tracing::info;

use errors::CoreError;

/// Main entry point for the Chart Insight core library.
///
/// Takes completed vision-model responses and turns them into validated,
/// exportable chart records. Holds only immutable settings, so a single
/// instance can serve concurrent callers.
#[must_use]
pub struct ChartInsight {
    settings: ValidatorSettings,
    normalizer: ResponseNormalizer,
    validator: ConsistencyValidator,
    detection_service: DetectionService,
    analytics_service: AnalyticsService,
    export: ExportAdapter,
}

impl std::fmt::Debug for ChartInsight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartInsight")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChartInsight {
    /// Create an instance with default thresholds.
    pub fn new() -> Self {
        Self::build(ValidatorSettings::default())
    }

    /// Create an instance with custom thresholds.
    pub fn with_settings(settings: ValidatorSettings) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    /// Create an instance from a JSON settings document.
    pub fn from_settings_json(json: &str) -> Result<Self, CoreError> {
        Ok(Self::build(ValidatorSettings::from_json(json)?))
    }

    fn build(settings: ValidatorSettings) -> Self {
        Self {
            normalizer: ResponseNormalizer::new(),
            validator: ConsistencyValidator::with_settings(settings.clone()),
            detection_service: DetectionService::new(settings.clone()),
            analytics_service: AnalyticsService::new(),
            export: ExportAdapter::new(),
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    // ── Extraction ──────────────────────────────────────────────────

    /// Normalize a raw extraction response without validating it.
    pub fn normalize(&self, raw: &RawResponse, hint: Option<ChartKind>) -> ChartRecord {
        self.normalizer.normalize(raw, hint)
    }

    /// Validate an already-normalized record.
    pub fn validate(&self, record: &ChartRecord) -> ValidationResult {
        self.validator.validate(record)
    }

    /// Normalize and validate a raw extraction response.
    pub fn process(&self, raw: &RawResponse, hint: Option<ChartKind>) -> ValidationResult {
        let record = self.normalizer.normalize(raw, hint);
        self.validator.validate_owned(record)
    }

    /// Normalize and validate model output text.
    pub fn process_text(&self, text: &str, hint: Option<ChartKind>) -> ValidationResult {
        self.process(&RawResponse::Text(text.to_string()), hint)
    }

    // ── Detection & question answering ─────────────────────────────

    /// Read a detection response and check it.
    pub fn detect(&self, raw: &RawResponse) -> (DetectionResult, Vec<ValidationFinding>) {
        let detection = self.detection_service.normalize(raw);
        let findings = self.detection_service.validate(&detection);
        (detection, findings)
    }

    /// Read the model's answer to a question about a chart.
    #[must_use]
    pub fn answer(&self, raw: &RawResponse) -> QuestionAnswer {
        QuestionAnswer::from_raw(raw)
    }

    // ── Full analysis ───────────────────────────────────────────────

    /// Run a complete analysis: optional detection, then extraction using
    /// the detected kind as a hint, validation, consistency between the
    /// two, and a summary.
    pub fn analyze(&self, detection: Option<&RawResponse>, extraction: &RawResponse) -> AnalysisReport {
        let (detection, mut detection_findings) = match detection {
            Some(raw) => {
                let (d, f) = self.detect(raw);
                (Some(d), f)
            }
            None => (None, Vec::new()),
        };

        let hint = detection
            .as_ref()
            .map(|d| d.kind)
            .filter(|k| *k != ChartKind::Unknown);
        let result = self.process(extraction, hint);

        if let Some(d) = &detection {
            detection_findings.extend(self.detection_service.check_consistency(d, &result.record));
        }

        let summary = self.analytics_service.summarize(&result.record);
        let report = AnalysisReport {
            id: uuid::Uuid::new_v4(),
            generated_at: Utc::now(),
            detection,
            detection_findings,
            result,
            summary,
        };

        info!(
            id = %report.id,
            kind = %report.result.record.kind,
            valid = report.is_valid(),
            findings = report.all_findings().count(),
            "chart analysis complete"
        );
        report
    }

    // ── Analytics & export ──────────────────────────────────────────

    #[must_use]
    pub fn summarize(&self, record: &ChartRecord) -> ChartSummary {
        self.analytics_service.summarize(record)
    }

    pub fn export_json(&self, result: &ValidationResult) -> Result<String, CoreError> {
        self.export.to_json(result)
    }

    pub fn export_report_json(&self, report: &AnalysisReport) -> Result<String, CoreError> {
        serde_json::to_string_pretty(report).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    pub fn export_csv(&self, record: &ChartRecord) -> Result<String, CoreError> {
        self.export.to_csv(record)
    }
}

impl Default for ChartInsight {
    fn default() -> Self {
        Self::new()
    }
}
