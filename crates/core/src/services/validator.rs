use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::models::chart::{ChartKind, ChartRecord, PERCENTAGE_SERIES_LABEL};
use crate::models::settings::ValidatorSettings;
use crate::models::validation::{ValidationFinding, ValidationResult};

/// Checks cross-field invariants of a normalized [`ChartRecord`].
///
/// Every rule runs independently and all findings are collected. The
/// validator is deterministic and holds no mutable state, so one instance
/// can be shared across threads.
///
/// `Unknown` records only get the kind-independent checks (emptiness and
/// series content); the shape rules need a known kind to mean anything.
#[derive(Debug, Clone, Default)]
pub struct ConsistencyValidator {
    settings: ValidatorSettings,
}

impl ConsistencyValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ValidatorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    /// Validate a record, keeping a copy of it in the result.
    pub fn validate(&self, record: &ChartRecord) -> ValidationResult {
        self.validate_owned(record.clone())
    }

    /// Validate a record, moving it into the result.
    pub fn validate_owned(&self, record: ChartRecord) -> ValidationResult {
        let findings = self.findings(&record);
        let result = ValidationResult::new(record, findings);

        if result.is_valid {
            debug!(
                kind = %result.record.kind,
                warnings = result.findings.len(),
                "chart record passed validation"
            );
        } else {
            warn!(
                kind = %result.record.kind,
                errors = result.errors().count(),
                warnings = result.warnings().count(),
                "chart record failed validation"
            );
        }
        result
    }

    /// Run every rule and collect the findings in rule order.
    pub fn findings(&self, record: &ChartRecord) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();
        let shaped = record.kind != ChartKind::Unknown;

        if shaped {
            check_shape(record, &mut findings);
            check_alignment(record, &mut findings);
            if record.kind == ChartKind::Pie {
                self.check_pie_sum(record, &mut findings);
            }
            if matches!(record.kind, ChartKind::Pie | ChartKind::Area) {
                check_non_negative(record, &mut findings);
            }
        }
        check_emptiness(record, &mut findings);

        if shaped {
            check_duplicate_categories(record, &mut findings);
        }
        check_series_content(record, &mut findings);
        check_kind_hint(record, &mut findings);

        findings
    }

    /// True when a unit field declares the pie's values to be raw
    /// magnitudes rather than percentages.
    fn declares_raw_magnitudes(&self, record: &ChartRecord) -> bool {
        self.settings.unit_keys.iter().any(|key| {
            record.metadata_value(key).is_some_and(|unit| {
                let unit = unit.trim().to_lowercase();
                !unit.is_empty() && !unit.contains('%') && !unit.contains("percent")
            })
        })
    }

    /// Numeric sanity for pie charts: the first series should sum to about
    /// 100 when it holds percentages, and to something positive when it
    /// holds raw magnitudes. A series labelled `percentage` always holds
    /// percentages, whatever the unit says.
    fn check_pie_sum(&self, record: &ChartRecord, findings: &mut Vec<ValidationFinding>) {
        let Some(first) = record.series.first() else {
            return;
        };
        let sum: f64 = first.numeric_values().sum();
        let field = series_field(&first.label);

        if first.label != PERCENTAGE_SERIES_LABEL && self.declares_raw_magnitudes(record) {
            if sum <= 0.0 {
                findings.push(ValidationFinding::warning(
                    field,
                    format!("non-positive total {sum} for raw magnitude pie chart"),
                ));
            }
            return;
        }

        let band = self.settings.pie_sum_tolerance;
        if !band.contains(sum) {
            findings.push(ValidationFinding::warning(
                field,
                format!(
                    "percentage sum out of tolerance: {sum} not in [{}, {}]",
                    band.min, band.max
                ),
            ));
        }
    }
}

fn series_field(label: &str) -> String {
    format!("series[{label}]")
}

/// Category-positioned kinds need an axis once they have data.
fn check_shape(record: &ChartRecord, findings: &mut Vec<ValidationFinding>) {
    if record.kind.requires_categories() && record.categories.is_none() && !record.series.is_empty() {
        findings.push(ValidationFinding::error(
            "categories",
            format!("missing categories for {} chart", record.kind),
        ));
    }
}

/// Every series must have exactly one value per category.
fn check_alignment(record: &ChartRecord, findings: &mut Vec<ValidationFinding>) {
    let Some(categories) = &record.categories else {
        return;
    };
    for series in &record.series {
        if series.len() != categories.len() {
            findings.push(ValidationFinding::error(
                series_field(&series.label),
                format!(
                    "series '{}' has {} values but there are {} categories",
                    series.label,
                    series.len(),
                    categories.len()
                ),
            ));
        }
    }
}

fn check_non_negative(record: &ChartRecord, findings: &mut Vec<ValidationFinding>) {
    for series in &record.series {
        let negatives = series.numeric_values().filter(|v| *v < 0.0).count();
        if negatives > 0 {
            findings.push(ValidationFinding::warning(
                series_field(&series.label),
                format!(
                    "{negatives} negative value(s) in {} chart series '{}'",
                    record.kind, series.label
                ),
            ));
        }
    }
}

fn check_emptiness(record: &ChartRecord, findings: &mut Vec<ValidationFinding>) {
    if record.series.is_empty() {
        findings.push(ValidationFinding::error("series", "no data extracted"));
    }
}

fn check_duplicate_categories(record: &ChartRecord, findings: &mut Vec<ValidationFinding>) {
    let Some(categories) = &record.categories else {
        return;
    };
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for label in categories.labels().iter().filter(|l| !l.is_empty()) {
        if !seen.insert(label.as_str()) {
            duplicates.insert(label.as_str());
        }
    }
    if !duplicates.is_empty() {
        let list: Vec<&str> = duplicates.into_iter().collect();
        findings.push(ValidationFinding::warning(
            "categories",
            format!("duplicate categories: {}", list.join(", ")),
        ));
    }
}

fn check_series_content(record: &ChartRecord, findings: &mut Vec<ValidationFinding>) {
    for series in &record.series {
        if series.is_all_missing() {
            findings.push(ValidationFinding::warning(
                series_field(&series.label),
                format!("series '{}' has no numeric values", series.label),
            ));
        }
    }
}

fn check_kind_hint(record: &ChartRecord, findings: &mut Vec<ValidationFinding>) {
    if let Some(hint) = record.kind_hint {
        findings.push(ValidationFinding::warning(
            "kind",
            format!("response declared a {} chart but {hint} was expected", record.kind),
        ));
    }
}
