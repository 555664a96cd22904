use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Inclusive numeric window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceBand {
    pub min: f64,
    pub max: f64,
}

impl ToleranceBand {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Tunable thresholds for validation.
///
/// Every field has a default, so a partial JSON document such as
/// `{"min_confidence": 0.5}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSettings {
    /// Window the first pie series must sum into when its values are
    /// percentages.
    pub pie_sum_tolerance: ToleranceBand,

    /// Detection confidence below this is reported as a warning.
    pub min_confidence: f64,

    /// Metadata keys that may declare the unit of a pie chart's values.
    /// A non-percentage unit under any of them means raw magnitudes.
    pub unit_keys: Vec<String>,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            pie_sum_tolerance: ToleranceBand::new(90.0, 110.0),
            min_confidence: 0.7,
            unit_keys: vec!["unit".to_string(), "units".to_string(), "value_unit".to_string()],
        }
    }
}

impl ValidatorSettings {
    /// Parse settings from a JSON document and check them.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: ValidatorSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_pie_tolerance(mut self, min: f64, max: f64) -> Self {
        self.pie_sum_tolerance = ToleranceBand::new(min, max);
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let band = self.pie_sum_tolerance;
        if !band.min.is_finite() || !band.max.is_finite() {
            return Err(CoreError::InvalidSettings(
                "pie_sum_tolerance bounds must be finite".into(),
            ));
        }
        if band.min > band.max {
            return Err(CoreError::InvalidSettings(format!(
                "pie_sum_tolerance min ({}) is greater than max ({})",
                band.min, band.max
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(CoreError::InvalidSettings(format!(
                "min_confidence must be between 0 and 1, got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}
