use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::field::{coerce_number, stringify};
use super::raw::RawResponse;

/// The model's answer to a natural-language question about a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub answer: String,

    /// Data points or visual elements the model cited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,

    /// In [0, 1]; out-of-range values are dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl QuestionAnswer {
    /// Normalize a raw answer response.
    ///
    /// Prose with no recoverable JSON becomes the answer text itself, so a
    /// model that ignores the requested format still yields an answer.
    pub fn from_raw(raw: &RawResponse) -> Self {
        let Some(map) = raw.as_object() else {
            return Self {
                answer: raw.to_raw_string().trim().to_string(),
                evidence: None,
                confidence: None,
            };
        };

        let answer = map
            .get("answer")
            .filter(|v| !v.is_null())
            .map(stringify)
            .unwrap_or_default();
        let evidence = map
            .get("evidence")
            .filter(|v| !v.is_null())
            .map(stringify)
            .filter(|s| !s.trim().is_empty());
        let confidence = map
            .get("confidence")
            .and_then(coerce_number)
            .filter(|c| (0.0..=1.0).contains(c));

        Self {
            answer,
            evidence,
            confidence,
        }
    }

    pub fn from_value(value: Value) -> Self {
        Self::from_raw(&RawResponse::Structured(value))
    }
}
