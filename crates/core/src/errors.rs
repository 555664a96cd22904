use thiserror::Error;

/// Unified error type for the chart-insight-core library.
///
/// Normalization and validation never fail: anomalies there are returned
/// as data (`ValidationFinding`). Only settings loading and export are
/// fallible.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration ───────────────────────────────────────────────
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Export ──────────────────────────────────────────────────────
    #[error("Export failed ({format}): {message}")]
    Export {
        format: String,
        message: String,
    },
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Export {
            format: "csv".into(),
            message: e.to_string(),
        }
    }
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for CoreError {
    fn from(e: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        CoreError::Export {
            format: "csv".into(),
            message: e.error().to_string(),
        }
    }
}

impl From<std::string::FromUtf8Error> for CoreError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        CoreError::Export {
            format: "csv".into(),
            message: e.to_string(),
        }
    }
}
