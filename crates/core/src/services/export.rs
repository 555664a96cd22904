use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::CoreError;
use crate::models::chart::ChartRecord;
use crate::models::validation::ValidationResult;

/// Cell text written for a missing value in CSV output.
pub const MISSING_CELL: &str = "null";

/// Tabular view of a record: one row per category, one column per series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTable {
    /// First header is `category`, or `index` when the record has no
    /// category axis; the rest are series labels.
    pub headers: Vec<String>,
    pub rows: Vec<ExportRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub key: String,
    pub values: Vec<Option<f64>>,
}

/// Converts validated results into JSON and tabular form.
///
/// The adapter only renders strings; writing them anywhere is the
/// caller's business.
pub struct ExportAdapter;

impl ExportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Pretty JSON of the record, its findings and the validity flag.
    pub fn to_json(&self, result: &ValidationResult) -> Result<String, CoreError> {
        serde_json::to_string_pretty(result).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    /// Build the table. The row count is the longer of the category axis
    /// and the longest series; short series are padded with `None`.
    pub fn to_table(&self, record: &ChartRecord) -> ExportTable {
        let key_header = if record.categories.is_some() {
            "category"
        } else {
            "index"
        };
        let mut headers = Vec::with_capacity(record.series.len() + 1);
        headers.push(key_header.to_string());
        headers.extend(record.series.iter().map(|s| s.label.clone()));

        let category_len = record.categories.as_ref().map_or(0, |c| c.len());
        let longest_series = record.series.iter().map(|s| s.len()).max().unwrap_or(0);
        let row_count = category_len.max(longest_series);

        let rows = (0..row_count)
            .map(|idx| ExportRow {
                key: match &record.categories {
                    Some(categories) => categories.get(idx).unwrap_or_default().to_string(),
                    None => idx.to_string(),
                },
                values: record
                    .series
                    .iter()
                    .map(|s| s.values.get(idx).copied().flatten())
                    .collect(),
            })
            .collect();

        ExportTable { headers, rows }
    }

    /// CSV rendering of [`ExportAdapter::to_table`], `null` for missing cells.
    pub fn to_csv(&self, record: &ChartRecord) -> Result<String, CoreError> {
        let table = self.to_table(record);
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(&table.headers)?;
        for row in &table.rows {
            let mut cells = Vec::with_capacity(row.values.len() + 1);
            cells.push(row.key.clone());
            cells.extend(row.values.iter().map(|v| match v {
                Some(n) => n.to_string(),
                None => MISSING_CELL.to_string(),
            }));
            writer.write_record(&cells)?;
        }

        let bytes = writer.into_inner()?;
        let csv = String::from_utf8(bytes)?;
        debug!(rows = table.rows.len(), columns = table.headers.len(), "rendered csv export");
        Ok(csv)
    }
}

impl Default for ExportAdapter {
    fn default() -> Self {
        Self::new()
    }
}
