use serde::{Deserialize, Serialize};

use super::chart::ChartKind;

/// Overview of one extracted chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSummary {
    pub kind: ChartKind,

    pub title: Option<String>,

    /// Number of series in the record
    pub series_count: usize,

    /// Number of non-missing values across all series
    pub data_point_count: usize,

    /// Category carrying the largest value of the first series
    pub highest: Option<CategoryValue>,

    /// Category carrying the smallest value of the first series
    pub lowest: Option<CategoryValue>,

    /// Per-series statistics; series without numeric values are omitted
    pub statistics: Vec<SeriesStatistics>,
}

/// A value paired with the category (or position) it was read at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryValue {
    pub category: String,
    pub value: f64,
}

/// Descriptive statistics over a series' non-missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    pub label: String,

    /// Number of non-missing values
    pub count: usize,

    pub sum: f64,
    pub mean: f64,
    pub median: f64,

    /// Sample standard deviation (n - 1); `None` with fewer than two values
    pub std_dev: Option<f64>,

    pub min: f64,
    pub max: f64,
}
