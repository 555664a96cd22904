use crate::models::analytics::{CategoryValue, ChartSummary, SeriesStatistics};
use crate::models::chart::{ChartRecord, Series};

/// Computes descriptive statistics over an extracted chart.
///
/// Missing points are skipped, never treated as zero.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Summarize a record: counts, extremes of the first series and
    /// per-series statistics.
    pub fn summarize(&self, record: &ChartRecord) -> ChartSummary {
        let statistics = record
            .series
            .iter()
            .filter_map(|s| self.series_statistics(s))
            .collect();

        let (highest, lowest) = match record.series.first() {
            Some(first) => self.extremes(record, first),
            None => (None, None),
        };

        ChartSummary {
            kind: record.kind,
            title: record.title.clone(),
            series_count: record.series.len(),
            data_point_count: record.data_point_count(),
            highest,
            lowest,
            statistics,
        }
    }

    /// Statistics over one series; `None` when it has no numeric values.
    pub fn series_statistics(&self, series: &Series) -> Option<SeriesStatistics> {
        let mut values: Vec<f64> = series.numeric_values().collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let sum: f64 = values.iter().sum();
        let mean = sum / count as f64;
        let median = if count % 2 == 0 {
            (values[count / 2 - 1] + values[count / 2]) / 2.0
        } else {
            values[count / 2]
        };
        let std_dev = (count > 1).then(|| {
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        });

        Some(SeriesStatistics {
            label: series.label.clone(),
            count,
            sum,
            mean,
            median,
            std_dev,
            min: values[0],
            max: values[count - 1],
        })
    }

    /// Largest and smallest values of `series`, labelled by category when
    /// the record has an axis, by 1-based position otherwise. Ties keep
    /// the first occurrence.
    fn extremes(
        &self,
        record: &ChartRecord,
        series: &Series,
    ) -> (Option<CategoryValue>, Option<CategoryValue>) {
        let label_at = |idx: usize| {
            record
                .categories
                .as_ref()
                .and_then(|c| c.get(idx))
                .map(str::to_string)
                .unwrap_or_else(|| (idx + 1).to_string())
        };

        let mut highest: Option<(usize, f64)> = None;
        let mut lowest: Option<(usize, f64)> = None;
        for (idx, value) in series.values.iter().enumerate() {
            let Some(v) = *value else { continue };
            if highest.map_or(true, |(_, h)| v > h) {
                highest = Some((idx, v));
            }
            if lowest.map_or(true, |(_, l)| v < l) {
                lowest = Some((idx, v));
            }
        }

        let to_cv = |(idx, value): (usize, f64)| CategoryValue {
            category: label_at(idx),
            value,
        };
        (highest.map(to_cv), lowest.map(to_cv))
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
