use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata key under which the raw response is kept when nothing
/// structured could be recovered from it.
pub const RAW_RESPONSE_KEY: &str = "raw_response";

/// Label of the pie series holding per-segment percentages.
pub const PERCENTAGE_SERIES_LABEL: &str = "percentage";

/// The shape of chart a record describes.
/// Determines which shape-specific validation rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
    Combo,
    /// The normalizer could not classify the response.
    Unknown,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Scatter,
        ChartKind::Area,
        ChartKind::Combo,
        ChartKind::Unknown,
    ];

    /// Match a loosely-written chart type name.
    ///
    /// Case-insensitive. Accepts the bare kind (`"bar"`), the suffixed
    /// forms the vision prompts use (`"bar_chart"`, `"scatter_plot"`,
    /// `"Line Chart"`) and a few common aliases (`"column"`, `"donut"`).
    /// Returns `None` for anything else, including `"unknown"`.
    pub fn parse_loose(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        let mut stem = lower.as_str();
        for suffix in ["_chart", "-chart", " chart", "_plot", "-plot", " plot", "_graph", " graph"] {
            if let Some(s) = stem.strip_suffix(suffix) {
                stem = s;
                break;
            }
        }

        match stem.trim() {
            "bar" | "column" | "histogram" => Some(ChartKind::Bar),
            "line" => Some(ChartKind::Line),
            "pie" | "donut" | "doughnut" => Some(ChartKind::Pie),
            "scatter" => Some(ChartKind::Scatter),
            "area" => Some(ChartKind::Area),
            "combo" | "combination" | "mixed" => Some(ChartKind::Combo),
            _ => None,
        }
    }

    /// Kinds whose series are positioned against a category axis.
    pub fn requires_categories(&self) -> bool {
        matches!(
            self,
            ChartKind::Bar | ChartKind::Line | ChartKind::Area | ChartKind::Combo
        )
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartKind::Bar => write!(f, "bar"),
            ChartKind::Line => write!(f, "line"),
            ChartKind::Pie => write!(f, "pie"),
            ChartKind::Scatter => write!(f, "scatter"),
            ChartKind::Area => write!(f, "area"),
            ChartKind::Combo => write!(f, "combo"),
            ChartKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// One named sequence of data points.
///
/// `None` marks a point the model reported but whose value could not be
/// read as a number. It is kept in place so positions stay aligned with
/// the category axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

impl Series {
    pub fn new(label: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    /// Convenience constructor for a series with no missing points.
    pub fn from_numbers(label: impl Into<String>, values: &[f64]) -> Self {
        Self::new(label, values.iter().copied().map(Some).collect())
    }

    /// Iterate the values that are present.
    pub fn numeric_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|v| *v)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when the series has no value that could be read as a number.
    pub fn is_all_missing(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// Ordered labels against which series values are positioned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryAxis(pub Vec<String>);

impl CategoryAxis {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).map(String::as_str)
    }
}

/// The canonical structured description of one chart.
///
/// Created fresh from a single raw model response; never mutated after
/// validation. `metadata` is a sorted map so serialization is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub kind: ChartKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<CategoryAxis>,

    #[serde(default)]
    pub series: Vec<Series>,

    /// Free-form fields the normalizer did not map (units, notes, ...),
    /// stringified.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// The caller's expected kind, kept only when the response declared a
    /// different one. Lives outside `metadata` so response fields of the
    /// same name are never shadowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind_hint: Option<ChartKind>,
}

impl ChartRecord {
    /// An empty record of the given kind.
    pub fn empty(kind: ChartKind) -> Self {
        Self {
            kind,
            title: None,
            categories: None,
            series: Vec::new(),
            metadata: BTreeMap::new(),
            kind_hint: None,
        }
    }

    /// Record produced when nothing structured could be recovered.
    /// The raw input is kept under [`RAW_RESPONSE_KEY`].
    pub fn unparsed(raw: impl Into<String>) -> Self {
        let mut record = Self::empty(ChartKind::Unknown);
        record.metadata.insert(RAW_RESPONSE_KEY.to_string(), raw.into());
        record
    }

    /// Total number of non-missing values across all series.
    pub fn data_point_count(&self) -> usize {
        self.series.iter().map(|s| s.numeric_values().count()).sum()
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}
