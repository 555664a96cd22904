use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

use crate::models::chart::{CategoryAxis, ChartKind, ChartRecord, Series, PERCENTAGE_SERIES_LABEL};
use crate::models::field::{coerce_number, scalar_label, stringify, FieldParse};
use crate::models::raw::RawResponse;

const KIND_KEYS: &[&str] = &["kind", "chart_type", "type"];
const TITLE_KEYS: &[&str] = &["title"];
const CATEGORY_KEYS: &[&str] = &["categories", "labels", "x_labels", "x_values"];
const SERIES_KEYS: &[&str] = &["series", "datasets"];
const DATA_POINTS_KEY: &str = "data_points";
const SEGMENTS_KEY: &str = "segments";

const SERIES_LABEL_KEYS: &[&str] = &["label", "name"];
const SERIES_VALUE_KEYS: &[&str] = &["values", "data"];
const POINT_CATEGORY_KEYS: &[&str] = &["category", "label", "name"];

/// Turns an untrusted model response into a [`ChartRecord`].
///
/// Total: every input yields a record. Fields that are missing are left
/// empty; fields that are present but unreadable are kept, stringified,
/// in the record's metadata under their original key. Values that are
/// not numbers become `None` in place so they stay aligned with the
/// category axis.
///
/// Pure business logic, no I/O.
pub struct ResponseNormalizer;

/// Series read out of a response, plus category labels implied by the
/// points themselves (`x` / `category` fields) when the response did not
/// provide an explicit axis.
struct ExtractedSeries {
    series: Vec<Series>,
    implied_categories: Option<CategoryAxis>,
}

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a raw response, optionally hinting the expected kind.
    ///
    /// The kind declared in the response wins when it is recognized. The
    /// hint is used when the response declares nothing usable. When the
    /// two disagree the hint is kept in [`ChartRecord::kind_hint`].
    /// A response with no recoverable JSON object is always `Unknown`.
    pub fn normalize(&self, raw: &RawResponse, hint: Option<ChartKind>) -> ChartRecord {
        match raw.as_object() {
            Some(map) => self.normalize_object(&map, hint),
            None => {
                warn!(hint = ?hint, "response contains no JSON object, keeping raw text");
                ChartRecord::unparsed(raw.to_raw_string())
            }
        }
    }

    /// Normalize an already-parsed JSON value.
    pub fn normalize_value(&self, value: &Value, hint: Option<ChartKind>) -> ChartRecord {
        self.normalize(&RawResponse::Structured(value.clone()), hint)
    }

    /// Normalize model output text (JSON, fenced JSON, or prose).
    pub fn normalize_text(&self, text: &str, hint: Option<ChartKind>) -> ChartRecord {
        self.normalize(&RawResponse::Text(text.to_string()), hint)
    }

    fn normalize_object(&self, map: &Map<String, Value>, hint: Option<ChartKind>) -> ChartRecord {
        let mut metadata = BTreeMap::new();
        let mut consumed: HashSet<&str> = HashSet::new();
        let mut kind_hint = None;

        // 1. kind
        let (kind_key, kind_field) = parse_kind(map);
        consumed.extend(kind_key);
        let kind = match kind_field {
            FieldParse::Present(declared) if declared != ChartKind::Unknown => {
                kind_hint = hint.filter(|h| *h != ChartKind::Unknown && *h != declared);
                declared
            }
            FieldParse::Unparseable(raw) => {
                if let Some(key) = kind_key {
                    metadata.insert(key.to_string(), raw);
                }
                hint.unwrap_or(ChartKind::Unknown)
            }
            _ => hint.unwrap_or(ChartKind::Unknown),
        };

        // 2. title
        let (title_key, title_field) = parse_title(map);
        consumed.extend(title_key);
        let title = keep_unparseable(title_field, title_key, &mut metadata);

        // 3. categories
        let (category_key, category_field) = parse_categories(map);
        consumed.extend(category_key);
        let explicit_categories = keep_unparseable(category_field, category_key, &mut metadata);

        // 4. series
        let extracted = if let Some((key, value)) = first_present(map, SERIES_KEYS) {
            consumed.insert(key);
            match value {
                Value::Array(entries) => extract_series_list(key, entries, &mut metadata),
                other => {
                    metadata.insert(key.to_string(), stringify(other));
                    ExtractedSeries::none()
                }
            }
        } else if let Some(points) = map.get(DATA_POINTS_KEY).filter(|v| !v.is_null()) {
            consumed.insert(DATA_POINTS_KEY);
            match points {
                Value::Array(points) => extract_data_points(points, kind, map),
                other => {
                    metadata.insert(DATA_POINTS_KEY.to_string(), stringify(other));
                    ExtractedSeries::none()
                }
            }
        } else if let Some(segments) = map.get(SEGMENTS_KEY).filter(|v| !v.is_null()) {
            consumed.insert(SEGMENTS_KEY);
            match segments {
                Value::Array(segments) => extract_segments(segments),
                other => {
                    metadata.insert(SEGMENTS_KEY.to_string(), stringify(other));
                    ExtractedSeries::none()
                }
            }
        } else {
            ExtractedSeries::none()
        };

        let categories = explicit_categories.or(extracted.implied_categories);

        // 5. everything else is provenance
        for (key, value) in map {
            if !consumed.contains(key.as_str()) {
                insert_unique(&mut metadata, key, stringify(value));
            }
        }

        let record = ChartRecord {
            kind,
            title,
            categories,
            series: extracted.series,
            metadata,
            kind_hint,
        };

        debug!(
            kind = %record.kind,
            series = record.series.len(),
            categories = record.categories.as_ref().map_or(0, CategoryAxis::len),
            metadata = record.metadata.len(),
            "normalized chart response"
        );

        record
    }
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractedSeries {
    fn none() -> Self {
        Self {
            series: Vec::new(),
            implied_categories: None,
        }
    }
}

// ── Field parsers ───────────────────────────────────────────────────

/// First key from `keys` that is present with a non-null value.
fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&'a str]) -> Option<(&'a str, &'a Value)> {
    keys.iter()
        .find_map(|k| map.get(*k).filter(|v| !v.is_null()).map(|v| (*k, v)))
}

/// Locate and classify the chart kind field.
pub fn parse_kind<'a>(map: &'a Map<String, Value>) -> (Option<&'a str>, FieldParse<ChartKind>) {
    let Some((key, value)) = first_present(map, KIND_KEYS) else {
        return (None, FieldParse::Absent);
    };

    let field = match value {
        Value::String(s) => {
            let lower = s.trim().to_lowercase();
            if lower == "unknown" || lower == "other" {
                FieldParse::Present(ChartKind::Unknown)
            } else {
                match ChartKind::parse_loose(s) {
                    Some(kind) => FieldParse::Present(kind),
                    None => FieldParse::Unparseable(s.clone()),
                }
            }
        }
        other => FieldParse::Unparseable(stringify(other)),
    };
    (Some(key), field)
}

/// A title is only accepted as a non-empty string.
pub fn parse_title<'a>(map: &'a Map<String, Value>) -> (Option<&'a str>, FieldParse<String>) {
    let Some((key, value)) = first_present(map, TITLE_KEYS) else {
        return (None, FieldParse::Absent);
    };

    let field = match value {
        Value::String(s) if s.trim().is_empty() => FieldParse::Absent,
        Value::String(s) => FieldParse::Present(s.trim().to_string()),
        other => FieldParse::Unparseable(stringify(other)),
    };
    (Some(key), field)
}

/// Categories must be an array of scalars. A `null` entry becomes an
/// empty label so positions are preserved; a nested entry makes the
/// whole axis unreadable.
pub fn parse_categories<'a>(map: &'a Map<String, Value>) -> (Option<&'a str>, FieldParse<CategoryAxis>) {
    let Some((key, value)) = first_present(map, CATEGORY_KEYS) else {
        return (None, FieldParse::Absent);
    };

    let field = match value {
        Value::Array(items) => {
            let labels: Option<Vec<String>> = items
                .iter()
                .map(|item| match item {
                    Value::Null => Some(String::new()),
                    other => scalar_label(other),
                })
                .collect();
            match labels {
                Some(labels) => FieldParse::Present(CategoryAxis(labels)),
                None => FieldParse::Unparseable(stringify(value)),
            }
        }
        other => FieldParse::Unparseable(stringify(other)),
    };
    (Some(key), field)
}

/// Unwrap a parsed field, moving an unparseable raw value into metadata.
fn keep_unparseable<T>(
    field: FieldParse<T>,
    key: Option<&str>,
    metadata: &mut BTreeMap<String, String>,
) -> Option<T> {
    match field {
        FieldParse::Present(v) => Some(v),
        FieldParse::Absent => None,
        FieldParse::Unparseable(raw) => {
            if let Some(key) = key {
                metadata.insert(key.to_string(), raw);
            }
            None
        }
    }
}

/// Insert under `key`, or under `key#2`, `key#3`, ... when the key is
/// already taken, so no value is ever dropped.
fn insert_unique(metadata: &mut BTreeMap<String, String>, key: &str, value: String) {
    if !metadata.contains_key(key) {
        metadata.insert(key.to_string(), value);
        return;
    }
    let mut n = 2;
    while metadata.contains_key(&format!("{key}#{n}")) {
        n += 1;
    }
    metadata.insert(format!("{key}#{n}"), value);
}

// ── Series extraction ───────────────────────────────────────────────

/// Read a value out of a point: the first of `keys` for an object point,
/// the point itself for a bare scalar.
fn point_value(point: &Value, keys: &[&str]) -> Option<f64> {
    match point {
        Value::Object(obj) => keys
            .iter()
            .find_map(|k| obj.get(*k))
            .and_then(coerce_number),
        other => coerce_number(other),
    }
}

fn point_label(point: &Value, keys: &[&str]) -> String {
    match point {
        Value::Object(obj) => keys
            .iter()
            .find_map(|k| obj.get(*k))
            .and_then(scalar_label)
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// `series: [...]`. Each entry is an object with a label and either a
/// `values`/`data` array or a `data_points` array of `{x, y}` points, or
/// a bare array of values.
fn extract_series_list(
    key: &str,
    entries: &[Value],
    metadata: &mut BTreeMap<String, String>,
) -> ExtractedSeries {
    let mut series = Vec::with_capacity(entries.len());
    // x labels of each series read from `{x, y}` points, by series index
    let mut positioned: Vec<(usize, Vec<String>)> = Vec::new();

    for (idx, entry) in entries.iter().enumerate() {
        let fallback_label = format!("Series {}", idx + 1);

        let parsed = match entry {
            Value::Object(obj) => {
                let label = SERIES_LABEL_KEYS
                    .iter()
                    .find_map(|k| obj.get(*k))
                    .and_then(scalar_label)
                    .filter(|l| !l.is_empty())
                    .unwrap_or(fallback_label);

                if let Some(Value::Array(values)) = SERIES_VALUE_KEYS.iter().find_map(|k| obj.get(*k)) {
                    Some(Series::new(label, values.iter().map(coerce_number).collect()))
                } else if let Some(Value::Array(points)) = obj.get(DATA_POINTS_KEY) {
                    positioned.push((
                        series.len(),
                        points.iter().map(|p| point_label(p, &["x"])).collect(),
                    ));
                    Some(Series::new(
                        label,
                        points.iter().map(|p| point_value(p, &["y", "value"])).collect(),
                    ))
                } else {
                    None
                }
            }
            Value::Array(values) => Some(Series::new(
                fallback_label,
                values.iter().map(coerce_number).collect(),
            )),
            _ => None,
        };

        match parsed {
            Some(s) => series.push(s),
            None => {
                warn!(index = idx, "rejected series entry without a values array");
                insert_unique(metadata, &format!("{key}[{idx}]"), stringify(entry));
            }
        }
    }

    let implied_categories = merge_point_axes(&mut series, &positioned);
    ExtractedSeries {
        series,
        implied_categories,
    }
}

/// Build one category axis from the x labels of point-based series.
///
/// When every such series sits on the same labels that axis is used as
/// is. Otherwise the axis is the union of all labels in first-seen order
/// and each series is re-laid onto it, `None` where it has no point.
/// A label repeated within a series is matched occurrence by occurrence.
fn merge_point_axes(series: &mut [Series], positioned: &[(usize, Vec<String>)]) -> Option<CategoryAxis> {
    let (_, first) = positioned.first()?;
    if positioned.iter().all(|(_, labels)| labels == first) {
        return Some(CategoryAxis(first.clone()));
    }

    let mut axis: Vec<String> = Vec::new();
    let mut slots: Vec<Vec<usize>> = Vec::with_capacity(positioned.len());
    for (_, labels) in positioned {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut positions = Vec::with_capacity(labels.len());
        for label in labels {
            let occurrence = seen.entry(label.as_str()).or_insert(0);
            let slot = axis
                .iter()
                .enumerate()
                .filter(|(_, l)| *l == label)
                .nth(*occurrence)
                .map(|(i, _)| i);
            let slot = slot.unwrap_or_else(|| {
                axis.push(label.clone());
                axis.len() - 1
            });
            *occurrence += 1;
            positions.push(slot);
        }
        slots.push(positions);
    }

    for ((idx, _), positions) in positioned.iter().zip(slots) {
        let old = std::mem::take(&mut series[*idx].values);
        let mut values = vec![None; axis.len()];
        for (value, slot) in old.into_iter().zip(positions) {
            values[slot] = value;
        }
        series[*idx].values = values;
    }
    debug!(categories = axis.len(), "merged differing point axes");
    Some(CategoryAxis(axis))
}

/// Top-level `data_points`, as produced for bar and scatter charts.
///
/// `{category, value}` points become an axis plus one series. `{x, y}`
/// points become two series for a scatter chart, otherwise an axis from
/// `x` plus one series from `y`.
fn extract_data_points(points: &[Value], kind: ChartKind, map: &Map<String, Value>) -> ExtractedSeries {
    let has_key = |key: &str| {
        points
            .iter()
            .any(|p| p.as_object().is_some_and(|o| o.contains_key(key)))
    };
    let axis_label = |key: &str, default: &str| {
        map.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    if has_key("x") && !has_key("category") {
        let ys = Series::new(
            axis_label("y_axis_label", "y"),
            points.iter().map(|p| point_value(p, &["y", "value"])).collect(),
        );
        if kind == ChartKind::Scatter {
            let xs = Series::new(
                axis_label("x_axis_label", "x"),
                points.iter().map(|p| point_value(p, &["x"])).collect(),
            );
            return ExtractedSeries {
                series: vec![xs, ys],
                implied_categories: None,
            };
        }
        return ExtractedSeries {
            series: vec![ys],
            implied_categories: Some(CategoryAxis(
                points.iter().map(|p| point_label(p, &["x"])).collect(),
            )),
        };
    }

    let categories = CategoryAxis(
        points
            .iter()
            .map(|p| point_label(p, POINT_CATEGORY_KEYS))
            .collect(),
    );
    let values = Series::new(
        axis_label("y_axis_label", "value"),
        points.iter().map(|p| point_value(p, &["value", "y"])).collect(),
    );
    ExtractedSeries {
        series: vec![values],
        implied_categories: Some(categories),
    }
}

/// Pie `segments: [{label, value, percentage}]`.
///
/// Percentages, when any segment carries one, become the first series so
/// the pie-sum check reads them; raw values follow as a second series.
fn extract_segments(segments: &[Value]) -> ExtractedSeries {
    let categories = CategoryAxis(
        segments
            .iter()
            .map(|s| point_label(s, POINT_CATEGORY_KEYS))
            .collect(),
    );
    let has_key = |key: &str| {
        segments
            .iter()
            .any(|s| s.as_object().is_some_and(|o| o.contains_key(key)))
    };

    let mut series = Vec::with_capacity(2);
    if has_key(PERCENTAGE_SERIES_LABEL) {
        series.push(Series::new(
            PERCENTAGE_SERIES_LABEL,
            segments.iter().map(|s| point_value(s, &[PERCENTAGE_SERIES_LABEL])).collect(),
        ));
        if has_key("value") {
            series.push(Series::new(
                "value",
                segments.iter().map(|s| point_value(s, &["value"])).collect(),
            ));
        }
    } else {
        series.push(Series::new(
            "value",
            segments.iter().map(|s| point_value(s, &["value"])).collect(),
        ));
    }
    ExtractedSeries {
        series,
        implied_categories: Some(categories),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn kind_field_variants() {
        assert_eq!(parse_kind(&obj(json!({}))).1, FieldParse::Absent);
        assert_eq!(
            parse_kind(&obj(json!({"chart_type": "Pie_Chart"}))),
            (Some("chart_type"), FieldParse::Present(ChartKind::Pie))
        );
        assert_eq!(
            parse_kind(&obj(json!({"kind": 7}))).1,
            FieldParse::Unparseable("7".into())
        );
        assert_eq!(
            parse_kind(&obj(json!({"kind": "other"}))).1,
            FieldParse::Present(ChartKind::Unknown)
        );
    }

    #[test]
    fn title_must_be_a_string() {
        assert_eq!(
            parse_title(&obj(json!({"title": "  Sales "}))).1,
            FieldParse::Present("Sales".into())
        );
        assert_eq!(parse_title(&obj(json!({"title": ""}))).1, FieldParse::Absent);
        assert_eq!(
            parse_title(&obj(json!({"title": ["a"]}))).1,
            FieldParse::Unparseable("[\"a\"]".into())
        );
    }

    #[test]
    fn nested_category_entry_rejects_axis() {
        let input = obj(json!({"labels": ["a", {"b": 1}]}));
        let (key, field) = parse_categories(&input);
        assert_eq!(key, Some("labels"));
        assert!(matches!(field, FieldParse::Unparseable(_)));
    }

    #[test]
    fn null_category_entry_keeps_position() {
        let (_, field) = parse_categories(&obj(json!({"categories": ["a", null, 3]})));
        assert_eq!(field, FieldParse::Present(CategoryAxis::new(["a", "", "3"])));
    }
}
