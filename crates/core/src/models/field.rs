use serde_json::Value;

/// Outcome of reading one field out of an untrusted response.
///
/// `Unparseable` keeps the stringified raw value so the normalizer can
/// preserve it in the record's metadata instead of silently dropping it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldParse<T> {
    Present(T),
    Absent,
    Unparseable(String),
}

impl<T> FieldParse<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, FieldParse::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldParse::Absent)
    }

    pub fn present(self) -> Option<T> {
        match self {
            FieldParse::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldParse<U> {
        match self {
            FieldParse::Present(v) => FieldParse::Present(f(v)),
            FieldParse::Absent => FieldParse::Absent,
            FieldParse::Unparseable(raw) => FieldParse::Unparseable(raw),
        }
    }

    /// Keep the first field that is not `Absent`.
    pub fn or_else(self, f: impl FnOnce() -> FieldParse<T>) -> FieldParse<T> {
        match self {
            FieldParse::Absent => f(),
            other => other,
        }
    }
}

/// Render any JSON value as a metadata string.
/// Strings are taken verbatim, everything else in compact JSON form.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce one loosely-typed value to a finite number.
///
/// Accepts JSON numbers and numeric strings, tolerating surrounding
/// whitespace, thousands separators, a trailing `%` and a leading
/// currency sign. Anything else, including NaN and infinities, is `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    }
}

fn parse_numeric_str(s: &str) -> Option<f64> {
    let mut text = s.trim();
    text = text.strip_suffix('%').unwrap_or(text).trim_end();

    // "-$12" carries its sign ahead of the currency symbol
    let mut sign = "";
    if let Some(rest) = text.strip_prefix(['-', '+']) {
        if rest.starts_with(['$', '€', '£', '¥']) {
            sign = &text[..1];
            text = rest;
        }
    }
    for symbol in ['$', '€', '£', '¥'] {
        if let Some(rest) = text.strip_prefix(symbol) {
            text = rest.trim_start();
            break;
        }
    }

    let cleaned: String = sign
        .chars()
        .chain(text.chars().filter(|c| *c != ',' && *c != '_'))
        .collect();
    if cleaned.is_empty() || !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    // Rust's float parser accepts "inf"/"nan"; the digit check above
    // rejects those spellings, the finiteness check catches overflow.
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Read a scalar label (category name, series label).
/// Numbers and booleans are stringified; null and containers are rejected.
pub fn scalar_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
