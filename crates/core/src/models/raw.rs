use serde_json::{Map, Value};

/// A completed response from the vision model, as handed to the core.
///
/// The provider may return structured JSON or prose (often with the JSON
/// wrapped in a markdown fence). Both are accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    Structured(Value),
    Text(String),
}

impl RawResponse {
    /// Recover a JSON object from the response, if there is one.
    pub fn as_object(&self) -> Option<Map<String, Value>> {
        match self {
            RawResponse::Structured(Value::Object(map)) => Some(map.clone()),
            RawResponse::Structured(Value::String(text)) => extract_json_object(text),
            RawResponse::Structured(_) => None,
            RawResponse::Text(text) => extract_json_object(text),
        }
    }

    /// The response's string form, used for provenance when nothing
    /// structured could be recovered.
    pub fn to_raw_string(&self) -> String {
        match self {
            RawResponse::Structured(Value::String(s)) => s.clone(),
            RawResponse::Structured(v) => v.to_string(),
            RawResponse::Text(t) => t.clone(),
        }
    }
}

impl From<Value> for RawResponse {
    fn from(value: Value) -> Self {
        RawResponse::Structured(value)
    }
}

impl From<String> for RawResponse {
    fn from(text: String) -> Self {
        RawResponse::Text(text)
    }
}

impl From<&str> for RawResponse {
    fn from(text: &str) -> Self {
        RawResponse::Text(text.to_string())
    }
}

/// Pull a JSON object out of free-form model output.
///
/// Tries, in order: the whole text, a ```json fenced block, a bare ```
/// fenced block, and the span from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim();

    if let Some(map) = parse_object(trimmed) {
        return Some(map);
    }

    let fenced = if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + "```json".len()..];
        after.find("```").map(|end| &after[..end])
    } else if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        after.find("```").map(|end| &after[..end])
    } else {
        None
    };

    if let Some(block) = fenced {
        if let Some(map) = parse_object(block.trim()) {
            return Some(map);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return parse_object(&trimmed[start..=end]);
        }
    }

    None
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
