//! Response Normalizer: recovers a JSON object from free-text assistant output.
//!
//! Strategies, first success wins:
//! 1. the whole trimmed text is a JSON object
//! 2. the body of the first ```` ```json ```` fence is a JSON object
//! 3. the slice from the first `{` to the last `}` is a JSON object
//! 4. otherwise `ParseFailed` carrying the trimmed text
//!
//! Malformed JSON is never repaired.

use serde_json::{Map, Value};

/// Key under which unparseable text is returned to callers.
pub const RAW_TEXT_KEY: &str = "rawText";

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Outcome of normalizing assistant output.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Record(Map<String, Value>),
    /// No strategy produced a JSON object. Holds the trimmed original text.
    ParseFailed(String),
}

impl Normalized {
    pub fn is_record(&self) -> bool {
        matches!(self, Normalized::Record(_))
    }

    pub fn as_record(&self) -> Option<&Map<String, Value>> {
        match self {
            Normalized::Record(map) => Some(map),
            Normalized::ParseFailed(_) => None,
        }
    }

    /// Wire form: the record itself, or `{"rawText": <text>}`.
    pub fn into_value(self) -> Value {
        match self {
            Normalized::Record(map) => Value::Object(map),
            Normalized::ParseFailed(text) => {
                let mut map = Map::new();
                map.insert(RAW_TEXT_KEY.to_string(), Value::String(text));
                Value::Object(map)
            }
        }
    }
}

pub fn normalize(raw: &str) -> Normalized {
    let text = raw.trim();

    if let Some(map) = parse_object(text) {
        return Normalized::Record(map);
    }

    if let Some(map) = fenced_block(text).and_then(parse_object) {
        return Normalized::Record(map);
    }

    if let Some(map) = brace_span(text).and_then(parse_object) {
        return Normalized::Record(map);
    }

    Normalized::ParseFailed(text.to_string())
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Body between the first ```` ```json ```` marker and the next closing fence.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find(JSON_FENCE)? + JSON_FENCE.len();
    let end = start + text[start..].find(FENCE)?;
    Some(text[start..end].trim())
}

/// Slice from the first `{` through the last `}`.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
