use serde::Deserialize;
use serde_json::{Map, Value};

/// A block exactly as listed by `GET /blocks/{id}/children`.
///
/// Notion stores the kind-specific body under a key named after the type tag
/// (`{"type": "quote", "quote": {...}}`), so everything beyond the common
/// fields is kept as an untyped map and read through [`RawBlock::body`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl RawBlock {
    pub fn body(&self) -> Option<&Value> {
        self.payload.get(&self.block_type)
    }
}

/// A database row as returned by `POST /databases/{id}/query`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPage {
    pub id: String,
    #[serde(default)]
    pub icon: Option<Value>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// One page of a paginated Notion list response.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Notion's error object (`{"object": "error", "code": ..., "message": ...}`).
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// URL of a file object, whichever storage variant populated it.
///
/// Notion file objects are either `{"type": "external", "external": {"url"}}`
/// or `{"type": "file", "file": {"url", "expiry_time"}}`. The declared type is
/// tried first, then the other variant.
pub fn file_url(value: &Value) -> Option<String> {
    let declared = value.get("type").and_then(Value::as_str);
    let external = || value.pointer("/external/url").and_then(Value::as_str);
    let hosted = || value.pointer("/file/url").and_then(Value::as_str);

    let url = match declared {
        Some("external") => external().or_else(hosted),
        _ => hosted().or_else(external),
    };

    url.filter(|u| !u.is_empty()).map(str::to_string)
}
