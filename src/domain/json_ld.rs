use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::CrawlError;

/// A value that can be read out of a loosely shaped JSON-LD entity.
pub trait FieldValue: Sized {
    fn from_json(value: &Value) -> Option<Self>;
}

impl FieldValue for String {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().map(|s| s.to_string())
    }
}

impl FieldValue for u64 {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Tolerant lookup of `pointer` (RFC 6901, e.g. `/worksFor/0/url`) inside
/// `entity`. Any missing or mistyped step yields `default`.
pub fn field<T: FieldValue>(entity: &Value, pointer: &str, default: T) -> T {
    entity
        .pointer(pointer)
        .and_then(T::from_json)
        .unwrap_or(default)
}

/// Parses the `application/ld+json` block in the page head and returns its
/// `@graph` entities.
pub fn extract_graph(html: &str) -> Result<Vec<Value>, CrawlError> {
    let document = Html::parse_document(html);
    let script_selector = Selector::parse(r#"head script[type="application/ld+json"]"#)
        .map_err(|e| CrawlError::extraction(e.to_string()))?;

    let script = document
        .select(&script_selector)
        .next()
        .ok_or_else(|| CrawlError::extraction("no structured data block in page head"))?;
    let json_text: String = script.text().collect();

    let mut root: Value = serde_json::from_str(json_text.trim())?;
    match root.get_mut("@graph").map(Value::take) {
        Some(Value::Array(entities)) => Ok(entities),
        _ => Err(CrawlError::extraction("structured data has no @graph array")),
    }
}

/// First entity whose `@type` is `type_name`.
pub fn find_typed<'a>(graph: &'a [Value], type_name: &str) -> Option<&'a Value> {
    graph
        .iter()
        .find(|entity| entity.get("@type").and_then(Value::as_str) == Some(type_name))
}
