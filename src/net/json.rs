//! JSON extraction utilities for catalog API responses.
//!
//! The catalog API is loosely specified: `results` may be missing, the total may
//! be reported as `total` or as `count`, ids may be strings or numbers. These
//! helpers read such payloads leniently instead of failing the whole page.
//!
//! # Examples
//!
//! ```rust
//! use kodex::net::json;
//! use serde_json::json;
//!
//! let data = json!({
//!     "results": [{"id": 1, "name": "Hulk"}],
//!     "count": 1
//! });
//!
//! assert_eq!(json::extract_array(&data, "results").len(), 1);
//! assert_eq!(json::read_total(&data), Some(1));
//! ```

use serde_json::Value;

use crate::types::{CatalogItem, Collection, Thumbnail};

/// Extracts a value from nested JSON using dot notation.
///
/// # Examples
///
/// ```rust
/// use kodex::net::json;
/// use serde_json::json;
///
/// let data = json!({"thumbnail": {"path": "http://x/y", "extension": "jpg"}});
///
/// let ext = json::extract_path(&data, "thumbnail.extension");
/// assert_eq!(ext.and_then(|v| v.as_str()), Some("jpg"));
/// assert!(json::extract_path(&data, "thumbnail.size").is_none());
/// ```
pub fn extract_path<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = json;

    for key in path.split('.') {
        current = current.get(key)?;
    }

    Some(current)
}

/// Extracts an array from a nested JSON path.
///
/// Returns an empty slice when the path doesn't exist or isn't an array.
pub fn extract_array<'a>(json: &'a Value, path: &str) -> &'a [Value] {
    extract_path(json, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Reads the collection size from a page payload.
///
/// `total` wins over `count`; a field only counts when it is numeric. Negative
/// or fractional values are truncated into range, so `-3` reads as `0`.
///
/// ```rust
/// use kodex::net::json::read_total;
/// use serde_json::json;
///
/// assert_eq!(read_total(&json!({"total": 12, "count": 3})), Some(12));
/// assert_eq!(read_total(&json!({"total": "12", "count": 3})), Some(3));
/// assert_eq!(read_total(&json!({"results": []})), None);
/// ```
pub fn read_total(json: &Value) -> Option<u64> {
    ["total", "count"]
        .iter()
        .find_map(|field| json.get(field).and_then(as_count))
}

fn as_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value.as_f64().map(|n| if n <= 0.0 { 0 } else { n as u64 })
}

/// Reads a string-or-number field as a string.
pub fn read_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Converts one element of `results` into a [`CatalogItem`].
///
/// The label comes from the collection's label field. The id is taken from
/// `_id`, then `id`, then the label itself. Returns `None` only when neither an
/// id nor a label can be found.
pub fn parse_item(collection: Collection, value: &Value) -> Option<CatalogItem> {
    let label = value
        .get(collection.label_field())
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let id = value
        .get("_id")
        .and_then(read_id)
        .or_else(|| value.get("id").and_then(read_id))
        .or_else(|| (!label.is_empty()).then(|| label.clone()))?;

    let thumbnail = value.get("thumbnail").and_then(|thumb| {
        Some(Thumbnail {
            path: thumb.get("path")?.as_str()?.to_string(),
            extension: thumb.get("extension")?.as_str()?.to_string(),
        })
    });

    let description = value
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(CatalogItem {
        id,
        label,
        thumbnail,
        description,
    })
}
