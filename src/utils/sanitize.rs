use serde_json::{Map, Value};

use crate::model::media::LOCAL_PREVIEW_SCHEME;

fn is_local_preview(map: &Map<String, Value>) -> bool {
    map.get("url")
        .and_then(Value::as_str)
        .is_some_and(|url| url.starts_with(LOCAL_PREVIEW_SCHEME))
}

/// Removes every media-like object whose `url` is a local `blob:` preview.
///
/// Such objects are dropped from arrays and object fields holding one are omitted.
/// Returns `None` when `value` itself is a preview object.
pub fn strip_local_previews(value: Value) -> Option<Value> {
    match value {
        Value::Object(map) => {
            if is_local_preview(&map) {
                return None;
            }
            let cleaned: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| strip_local_previews(v).map(|v| (k, v)))
                .collect();
            Some(Value::Object(cleaned))
        }
        Value::Array(items) => Some(Value::Array(
            items.into_iter().filter_map(strip_local_previews).collect(),
        )),
        other => Some(other),
    }
}

/// Like [`strip_local_previews`] but a top-level preview becomes `null`.
pub fn sanitize_body(value: Value) -> Value {
    strip_local_previews(value).unwrap_or(Value::Null)
}

/// Response-side cleanup: preview media are removed like in
/// [`strip_local_previews`], and so are `null` array elements and object fields
/// left with a `null` value. A top-level `null` is returned as is.
pub fn clean_response(value: Value) -> Value {
    match value {
        Value::Object(map) if is_local_preview(&map) => Value::Null,
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, clean_response(v)))
                .filter(|(_, v)| !v.is_null())
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(clean_response)
                .filter(|v| !v.is_null())
                .collect(),
        ),
        other => other,
    }
}

/// True when [`clean_response`] would change `value`.
pub fn needs_response_cleanup(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            is_local_preview(map) || map.values().any(|v| v.is_null() || needs_response_cleanup(v))
        }
        Value::Array(items) => items.iter().any(|v| v.is_null() || needs_response_cleanup(v)),
        _ => false,
    }
}

/// True when any preview url is present anywhere in `value`.
pub fn contains_local_preview(value: &Value) -> bool {
    match value {
        Value::Object(map) => is_local_preview(map) || map.values().any(contains_local_preview),
        Value::Array(items) => items.iter().any(contains_local_preview),
        _ => false,
    }
}
