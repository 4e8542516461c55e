//! Dot-path helpers over arbitrary JSON
//!
//! These know nothing about the HostContext schema. A segment addresses an
//! object key, or an array index when the current value is an array.

use serde_json::Value;

/// Join a parent path and a key into a dot-path
pub fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Resolve `path` against `data`.
///
/// Returns `None` when any segment is absent or an intermediate value is
/// `null`. A final `null` is returned as `Some(Value::Null)`.
pub fn get_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(data);
    }
    let mut current = data;
    for segment in path.split('.') {
        if current.is_null() {
            return None;
        }
        current = step(current, segment)?;
    }
    Some(current)
}

/// True when `path` resolves, including to an explicit `null`
pub fn has_path(data: &Value, path: &str) -> bool {
    get_path(data, path).is_some()
}

/// Parent of a dot-path, `None` for a top-level key
pub fn parent(path: &str) -> Option<&str> {
    path.rsplit_once('.').map(|(parent, _)| parent)
}

/// True when `path` lies strictly beneath `ancestor`
pub fn is_descendant(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len() + 1
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'.'
}
