use serde_json::Value;

use crate::ValuesMap;

/// Walks `path` (dot separated) through `values`.
///
/// Returns `None` as soon as a segment is missing or the current node cannot be
/// indexed. A present `null` is returned as `Some(Value::Null)`.
pub fn find_value_by_path<'a>(values: &'a ValuesMap, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let head = segments.next()?;
    let mut current = values.get(head)?;
    for segment in segments {
        current = child_value(current, segment)?;
    }
    Some(current)
}

fn child_value<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(entries) => entries.get(segment),
        Value::Array(items) => parse_index(segment).and_then(|index| items.get(index)),
        _ => None,
    }
}

fn parse_index(segment: &str) -> Option<usize> {
    let index = segment.parse::<usize>().ok()?;
    // "01" and "+1" are object keys, not array positions.
    (index.to_string() == segment).then_some(index)
}
