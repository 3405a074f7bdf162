//! Dot-path navigation over raw crawler payloads.

use serde_json::Value;
use unipost_model::TargetType;

/// Resolves a dot-separated path against a nested JSON document.
///
/// Crawler payloads nest repeated objects, so an intermediate array is
/// traversed through its first element. Returns `None` when a segment is
/// absent or an intermediate array is empty.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use unipost_map::path::resolve_path;
///
/// let doc = json!({"author": {"name": "ada"}});
/// assert_eq!(resolve_path(&doc, "author.name"), Some(&json!("ada")));
/// assert_eq!(resolve_path(&doc, "author.handle"), None);
/// ```
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = step(current, segment)?;
    }
    Some(current)
}

/// Extracts the value at `path`, applying the leaf-array rule for the
/// declared target type.
///
/// A leaf array is kept whole when the target is an `ARRAY<T>` column;
/// for scalar targets its first element is taken instead, and an empty
/// leaf array counts as absent.
pub fn extract(root: &Value, path: &str, target_type: &TargetType) -> Option<Value> {
    let resolved = resolve_path(root, path)?;
    match resolved {
        Value::Array(items) if !target_type.is_array() => items.first().cloned(),
        other => Some(other.clone()),
    }
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => step(items.first()?, segment),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_objects() {
        let doc = json!({"video": {"meta": {"width": 1080}}});
        assert_eq!(resolve_path(&doc, "video.meta.width"), Some(&json!(1080)));
    }

    #[test]
    fn intermediate_array_uses_first_element() {
        let doc = json!({"media": [{"image": {"uri": "a.jpg"}}, {"image": {"uri": "b.jpg"}}]});
        assert_eq!(resolve_path(&doc, "media.image.uri"), Some(&json!("a.jpg")));
    }

    #[test]
    fn empty_intermediate_array_is_absent() {
        let doc = json!({"media": []});
        assert_eq!(resolve_path(&doc, "media.image"), None);
    }

    #[test]
    fn missing_segment_is_absent() {
        let doc = json!({"a": {"b": 1}});
        assert_eq!(resolve_path(&doc, "a.c"), None);
        assert_eq!(resolve_path(&doc, "a.b.c"), None);
    }

    #[test]
    fn leaf_array_kept_for_array_targets() {
        let doc = json!({"tags": ["x", "y"]});
        let array_ty = TargetType::parse("ARRAY<STRING>").unwrap();
        let scalar_ty = TargetType::parse("STRING").unwrap();
        assert_eq!(extract(&doc, "tags", &array_ty), Some(json!(["x", "y"])));
        assert_eq!(extract(&doc, "tags", &scalar_ty), Some(json!("x")));
    }

    #[test]
    fn empty_leaf_array_is_absent_for_scalars() {
        let doc = json!({"tags": []});
        let scalar_ty = TargetType::parse("STRING").unwrap();
        assert_eq!(extract(&doc, "tags", &scalar_ty), None);
    }
}
