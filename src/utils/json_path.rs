//! Path-based access over dynamically shaped JSON state trees.
//!
//! Module mount paths are ordered name sequences; these helpers walk a
//! `serde_json::Value` tree along such a path. An empty path resolves to
//! the tree itself.

use serde_json::Value;

/// Resolves `path` against `root`, returning the slice it addresses.
///
/// # Examples
///
/// ```rust
/// use canopy_store::utils::json_path::walk;
/// use serde_json::json;
///
/// let tree = json!({"a": {"b": {"x": 1}}});
/// let path = vec!["a".to_string(), "b".to_string()];
/// assert_eq!(walk(&tree, &path), Some(&json!({"x": 1})));
/// assert_eq!(walk(&tree, &[]), Some(&tree));
/// assert_eq!(walk(&tree, &["ghost".to_string()]), None);
/// ```
pub fn walk<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter()
        .try_fold(root, |slice, segment| slice.get(segment.as_str()))
}

/// Mutable variant of [`walk`].
pub fn walk_mut<'a>(root: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    path.iter()
        .try_fold(root, |slice, segment| slice.get_mut(segment.as_str()))
}
