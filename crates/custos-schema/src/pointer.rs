//! JSON Pointer helpers for walking the assembled schema along a violation's
//! schema path, following local `$ref`s on the way.

use serde_json::Value;

/// Upper bound on consecutive `$ref` hops at one node.
const MAX_REF_HOPS: usize = 16;

/// Split a JSON Pointer into unescaped segments. `""` is the root.
pub(crate) fn segments(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer
        .trim_start_matches('/')
        .split('/')
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Join segments into a JSON Pointer, escaping as needed.
pub(crate) fn join<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| format!("/{}", s.as_ref().replace('~', "~0").replace('/', "~1")))
        .collect()
}

/// Resolve a local reference (`#/definitions/...`) against `root`.
pub(crate) fn resolve_ref<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    let fragment = reference.strip_prefix('#')?;
    root.pointer(fragment)
}

/// Follow `$ref` at `node` until reaching a node without one.
fn deref<'a>(root: &'a Value, mut node: &'a Value) -> Option<&'a Value> {
    for _ in 0..MAX_REF_HOPS {
        match node.get("$ref").and_then(Value::as_str) {
            Some(reference) => node = resolve_ref(root, reference)?,
            None => return Some(node),
        }
    }
    None
}

/// Walk `root` along a schema path.
///
/// A `$ref` segment follows the reference. When a segment is not a key of a
/// node that carries a `$ref`, the reference is followed and the segment is
/// retried, so paths recorded with or without explicit `$ref` segments both
/// resolve.
pub(crate) fn resolve_schema_path<'a, S: AsRef<str>>(root: &'a Value, path: &[S]) -> Option<&'a Value> {
    let mut node = root;
    for segment in path {
        let segment = segment.as_ref();
        if segment == "$ref" {
            node = deref(root, node)?;
            continue;
        }
        node = match child(node, segment) {
            Some(next) => next,
            None => child(deref(root, node)?, segment)?,
        };
    }
    Some(node)
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

/// Index of the last integer segment, if any.
pub(crate) fn last_index<S: AsRef<str>>(path: &[S]) -> Option<usize> {
    path.iter().rev().find_map(|s| s.as_ref().parse::<usize>().ok())
}
