// ── Deep paths into JSON property trees ──
//
// A path is a dot-separated list of keys (`effect.pluginOpts.startChannel`).
// Numeric segments index into arrays when the current value is an array.

use serde_json::{Map, Value};

/// Root token under which an effect's parameter object lives.
pub const ROOT_TOKEN: &str = "effect";

/// Join a parent path and a child key.
pub fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|s| !s.is_empty())
}

/// Non-failing lookup. Missing keys, out-of-range indices and descending
/// into a scalar all yield `None`.
pub fn deep_get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path).try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Set `value` at `path`, creating intermediate objects as needed.
///
/// Any non-container met along the way is replaced by an empty object;
/// arrays grow with `null`s to reach the addressed index. An empty path
/// replaces `root` itself.
pub fn deep_set(root: &mut Value, path: &str, value: Value) {
    let mut current = root;

    for segment in segments(path) {
        if !can_hold(current, segment) {
            *current = Value::Object(Map::new());
        }
        let Some(slot) = child_slot(current, segment) else {
            return;
        };
        current = slot;
    }

    *current = value;
}

fn can_hold(container: &Value, segment: &str) -> bool {
    match container {
        Value::Object(_) => true,
        Value::Array(_) => segment.parse::<usize>().is_ok(),
        _ => false,
    }
}

/// Mutable slot for `segment` inside `container`, inserting `null` when
/// the key or index is absent.
fn child_slot<'a>(container: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match container {
        Value::Object(map) => Some(map.entry(segment.to_owned()).or_insert(Value::Null)),
        Value::Array(items) => {
            let index = segment.parse::<usize>().ok()?;
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            items.get_mut(index)
        }
        _ => None,
    }
}
