use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::filter::{self, PRIVATE_MARKER, RESERVED_FIELDS};
use crate::value::FieldValue;

/// Converts a live value into a deep, independent, structurally comparable
/// representation. Total over every variant and never mutates its input.
///
/// Dispatch order: nested tracker, mapping, sequence, serialization hook,
/// struct shape, scalar.
/// A nested tracker contributes its currently filtered *live* attributes,
/// not its last committed snapshot.
pub fn snapshot(value: &FieldValue) -> Value {
    match value {
        FieldValue::Tracker(child) => {
            let child = child.borrow();
            let filtered =
                filter::filter_fields(child.fields(), child.include_mode(), None, RESERVED_FIELDS);
            let mut map = Map::new();
            for (name, value) in filtered {
                map.insert(name.to_string(), snapshot(value));
            }
            Value::Object(map)
        }
        FieldValue::Mapping(entries) => {
            let mut map = Map::new();
            for (name, value) in entries {
                map.insert(name.clone(), snapshot(value));
            }
            Value::Object(map)
        }
        FieldValue::Sequence(items) => Value::Array(items.iter().map(snapshot).collect()),
        FieldValue::Serializable(hook) => hook.to_snapshot(),
        FieldValue::Struct(entries) => {
            let mut map = Map::new();
            for (name, value) in entries {
                if name.starts_with(PRIVATE_MARKER) {
                    continue;
                }
                map.insert(name.clone(), snapshot(value));
            }
            Value::Object(map)
        }
        FieldValue::Scalar(value) => value.clone(),
    }
}

/// Snapshots a filtered field map into owned name/value pairs.
pub fn snapshot_fields(fields: BTreeMap<&str, &FieldValue>) -> BTreeMap<String, Value> {
    fields
        .into_iter()
        .map(|(name, value)| (name.to_string(), snapshot(value)))
        .collect()
}
