use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::tracker::Tracker;

/// Nested trackers are shared by reference, never owned by a parent. The
/// same child may be held by several parents or mutated directly through
/// this handle.
pub type SharedTracker = Rc<RefCell<Tracker>>;

/// Explicit serialization hook. The returned value is used as the snapshot
/// as-is, without further recursion, and the call is trusted to be
/// side-effect free.
pub trait ToSnapshot {
    fn to_snapshot(&self) -> Value;
}

/// A live tracked value. The closed set of variants replaces the capability
/// probing a dynamic language would use to decide how to snapshot a field.
#[derive(Clone)]
pub enum FieldValue {
    /// Scalars and pre-serialized JSON trees, snapshotted as-is.
    Scalar(Value),
    Sequence(Vec<FieldValue>),
    Mapping(BTreeMap<String, FieldValue>),
    /// A nested tracker; snapshots capture its live filtered state.
    Tracker(SharedTracker),
    Serializable(Rc<dyn ToSnapshot>),
    /// An arbitrary object's attribute shape. Private-named entries are
    /// skipped at snapshot time.
    Struct(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Converts any serde-serializable value into a scalar JSON tree.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        Ok(FieldValue::Scalar(serde_json::to_value(value)?))
    }

    pub fn serializable<T: ToSnapshot + 'static>(value: T) -> Self {
        FieldValue::Serializable(Rc::new(value))
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            FieldValue::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            FieldValue::Mapping(entries) => f.debug_tuple("Mapping").field(entries).finish(),
            FieldValue::Tracker(child) => match child.try_borrow() {
                Ok(child) => f
                    .debug_tuple("Tracker")
                    .field(&child.fields().keys().collect::<Vec<_>>())
                    .finish(),
                Err(_) => f.write_str("Tracker(<borrowed>)"),
            },
            FieldValue::Serializable(_) => f.write_str("Serializable(..)"),
            FieldValue::Struct(entries) => f.debug_tuple("Struct").field(entries).finish(),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(Value::from(value))
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<BTreeMap<String, T>> for FieldValue {
    fn from(entries: BTreeMap<String, T>) -> Self {
        FieldValue::Mapping(
            entries
                .into_iter()
                .map(|(name, value)| (name, value.into()))
                .collect(),
        )
    }
}

impl From<SharedTracker> for FieldValue {
    fn from(tracker: SharedTracker) -> Self {
        FieldValue::Tracker(tracker)
    }
}
