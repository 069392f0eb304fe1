use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::models::{Action, ChangeRecord};

/// Classifies one field's transition between two snapshots. Equality is
/// structural, not identity. Returns `None` when nothing happened.
pub fn classify(old: Option<&Value>, new: Option<&Value>) -> Option<Action> {
    match (old, new) {
        (None, Some(_)) => Some(Action::Created),
        (Some(_), None) => Some(Action::Deleted),
        (Some(old), Some(new)) if old != new => Some(Action::Changed),
        _ => None,
    }
}

/// Compares the stored snapshot against a freshly snapshotted current state
/// and produces one unstamped record per differing field.
///
/// The union of field names is visited in lexicographic order. Pure: neither
/// input is touched.
pub fn diff_snapshots(
    original: &BTreeMap<String, Value>,
    current: &BTreeMap<String, Value>,
) -> Vec<ChangeRecord> {
    let names: BTreeSet<&str> = original
        .keys()
        .chain(current.keys())
        .map(String::as_str)
        .collect();

    let mut records = Vec::new();
    for name in names {
        let old = original.get(name);
        let new = current.get(name);
        if let Some(action) = classify(old, new) {
            records.push(ChangeRecord::new(name, old.cloned(), new.cloned(), action));
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(entries: &[(&str, Value)]) -> BTreeMap<String, Value> {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_classify_created() {
        assert_eq!(classify(None, Some(&json!(1))), Some(Action::Created));
    }

    #[test]
    fn test_classify_deleted() {
        assert_eq!(classify(Some(&json!(1)), None), Some(Action::Deleted));
    }

    #[test]
    fn test_classify_changed() {
        assert_eq!(
            classify(Some(&json!(1)), Some(&json!(2))),
            Some(Action::Changed)
        );
    }

    #[test]
    fn test_classify_equal_is_no_action() {
        assert_eq!(classify(Some(&json!([1, 2])), Some(&json!([1, 2]))), None);
        assert_eq!(classify(None, None), None);
    }

    #[test]
    fn test_classify_created_null_value() {
        assert_eq!(classify(None, Some(&Value::Null)), Some(Action::Created));
    }

    #[test]
    fn test_diff_emits_one_record_per_changed_field() {
        let original = state(&[("a", json!(1)), ("b", json!("x"))]);
        let current = state(&[("a", json!(2)), ("b", json!("x"))]);

        let records = diff_snapshots(&original, &current);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field, "a");
        assert_eq!(records[0].action, Action::Changed);
        assert_eq!(records[0].old_value, Some(json!(1)));
        assert_eq!(records[0].new_value, Some(json!(2)));
    }

    #[test]
    fn test_diff_covers_created_and_deleted() {
        let original = state(&[("gone", json!(1))]);
        let current = state(&[("fresh", json!(2))]);

        let records = diff_snapshots(&original, &current);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field, "fresh");
        assert_eq!(records[0].action, Action::Created);
        assert_eq!(records[0].old_value, None);
        assert_eq!(records[1].field, "gone");
        assert_eq!(records[1].action, Action::Deleted);
        assert_eq!(records[1].new_value, None);
    }

    #[test]
    fn test_diff_identical_states_is_empty() {
        let original = state(&[("a", json!({"k": [1, 2]}))]);
        let records = diff_snapshots(&original, &original.clone());
        assert!(records.is_empty());
    }

    #[test]
    fn test_diff_records_are_unstamped() {
        let original = state(&[]);
        let current = state(&[("a", json!(1))]);

        let records = diff_snapshots(&original, &current);
        assert!(records[0].init.is_none());
        assert!(records[0].commit_id.is_none());
        assert!(records[0].timestamp.is_none());
    }

    #[test]
    fn test_diff_order_is_lexicographic() {
        let original = state(&[("b", json!(1)), ("d", json!(1))]);
        let current = state(&[("a", json!(1)), ("c", json!(1))]);

        let fields: Vec<_> = diff_snapshots(&original, &current)
            .into_iter()
            .map(|record| record.field)
            .collect();
        assert_eq!(fields, vec!["a", "b", "c", "d"]);
    }
}
