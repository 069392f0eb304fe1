use std::collections::BTreeMap;

use crate::models::IncludeMode;
use crate::value::FieldValue;

/// Names starting with this character are private for include-mode purposes.
pub const PRIVATE_MARKER: char = '_';

/// Bookkeeping names that must never be tracked, in any include mode. A user
/// field declared with one of these names is silently ignored.
pub const RESERVED_FIELDS: &[&str] = &["_include_mode", "_original_data", "_changed_log"];

/// Selects the field names that participate in tracking.
///
/// `include = None` means "*" (keep everything). Names absent from `fields`
/// are simply not in the result; the function never fails. Iteration order of
/// the input map is preserved.
pub fn filter_fields<'a>(
    fields: &'a BTreeMap<String, FieldValue>,
    mode: IncludeMode,
    include: Option<&[&str]>,
    exclude: &[&str],
) -> BTreeMap<&'a str, &'a FieldValue> {
    let mut result = BTreeMap::new();
    for (name, value) in fields {
        if let Some(include) = include {
            if !include.contains(&name.as_str()) {
                continue;
            }
        }
        match mode {
            IncludeMode::All => {}
            IncludeMode::OnlyPublic if name.starts_with(PRIVATE_MARKER) => continue,
            IncludeMode::OnlyPrivate if !name.starts_with(PRIVATE_MARKER) => continue,
            _ => {}
        }
        if exclude.contains(&name.as_str()) {
            continue;
        }
        result.insert(name.as_str(), value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> BTreeMap<String, FieldValue> {
        names
            .iter()
            .map(|name| (name.to_string(), FieldValue::from(1)))
            .collect()
    }

    fn names<'a>(filtered: &'a BTreeMap<&'a str, &'a FieldValue>) -> Vec<&'a str> {
        filtered.keys().copied().collect()
    }

    #[test]
    fn test_all_keeps_everything() {
        let fields = fields(&["a", "_b", "c"]);
        let filtered = filter_fields(&fields, IncludeMode::All, None, &[]);
        assert_eq!(names(&filtered), vec!["_b", "a", "c"]);
    }

    #[test]
    fn test_only_public_drops_private_names() {
        let fields = fields(&["a", "_b", "c"]);
        let filtered = filter_fields(&fields, IncludeMode::OnlyPublic, None, &[]);
        assert_eq!(names(&filtered), vec!["a", "c"]);
    }

    #[test]
    fn test_only_private_keeps_private_names() {
        let fields = fields(&["a", "_b", "c"]);
        let filtered = filter_fields(&fields, IncludeMode::OnlyPrivate, None, &[]);
        assert_eq!(names(&filtered), vec!["_b"]);
    }

    #[test]
    fn test_include_list_restricts_result() {
        let fields = fields(&["a", "b", "c"]);
        let filtered = filter_fields(&fields, IncludeMode::All, Some(&["a", "c", "missing"]), &[]);
        assert_eq!(names(&filtered), vec!["a", "c"]);
    }

    #[test]
    fn test_exclude_list_removes_names() {
        let fields = fields(&["a", "b", "c"]);
        let filtered = filter_fields(&fields, IncludeMode::All, None, &["b"]);
        assert_eq!(names(&filtered), vec!["a", "c"]);
    }

    #[test]
    fn test_reserved_fields_dropped_in_every_mode() {
        let fields = fields(&["a", "_include_mode", "_original_data", "_changed_log"]);
        for mode in [
            IncludeMode::All,
            IncludeMode::OnlyPublic,
            IncludeMode::OnlyPrivate,
        ] {
            let filtered = filter_fields(&fields, mode, None, RESERVED_FIELDS);
            for reserved in RESERVED_FIELDS {
                assert!(!filtered.contains_key(reserved));
            }
        }
    }
}
