use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Policy selecting which field names participate in tracking.
///
/// A name is considered private when it starts with
/// [`crate::filter::PRIVATE_MARKER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncludeMode {
    All,
    OnlyPublic,
    OnlyPrivate,
}

impl Default for IncludeMode {
    fn default() -> Self {
        IncludeMode::OnlyPublic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Created,
    Deleted,
    Changed,
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Created => "created",
            Action::Deleted => "deleted",
            Action::Changed => "changed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Action::Created),
            "deleted" => Some(Action::Deleted),
            "changed" => Some(Action::Changed),
            _ => None,
        }
    }
}

/// One logged field-level difference.
///
/// `init`, `timestamp` and `commit_id` are `None` on records produced by a
/// diff preview and get filled in when a commit stamps them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub field: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub action: Action,
    pub init: Option<bool>,
    pub timestamp: Option<DateTime<Utc>>,
    pub commit_id: Option<Uuid>,
}

impl ChangeRecord {
    pub fn new(
        field: impl Into<String>,
        old_value: Option<Value>,
        new_value: Option<Value>,
        action: Action,
    ) -> Self {
        Self {
            field: field.into(),
            old_value,
            new_value,
            action,
            init: None,
            timestamp: None,
            commit_id: None,
        }
    }

    pub(crate) fn stamp(&mut self, stamp: &CommitStamp) {
        self.init = Some(stamp.init);
        self.timestamp = Some(stamp.timestamp);
        self.commit_id = Some(stamp.commit_id);
    }
}

/// Metadata shared by every record produced within one commit, including
/// records appended to recursively committed child trackers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommitStamp {
    pub commit_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub init: bool,
}

impl CommitStamp {
    pub fn generate(init: bool) -> Self {
        Self {
            commit_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            init,
        }
    }
}

/// Append-only sequence of change records accumulated over a tracker's
/// lifetime. Never truncated or rewritten by the tracker itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeLog {
    records: Vec<ChangeRecord>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, record: ChangeRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeRecord> {
        self.records.iter()
    }

    /// Filters records by action kind and/or init flag. Both criteria must
    /// hold when both are given. Original order is preserved.
    pub fn filtered(&self, action: Option<Action>, init: Option<bool>) -> Vec<&ChangeRecord> {
        self.records
            .iter()
            .filter(|record| action.map_or(true, |a| record.action == a))
            .filter(|record| init.map_or(true, |i| record.init == Some(i)))
            .collect()
    }
}
