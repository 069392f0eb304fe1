use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::diff;
use crate::error::{Error, Result};
use crate::filter::{self, RESERVED_FIELDS};
use crate::models::{ChangeLog, ChangeRecord, CommitStamp, IncludeMode};
use crate::snapshot;
use crate::value::{FieldValue, SharedTracker};

/// Per-commit knobs. All optional; missing stamp parts are generated.
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    new_data: Option<BTreeMap<String, FieldValue>>,
    init: bool,
    commit_id: Option<Uuid>,
    timestamp: Option<DateTime<Utc>>,
}

impl CommitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits the supplied data instead of the tracker's live fields. The
    /// live fields themselves are left untouched.
    pub fn with_data(mut self, data: BTreeMap<String, FieldValue>) -> Self {
        self.new_data = Some(data);
        self
    }

    pub fn with_init(mut self, init: bool) -> Self {
        self.init = init;
        self
    }

    pub fn with_commit_id(mut self, commit_id: Uuid) -> Self {
        self.commit_id = Some(commit_id);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// An entity whose field-level changes are recorded across commits.
///
/// The tracker owns an explicit map of named live fields, the snapshot taken
/// at the last commit, and the append-only change log. Mutations are never
/// detected automatically; callers ask for a [`diff`](Tracker::diff) preview
/// or run a [`commit`](Tracker::commit).
#[derive(Debug, Clone)]
pub struct Tracker {
    include_mode: IncludeMode,
    fields: BTreeMap<String, FieldValue>,
    original: BTreeMap<String, Value>,
    log: ChangeLog,
}

impl Tracker {
    /// An empty tracker with no fields and no initial commit.
    pub fn new(include_mode: IncludeMode) -> Self {
        Self {
            include_mode,
            fields: BTreeMap::new(),
            original: BTreeMap::new(),
            log: ChangeLog::new(),
        }
    }

    pub fn builder() -> TrackerBuilder {
        TrackerBuilder::new()
    }

    pub fn include_mode(&self) -> IncludeMode {
        self.include_mode
    }

    /// The live field map, bookkeeping excluded by construction.
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// The state as of the last commit that recorded changes.
    pub fn stored_snapshot(&self) -> &BTreeMap<String, Value> {
        &self.original
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.log
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Wraps the tracker for use as a nested field of another tracker.
    pub fn into_shared(self) -> SharedTracker {
        Rc::new(RefCell::new(self))
    }

    fn filtered_fields(&self) -> BTreeMap<&str, &FieldValue> {
        filter::filter_fields(&self.fields, self.include_mode, None, RESERVED_FIELDS)
    }

    /// Read-only preview of pending changes against the live fields. Does
    /// not touch the stored snapshot or the log.
    pub fn diff(&self) -> Vec<ChangeRecord> {
        let current = snapshot::snapshot_fields(self.filtered_fields());
        diff::diff_snapshots(&self.original, &current)
    }

    /// Preview against externally supplied data, filtered with this
    /// tracker's include mode first.
    pub fn diff_against(&self, data: &BTreeMap<String, FieldValue>) -> Vec<ChangeRecord> {
        let filtered = filter::filter_fields(data, self.include_mode, None, RESERVED_FIELDS);
        let current = snapshot::snapshot_fields(filtered);
        diff::diff_snapshots(&self.original, &current)
    }

    /// Commits the live fields. Returns `Ok(true)` when changes were
    /// recorded and `Ok(false)` for a no-op commit.
    pub fn commit(&mut self) -> Result<bool> {
        self.commit_with(CommitOptions::new())
    }

    /// Commits with explicit options.
    ///
    /// A commit that detects no differences consumes no commit id or
    /// timestamp, appends nothing, and does not recurse into children.
    /// Otherwise the stored snapshot is replaced wholesale, every directly
    /// held nested tracker is committed with the same stamp (whether or not
    /// it has pending changes of its own, so all descendant records share
    /// commit lineage), and the stamped records are appended to the log.
    pub fn commit_with(&mut self, options: CommitOptions) -> Result<bool> {
        let current = match options.new_data.as_ref() {
            Some(data) => {
                let filtered =
                    filter::filter_fields(data, self.include_mode, None, RESERVED_FIELDS);
                snapshot::snapshot_fields(filtered)
            }
            None => snapshot::snapshot_fields(self.filtered_fields()),
        };

        let mut records = diff::diff_snapshots(&self.original, &current);
        if records.is_empty() {
            trace!(fields = current.len(), "commit found no changes");
            return Ok(false);
        }

        let stamp = CommitStamp {
            commit_id: options.commit_id.unwrap_or_else(Uuid::new_v4),
            timestamp: options.timestamp.unwrap_or_else(Utc::now),
            init: options.init,
        };

        // Children commit before this tracker's own state advances, so a
        // busy child leaves the parent's snapshot and log untouched.
        for (name, value) in &self.fields {
            if let FieldValue::Tracker(child) = value {
                let mut child = child
                    .try_borrow_mut()
                    .map_err(|_| Error::NestedTrackerBusy(name.clone()))?;
                child.commit_with(
                    CommitOptions::new()
                        .with_init(stamp.init)
                        .with_commit_id(stamp.commit_id)
                        .with_timestamp(stamp.timestamp),
                )?;
            }
        }

        self.original = current;

        debug!(
            commit_id = %stamp.commit_id,
            records = records.len(),
            init = stamp.init,
            "commit recorded changes"
        );

        for record in &mut records {
            record.stamp(&stamp);
        }
        for record in records {
            self.log.append(record);
        }

        Ok(true)
    }
}

/// Builds a tracker from declared fields. Performs an init commit by
/// default, seeding the stored snapshot and logging every field as Created
/// with `init = true`.
#[derive(Debug)]
pub struct TrackerBuilder {
    include_mode: IncludeMode,
    fields: BTreeMap<String, FieldValue>,
    init_commit: bool,
}

impl TrackerBuilder {
    fn new() -> Self {
        Self {
            include_mode: IncludeMode::default(),
            fields: BTreeMap::new(),
            init_commit: true,
        }
    }

    pub fn include_mode(mut self, include_mode: IncludeMode) -> Self {
        self.include_mode = include_mode;
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Suppresses the automatic init commit; the stored snapshot stays
    /// empty until the first explicit commit.
    pub fn init_commit(mut self, init_commit: bool) -> Self {
        self.init_commit = init_commit;
        self
    }

    pub fn build(self) -> Result<Tracker> {
        let mut tracker = Tracker {
            include_mode: self.include_mode,
            fields: self.fields,
            original: BTreeMap::new(),
            log: ChangeLog::new(),
        };
        if self.init_commit {
            tracker.commit_with(CommitOptions::new().with_init(true))?;
        }
        Ok(tracker)
    }
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
