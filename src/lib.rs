//! # snaplog
//!
//! Field-level change tracking for in-memory structured state.
//!
//! A [`Tracker`] holds an explicit map of named live fields, snapshots them
//! on commit, and records field-level differences (created / changed /
//! deleted) in an append-only [`ChangeLog`]. Every record produced by one
//! commit, including records from recursively committed nested trackers,
//! shares one commit id and timestamp.
//!
//! ## Example
//!
//! ```
//! use snaplog::{Action, Tracker};
//!
//! let mut user = Tracker::builder()
//!     .field("name", "Ivan")
//!     .field("age", 20)
//!     .build()
//!     .unwrap();
//!
//! user.set("age", 21);
//!
//! let pending = user.diff();
//! assert_eq!(pending[0].action, Action::Changed);
//!
//! user.commit().unwrap();
//! assert!(user.diff().is_empty());
//! ```

pub mod diff;
pub mod error;
pub mod filter;
pub mod models;
pub mod snapshot;
pub mod tracker;
pub mod value;

pub use error::{Error, Result};
pub use models::{Action, ChangeLog, ChangeRecord, CommitStamp, IncludeMode};
pub use tracker::{CommitOptions, Tracker, TrackerBuilder};
pub use value::{FieldValue, SharedTracker, ToSnapshot};
