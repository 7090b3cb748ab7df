//! # rostersync-sync
//!
//! The reconciliation engine. A run loads a directory roster and the remote
//! contact roster, matches them on phone number, and issues the creates,
//! updates and deletes that make the remote side match the directory.
//!
//! - [`page`]: size-sentinel pagination
//! - [`snapshot`]: roster and catalog loading
//! - [`lists`]: office → contact list resolution
//! - [`reconcile`]: the add / update / remove / unchanged partition
//! - [`apply`]: one write per record, dry-run aware
//! - [`pipeline`]: the whole run, as used by the CLI
//!
//! All API access goes through the [`RemoteClient`] trait.

pub mod apply;
pub mod client;
pub mod error;
pub mod lists;
pub mod page;
pub mod pipeline;
pub mod reconcile;
pub mod snapshot;

pub use apply::{ApplyMode, ApplyReport, ChangeApplier, Counts, Operation, Outcome, RecordOutcome};
pub use client::{ContactPayload, HttpRemoteClient, RemoteClient, RemoteContact, RemoteList};
pub use error::{RemoteError, SyncError};
pub use lists::{groups_missing_from_catalog, ListResolver};
pub use pipeline::{ListsReport, Overrides, RunOptions, RunReport};
pub use reconcile::{reconcile, ChangeSet, Drift, ReconcileOptions, Update};
pub use snapshot::{load_snapshot, LoadIssue, Snapshot, SnapshotLoader};
