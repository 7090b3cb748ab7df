//! Change application.
//!
//! Each record in a [`ChangeSet`] costs exactly one API call: add → create,
//! update → upsert with list replacement, remove → delete. Calls are
//! independent: a failure is recorded against its record and the next one
//! is attempted. Nothing is retried or rolled back.
//!
//! In [`ApplyMode::DryRun`] no write is issued and every record is reported
//! as [`Outcome::WouldApply`].

use serde::Serialize;

use rostersync_core::Phone;

use crate::client::{ContactPayload, RemoteClient};
use crate::error::RemoteError;
use crate::reconcile::ChangeSet;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    Live,
    DryRun,
}

impl ApplyMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            ApplyMode::DryRun
        } else {
            ApplyMode::Live
        }
    }

    pub fn is_dry_run(self) -> bool {
        self == ApplyMode::DryRun
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
    CreateList,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::CreateList => "create list",
        }
    }
}

/// Outcome of a single write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The API accepted the write.
    Applied,
    /// Dry run: the write was not issued.
    WouldApply,
    /// The write was attempted and rejected or lost.
    Failed { reason: String },
}

/// One record's (or one list's) write and how it went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordOutcome {
    pub operation: Operation,
    /// Phone for contact writes, list name for list creation.
    pub key: String,
    /// Human label for reports; empty for lists.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub outcome: Outcome,
}

impl RecordOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}

/// Attempted / succeeded / failed for one partition.
///
/// In dry-run `succeeded` counts records that would have been written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Counts {
    fn record(&mut self, outcome: &Outcome) {
        self.attempted += 1;
        match outcome {
            Outcome::Failed { .. } => self.failed += 1,
            Outcome::Applied | Outcome::WouldApply => self.succeeded += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub mode: ApplyMode,
    pub created: Counts,
    pub updated: Counts,
    pub deleted: Counts,
    pub unchanged: usize,
    pub outcomes: Vec<RecordOutcome>,
}

impl ApplyReport {
    pub fn new(mode: ApplyMode) -> Self {
        Self {
            mode,
            created: Counts::default(),
            updated: Counts::default(),
            deleted: Counts::default(),
            unchanged: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(RecordOutcome::is_failure)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    fn push(&mut self, outcome: RecordOutcome) {
        match outcome.operation {
            Operation::Create => self.created.record(&outcome.outcome),
            Operation::Update => self.updated.record(&outcome.outcome),
            Operation::Delete => self.deleted.record(&outcome.outcome),
            Operation::CreateList => {}
        }
        self.outcomes.push(outcome);
    }
}

// ---------------------------------------------------------------------------
// Applier
// ---------------------------------------------------------------------------

/// Drives the writes for a changeset through a [`RemoteClient`].
pub struct ChangeApplier<'a> {
    client: &'a dyn RemoteClient,
    mode: ApplyMode,
}

impl<'a> ChangeApplier<'a> {
    pub fn new(client: &'a dyn RemoteClient, mode: ApplyMode) -> Self {
        Self { client, mode }
    }

    pub fn mode(&self) -> ApplyMode {
        self.mode
    }

    /// Apply every pending write: adds, then updates, then removes.
    pub fn apply(&self, changes: &ChangeSet) -> ApplyReport {
        let mut report = ApplyReport::new(self.mode);
        report.unchanged = changes.unchanged.len();

        for record in &changes.to_add {
            let payload = ContactPayload::from_record(record);
            let outcome = self.write(Operation::Create, &record.phone, || {
                self.client.create_contact(&payload)
            });
            report.push(contact_outcome(
                Operation::Create,
                &record.phone,
                record.display_name(),
                outcome,
            ));
        }

        for update in &changes.to_update {
            let target = &update.target;
            let payload = ContactPayload::from_record(target);
            let outcome = self.write(Operation::Update, &target.phone, || {
                self.client.upsert_contact(&target.phone, &payload)
            });
            report.push(contact_outcome(
                Operation::Update,
                &target.phone,
                target.display_name(),
                outcome,
            ));
        }

        for record in &changes.to_remove {
            let outcome = self.write(Operation::Delete, &record.phone, || {
                self.client.delete_contact(&record.phone)
            });
            report.push(contact_outcome(
                Operation::Delete,
                &record.phone,
                record.display_name(),
                outcome,
            ));
        }

        let prefix = if self.mode.is_dry_run() { "[dry-run] " } else { "" };
        tracing::info!(
            "{prefix}applied: {} created, {} updated, {} deleted, {} failed",
            report.created.succeeded,
            report.updated.succeeded,
            report.deleted.succeeded,
            report.created.failed + report.updated.failed + report.deleted.failed
        );
        report
    }

    /// Create one contact list per name. Same failure and dry-run rules as
    /// [`ChangeApplier::apply`].
    pub fn create_groups(&self, names: &[String]) -> Vec<RecordOutcome> {
        names
            .iter()
            .map(|name| {
                let outcome = if self.mode.is_dry_run() {
                    tracing::info!("[dry-run] would create list {name}");
                    Outcome::WouldApply
                } else {
                    match self.client.create_group(name) {
                        Ok(()) => {
                            tracing::info!("created list {name}");
                            Outcome::Applied
                        }
                        Err(e) => {
                            tracing::warn!("create list {name} failed: {e}");
                            Outcome::Failed {
                                reason: e.to_string(),
                            }
                        }
                    }
                };
                RecordOutcome {
                    operation: Operation::CreateList,
                    key: name.clone(),
                    name: String::new(),
                    outcome,
                }
            })
            .collect()
    }

    fn write<F>(&self, operation: Operation, phone: &Phone, call: F) -> Outcome
    where
        F: FnOnce() -> Result<(), RemoteError>,
    {
        if self.mode.is_dry_run() {
            tracing::info!("[dry-run] would {} {phone}", operation.as_str());
            return Outcome::WouldApply;
        }
        match call() {
            Ok(()) => {
                tracing::info!("{} {phone}: ok", operation.as_str());
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!("{} {phone} failed: {e}", operation.as_str());
                Outcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn contact_outcome(
    operation: Operation,
    phone: &Phone,
    name: String,
    outcome: Outcome,
) -> RecordOutcome {
    RecordOutcome {
        operation,
        key: phone.to_string(),
        name,
        outcome,
    }
}
