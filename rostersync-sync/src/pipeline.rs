//! Shared run entrypoint used by `rostersync plan`, `sync` and `lists`.
//!
//! Stages run strictly in sequence:
//! load snapshot → (create missing lists) → resolve → reconcile → apply.
//! Only configuration can fail a run; every later problem ends up in the
//! [`RunReport`].

use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};
use serde::Serialize;

use rostersync_core::{Config, Group, GroupCatalog};
use rostersync_directory::DirectorySource;

use crate::apply::{ApplyMode, ApplyReport, ChangeApplier, Outcome, RecordOutcome};
use crate::client::{HttpRemoteClient, RemoteClient};
use crate::error::SyncError;
use crate::lists::{groups_missing_from_catalog, ListResolver};
use crate::reconcile::{reconcile, ChangeSet, ReconcileOptions};
use crate::snapshot::{LoadIssue, Snapshot, SnapshotLoader};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Validated run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub page_size: NonZeroUsize,
    pub base_list_ids: Vec<String>,
    pub mode: ApplyMode,
    pub reconcile: ReconcileOptions,
    pub create_missing_lists: bool,
}

impl RunOptions {
    /// Validate `config` and extract the settings a run needs.
    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        config.validate()?;
        Ok(Self {
            page_size: config.page_size()?,
            base_list_ids: config.base_list_ids().map(str::to_owned).collect(),
            mode: ApplyMode::from_dry_run(config.dry_run),
            reconcile: ReconcileOptions {
                compare_email: config.compare_email,
                preserve_remote_groups: config.preserve_remote_groups,
            },
            create_missing_lists: config.create_missing_lists,
        })
    }
}

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub dry_run: Option<bool>,
    pub create_missing_lists: Option<bool>,
}

impl Overrides {
    fn apply_to(self, options: &mut RunOptions) {
        if let Some(dry_run) = self.dry_run {
            options.mode = ApplyMode::from_dry_run(dry_run);
        }
        if let Some(create) = self.create_missing_lists {
            options.create_missing_lists = create;
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Roster sizes and data-quality counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub directory: String,
    pub source_records: usize,
    pub remote_records: usize,
    pub lists: usize,
    pub source_duplicates: usize,
    pub remote_duplicates: usize,
    pub skipped_source: usize,
    pub skipped_remote: usize,
    pub requests: usize,
}

impl SnapshotSummary {
    fn of(directory: String, snapshot: &Snapshot) -> Self {
        Self {
            directory,
            source_records: snapshot.source.len(),
            remote_records: snapshot.remote.len(),
            lists: snapshot.catalog.len(),
            source_duplicates: snapshot.source.duplicates().len(),
            remote_duplicates: snapshot.remote.duplicates().len(),
            skipped_source: snapshot.source.skipped_blank_phone(),
            skipped_remote: snapshot.remote.skipped_blank_phone(),
            requests: snapshot.requests,
        }
    }
}

/// Everything one run produced. Lives only as long as the process.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub mode: ApplyMode,
    pub snapshot: SnapshotSummary,
    pub issues: Vec<LoadIssue>,
    pub missing_lists: Vec<String>,
    pub list_outcomes: Vec<RecordOutcome>,
    pub changes: ChangeSet,
    pub apply: ApplyReport,
}

impl RunReport {
    /// Any contact or list write failed.
    pub fn has_failures(&self) -> bool {
        self.apply.has_failures() || self.list_outcomes.iter().any(RecordOutcome::is_failure)
    }
}

/// The catalog next to the offices it does not cover.
#[derive(Debug, Clone, Serialize)]
pub struct ListsReport {
    pub lists: Vec<Group>,
    pub missing: Vec<String>,
    pub issues: Vec<LoadIssue>,
    pub outcomes: Vec<RecordOutcome>,
}

impl ListsReport {
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(RecordOutcome::is_failure)
    }
}

// ---------------------------------------------------------------------------
// Entrypoints
// ---------------------------------------------------------------------------

/// Run one sync against the given collaborators.
pub fn run(
    directory: &dyn DirectorySource,
    client: &dyn RemoteClient,
    options: &RunOptions,
) -> RunReport {
    let started_at = Utc::now();
    let prefix = if options.mode.is_dry_run() { "[dry-run] " } else { "" };
    tracing::info!("{prefix}sync started from {}", directory.describe());

    let loader = SnapshotLoader::new(directory, client, options.page_size);
    let mut snapshot = loader.load();
    let applier = ChangeApplier::new(client, options.mode);

    let missing_lists = groups_missing_from_catalog(&snapshot.source, &snapshot.catalog);
    if !missing_lists.is_empty() {
        tracing::warn!(
            "{} office(s) have no contact list: {}",
            missing_lists.len(),
            missing_lists.join(", ")
        );
    }

    let mut list_outcomes = Vec::new();
    if options.create_missing_lists && !missing_lists.is_empty() {
        list_outcomes = applier.create_groups(&missing_lists);
        if list_outcomes.iter().any(|o| o.outcome == Outcome::Applied) {
            let refreshed = loader.catalog();
            snapshot.catalog =
                merge_catalogs(&snapshot.catalog, refreshed.value.groups().cloned());
            snapshot.issues.extend(refreshed.issues);
            snapshot.requests += refreshed.requests;
        }
        let planned = list_outcomes
            .iter()
            .filter(|o| o.outcome == Outcome::WouldApply)
            .map(|o| Group {
                id: None,
                name: o.key.clone(),
            });
        snapshot.catalog = merge_catalogs(&snapshot.catalog, planned);
    }

    let resolver = ListResolver::new(
        options.base_list_ids.iter().map(String::as_str),
        &snapshot.catalog,
    );
    let changes = reconcile(&snapshot.source, &snapshot.remote, &resolver, options.reconcile);
    let apply = applier.apply(&changes);

    let finished_at = Utc::now();
    tracing::info!(
        "{prefix}sync finished in {} ms",
        (finished_at - started_at).num_milliseconds()
    );

    RunReport {
        started_at,
        finished_at,
        mode: options.mode,
        snapshot: SnapshotSummary::of(directory.describe(), &snapshot),
        issues: snapshot.issues,
        missing_lists,
        list_outcomes,
        changes,
        apply,
    }
}

/// `base` overlaid with `newer`; a list in both keeps the newer entry.
///
/// A catalog refetch can come back truncated, so lists already known are
/// never dropped here.
fn merge_catalogs<I>(base: &GroupCatalog, newer: I) -> GroupCatalog
where
    I: IntoIterator<Item = Group>,
{
    GroupCatalog::from_groups(base.groups().cloned().chain(newer))
}

/// Validate `config`, build the collaborators it names and run.
pub fn run_with_config(config: &Config, overrides: Overrides) -> Result<RunReport, SyncError> {
    let mut options = RunOptions::from_config(config)?;
    overrides.apply_to(&mut options);

    let directory = rostersync_directory::from_config(&config.directory);
    let client = HttpRemoteClient::from_config(config)?;
    Ok(run(directory.as_ref(), &client, &options))
}

/// Fetch the catalog and the offices missing from it; optionally create them.
pub fn inspect_lists(
    directory: &dyn DirectorySource,
    client: &dyn RemoteClient,
    page_size: NonZeroUsize,
    create: Option<ApplyMode>,
) -> ListsReport {
    let loader = SnapshotLoader::new(directory, client, page_size);
    let source = loader.source();
    let catalog = loader.catalog();

    let missing = groups_missing_from_catalog(&source.value, &catalog.value);
    let outcomes = match create {
        Some(mode) if !missing.is_empty() => {
            ChangeApplier::new(client, mode).create_groups(&missing)
        }
        _ => Vec::new(),
    };

    let mut issues = source.issues;
    issues.extend(catalog.issues);
    ListsReport {
        lists: catalog.value.groups().cloned().collect(),
        missing,
        issues,
        outcomes,
    }
}

/// [`inspect_lists`] with collaborators built from `config`.
pub fn lists_with_config(config: &Config, create: bool) -> Result<ListsReport, SyncError> {
    let options = RunOptions::from_config(config)?;
    let directory = rostersync_directory::from_config(&config.directory);
    let client = HttpRemoteClient::from_config(config)?;
    let create = create.then_some(ApplyMode::Live);
    Ok(inspect_lists(directory.as_ref(), &client, options.page_size, create))
}
