//! Snapshot loading: the source roster, the remote roster and the group
//! catalog, each normalized and keyed.
//!
//! Loading never fails. A directory error yields an empty source roster, a
//! failed page yields a truncated remote collection; both are recorded as a
//! [`LoadIssue`] so the run report can show what the snapshot is missing.

use std::fmt;
use std::num::NonZeroUsize;

use serde::Serialize;

use rostersync_core::normalize::{non_blank, normalize_email, normalize_phone};
use rostersync_core::{Group, GroupCatalog, Phone, Provenance, Record, Roster};
use rostersync_directory::DirectorySource;

use crate::client::{RemoteClient, RemoteContact};
use crate::page::{fetch_all, Fetched};

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// A remote collection fetched through the pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Contacts,
    Lists,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Contacts => f.write_str("contacts"),
            Collection::Lists => f.write_str("lists"),
        }
    }
}

/// Something that makes a snapshot less trustworthy without stopping the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadIssue {
    /// The directory could not be read; the source roster is empty.
    DirectoryUnavailable { directory: String, reason: String },
    /// The directory answered with zero users.
    EmptySource { directory: String },
    /// A remote collection stopped early at `page`.
    Truncated {
        collection: Collection,
        page: usize,
        reason: String,
    },
    /// Keys that appeared more than once; the last occurrence was kept.
    DuplicateKeys {
        provenance: Provenance,
        phones: Vec<Phone>,
    },
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadIssue::DirectoryUnavailable { directory, reason } => {
                write!(f, "directory {directory} unavailable: {reason}")
            }
            LoadIssue::EmptySource { directory } => {
                write!(f, "directory {directory} returned no users")
            }
            LoadIssue::Truncated {
                collection,
                page,
                reason,
            } => write!(f, "{collection} truncated at page {page}: {reason}"),
            LoadIssue::DuplicateKeys { provenance, phones } => {
                let provenance = match provenance {
                    Provenance::Source => "source",
                    Provenance::Remote => "remote",
                };
                let list: Vec<&str> = phones.iter().map(Phone::as_str).collect();
                write!(
                    f,
                    "{} duplicate {provenance} phone(s), last entry kept: {}",
                    phones.len(),
                    list.join(", ")
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// One loaded value with the issues and request count it cost.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub issues: Vec<LoadIssue>,
    pub requests: usize,
}

/// Everything the reconciler needs, plus how it was obtained.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub source: Roster,
    pub remote: Roster,
    pub catalog: GroupCatalog,
    pub issues: Vec<LoadIssue>,
    /// Remote page requests issued while loading.
    pub requests: usize,
}

/// Builds snapshots from a directory and a contacts API client.
pub struct SnapshotLoader<'a> {
    directory: &'a dyn DirectorySource,
    client: &'a dyn RemoteClient,
    page_size: NonZeroUsize,
}

impl<'a> SnapshotLoader<'a> {
    pub fn new(
        directory: &'a dyn DirectorySource,
        client: &'a dyn RemoteClient,
        page_size: NonZeroUsize,
    ) -> Self {
        Self {
            directory,
            client,
            page_size,
        }
    }

    /// Load source, remote contacts and catalog, in that order.
    pub fn load(&self) -> Snapshot {
        let source = self.source();
        let remote = self.remote();
        let catalog = self.catalog();

        let mut issues = source.issues;
        issues.extend(remote.issues);
        issues.extend(catalog.issues);

        tracing::info!(
            "snapshot: {} source, {} remote, {} lists ({} requests)",
            source.value.len(),
            remote.value.len(),
            catalog.value.len(),
            remote.requests + catalog.requests
        );

        Snapshot {
            source: source.value,
            remote: remote.value,
            catalog: catalog.value,
            issues,
            requests: remote.requests + catalog.requests,
        }
    }

    /// Read and normalize the directory.
    pub fn source(&self) -> Loaded<Roster> {
        let directory = self.directory.describe();
        let mut issues = Vec::new();

        let raw = match self.directory.fetch_records() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("directory {directory} unavailable: {e}");
                issues.push(LoadIssue::DirectoryUnavailable {
                    directory,
                    reason: e.to_string(),
                });
                return Loaded {
                    value: Roster::empty(Provenance::Source),
                    issues,
                    requests: 0,
                };
            }
        };

        if raw.is_empty() {
            tracing::warn!("directory {directory} returned no users");
            issues.push(LoadIssue::EmptySource { directory });
        }

        let total = raw.len();
        let records: Vec<Record> = raw.iter().filter_map(|r| r.normalize()).collect();
        let skipped = total - records.len();
        if skipped > 0 {
            tracing::debug!("skipped {skipped} directory users without a usable mobile number");
        }

        let roster = Roster::from_records(Provenance::Source, records).with_skipped(skipped);
        issues.extend(duplicate_issue(&roster));
        Loaded {
            value: roster,
            issues,
            requests: 0,
        }
    }

    /// Fetch and normalize every remote contact.
    pub fn remote(&self) -> Loaded<Roster> {
        let fetched = fetch_all(self.page_size, |page| {
            self.client.list_contacts_page(page, self.page_size.get())
        });
        let Fetched {
            items,
            requests,
            truncated,
        } = fetched;

        let total = items.len();
        let records: Vec<Record> = items.into_iter().filter_map(normalize_contact).collect();
        let skipped = total - records.len();

        let roster = Roster::from_records(Provenance::Remote, records).with_skipped(skipped);
        let mut issues: Vec<LoadIssue> = truncated
            .map(|t| LoadIssue::Truncated {
                collection: Collection::Contacts,
                page: t.page,
                reason: t.error.to_string(),
            })
            .into_iter()
            .collect();
        issues.extend(duplicate_issue(&roster));

        Loaded {
            value: roster,
            issues,
            requests,
        }
    }

    /// Fetch every remote contact list.
    pub fn catalog(&self) -> Loaded<GroupCatalog> {
        let Fetched {
            items,
            requests,
            truncated,
        } = fetch_all(self.page_size, |page| {
            self.client.list_groups_page(page, self.page_size.get())
        });

        let catalog = GroupCatalog::from_groups(
            items
                .into_iter()
                .filter(|list| !list.name.trim().is_empty())
                .map(Group::from),
        );
        let issues = truncated
            .map(|t| LoadIssue::Truncated {
                collection: Collection::Lists,
                page: t.page,
                reason: t.error.to_string(),
            })
            .into_iter()
            .collect();

        Loaded {
            value: catalog,
            issues,
            requests,
        }
    }
}

/// Shorthand for `SnapshotLoader::new(..).load()`.
pub fn load_snapshot(
    directory: &dyn DirectorySource,
    client: &dyn RemoteClient,
    page_size: NonZeroUsize,
) -> Snapshot {
    SnapshotLoader::new(directory, client, page_size).load()
}

/// Normalize a contact the same way directory users are normalized.
///
/// Memberships keep both sides of each list: its effective id (so the
/// contact can be written back with the same lists) and its name.
pub fn normalize_contact(contact: RemoteContact) -> Option<Record> {
    let phone = normalize_phone(contact.contact_phone.as_deref())?;
    let mut record = Record::new(phone);
    record.first_name = non_blank(contact.first_name.as_deref());
    record.last_name = non_blank(contact.last_name.as_deref());
    record.email = normalize_email(contact.email.as_deref());

    for list in contact.lists {
        let group = Group::from(list);
        if group.id.is_none() && group.name.trim().is_empty() {
            continue;
        }
        record.group_ids.insert(group.effective_id());
        if !group.name.trim().is_empty() {
            record.group_names.insert(group.name);
        }
    }
    Some(record)
}

fn duplicate_issue(roster: &Roster) -> Option<LoadIssue> {
    if roster.duplicates().is_empty() {
        return None;
    }
    let issue = LoadIssue::DuplicateKeys {
        provenance: roster.provenance(),
        phones: roster.duplicates().iter().cloned().collect(),
    };
    tracing::warn!("{issue}");
    Some(issue)
}
