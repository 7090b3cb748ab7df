//! The reconciler: one pass over the sorted union of phone keys.
//!
//! | present in        | outcome                                  |
//! |-------------------|------------------------------------------|
//! | source only       | add, target = source with resolved lists |
//! | remote only       | remove                                   |
//! | both, drifted     | update                                   |
//! | both, no drift    | unchanged                                |

use std::collections::BTreeSet;

use serde::Serialize;

use rostersync_core::{Phone, Record, Roster};

use crate::lists::ListResolver;

/// A field that differs between the source and the remote contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Drift {
    FirstName,
    LastName,
    Email,
    Membership,
}

impl Drift {
    pub fn as_str(self) -> &'static str {
        match self {
            Drift::FirstName => "first_name",
            Drift::LastName => "last_name",
            Drift::Email => "email",
            Drift::Membership => "membership",
        }
    }
}

/// A contact that exists on both sides but needs rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Update {
    /// What the contact should look like after the write.
    pub target: Record,
    /// The contact as it was fetched.
    pub current: Record,
    pub drift: Vec<Drift>,
}

/// The four disjoint partitions of `source ∪ remote`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub to_add: Vec<Record>,
    pub to_update: Vec<Update>,
    pub to_remove: Vec<Record>,
    pub unchanged: Vec<Record>,
}

impl ChangeSet {
    /// `true` when no write is needed.
    pub fn is_empty(&self) -> bool {
        self.pending_writes() == 0
    }

    pub fn pending_writes(&self) -> usize {
        self.to_add.len() + self.to_update.len() + self.to_remove.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Treat a changed email as drift.
    pub compare_email: bool,
    /// Keep every list the contact is already on when it is rewritten.
    pub preserve_remote_groups: bool,
}

/// Classify every key of `source ∪ remote`.
pub fn reconcile(
    source: &Roster,
    remote: &Roster,
    resolver: &ListResolver<'_>,
    options: ReconcileOptions,
) -> ChangeSet {
    let keys: BTreeSet<&Phone> = source.keys().chain(remote.keys()).collect();
    let mut changes = ChangeSet::default();

    for key in keys {
        match (source.get(key), remote.get(key)) {
            (Some(src), None) => changes.to_add.push(resolver.resolved(src)),
            (None, Some(rem)) => changes.to_remove.push(rem.clone()),
            (Some(src), Some(rem)) => {
                let drift = detect_drift(src, rem, resolver, options);
                if drift.is_empty() {
                    changes.unchanged.push(src.clone());
                } else {
                    let mut target = resolver.resolved(src);
                    if options.preserve_remote_groups {
                        target.group_ids.extend(rem.group_ids.iter().cloned());
                    }
                    tracing::debug!(
                        "{key} drifted: {}",
                        drift.iter().map(|d| d.as_str()).collect::<Vec<_>>().join(", ")
                    );
                    changes.to_update.push(Update {
                        target,
                        current: rem.clone(),
                        drift,
                    });
                }
            }
            (None, None) => {}
        }
    }

    tracing::info!(
        "reconciled: {} add, {} update, {} remove, {} unchanged",
        changes.to_add.len(),
        changes.to_update.len(),
        changes.to_remove.len(),
        changes.unchanged.len()
    );
    changes
}

/// Fields on which `remote` differs from `source`.
///
/// Names compare exactly. Membership drifts only when the office list
/// resolves and the contact is on it neither by id nor by name; lists the
/// contact has beyond that are never drift.
pub fn detect_drift(
    source: &Record,
    remote: &Record,
    resolver: &ListResolver<'_>,
    options: ReconcileOptions,
) -> Vec<Drift> {
    let mut drift = Vec::new();
    if source.first_name != remote.first_name {
        drift.push(Drift::FirstName);
    }
    if source.last_name != remote.last_name {
        drift.push(Drift::LastName);
    }
    if options.compare_email && source.email != remote.email {
        drift.push(Drift::Email);
    }
    if let Some(group) = resolver.office_group(source) {
        if !remote.is_member_of(group) {
            drift.push(Drift::Membership);
        }
    }
    drift
}
