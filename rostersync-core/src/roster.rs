//! Phone-keyed rosters and the remote group catalog.
//!
//! Both are built once per run and never mutated afterwards.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::{Group, Phone, Record};

/// Which system a roster was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Source,
    Remote,
}

/// Normalized snapshot of one system's people, keyed by phone.
///
/// Duplicate keys resolve last-wins in input order. Every key that was seen
/// more than once is listed in [`Roster::duplicates`] so callers can report
/// the data-quality problem instead of it disappearing silently.
#[derive(Debug, Clone)]
pub struct Roster {
    provenance: Provenance,
    records: BTreeMap<Phone, Record>,
    duplicates: BTreeSet<Phone>,
    skipped_blank_phone: usize,
}

impl Roster {
    pub fn empty(provenance: Provenance) -> Self {
        Self {
            provenance,
            records: BTreeMap::new(),
            duplicates: BTreeSet::new(),
            skipped_blank_phone: 0,
        }
    }

    /// Index `records` by phone, last occurrence wins.
    pub fn from_records<I>(provenance: Provenance, records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let mut roster = Self::empty(provenance);
        for record in records {
            let phone = record.phone.clone();
            if roster.records.insert(phone.clone(), record).is_some() {
                roster.duplicates.insert(phone);
            }
        }
        roster
    }

    /// Record how many input entries were dropped for having no usable phone.
    pub fn with_skipped(mut self, skipped_blank_phone: usize) -> Self {
        self.skipped_blank_phone = skipped_blank_phone;
        self
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn get(&self, phone: &Phone) -> Option<&Record> {
        self.records.get(phone)
    }

    pub fn contains(&self, phone: &Phone) -> bool {
        self.records.contains_key(phone)
    }

    pub fn keys(&self) -> btree_map::Keys<'_, Phone, Record> {
        self.records.keys()
    }

    pub fn records(&self) -> btree_map::Values<'_, Phone, Record> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn duplicates(&self) -> &BTreeSet<Phone> {
        &self.duplicates
    }

    pub fn skipped_blank_phone(&self) -> usize {
        self.skipped_blank_phone
    }
}

/// The remote system's contact lists, indexed by name.
#[derive(Debug, Clone, Default)]
pub struct GroupCatalog {
    by_name: BTreeMap<String, Group>,
}

impl GroupCatalog {
    /// Index `groups` by name; a repeated name replaces the earlier entry.
    pub fn from_groups<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = Group>,
    {
        Self {
            by_name: groups.into_iter().map(|g| (g.name.clone(), g)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.by_name.get(name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn groups(&self) -> btree_map::Values<'_, String, Group> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
