//! Office → contact list resolution.

use std::collections::BTreeSet;

use rostersync_core::normalize::is_blank;
use rostersync_core::{Group, GroupCatalog, GroupId, Record, Roster};

/// Derives each source record's target list set.
///
/// The target is the configured base lists plus the list named after the
/// record's office, when such a list exists in the catalog. Offices without
/// a list contribute nothing; [`groups_missing_from_catalog`] reports them.
#[derive(Debug, Clone)]
pub struct ListResolver<'a> {
    base: BTreeSet<GroupId>,
    catalog: &'a GroupCatalog,
}

impl<'a> ListResolver<'a> {
    pub fn new<I, S>(base: I, catalog: &'a GroupCatalog) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<GroupId>,
    {
        Self {
            base: base.into_iter().map(Into::into).collect(),
            catalog,
        }
    }

    pub fn base(&self) -> &BTreeSet<GroupId> {
        &self.base
    }

    /// The catalog list for the record's office, if any.
    pub fn office_group(&self, record: &Record) -> Option<&'a Group> {
        let office = record.office.as_deref();
        if is_blank(office) {
            return None;
        }
        let catalog = self.catalog;
        office.and_then(|name| catalog.get(name))
    }

    /// `base ∪ {effective id of the office list}`.
    pub fn resolve(&self, record: &Record) -> BTreeSet<GroupId> {
        let mut ids = self.base.clone();
        if let Some(group) = self.office_group(record) {
            ids.insert(group.effective_id());
        }
        ids
    }

    /// A copy of `record` whose `group_ids` is the resolved target set.
    pub fn resolved(&self, record: &Record) -> Record {
        let mut target = record.clone();
        target.group_ids = self.resolve(record);
        target
    }
}

/// Distinct non-blank offices in `source` that have no list in `catalog`,
/// sorted by name.
pub fn groups_missing_from_catalog(source: &Roster, catalog: &GroupCatalog) -> Vec<String> {
    source
        .records()
        .filter_map(|record| record.office.as_deref())
        .filter(|office| !is_blank(Some(*office)) && !catalog.contains_name(office))
        .map(str::to_owned)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
