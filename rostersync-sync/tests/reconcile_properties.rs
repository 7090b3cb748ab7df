use std::collections::BTreeSet;

use proptest::prelude::*;

use rostersync_core::{Group, GroupCatalog, GroupId, Phone, Provenance, Record, Roster};
use rostersync_sync::{reconcile, ListResolver, ReconcileOptions};

const OFFICES: [&str; 3] = ["HQ", "Depot", "Remote"];

fn record_strategy() -> impl Strategy<Value = Record> {
    (
        0u32..40,
        prop::option::of(prop::sample::select(vec!["Ann", "Bob", "Cy"])),
        prop::option::of(prop::sample::select(OFFICES.to_vec())),
        prop::collection::btree_set(prop::sample::select(vec!["G1", "g-hq", "x"]), 0..3),
    )
        .prop_map(|(n, first, office, lists)| {
            let mut record = Record::new(Phone::parse(&format!("555{n:07}")).unwrap());
            record.first_name = first.map(str::to_string);
            record.office = office.map(str::to_string);
            record.group_ids = lists.into_iter().map(GroupId::from).collect();
            record
        })
}

fn roster_strategy(provenance: Provenance) -> impl Strategy<Value = Roster> {
    prop::collection::vec(record_strategy(), 0..30)
        .prop_map(move |records| Roster::from_records(provenance, records))
}

fn catalog() -> GroupCatalog {
    GroupCatalog::from_groups([Group {
        id: Some(GroupId::from("g-hq")),
        name: "HQ".to_string(),
    }])
}

proptest! {
    #[test]
    fn partitions_are_disjoint_and_cover_every_key(
        source in roster_strategy(Provenance::Source),
        remote in roster_strategy(Provenance::Remote),
        compare_email in any::<bool>(),
        preserve_remote_groups in any::<bool>(),
    ) {
        let catalog = catalog();
        let resolver = ListResolver::new(["G1"], &catalog);
        let options = ReconcileOptions { compare_email, preserve_remote_groups };
        let changes = reconcile(&source, &remote, &resolver, options);

        let partitions: [Vec<&Phone>; 4] = [
            changes.to_add.iter().map(|r| &r.phone).collect(),
            changes.to_update.iter().map(|u| &u.target.phone).collect(),
            changes.to_remove.iter().map(|r| &r.phone).collect(),
            changes.unchanged.iter().map(|r| &r.phone).collect(),
        ];

        let total: usize = partitions.iter().map(Vec::len).sum();
        let covered: BTreeSet<&Phone> = partitions.iter().flatten().copied().collect();
        let expected: BTreeSet<&Phone> = source.keys().chain(remote.keys()).collect();

        prop_assert_eq!(total, covered.len(), "a key landed in two partitions");
        prop_assert_eq!(covered, expected);
    }

    #[test]
    fn adds_come_from_source_and_removes_from_remote(
        source in roster_strategy(Provenance::Source),
        remote in roster_strategy(Provenance::Remote),
    ) {
        let catalog = catalog();
        let resolver = ListResolver::new(["G1"], &catalog);
        let changes = reconcile(&source, &remote, &resolver, ReconcileOptions::default());

        for added in &changes.to_add {
            prop_assert!(source.contains(&added.phone) && !remote.contains(&added.phone));
            prop_assert!(added.group_ids.contains(&GroupId::from("G1")));
        }
        for removed in &changes.to_remove {
            prop_assert!(remote.contains(&removed.phone) && !source.contains(&removed.phone));
        }
        for update in &changes.to_update {
            prop_assert!(!update.drift.is_empty());
        }
    }
}
