//! Property tests for the merge engine.

use fieldsync_core::{Record, RecordId};
use fieldsync_sync_protocol::{merge, merge_with_stats};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn arb_record() -> impl Strategy<Value = Record> {
    let id = prop_oneof![
        (0i64..12).prop_map(serde_json::Value::from),
        "[a-c]_[0-3]".prop_map(serde_json::Value::from),
    ];
    (id, "[a-z]{0,4}", 0i64..100).prop_map(|(id, name, qty)| {
        Record::new().with("id", id).with("name", name).with("quantity", qty)
    })
}

fn arb_records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(arb_record(), 0..16)
}

/// Keys a record list by id, last occurrence winning.
fn as_set(records: &[Record]) -> BTreeMap<RecordId, Record> {
    records
        .iter()
        .filter_map(|r| r.id().map(|id| (id, r.clone())))
        .collect()
}

proptest! {
    #[test]
    fn merge_is_idempotent(remote in arb_records(), local in arb_records()) {
        let once = merge(&remote, &local);
        let twice = merge(&once, &local);
        prop_assert_eq!(as_set(&once), as_set(&twice));
    }

    #[test]
    fn local_side_wins(remote in arb_records(), local in arb_records()) {
        let merged = as_set(&merge(&remote, &local));
        for (id, record) in as_set(&local) {
            prop_assert_eq!(merged.get(&id), Some(&record));
        }
    }

    #[test]
    fn empty_side_preserves_the_other(records in arb_records()) {
        prop_assert_eq!(as_set(&merge(&records, &[])), as_set(&records));
        prop_assert_eq!(as_set(&merge(&[], &records)), as_set(&records));
    }

    #[test]
    fn result_has_unique_ids(remote in arb_records(), local in arb_records()) {
        let merged = merge(&remote, &local);
        prop_assert_eq!(as_set(&merged).len(), merged.len());
    }

    #[test]
    fn remote_only_ids_survive(remote in arb_records(), local in arb_records()) {
        let merged = as_set(&merge(&remote, &local));
        let local_ids = as_set(&local);
        for (id, record) in as_set(&remote) {
            if !local_ids.contains_key(&id) {
                prop_assert_eq!(merged.get(&id), Some(&record));
            }
        }
    }

    #[test]
    fn stats_add_up(remote in arb_records(), local in arb_records()) {
        let (merged, stats) = merge_with_stats(&remote, &local);
        prop_assert_eq!(stats.remote + stats.local, stats.merged + stats.overwritten + stats.dropped);
        prop_assert_eq!(stats.merged, merged.len());
    }
}
