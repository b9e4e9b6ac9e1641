//! Merge engine.
//!
//! Reconciles the remote and local arrays of one collection by record id.
//! Remote records go in first, local records second, and a later insertion
//! replaces any earlier record with the same id. The result keeps the
//! position where each id was first seen.
//!
//! Records whose `id` is missing, null, or not an integer or string are
//! dropped. Same-id records are never reconciled field by field.

use fieldsync_core::{Record, RecordId};
use indexmap::IndexMap;

/// Counters describing one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Records read from the remote side.
    pub remote: usize,
    /// Records read from the local side.
    pub local: usize,
    /// Records in the result.
    pub merged: usize,
    /// Insertions that replaced an earlier record with the same id.
    pub overwritten: usize,
    /// Records dropped for lacking a usable id.
    pub dropped: usize,
}

/// Merges `remote` and `local`, local side winning on equal ids.
#[must_use]
pub fn merge(remote: &[Record], local: &[Record]) -> Vec<Record> {
    merge_with_stats(remote, local).0
}

/// Like [`merge`], also returning what happened.
#[must_use]
pub fn merge_with_stats(remote: &[Record], local: &[Record]) -> (Vec<Record>, MergeStats) {
    let mut by_id: IndexMap<RecordId, &Record> = IndexMap::with_capacity(remote.len() + local.len());
    let mut stats = MergeStats {
        remote: remote.len(),
        local: local.len(),
        ..MergeStats::default()
    };

    for record in remote.iter().chain(local) {
        match record.id() {
            Some(id) => {
                if by_id.insert(id, record).is_some() {
                    stats.overwritten += 1;
                }
            }
            None => stats.dropped += 1,
        }
    }

    let merged: Vec<Record> = by_id.into_values().cloned().collect();
    stats.merged = merged.len();
    (merged, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn local_wins_on_shared_id() {
        let remote = vec![rec(json!({"id": 1, "month": 3, "branch": "X", "product": "A", "meta": 10}))];
        let local = vec![
            rec(json!({"id": 1, "month": 3, "branch": "X", "product": "A", "meta": 20})),
            rec(json!({"id": 2, "month": 4, "branch": "Y", "product": "B", "meta": 5})),
        ];

        let (merged, stats) = merge_with_stats(&remote, &local);

        assert_eq!(merged, local);
        assert_eq!(
            stats,
            MergeStats {
                remote: 1,
                local: 2,
                merged: 2,
                overwritten: 1,
                dropped: 0,
            }
        );
    }

    #[test]
    fn first_seen_position_is_kept() {
        let remote = vec![rec(json!({"id": 5, "v": "r5"})), rec(json!({"id": 1, "v": "r1"}))];
        let local = vec![rec(json!({"id": 1, "v": "l1"})), rec(json!({"id": 9, "v": "l9"}))];

        let merged = merge(&remote, &local);
        let values: Vec<_> = merged.iter().map(|r| r.get("v").unwrap().as_str().unwrap()).collect();
        assert_eq!(values, vec!["r5", "l1", "l9"]);
    }

    #[test]
    fn records_without_usable_id_are_dropped() {
        let remote = vec![
            rec(json!({"v": "no id"})),
            rec(json!({"id": null, "v": "null id"})),
            rec(json!({"id": 1.5, "v": "float id"})),
        ];
        let local = vec![rec(json!({"id": "7_2024-05-01", "v": "kept"}))];

        let (merged, stats) = merge_with_stats(&remote, &local);
        assert_eq!(merged.len(), 1);
        assert_eq!(stats.dropped, 3);
    }

    #[test]
    fn integer_and_string_ids_do_not_collide() {
        let remote = vec![rec(json!({"id": 1, "v": "int"}))];
        let local = vec![rec(json!({"id": "1", "v": "text"}))];
        assert_eq!(merge(&remote, &local).len(), 2);
    }

    #[test]
    fn duplicate_ids_within_one_side_keep_the_last() {
        let local = vec![rec(json!({"id": 3, "v": "a"})), rec(json!({"id": 3, "v": "b"}))];
        let merged = merge(&[], &local);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].get("v").unwrap(), "b");
    }
}
