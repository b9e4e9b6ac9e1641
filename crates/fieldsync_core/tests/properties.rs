//! Property tests for store invariants.

use fieldsync_core::{CollectionSchema, Record, RecordId, Schema, Store};
use proptest::prelude::*;

fn store() -> Store {
    Store::open_in_memory(Schema::new(1).with_collection(CollectionSchema::auto_increment("sales"))).unwrap()
}

proptest! {
    #[test]
    fn replace_all_numbers_densely(quantities in prop::collection::vec(1i64..100, 0..20)) {
        let store = store();
        store.put("sales", Record::new().with("quantity", 0)).unwrap();

        let incoming: Vec<Record> = quantities
            .iter()
            .enumerate()
            .map(|(i, q)| Record::new().with("id", 1000 + i as i64).with("quantity", *q))
            .collect();
        store.replace_all("sales", incoming).unwrap();

        let all = store.get_all("sales").unwrap();
        prop_assert_eq!(all.len(), quantities.len());
        for (i, record) in all.iter().enumerate() {
            prop_assert_eq!(record.id(), Some(RecordId::Int(i as i64 + 1)));
            prop_assert_eq!(record.get("quantity").and_then(|v| v.as_i64()), Some(quantities[i]));
        }
    }

    #[test]
    fn generated_ids_never_repeat(removals in prop::collection::vec(any::<bool>(), 1..20)) {
        let store = store();
        let mut seen = Vec::new();
        for remove in removals {
            let id = store.put("sales", Record::new().with("quantity", 1)).unwrap();
            prop_assert!(!seen.contains(&id));
            if remove {
                store.remove("sales", &id).unwrap();
            }
            seen.push(id);
        }
    }
}
