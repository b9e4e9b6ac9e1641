//! Serialized image of the whole store.
//!
//! The image is a JSON document:
//!
//! ```text
//! {
//!   "format": 1,
//!   "schemaVersion": 2,
//!   "collections": {
//!     "goals": { "nextId": 3, "records": [ { "id": 1, ... }, { "id": 2, ... } ] },
//!     ...
//!   }
//! }
//! ```
//!
//! It is rewritten as a whole after every committed transaction.

use crate::collection::CollectionData;
use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current image format.
pub(crate) const IMAGE_FORMAT: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageRef<'a> {
    format: u32,
    schema_version: u32,
    collections: BTreeMap<&'a str, CollectionRef<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionRef<'a> {
    next_id: i64,
    records: Vec<&'a Record>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Image {
    format: u32,
    schema_version: u32,
    #[serde(default)]
    collections: BTreeMap<String, CollectionImage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionImage {
    next_id: i64,
    #[serde(default)]
    records: Vec<Record>,
}

/// Encodes collections into image bytes.
pub(crate) fn encode<'a, I>(schema_version: u32, collections: I) -> CoreResult<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a CollectionData)>,
{
    let image = ImageRef {
        format: IMAGE_FORMAT,
        schema_version,
        collections: collections
            .into_iter()
            .map(|(name, data)| {
                (
                    name,
                    CollectionRef {
                        next_id: data.next_id(),
                        records: data.records().collect(),
                    },
                )
            })
            .collect(),
    };
    Ok(serde_json::to_vec(&image)?)
}

/// Decodes image bytes into the schema version and collections.
pub(crate) fn decode(bytes: &[u8]) -> CoreResult<(u32, BTreeMap<String, CollectionData>)> {
    let image: Image = serde_json::from_slice(bytes)
        .map_err(|e| CoreError::invalid_format(format!("unreadable store image: {e}")))?;

    if image.format != IMAGE_FORMAT {
        return Err(CoreError::invalid_format(format!(
            "unsupported image format {}, expected {}",
            image.format, IMAGE_FORMAT
        )));
    }

    let mut collections = BTreeMap::new();
    for (name, collection) in image.collections {
        let data = CollectionData::from_parts(collection.records, collection.next_id)?;
        collections.insert(name, data);
    }
    Ok((image.schema_version, collections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionSchema;
    use crate::record::RecordId;

    #[test]
    fn encode_then_decode_keeps_generator_and_records() {
        let schema = CollectionSchema::auto_increment("sales");
        let mut sales = CollectionData::default();
        sales.put(&schema, Record::new().with("quantity", 2)).unwrap();
        sales.put(&schema, Record::new().with("quantity", 5)).unwrap();
        sales.remove(&RecordId::Int(2));

        let bytes = encode(4, [("sales", &sales)]).unwrap();
        let (version, collections) = decode(&bytes).unwrap();

        assert_eq!(version, 4);
        let restored = &collections["sales"];
        assert_eq!(restored.len(), 1);
        // The generator is not rewound by deletes
        assert_eq!(restored.next_id(), 3);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode(b"not json").unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat { .. }));
    }

    #[test]
    fn decode_rejects_unknown_format() {
        let err = decode(br#"{"format": 99, "schemaVersion": 1, "collections": {}}"#).unwrap_err();
        assert!(err.to_string().contains("unsupported image format"));
    }
}
