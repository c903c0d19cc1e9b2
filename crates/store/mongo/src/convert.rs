//! Conversion between entity documents and their stored BSON form.
//!
//! Entities serialize timestamps as RFC 3339 strings; they are stored as BSON
//! dates so that range filters compare chronologically. Object ids are
//! exposed to entities as hex strings.

use chrono::{DateTime, SecondsFormat, Utc};
use mongodb::bson::{self, Bson, DateTime as BsonDateTime, Document};

use inkwell_store::{Document as Entity, StoreError};

/// Serialize an entity for writing. The id field is removed; the store
/// assigns it on insert and never changes it on update.
pub fn to_stored<T: Entity>(entity: &T, timestamp_fields: &[&str]) -> Result<Document, StoreError> {
    let mut doc =
        bson::to_document(entity).map_err(|e| StoreError::Serialization(e.to_string()))?;
    doc.remove(T::ID_FIELD);
    for field in timestamp_fields {
        if let Some(Bson::String(raw)) = doc.get(*field)
            && let Ok(ts) = DateTime::parse_from_rfc3339(raw)
        {
            let date = BsonDateTime::from_millis(ts.timestamp_millis());
            doc.insert(*field, date);
        }
    }
    Ok(doc)
}

/// Decode a stored document into an entity.
pub fn from_stored<T: Entity>(mut doc: Document) -> Result<T, StoreError> {
    for (_, value) in doc.iter_mut() {
        let replacement = match &*value {
            Bson::ObjectId(oid) => Some(oid.to_hex()),
            Bson::DateTime(date) => DateTime::<Utc>::from_timestamp_millis(date.timestamp_millis())
                .map(|ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            _ => None,
        };
        if let Some(text) = replacement {
            *value = Bson::String(text);
        }
    }
    bson::from_document(doc).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use inkwell_store::testing::ConformanceDoc;
    use mongodb::bson::doc;
    use mongodb::bson::oid::ObjectId;

    use super::*;

    #[test]
    fn stored_form_drops_id_and_converts_timestamps() {
        let created = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        let entity = ConformanceDoc {
            id: Some("abc".into()),
            name: "n".into(),
            rank: 3,
            tag: "t".into(),
            created_at: created,
        };
        let stored = to_stored(&entity, &["created_at"]).unwrap();
        assert!(!stored.contains_key("_id"));
        assert_eq!(
            stored.get("created_at"),
            Some(&Bson::DateTime(BsonDateTime::from_millis(
                created.timestamp_millis()
            )))
        );
    }

    #[test]
    fn reads_expose_hex_ids_and_chrono_timestamps() {
        let oid = ObjectId::new();
        let created = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        let stored = doc! {
            "_id": oid,
            "name": "n",
            "rank": 3_i64,
            "tag": "t",
            "created_at": BsonDateTime::from_millis(created.timestamp_millis()),
        };
        let entity: ConformanceDoc = from_stored(stored).unwrap();
        assert_eq!(entity.id, Some(oid.to_hex()));
        assert_eq!(entity.created_at, created);
        assert_eq!(entity.rank, 3);
    }
}
