//! Stored representation of an account.

use mongodb::{
    bson::{self, oid::ObjectId, Document},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const COLLECTION: &str = "accounts";

/// An account as persisted in the `accounts` collection.
///
/// Empty string fields are left out of the document, so a `$set` built from
/// this type only touches the fields that carry a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_number: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl AccountDocument {
    /// Fields for a `$set` update. `_id` is never part of it.
    pub fn set_document(&self) -> Result<Document, ModelError> {
        let mut doc = bson::to_document(self).map_err(|e| ModelError::Encode(e.to_string()))?;
        doc.remove("_id");
        Ok(doc)
    }
}

pub fn collection(db: &Database) -> Collection<AccountDocument> {
    db.collection::<AccountDocument>(COLLECTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn empty_fields_are_omitted() {
        let d = AccountDocument { city: "NYC".into(), ..Default::default() };
        let encoded = bson::to_document(&d).unwrap();
        assert_eq!(encoded, doc! { "city": "NYC" });
    }

    #[test]
    fn id_maps_to_underscore_id() {
        let oid = ObjectId::new();
        let d = AccountDocument {
            id: Some(oid),
            account_number: "A1".into(),
            city: "NYC".into(),
            name: "Alice".into(),
        };
        let encoded = bson::to_document(&d).unwrap();
        assert_eq!(encoded.get_object_id("_id").unwrap(), oid);
        assert_eq!(encoded.get_str("accountNumber").unwrap(), "A1");

        let decoded: AccountDocument = bson::from_document(encoded).unwrap();
        assert_eq!(decoded, d);
    }

    #[test]
    fn set_document_drops_id() {
        let d = AccountDocument { id: Some(ObjectId::new()), name: "Bob".into(), ..Default::default() };
        assert_eq!(d.set_document().unwrap(), doc! { "name": "Bob" });
    }

    #[test]
    fn missing_fields_decode_as_empty() {
        let oid = ObjectId::new();
        let decoded: AccountDocument = bson::from_document(doc! { "_id": oid }).unwrap();
        assert_eq!(decoded.id, Some(oid));
        assert!(decoded.account_number.is_empty());
        assert!(decoded.city.is_empty());
        assert!(decoded.name.is_empty());
    }
}
