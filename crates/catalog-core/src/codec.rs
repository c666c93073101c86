//! Conversion between typed records and store documents.

use catalog_store::{Collection, Document, INTERNAL_ID_FIELD};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{CatalogError, CatalogResult};

/// Serialize a record into a document.
pub fn to_document<T: Serialize>(collection: Collection, value: &T) -> CatalogResult<Document> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CatalogError::CorruptDocument {
            collection: collection.name().to_string(),
            reason: format!("record serialized to non-object {other}"),
        }),
        Err(e) => Err(CatalogError::CorruptDocument {
            collection: collection.name().to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Decode a stored document, dropping the store's internal identity.
pub fn from_document<T: DeserializeOwned>(
    collection: Collection,
    mut document: Document,
) -> CatalogResult<T> {
    document.remove(INTERNAL_ID_FIELD);
    serde_json::from_value(Value::Object(document)).map_err(|e| CatalogError::CorruptDocument {
        collection: collection.name().to_string(),
        reason: e.to_string(),
    })
}

pub fn from_documents<T: DeserializeOwned>(
    collection: Collection,
    documents: Vec<Document>,
) -> CatalogResult<Vec<T>> {
    documents
        .into_iter()
        .map(|d| from_document(collection, d))
        .collect()
}
