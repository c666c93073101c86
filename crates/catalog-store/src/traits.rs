//! The [`DocumentStore`] trait defining the persistence gateway.

use crate::document::{Collection, Document, Filter, Update, WriteOp};
use crate::error::StoreResult;

/// Collection-scoped document storage.
///
/// Implementations must be thread-safe (`Send + Sync`). Each method is an
/// independent operation on at most the documents it names; nothing here
/// spans calls, so a sequence of calls is not isolated from concurrent
/// writers.
pub trait DocumentStore: Send + Sync {
    /// First document matching `filter`, or `Ok(None)`.
    fn find_one(&self, collection: Collection, filter: &Filter) -> StoreResult<Option<Document>>;

    /// Every document matching `filter`, in insertion order.
    ///
    /// The result is a fresh snapshot; calling again re-reads the store.
    fn find_many(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Document>>;

    /// Insert a document.
    ///
    /// Fails with [`StoreError::DuplicateKey`](crate::StoreError::DuplicateKey)
    /// only for keys the backend was configured to enforce.
    fn insert_one(&self, collection: Collection, document: Document) -> StoreResult<()>;

    /// Apply `update` to the first matching document. Returns the number of
    /// documents matched (0 or 1).
    fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> StoreResult<u64>;

    /// Apply `update` to every matching document. Returns the number matched.
    fn update_many(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> StoreResult<u64>;

    /// Delete the first matching document. Returns the number deleted (0 or 1).
    fn delete_one(&self, collection: Collection, filter: &Filter) -> StoreResult<u64>;

    /// Number of documents matching `filter`.
    fn count(&self, collection: Collection, filter: &Filter) -> StoreResult<u64> {
        Ok(self.find_many(collection, filter)?.len() as u64)
    }

    /// Whether any document matches `filter`.
    fn exists(&self, collection: Collection, filter: &Filter) -> StoreResult<bool> {
        Ok(self.find_one(collection, filter)?.is_some())
    }

    /// Whether [`apply_batch`](Self::apply_batch) is all-or-nothing.
    fn supports_atomic_batch(&self) -> bool {
        false
    }

    /// Apply a sequence of writes and return each one's affected count
    /// (inserts count as 1).
    ///
    /// The default implementation issues the writes one at a time and stops
    /// at the first error, leaving earlier writes in place.
    fn apply_batch(&self, ops: &[WriteOp]) -> StoreResult<Vec<u64>> {
        ops.iter()
            .map(|op| match op {
                WriteOp::Insert {
                    collection,
                    document,
                } => self.insert_one(*collection, document.clone()).map(|()| 1),
                WriteOp::UpdateOne {
                    collection,
                    filter,
                    update,
                } => self.update_one(*collection, filter, update),
                WriteOp::UpdateMany {
                    collection,
                    filter,
                    update,
                } => self.update_many(*collection, filter, update),
                WriteOp::DeleteOne { collection, filter } => self.delete_one(*collection, filter),
            })
            .collect()
    }
}
