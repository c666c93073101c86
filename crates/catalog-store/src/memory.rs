//! In-memory document store for tests and ephemeral servers.
//!
//! [`InMemoryDocumentStore`] keeps each collection as a `Vec` of documents
//! behind one `RwLock`. Batches are applied to a scratch copy and swapped in
//! only when every write succeeds, so the store supports atomic batches.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use uuid::Uuid;

use crate::document::{lookup, Collection, Document, Filter, Update, WriteOp, INTERNAL_ID_FIELD};
use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentStore;

/// All collections, keyed by collection.
pub type Collections = BTreeMap<Collection, Vec<Document>>;

/// An in-memory implementation of [`DocumentStore`].
pub struct InMemoryDocumentStore {
    collections: RwLock<Collections>,
    unique_keys: Vec<(Collection, String)>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store that enforces no unique keys.
    pub fn new() -> Self {
        Self::from_collections(Collections::new())
    }

    /// Create a store pre-populated with `collections`.
    pub fn from_collections(collections: Collections) -> Self {
        Self {
            collections: RwLock::new(collections),
            unique_keys: Vec::new(),
        }
    }

    /// Reject inserts and updates that would give two documents in
    /// `collection` the same value at `field`.
    pub fn with_unique_key(mut self, collection: Collection, field: impl Into<String>) -> Self {
        self.unique_keys.push((collection, field.into()));
        self
    }

    /// A copy of every collection.
    pub fn snapshot(&self) -> StoreResult<Collections> {
        Ok(self.read()?.clone())
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: Collection) -> StoreResult<usize> {
        Ok(self.read()?.get(&collection).map_or(0, Vec::len))
    }

    /// A detached copy with the same documents and unique keys.
    pub(crate) fn scratch(&self) -> StoreResult<Self> {
        Ok(Self {
            collections: RwLock::new(self.snapshot()?),
            unique_keys: self.unique_keys.clone(),
        })
    }

    pub(crate) fn into_collections(self) -> StoreResult<Collections> {
        self.collections
            .into_inner()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    /// Swap in `collections` wholesale.
    pub(crate) fn replace(&self, collections: Collections) -> StoreResult<()> {
        *self.write()? = collections;
        Ok(())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn apply(&self, op: &WriteOp) -> StoreResult<u64> {
        let mut collections = self.write()?;
        apply_op(&mut collections, &self.unique_keys, op)
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn find_one(&self, collection: Collection, filter: &Filter) -> StoreResult<Option<Document>> {
        let collections = self.read()?;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)))
            .cloned())
    }

    fn find_many(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Document>> {
        let collections = self.read()?;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    fn insert_one(&self, collection: Collection, document: Document) -> StoreResult<()> {
        self.apply(&WriteOp::Insert {
            collection,
            document,
        })
        .map(|_| ())
    }

    fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> StoreResult<u64> {
        self.apply(&WriteOp::UpdateOne {
            collection,
            filter: filter.clone(),
            update: update.clone(),
        })
    }

    fn update_many(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> StoreResult<u64> {
        self.apply(&WriteOp::UpdateMany {
            collection,
            filter: filter.clone(),
            update: update.clone(),
        })
    }

    fn delete_one(&self, collection: Collection, filter: &Filter) -> StoreResult<u64> {
        self.apply(&WriteOp::DeleteOne {
            collection,
            filter: filter.clone(),
        })
    }

    fn count(&self, collection: Collection, filter: &Filter) -> StoreResult<u64> {
        let collections = self.read()?;
        Ok(collections
            .get(&collection)
            .map_or(0, |docs| docs.iter().filter(|d| filter.matches(d)).count()) as u64)
    }

    fn supports_atomic_batch(&self) -> bool {
        true
    }

    fn apply_batch(&self, ops: &[WriteOp]) -> StoreResult<Vec<u64>> {
        let mut collections = self.write()?;
        let mut scratch = collections.clone();
        let counts = ops
            .iter()
            .map(|op| apply_op(&mut scratch, &self.unique_keys, op))
            .collect::<StoreResult<Vec<u64>>>()?;
        *collections = scratch;
        Ok(counts)
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: BTreeMap<&'static str, usize> = match self.collections.read() {
            Ok(c) => c.iter().map(|(k, v)| (k.name(), v.len())).collect(),
            Err(_) => BTreeMap::new(),
        };
        f.debug_struct("InMemoryDocumentStore")
            .field("documents", &counts)
            .field("unique_keys", &self.unique_keys)
            .finish()
    }
}

pub(crate) fn apply_op(
    collections: &mut Collections,
    unique_keys: &[(Collection, String)],
    op: &WriteOp,
) -> StoreResult<u64> {
    let collection = op.collection();
    let docs = collections.entry(collection).or_default();
    match op {
        WriteOp::Insert { document, .. } => {
            let mut document = document.clone();
            if !document.contains_key(INTERNAL_ID_FIELD) {
                document.insert(
                    INTERNAL_ID_FIELD.to_string(),
                    Value::from(Uuid::now_v7().to_string()),
                );
            }
            check_unique(collection, docs, None, &document, unique_keys)?;
            docs.push(document);
            Ok(1)
        }
        WriteOp::UpdateOne { filter, update, .. } => {
            match docs.iter().position(|d| filter.matches(d)) {
                Some(index) => {
                    update_at(collection, docs, index, update, unique_keys)?;
                    Ok(1)
                }
                None => Ok(0),
            }
        }
        WriteOp::UpdateMany { filter, update, .. } => {
            let matched: Vec<usize> = docs
                .iter()
                .enumerate()
                .filter(|(_, d)| filter.matches(d))
                .map(|(i, _)| i)
                .collect();
            for &index in &matched {
                update_at(collection, docs, index, update, unique_keys)?;
            }
            Ok(matched.len() as u64)
        }
        WriteOp::DeleteOne { filter, .. } => match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        },
    }
}

fn update_at(
    collection: Collection,
    docs: &mut [Document],
    index: usize,
    update: &Update,
    unique_keys: &[(Collection, String)],
) -> StoreResult<()> {
    let mut updated = docs[index].clone();
    update.apply(&mut updated);
    check_unique(collection, docs, Some(index), &updated, unique_keys)?;
    docs[index] = updated;
    Ok(())
}

fn check_unique(
    collection: Collection,
    docs: &[Document],
    skip: Option<usize>,
    candidate: &Document,
    unique_keys: &[(Collection, String)],
) -> StoreResult<()> {
    for (_, field) in unique_keys.iter().filter(|(c, _)| *c == collection) {
        let Some(value) = lookup(candidate, field) else {
            continue;
        };
        let clash = docs
            .iter()
            .enumerate()
            .any(|(i, d)| Some(i) != skip && lookup(d, field) == Some(value));
        if clash {
            return Err(StoreError::DuplicateKey {
                collection: collection.name().to_string(),
                field: field.clone(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}
