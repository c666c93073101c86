//! JSON-file document store.
//!
//! The whole database lives in memory and is written out as a single JSON
//! object (`{"categories": [...], "parts": [...], ...}`) after every
//! successful mutation. Writes go to a temporary file in the same directory
//! which is then renamed over the snapshot, so a crash never leaves a torn
//! file behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::document::{Collection, Document, Filter, Update, WriteOp};
use crate::error::{StoreError, StoreResult};
use crate::memory::{Collections, InMemoryDocumentStore};
use crate::traits::DocumentStore;

/// A [`DocumentStore`] persisted as a JSON snapshot on disk.
#[derive(Debug)]
pub struct JsonFileDocumentStore {
    path: PathBuf,
    inner: InMemoryDocumentStore,
    /// Serializes mutate-then-flush so snapshots are written in order.
    write_lock: Mutex<()>,
}

impl JsonFileDocumentStore {
    /// Open the snapshot at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let collections = if path.exists() {
            let bytes = fs::read(&path)?;
            decode_snapshot(&bytes)?
        } else {
            debug!(path = %path.display(), "no snapshot on disk; starting empty");
            Collections::new()
        };
        Ok(Self {
            path,
            inner: InMemoryDocumentStore::from_collections(collections),
            write_lock: Mutex::new(()),
        })
    }

    /// See [`InMemoryDocumentStore::with_unique_key`].
    pub fn with_unique_key(mut self, collection: Collection, field: impl Into<String>) -> Self {
        self.inner = self.inner.with_unique_key(collection, field);
        self
    }

    /// Run `op` on a scratch copy, write the copy to disk and only then make
    /// it visible. A failed write leaves memory and disk unchanged.
    fn mutate<T>(&self, op: impl FnOnce(&InMemoryDocumentStore) -> StoreResult<T>) -> StoreResult<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        let scratch = self.inner.scratch()?;
        let result = op(&scratch)?;
        let collections = scratch.into_collections()?;
        self.flush(&collections)?;
        self.inner.replace(collections)?;
        Ok(result)
    }

    fn flush(&self, snapshot: &Collections) -> StoreResult<()> {
        let bytes = encode_snapshot(snapshot)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "snapshot written");
        Ok(())
    }
}

impl DocumentStore for JsonFileDocumentStore {
    fn find_one(&self, collection: Collection, filter: &Filter) -> StoreResult<Option<Document>> {
        self.inner.find_one(collection, filter)
    }

    fn find_many(&self, collection: Collection, filter: &Filter) -> StoreResult<Vec<Document>> {
        self.inner.find_many(collection, filter)
    }

    fn insert_one(&self, collection: Collection, document: Document) -> StoreResult<()> {
        self.mutate(|s| s.insert_one(collection, document))
    }

    fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> StoreResult<u64> {
        self.mutate(|s| s.update_one(collection, filter, update))
    }

    fn update_many(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> StoreResult<u64> {
        self.mutate(|s| s.update_many(collection, filter, update))
    }

    fn delete_one(&self, collection: Collection, filter: &Filter) -> StoreResult<u64> {
        self.mutate(|s| s.delete_one(collection, filter))
    }

    fn count(&self, collection: Collection, filter: &Filter) -> StoreResult<u64> {
        self.inner.count(collection, filter)
    }

    fn supports_atomic_batch(&self) -> bool {
        true
    }

    fn apply_batch(&self, ops: &[WriteOp]) -> StoreResult<Vec<u64>> {
        self.mutate(|s| s.apply_batch(ops))
    }
}

fn encode_snapshot(collections: &Collections) -> StoreResult<Vec<u8>> {
    let named: BTreeMap<&'static str, &Vec<Document>> = collections
        .iter()
        .map(|(collection, docs)| (collection.name(), docs))
        .collect();
    Ok(serde_json::to_vec_pretty(&named)?)
}

fn decode_snapshot(bytes: &[u8]) -> StoreResult<Collections> {
    let named: BTreeMap<String, Vec<Document>> = serde_json::from_slice(bytes)?;
    let mut collections = Collections::new();
    for (name, docs) in named {
        match Collection::from_name(&name) {
            Some(collection) => {
                collections.insert(collection, docs);
            }
            None => warn!(collection = %name, "ignoring unknown collection in snapshot"),
        }
    }
    Ok(collections)
}
