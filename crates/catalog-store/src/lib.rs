//! Document store gateway for the inventory catalog.
//!
//! The catalog keeps its records as schemaless JSON documents grouped into
//! named collections, the way a document database would. This crate is the
//! only place that touches storage; the engines above it speak to the
//! [`DocumentStore`] trait and never to a concrete backend.
//!
//! # Storage Backends
//!
//! - [`InMemoryDocumentStore`] -- `RwLock`-guarded collections for tests and
//!   ephemeral servers
//! - [`JsonFileDocumentStore`] -- the in-memory store plus a JSON snapshot on
//!   disk, rewritten after every mutation
//!
//! # Design Rules
//!
//! 1. Every call is an independent single-document operation. Multi-document
//!    atomicity is only available through [`DocumentStore::apply_batch`] on
//!    backends that report [`DocumentStore::supports_atomic_batch`].
//! 2. Natural-key uniqueness is the caller's job. A backend only rejects
//!    duplicates for keys it was explicitly told about.
//! 3. Each inserted document gets a store-internal `_id` that callers are
//!    expected to ignore.

pub mod document;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use document::{Collection, Document, Filter, Update, WriteOp, INTERNAL_ID_FIELD};
pub use error::{StoreError, StoreResult};
pub use file::JsonFileDocumentStore;
pub use memory::InMemoryDocumentStore;
pub use traits::DocumentStore;
