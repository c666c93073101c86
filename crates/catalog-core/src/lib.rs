//! Consistency engines for the inventory catalog.
//!
//! The catalog is a tree of categories linked by `parent_name`, plus parts
//! filed under the leaves. Two engines keep that structure consistent:
//!
//! - [`CategoryHierarchy`] creates, renames, re-parents and deletes
//!   categories, re-linking children so the tree never points at a category
//!   that no longer exists.
//! - [`PartPlacement`] creates and patches parts, making sure every part sits
//!   in an existing non-base category.
//!
//! Neither engine holds a store. Every operation takes the
//! [`DocumentStore`](catalog_store::DocumentStore) it should run against,
//! so the same engine serves an in-memory store in tests and a file-backed
//! store in production.
//!
//! # Consistency model
//!
//! Each store call is atomic on its own. Multi-document changes (rename and
//! delete cascades) are planned as a [`CascadePlan`] of idempotent steps.
//! With [`EngineConfig::atomic_cascades`] the plan is submitted as one batch;
//! otherwise the steps run one by one and a crash in between can leave some
//! children re-linked and others not. Re-running the same plan converges.
//! Uniqueness checks are check-then-insert and race with concurrent writers.

pub mod audit;
pub mod cascade;
pub mod codec;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod placement;
pub mod seed;

pub use audit::{audit_tree, AuditReport, Violation};
pub use cascade::{CascadeAction, CascadePlan, CascadeStep};
pub use config::EngineConfig;
pub use error::{CatalogError, CatalogResult, ErrorKind};
pub use hierarchy::CategoryHierarchy;
pub use placement::PartPlacement;
pub use seed::seed_demo_data;
