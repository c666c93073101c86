//! Error types for catalog operations.

use catalog_store::StoreError;
use catalog_types::TypeError;
use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a [`CatalogError`], used to pick a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A natural key is already taken.
    Conflict,
    /// The addressed category or part does not exist.
    NotFound,
    /// A parent or category reference points nowhere useful.
    InvalidReference,
    /// The change would break a structural rule of the tree.
    InvariantViolation,
    /// The request itself is malformed.
    InvalidInput,
    /// Storage or configuration failure.
    Internal,
}

/// Errors that can occur in the category and part engines.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("category already exists: {name}")]
    CategoryExists { name: String },

    #[error("part with serial number {serial_number} already exists")]
    PartExists { serial_number: String },

    #[error("parent category does not exist: {parent_name}")]
    InvalidParent { parent_name: String },

    #[error("category {category} does not exist or is a base category; parts need a non-base category")]
    InvalidCategory { category: String },

    #[error("moving {name} under {parent_name} would create a cycle")]
    ParentCycle { name: String, parent_name: String },

    #[error("category not found: {name}")]
    CategoryNotFound { name: String },

    #[error("part not found: {serial_number}")]
    PartNotFound { serial_number: String },

    #[error("category {name} cannot become a base category because it has parts")]
    BaseCategoryHasParts { name: String },

    #[error("category {name} cannot be deleted because parts belong to it")]
    PartsAssociated { name: String },

    #[error("category {name} cannot be deleted because parts belong to its child category {child}")]
    ChildHasParts { name: String, child: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("corrupt document in {collection}: {reason}")]
    CorruptDocument { collection: String, reason: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CategoryExists { .. }
            | Self::PartExists { .. }
            | Self::Store(StoreError::DuplicateKey { .. }) => ErrorKind::Conflict,
            Self::CategoryNotFound { .. } | Self::PartNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidParent { .. } | Self::InvalidCategory { .. } | Self::ParentCycle { .. } => {
                ErrorKind::InvalidReference
            }
            Self::BaseCategoryHasParts { .. }
            | Self::PartsAssociated { .. }
            | Self::ChildHasParts { .. } => ErrorKind::InvariantViolation,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Config(_) | Self::CorruptDocument { .. } | Self::Store(_) => ErrorKind::Internal,
        }
    }
}

impl From<TypeError> for CatalogError {
    fn from(value: TypeError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
