use thiserror::Error;

/// Errors produced when validating catalog records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, TypeError>;
