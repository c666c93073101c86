//! Category records.

use serde::{Deserialize, Serialize};

/// A node in the category tree.
///
/// Categories reference their parent by name. A category whose
/// `parent_name` is empty is a *base* category: it organizes the tree but
/// may not hold parts directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique, non-empty natural key.
    pub name: String,
    /// Name of the parent category, or `""` for a base category.
    pub parent_name: String,
}

impl Category {
    pub fn new(name: impl Into<String>, parent_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_name: parent_name.into(),
        }
    }

    /// A base category (no parent).
    pub fn base(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    /// Returns `true` if this category has no parent and so cannot hold parts.
    pub fn is_base(&self) -> bool {
        self.parent_name.is_empty()
    }
}

/// Partial update of a category. Absent (or `null`) fields are left alone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_name: Option<String>,
}

impl CategoryUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            parent_name: None,
        }
    }

    pub fn reparent(parent_name: impl Into<String>) -> Self {
        Self {
            name: None,
            parent_name: Some(parent_name.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent_name.is_none()
    }
}
