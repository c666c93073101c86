//! Part search criteria.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sparse equality criteria for part search.
///
/// Only the fields that are set take part in the match; all of them must
/// hold. Location sub-fields are matched individually.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartSearch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
    pub room: Option<String>,
    pub bookcase: Option<String>,
    pub shelf: Option<String>,
    pub cuvette: Option<String>,
    pub column: Option<i64>,
    pub row: Option<i64>,
}

impl PartSearch {
    /// Filter by category only.
    pub fn in_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Default::default()
        }
    }

    /// The supplied criteria as `(document path, expected value)` pairs.
    ///
    /// Location sub-fields use dotted paths (`location.shelf`).
    pub fn clauses(&self) -> Vec<(&'static str, Value)> {
        let mut clauses = Vec::new();
        let mut text = |path: &'static str, value: &Option<String>| {
            if let Some(v) = value {
                clauses.push((path, Value::from(v.clone())));
            }
        };
        text("name", &self.name);
        text("description", &self.description);
        text("category", &self.category);
        text("location.room", &self.room);
        text("location.bookcase", &self.bookcase);
        text("location.shelf", &self.shelf);
        text("location.cuvette", &self.cuvette);

        if let Some(quantity) = self.quantity {
            clauses.push(("quantity", Value::from(quantity)));
        }
        if let Some(price) = self.price {
            clauses.push(("price", Value::from(price)));
        }
        if let Some(column) = self.column {
            clauses.push(("location.column", Value::from(column)));
        }
        if let Some(row) = self.row {
            clauses.push(("location.row", Value::from(row)));
        }
        clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_search_has_no_clauses() {
        assert!(PartSearch::default().is_empty());
    }

    #[test]
    fn location_fields_use_dotted_paths() {
        let search = PartSearch {
            shelf: Some("S1".into()),
            row: Some(3),
            ..Default::default()
        };
        let clauses = search.clauses();
        assert!(clauses.contains(&("location.shelf", Value::from("S1"))));
        assert!(clauses.contains(&("location.row", Value::from(3))));
        assert_eq!(clauses.len(), 2);
    }

    #[test]
    fn category_search() {
        let clauses = PartSearch::in_category("B").clauses();
        assert_eq!(clauses, vec![("category", Value::from("B"))]);
    }
}
