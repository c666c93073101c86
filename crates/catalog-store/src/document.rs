//! Documents, collections, filters and updates.
//!
//! Field paths are dotted (`location.shelf`) and address nested objects.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored record: a JSON object.
pub type Document = Map<String, Value>;

/// Field holding the store-assigned identity of a document.
pub const INTERNAL_ID_FIELD: &str = "_id";

/// The collections the catalog keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Categories,
    Parts,
    /// Marker documents written by demo seeding.
    DemoConfig,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Categories,
        Collection::Parts,
        Collection::DemoConfig,
    ];

    /// The collection name as it appears in storage.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Categories => "categories",
            Collection::Parts => "parts",
            Collection::DemoConfig => "demo_config",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Conjunction of equality clauses. The empty filter matches everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches documents whose field at `path` equals `value`.
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(path, value)
    }

    /// Adds another equality clause.
    pub fn and(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((path.into(), value.into()));
        self
    }

    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.clauses.iter().all(|(path, expected)| {
            lookup(document, path).is_some_and(|actual| values_equal(actual, expected))
        })
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            clauses: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A set of field assignments applied to a matched document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Update {
    sets: Vec<(String, Value)>,
}

impl Update {
    pub fn set(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and_set(path, value)
    }

    pub fn and_set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.sets.push((path.into(), value.into()));
        self
    }

    pub fn assignments(&self) -> &[(String, Value)] {
        &self.sets
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Writes every assignment into `document`, creating intermediate
    /// objects for dotted paths as needed.
    pub fn apply(&self, document: &mut Document) {
        for (path, value) in &self.sets {
            assign(document, path, value.clone());
        }
    }
}

/// One write inside a batch.
#[derive(Clone, Debug, PartialEq)]
pub enum WriteOp {
    Insert {
        collection: Collection,
        document: Document,
    },
    UpdateOne {
        collection: Collection,
        filter: Filter,
        update: Update,
    },
    UpdateMany {
        collection: Collection,
        filter: Filter,
        update: Update,
    },
    DeleteOne {
        collection: Collection,
        filter: Filter,
    },
}

impl WriteOp {
    pub fn collection(&self) -> Collection {
        match self {
            WriteOp::Insert { collection, .. }
            | WriteOp::UpdateOne { collection, .. }
            | WriteOp::UpdateMany { collection, .. }
            | WriteOp::DeleteOne { collection, .. } => *collection,
        }
    }
}

/// Resolve a dotted path inside a document.
pub fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn assign(document: &mut Document, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return;
    };

    let mut current = document;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(map) = slot else {
            return;
        };
        current = map;
    }
    current.insert(last.to_string(), value);
}

/// Numbers compare by value so that `10` matches `10.0`.
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        },
        _ => actual == expected,
    }
}
