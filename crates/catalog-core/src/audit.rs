//! Whole-catalog consistency audit.
//!
//! The engines keep the tree consistent for the operations they complete,
//! but cascades are not atomic by default and re-parenting does not check
//! that the new parent exists. [`audit_tree`] reads every category and part
//! and reports what is out of place.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use catalog_store::{Collection, DocumentStore, Filter};
use catalog_types::{Category, Part};
use serde::Serialize;
use tracing::debug;

use crate::codec::from_documents;
use crate::error::CatalogResult;

/// A single inconsistency found by [`audit_tree`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    DuplicateCategory { name: String },
    DanglingParent { category: String, parent_name: String },
    /// Categories on a parent cycle, sorted.
    ParentCycle { categories: Vec<String> },
    BaseCategoryHasParts { category: String, parts: usize },
    UnknownPartCategory { serial_number: String, category: String },
    DuplicateSerialNumber { serial_number: String },
}

/// Result of auditing the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub category_count: usize,
    pub part_count: usize,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }
}

pub fn audit_tree<S: DocumentStore + ?Sized>(store: &S) -> CatalogResult<AuditReport> {
    let categories: Vec<Category> = from_documents(
        Collection::Categories,
        store.find_many(Collection::Categories, &Filter::all())?,
    )?;
    let parts: Vec<Part> = from_documents(
        Collection::Parts,
        store.find_many(Collection::Parts, &Filter::all())?,
    )?;

    let mut violations = Vec::new();

    let mut by_name: HashMap<&str, &Category> = HashMap::with_capacity(categories.len());
    for category in &categories {
        if by_name.insert(category.name.as_str(), category).is_some() {
            violations.push(Violation::DuplicateCategory {
                name: category.name.clone(),
            });
        }
    }

    for category in &categories {
        if !category.is_base() && !by_name.contains_key(category.parent_name.as_str()) {
            violations.push(Violation::DanglingParent {
                category: category.name.clone(),
                parent_name: category.parent_name.clone(),
            });
        }
    }

    violations.extend(
        parent_cycles(&by_name)
            .into_iter()
            .map(|categories| Violation::ParentCycle { categories }),
    );

    let mut serials = BTreeSet::new();
    let mut parts_in_base: BTreeMap<&str, usize> = BTreeMap::new();
    for part in &parts {
        if !serials.insert(part.serial_number.as_str()) {
            violations.push(Violation::DuplicateSerialNumber {
                serial_number: part.serial_number.clone(),
            });
        }
        match by_name.get(part.category.as_str()) {
            None => violations.push(Violation::UnknownPartCategory {
                serial_number: part.serial_number.clone(),
                category: part.category.clone(),
            }),
            Some(category) if category.is_base() => {
                *parts_in_base.entry(category.name.as_str()).or_default() += 1;
            }
            Some(_) => {}
        }
    }
    violations.extend(
        parts_in_base
            .into_iter()
            .map(|(category, parts)| Violation::BaseCategoryHasParts {
                category: category.to_string(),
                parts,
            }),
    );

    debug!(
        categories = categories.len(),
        parts = parts.len(),
        violations = violations.len(),
        "catalog audited"
    );
    Ok(AuditReport {
        category_count: categories.len(),
        part_count: parts.len(),
        violations,
    })
}

/// Every parent cycle, each reported once with its members sorted.
fn parent_cycles(by_name: &HashMap<&str, &Category>) -> Vec<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    let mut marks: HashMap<&str, Mark> = HashMap::with_capacity(by_name.len());
    let mut cycles = Vec::new();

    let mut names: Vec<&str> = by_name.keys().copied().collect();
    names.sort_unstable();

    for start in names {
        let mut path: Vec<&str> = Vec::new();
        let mut cursor = start;
        loop {
            match marks.get(cursor) {
                Some(Mark::Done) => break,
                Some(Mark::Visiting) => {
                    if let Some(pos) = path.iter().position(|n| *n == cursor) {
                        let mut cycle: Vec<String> =
                            path[pos..].iter().map(|n| n.to_string()).collect();
                        cycle.sort();
                        cycles.push(cycle);
                    }
                    break;
                }
                None => {}
            }
            marks.insert(cursor, Mark::Visiting);
            path.push(cursor);
            match by_name.get(cursor) {
                Some(category) if !category.is_base() && by_name.contains_key(category.parent_name.as_str()) => {
                    cursor = category.parent_name.as_str();
                }
                _ => break,
            }
        }
        for name in path {
            marks.insert(name, Mark::Done);
        }
    }
    cycles
}
