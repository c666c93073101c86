//! The part placement engine.
//!
//! Parts may only be filed under a category that exists and has a parent.

use catalog_store::{Collection, DocumentStore, Filter, StoreError, Update};
use catalog_types::{validate_serial_number, Part, PartSearch, PartUpdate};
use serde_json::Value;
use tracing::{debug, info};

use crate::codec::{from_document, from_documents, to_document};
use crate::error::{CatalogError, CatalogResult};
use crate::hierarchy::find_category;

/// Part operations.
#[derive(Clone, Debug, Default)]
pub struct PartPlacement;

impl PartPlacement {
    pub fn new() -> Self {
        Self
    }

    /// Create a part in an existing non-base category.
    pub fn create<S: DocumentStore + ?Sized>(&self, store: &S, part: Part) -> CatalogResult<Part> {
        validate_serial_number(&part.serial_number)?;

        if find_part(store, &part.serial_number)?.is_some() {
            debug!(serial = %part.serial_number, "create rejected: serial number taken");
            return Err(CatalogError::PartExists {
                serial_number: part.serial_number,
            });
        }
        ensure_leaf_category(store, &part.category)?;

        let document = to_document(Collection::Parts, &part)?;
        store
            .insert_one(Collection::Parts, document)
            .map_err(|e| match e {
                StoreError::DuplicateKey { .. } => CatalogError::PartExists {
                    serial_number: part.serial_number.clone(),
                },
                other => other.into(),
            })?;
        info!(serial = %part.serial_number, category = %part.category, "part created");
        Ok(part)
    }

    /// Patch a part.
    ///
    /// A new category is validated as on create. A location patch is merged
    /// field by field into the stored location.
    pub fn update<S: DocumentStore + ?Sized>(
        &self,
        store: &S,
        serial_number: &str,
        update: PartUpdate,
    ) -> CatalogResult<Part> {
        let current = self.get(store, serial_number)?;

        if let Some(category) = &update.category {
            ensure_leaf_category(store, category)?;
        }

        let changes = self.changes(&current, update)?;
        if changes.is_empty() {
            return Ok(current);
        }

        let matched = store.update_one(
            Collection::Parts,
            &Filter::eq("serial_number", serial_number),
            &changes,
        )?;
        if matched == 0 {
            return Err(CatalogError::PartNotFound {
                serial_number: serial_number.to_string(),
            });
        }
        info!(serial = %serial_number, fields = changes.assignments().len(), "part updated");

        self.get(store, serial_number)
    }

    pub fn get<S: DocumentStore + ?Sized>(&self, store: &S, serial_number: &str) -> CatalogResult<Part> {
        find_part(store, serial_number)?.ok_or_else(|| CatalogError::PartNotFound {
            serial_number: serial_number.to_string(),
        })
    }

    /// Every part, in store order.
    pub fn list<S: DocumentStore + ?Sized>(&self, store: &S) -> CatalogResult<Vec<Part>> {
        from_documents(
            Collection::Parts,
            store.find_many(Collection::Parts, &Filter::all())?,
        )
    }

    pub fn delete<S: DocumentStore + ?Sized>(&self, store: &S, serial_number: &str) -> CatalogResult<()> {
        let deleted = store.delete_one(
            Collection::Parts,
            &Filter::eq("serial_number", serial_number),
        )?;
        if deleted == 0 {
            return Err(CatalogError::PartNotFound {
                serial_number: serial_number.to_string(),
            });
        }
        info!(serial = %serial_number, "part deleted");
        Ok(())
    }

    /// Parts matching every supplied criterion. No criteria matches all.
    pub fn search<S: DocumentStore + ?Sized>(
        &self,
        store: &S,
        criteria: &PartSearch,
    ) -> CatalogResult<Vec<Part>> {
        let filter: Filter = criteria.clauses().into_iter().collect();
        let found = from_documents(
            Collection::Parts,
            store.find_many(Collection::Parts, &filter)?,
        )?;
        debug!(clauses = filter.clauses().len(), hits = found.len(), "part search");
        Ok(found)
    }

    fn changes(&self, current: &Part, update: PartUpdate) -> CatalogResult<Update> {
        let mut changes = Update::default();
        if let Some(name) = update.name {
            changes = changes.and_set("name", name);
        }
        if let Some(description) = update.description {
            changes = changes.and_set("description", description);
        }
        if let Some(category) = update.category {
            changes = changes.and_set("category", category);
        }
        if let Some(quantity) = update.quantity {
            changes = changes.and_set("quantity", quantity);
        }
        if let Some(price) = update.price {
            changes = changes.and_set("price", price);
        }
        if let Some(location) = update.location.filter(|l| !l.is_empty()) {
            let merged = current.location.merged(&location);
            let value: Value = serde_json::to_value(&merged).map_err(|e| {
                CatalogError::CorruptDocument {
                    collection: Collection::Parts.name().to_string(),
                    reason: e.to_string(),
                }
            })?;
            changes = changes.and_set("location", value);
        }
        Ok(changes)
    }
}

pub(crate) fn find_part<S: DocumentStore + ?Sized>(
    store: &S,
    serial_number: &str,
) -> CatalogResult<Option<Part>> {
    store
        .find_one(Collection::Parts, &Filter::eq("serial_number", serial_number))?
        .map(|d| from_document(Collection::Parts, d))
        .transpose()
}

fn ensure_leaf_category<S: DocumentStore + ?Sized>(store: &S, category: &str) -> CatalogResult<()> {
    match find_category(store, category)? {
        Some(c) if !c.is_base() => Ok(()),
        _ => {
            debug!(category = %category, "part rejected: category missing or base");
            Err(CatalogError::InvalidCategory {
                category: category.to_string(),
            })
        }
    }
}
