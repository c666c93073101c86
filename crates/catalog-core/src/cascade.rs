//! Multi-document changes as explicit, idempotent step lists.
//!
//! A rename or delete touches several documents. Rather than issuing writes
//! ad hoc, the engines build a [`CascadePlan`] where every step addresses one
//! document by natural key and either sets a field to a fixed value or
//! deletes it. Setting a field to a constant is idempotent, and a delete or
//! rename whose key is already gone matches nothing, so re-running a plan
//! after a partial failure ends in the same state as running it once.

use catalog_store::{Collection, DocumentStore, Filter, Update, WriteOp};
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};

/// What a step does to the document it addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CascadeAction {
    Set { field: &'static str, value: String },
    Delete,
}

/// One write against one document, addressed by natural key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CascadeStep {
    pub collection: Collection,
    pub key_field: &'static str,
    pub key: String,
    pub action: CascadeAction,
    /// Fail the plan if this step matches no document.
    pub required: bool,
}

impl CascadeStep {
    /// Set `field` on the category called `name`.
    pub fn set_category(name: &str, field: &'static str, value: &str) -> Self {
        Self {
            collection: Collection::Categories,
            key_field: "name",
            key: name.to_string(),
            action: CascadeAction::Set {
                field,
                value: value.to_string(),
            },
            required: false,
        }
    }

    /// Point the part `serial_number` at `category`.
    pub fn set_part_category(serial_number: &str, category: &str) -> Self {
        Self {
            collection: Collection::Parts,
            key_field: "serial_number",
            key: serial_number.to_string(),
            action: CascadeAction::Set {
                field: "category",
                value: category.to_string(),
            },
            required: false,
        }
    }

    /// Delete the category called `name`.
    pub fn delete_category(name: &str) -> Self {
        Self {
            collection: Collection::Categories,
            key_field: "name",
            key: name.to_string(),
            action: CascadeAction::Delete,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn to_write_op(&self) -> WriteOp {
        let filter = Filter::eq(self.key_field, self.key.as_str());
        match &self.action {
            CascadeAction::Set { field, value } => WriteOp::UpdateOne {
                collection: self.collection,
                filter,
                update: Update::set(*field, value.as_str()),
            },
            CascadeAction::Delete => WriteOp::DeleteOne {
                collection: self.collection,
                filter,
            },
        }
    }

    fn missing(&self) -> CatalogError {
        match self.collection {
            Collection::Parts => CatalogError::PartNotFound {
                serial_number: self.key.clone(),
            },
            _ => CatalogError::CategoryNotFound {
                name: self.key.clone(),
            },
        }
    }
}

/// An ordered list of [`CascadeStep`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CascadePlan {
    steps: Vec<CascadeStep>,
}

impl CascadePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: CascadeStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[CascadeStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run the plan against `store`.
    ///
    /// With `atomic` the steps go to the store as one batch. Otherwise they
    /// run in order and the first required step that matches nothing stops
    /// the plan with a not-found error, leaving later steps unapplied.
    pub fn execute<S: DocumentStore + ?Sized>(&self, store: &S, atomic: bool) -> CatalogResult<()> {
        if self.steps.is_empty() {
            return Ok(());
        }

        if atomic {
            let ops: Vec<WriteOp> = self.steps.iter().map(CascadeStep::to_write_op).collect();
            let counts = store.apply_batch(&ops)?;
            debug!(steps = ops.len(), "cascade applied as batch");
            if let Some((step, _)) = self
                .steps
                .iter()
                .zip(&counts)
                .find(|(step, count)| step.required && **count == 0)
            {
                return Err(step.missing());
            }
            return Ok(());
        }

        for (index, step) in self.steps.iter().enumerate() {
            let matched = match step.to_write_op() {
                WriteOp::UpdateOne {
                    collection,
                    filter,
                    update,
                } => store.update_one(collection, &filter, &update)?,
                WriteOp::DeleteOne { collection, filter } => store.delete_one(collection, &filter)?,
                other => store.apply_batch(std::slice::from_ref(&other))?.iter().sum(),
            };
            debug!(
                step = index,
                collection = %step.collection,
                key = %step.key,
                matched,
                "cascade step"
            );
            if step.required && matched == 0 {
                return Err(step.missing());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_store::InMemoryDocumentStore;
    use catalog_types::Category;

    use crate::codec::{from_documents, to_document};

    fn store_with(categories: &[Category]) -> InMemoryDocumentStore {
        let store = InMemoryDocumentStore::new();
        for c in categories {
            store
                .insert_one(
                    Collection::Categories,
                    to_document(Collection::Categories, c).unwrap(),
                )
                .unwrap();
        }
        store
    }

    fn categories(store: &InMemoryDocumentStore) -> Vec<Category> {
        from_documents(
            Collection::Categories,
            store
                .find_many(Collection::Categories, &Filter::all())
                .unwrap(),
        )
        .unwrap()
    }

    fn rename_plan() -> CascadePlan {
        let mut plan = CascadePlan::new();
        plan.push(CascadeStep::set_category("X", "parent_name", "B"));
        plan.push(CascadeStep::set_category("Y", "parent_name", "B"));
        plan.push(CascadeStep::set_category("A", "name", "B").required());
        plan
    }

    #[test]
    fn sequential_plan_applies_in_order() {
        let store = store_with(&[
            Category::base("A"),
            Category::new("X", "A"),
            Category::new("Y", "A"),
        ]);
        rename_plan().execute(&store, false).unwrap();
        assert_eq!(
            categories(&store),
            vec![
                Category::base("B"),
                Category::new("X", "B"),
                Category::new("Y", "B"),
            ]
        );
    }

    #[test]
    fn rerunning_a_plan_converges() {
        let store = store_with(&[
            Category::base("A"),
            Category::new("X", "A"),
            Category::new("Y", "A"),
        ]);
        let plan = rename_plan();
        plan.execute(&store, false).unwrap();
        let once = categories(&store);

        // The self-rename step is required and now finds nothing.
        let err = plan.execute(&store, false).unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound { .. }));
        assert_eq!(categories(&store), once);
    }

    #[test]
    fn resuming_after_partial_failure_converges() {
        let store = store_with(&[
            Category::base("A"),
            Category::new("X", "A"),
            Category::new("Y", "A"),
        ]);
        // Simulate a crash after the first step.
        let mut first = CascadePlan::new();
        first.push(rename_plan().steps()[0].clone());
        first.execute(&store, false).unwrap();

        rename_plan().execute(&store, false).unwrap();
        assert_eq!(
            categories(&store),
            vec![
                Category::base("B"),
                Category::new("X", "B"),
                Category::new("Y", "B"),
            ]
        );
    }

    #[test]
    fn atomic_plan_reports_missing_required_step() {
        let store = store_with(&[Category::base("A")]);
        let mut plan = CascadePlan::new();
        plan.push(CascadeStep::delete_category("missing").required());
        let err = plan.execute(&store, true).unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound { name } if name == "missing"));
    }

    #[test]
    fn empty_plan_is_a_no_op() {
        let store = InMemoryDocumentStore::new();
        assert!(CascadePlan::new().execute(&store, true).is_ok());
    }
}
