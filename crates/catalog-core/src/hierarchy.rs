//! The category hierarchy engine.
//!
//! Categories form a forest linked by `parent_name`. The engine guarantees,
//! for every operation it completes:
//!
//! - names are unique and non-empty;
//! - a created category's parent exists;
//! - no category becomes its own ancestor, including through children it
//!   adopts from a dangling `parent_name` when created or renamed;
//! - a category with parts never becomes a base category;
//! - renames carry direct children along, and deletes splice children onto
//!   the deleted category's former parent.
//!
//! Re-parenting under a non-empty name does not check that the new parent
//! exists. Create does.

use std::collections::{HashMap, HashSet};

use catalog_store::{Collection, DocumentStore, Filter};
use catalog_types::{validate_category_name, Category, CategoryUpdate, Part};
use tracing::{debug, info};

use crate::cascade::{CascadePlan, CascadeStep};
use crate::codec::{from_document, from_documents, to_document};
use crate::config::EngineConfig;
use crate::error::{CatalogError, CatalogResult};

/// Category operations. Cheap to clone; holds only configuration.
#[derive(Clone, Debug, Default)]
pub struct CategoryHierarchy {
    config: EngineConfig,
}

impl CategoryHierarchy {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a category. Its parent, if any, must already exist.
    pub fn create<S: DocumentStore + ?Sized>(
        &self,
        store: &S,
        category: Category,
    ) -> CatalogResult<Category> {
        validate_category_name(&category.name)?;

        if find_category(store, &category.name)?.is_some() {
            debug!(category = %category.name, "create rejected: name taken");
            return Err(CatalogError::CategoryExists {
                name: category.name,
            });
        }

        if !category.is_base() && find_category(store, &category.parent_name)?.is_none() {
            debug!(
                category = %category.name,
                parent = %category.parent_name,
                "create rejected: parent missing"
            );
            return Err(CatalogError::InvalidParent {
                parent_name: category.parent_name,
            });
        }

        if closes_cycle(store, &category.name, &category.parent_name, None)? {
            debug!(category = %category.name, "create rejected: would adopt an ancestor");
            return Err(CatalogError::ParentCycle {
                name: category.name,
                parent_name: category.parent_name,
            });
        }

        let document = to_document(Collection::Categories, &category)?;
        store
            .insert_one(Collection::Categories, document)
            .map_err(|e| match e {
                catalog_store::StoreError::DuplicateKey { .. } => CatalogError::CategoryExists {
                    name: category.name.clone(),
                },
                other => other.into(),
            })?;
        info!(category = %category.name, parent = %category.parent_name, "category created");
        Ok(category)
    }

    /// Rename and/or re-parent `target_name`.
    ///
    /// Only the fields present in `update` are applied. A rename rewrites
    /// the `parent_name` of every direct child before renaming the target.
    /// A move to the base level is refused while parts reference the
    /// category under the name it will have after the update. All checks run
    /// before the first write.
    ///
    /// Returns the category as stored afterwards, looked up by its resulting
    /// name.
    pub fn update<S: DocumentStore + ?Sized>(
        &self,
        store: &S,
        target_name: &str,
        update: CategoryUpdate,
    ) -> CatalogResult<Category> {
        self.check_store(store)?;

        let current = find_category(store, target_name)?.ok_or_else(|| {
            CatalogError::CategoryNotFound {
                name: target_name.to_string(),
            }
        })?;

        let new_name = update.name.filter(|n| n != target_name);
        if let Some(name) = &new_name {
            validate_category_name(name)?;
            if find_category(store, name)?.is_some() {
                return Err(CatalogError::CategoryExists { name: name.clone() });
            }
        }
        let resulting_name = new_name.clone().unwrap_or_else(|| target_name.to_string());

        if let Some(parent_name) = &update.parent_name {
            if parent_name.is_empty() {
                let mut holders = vec![resulting_name.as_str()];
                if new_name.is_some() && self.config.rename_cascades_to_parts {
                    holders.push(target_name);
                }
                for holder in holders {
                    if store.exists(Collection::Parts, &Filter::eq("category", holder))? {
                        debug!(category = %resulting_name, "move to base rejected: has parts");
                        return Err(CatalogError::BaseCategoryHasParts {
                            name: resulting_name.clone(),
                        });
                    }
                }
            }
        }

        if new_name.is_some() || update.parent_name.is_some() {
            let resulting_parent = update
                .parent_name
                .clone()
                .unwrap_or_else(|| current.parent_name.clone());
            let renamed_from = new_name.as_ref().map(|_| target_name);
            if closes_cycle(store, &resulting_name, &resulting_parent, renamed_from)? {
                debug!(category = %target_name, parent = %resulting_parent, "update rejected: cycle");
                return Err(CatalogError::ParentCycle {
                    name: resulting_name,
                    parent_name: resulting_parent,
                });
            }
        }

        let mut plan = CascadePlan::new();
        if let Some(name) = &new_name {
            for child in self.children_of(store, target_name)? {
                plan.push(CascadeStep::set_category(&child.name, "parent_name", name));
            }
            if self.config.rename_cascades_to_parts {
                let parts: Vec<Part> = from_documents(
                    Collection::Parts,
                    store.find_many(Collection::Parts, &Filter::eq("category", target_name))?,
                )?;
                for part in parts {
                    plan.push(CascadeStep::set_part_category(&part.serial_number, name));
                }
            }
            plan.push(CascadeStep::set_category(target_name, "name", name).required());
        }
        if let Some(parent_name) = &update.parent_name {
            plan.push(
                CascadeStep::set_category(&resulting_name, "parent_name", parent_name).required(),
            );
        }

        plan.execute(store, self.config.atomic_cascades)?;
        if !plan.is_empty() {
            info!(
                category = %target_name,
                name = %resulting_name,
                parent = ?update.parent_name,
                steps = plan.len(),
                "category updated"
            );
        }

        self.get(store, &resulting_name)
    }

    pub fn get<S: DocumentStore + ?Sized>(&self, store: &S, name: &str) -> CatalogResult<Category> {
        find_category(store, name)?.ok_or_else(|| CatalogError::CategoryNotFound {
            name: name.to_string(),
        })
    }

    /// Every category, in store order.
    pub fn list<S: DocumentStore + ?Sized>(&self, store: &S) -> CatalogResult<Vec<Category>> {
        from_documents(
            Collection::Categories,
            store.find_many(Collection::Categories, &Filter::all())?,
        )
    }

    /// Direct children of `name`.
    pub fn children<S: DocumentStore + ?Sized>(
        &self,
        store: &S,
        name: &str,
    ) -> CatalogResult<Vec<Category>> {
        self.get(store, name)?;
        self.children_of(store, name)
    }

    /// The chain of parents from `name` up to its base category, nearest
    /// first. Stops early at a dangling parent or a cycle.
    pub fn ancestors<S: DocumentStore + ?Sized>(
        &self,
        store: &S,
        name: &str,
    ) -> CatalogResult<Vec<Category>> {
        let start = self.get(store, name)?;
        let mut seen = HashSet::from([start.name.clone()]);
        let mut chain = Vec::new();
        let mut parent_name = start.parent_name;
        while !parent_name.is_empty() && seen.insert(parent_name.clone()) {
            let Some(parent) = find_category(store, &parent_name)? else {
                break;
            };
            parent_name = parent.parent_name.clone();
            chain.push(parent);
        }
        Ok(chain)
    }

    /// Delete a category and splice its children onto its former parent.
    ///
    /// Refused while parts belong to the category or to any direct child.
    /// Children of a deleted base category become base categories.
    pub fn delete<S: DocumentStore + ?Sized>(&self, store: &S, name: &str) -> CatalogResult<()> {
        self.check_store(store)?;

        if store.exists(Collection::Parts, &Filter::eq("category", name))? {
            debug!(category = %name, "delete rejected: has parts");
            return Err(CatalogError::PartsAssociated {
                name: name.to_string(),
            });
        }

        let children = self.children_of(store, name)?;
        for child in &children {
            if store.exists(Collection::Parts, &Filter::eq("category", child.name.as_str()))? {
                debug!(category = %name, child = %child.name, "delete rejected: child has parts");
                return Err(CatalogError::ChildHasParts {
                    name: name.to_string(),
                    child: child.name.clone(),
                });
            }
        }

        let grandparent = self.get(store, name)?.parent_name;

        let mut plan = CascadePlan::new();
        plan.push(CascadeStep::delete_category(name).required());
        for child in &children {
            plan.push(CascadeStep::set_category(
                &child.name,
                "parent_name",
                &grandparent,
            ));
        }
        plan.execute(store, self.config.atomic_cascades)?;

        info!(
            category = %name,
            relinked = children.len(),
            parent = %grandparent,
            "category deleted"
        );
        Ok(())
    }

    fn children_of<S: DocumentStore + ?Sized>(
        &self,
        store: &S,
        name: &str,
    ) -> CatalogResult<Vec<Category>> {
        from_documents(
            Collection::Categories,
            store.find_many(Collection::Categories, &Filter::eq("parent_name", name))?,
        )
    }

    fn check_store<S: DocumentStore + ?Sized>(&self, store: &S) -> CatalogResult<()> {
        if self.config.atomic_cascades && !store.supports_atomic_batch() {
            return Err(CatalogError::Config(
                "atomic cascades requested but the store cannot apply atomic batches".into(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn find_category<S: DocumentStore + ?Sized>(
    store: &S,
    name: &str,
) -> CatalogResult<Option<Category>> {
    store
        .find_one(Collection::Categories, &Filter::eq("name", name))?
        .map(|d| from_document(Collection::Categories, d))
        .transpose()
}

/// Whether giving `name` the parent `parent` would put `name` on its own
/// parent chain.
///
/// The chain is walked as it will be after the write: `renamed_from` is the
/// name being replaced, whose children follow the rename, and categories
/// whose dangling `parent_name` equals `name` become its children.
fn closes_cycle<S: DocumentStore + ?Sized>(
    store: &S,
    name: &str,
    parent: &str,
    renamed_from: Option<&str>,
) -> CatalogResult<bool> {
    if parent.is_empty() {
        return Ok(false);
    }
    let categories: Vec<Category> = from_documents(
        Collection::Categories,
        store.find_many(Collection::Categories, &Filter::all())?,
    )?;
    let parents: HashMap<&str, &str> = categories
        .iter()
        .filter(|c| c.name != name && Some(c.name.as_str()) != renamed_from)
        .map(|c| {
            let parent = if Some(c.parent_name.as_str()) == renamed_from {
                name
            } else {
                c.parent_name.as_str()
            };
            (c.name.as_str(), parent)
        })
        .collect();

    let mut seen = HashSet::new();
    let mut cursor = parent;
    loop {
        if cursor == name {
            return Ok(true);
        }
        if cursor.is_empty() || !seen.insert(cursor) {
            return Ok(false);
        }
        match parents.get(cursor) {
            Some(next) => cursor = *next,
            None => return Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{audit_tree, Violation};
    use crate::placement::PartPlacement;
    use catalog_store::{InMemoryDocumentStore, StoreError, StoreResult, Update, WriteOp};
    use catalog_types::Location;

    fn part(serial: &str, category: &str) -> Part {
        Part {
            serial_number: serial.into(),
            name: "resistor".into(),
            description: "10k".into(),
            category: category.into(),
            quantity: 10,
            price: 19.99,
            location: Location {
                room: "lab".into(),
                bookcase: "b1".into(),
                shelf: "s1".into(),
                cuvette: "c1".into(),
                column: 1,
                row: 2,
            },
        }
    }

    fn setup(categories: &[(&str, &str)]) -> (InMemoryDocumentStore, CategoryHierarchy) {
        let store = InMemoryDocumentStore::new();
        let engine = CategoryHierarchy::default();
        for (name, parent) in categories {
            engine.create(&store, Category::new(*name, *parent)).unwrap();
        }
        (store, engine)
    }

    fn parent_of(store: &InMemoryDocumentStore, engine: &CategoryHierarchy, name: &str) -> String {
        engine.get(store, name).unwrap().parent_name
    }

    // ---- create ----

    #[test]
    fn create_base_and_child() {
        let (store, engine) = setup(&[("A", ""), ("B", "A")]);
        assert!(engine.get(&store, "A").unwrap().is_base());
        assert_eq!(parent_of(&store, &engine, "B"), "A");
    }

    #[test]
    fn create_rejects_duplicate_name() {
        let (store, engine) = setup(&[("A", "")]);
        let err = engine.create(&store, Category::base("A")).unwrap_err();
        assert!(matches!(err, CatalogError::CategoryExists { .. }));
    }

    #[test]
    fn create_rejects_missing_parent() {
        let (store, engine) = setup(&[]);
        let err = engine
            .create(&store, Category::new("A", "Z"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidParent { parent_name } if parent_name == "Z"));
        assert!(engine.list(&store).unwrap().is_empty());
    }

    #[test]
    fn create_rejects_empty_name() {
        let (store, engine) = setup(&[]);
        let err = engine.create(&store, Category::base("")).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
    }

    #[test]
    fn store_level_duplicate_maps_to_conflict() {
        let store =
            InMemoryDocumentStore::new().with_unique_key(Collection::Categories, "name");
        let engine = CategoryHierarchy::default();
        engine.create(&store, Category::base("A")).unwrap();
        let err = engine.create(&store, Category::base("A")).unwrap_err();
        assert!(matches!(err, CatalogError::CategoryExists { .. }));
    }

    // ---- update ----

    #[test]
    fn rename_rewrites_children_first() {
        let (store, engine) = setup(&[("A", ""), ("A1", "A"), ("A2", "A"), ("Other", "")]);
        let renamed = engine
            .update(&store, "A", CategoryUpdate::rename("B"))
            .unwrap();
        assert_eq!(renamed, Category::base("B"));
        assert_eq!(parent_of(&store, &engine, "A1"), "B");
        assert_eq!(parent_of(&store, &engine, "A2"), "B");
        assert!(engine.get(&store, "A").is_err());
        assert!(engine.get(&store, "Other").unwrap().is_base());
    }

    #[test]
    fn rename_to_taken_name_conflicts() {
        let (store, engine) = setup(&[("A", ""), ("B", "")]);
        let err = engine
            .update(&store, "A", CategoryUpdate::rename("B"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::CategoryExists { .. }));
    }

    #[test]
    fn rename_to_same_name_is_a_no_op() {
        let (store, engine) = setup(&[("A", ""), ("A1", "A")]);
        let same = engine
            .update(&store, "A", CategoryUpdate::rename("A"))
            .unwrap();
        assert_eq!(same, Category::base("A"));
        assert_eq!(parent_of(&store, &engine, "A1"), "A");
    }

    #[test]
    fn update_missing_category_is_not_found() {
        let (store, engine) = setup(&[]);
        let err = engine
            .update(&store, "ghost", CategoryUpdate::rename("x"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound { .. }));
    }

    #[test]
    fn empty_update_returns_current_category() {
        let (store, engine) = setup(&[("A", ""), ("B", "A")]);
        let b = engine
            .update(&store, "B", CategoryUpdate::default())
            .unwrap();
        assert_eq!(b, Category::new("B", "A"));
    }

    #[test]
    fn reparent_to_other_category() {
        let (store, engine) = setup(&[("A", ""), ("B", ""), ("S", "A")]);
        let s = engine
            .update(&store, "S", CategoryUpdate::reparent("B"))
            .unwrap();
        assert_eq!(s.parent_name, "B");
    }

    #[test]
    fn reparent_does_not_check_parent_exists() {
        let (store, engine) = setup(&[("A", ""), ("S", "A")]);
        let s = engine
            .update(&store, "S", CategoryUpdate::reparent("nowhere"))
            .unwrap();
        assert_eq!(s.parent_name, "nowhere");
    }

    #[test]
    fn reparent_under_descendant_is_a_cycle() {
        let (store, engine) = setup(&[("A", ""), ("B", "A"), ("C", "B")]);
        let err = engine
            .update(&store, "A", CategoryUpdate::reparent("C"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::ParentCycle { .. }));

        let err = engine
            .update(&store, "B", CategoryUpdate::reparent("B"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::ParentCycle { .. }));
        assert_eq!(parent_of(&store, &engine, "A"), "");
    }

    #[test]
    fn move_to_base_rejected_when_parts_exist() {
        let (store, engine) = setup(&[("A", ""), ("S", "A")]);
        PartPlacement::default()
            .create(&store, part("111", "S"))
            .unwrap();
        let err = engine
            .update(&store, "S", CategoryUpdate::reparent(""))
            .unwrap_err();
        assert!(matches!(err, CatalogError::BaseCategoryHasParts { .. }));
        assert_eq!(parent_of(&store, &engine, "S"), "A");
    }

    #[test]
    fn move_to_base_allowed_without_parts() {
        let (store, engine) = setup(&[("A", ""), ("S", "A")]);
        store
            .insert_one(
                Collection::Parts,
                to_document(Collection::Parts, &part("111", "not_matching")).unwrap(),
            )
            .unwrap();
        let s = engine
            .update(&store, "S", CategoryUpdate::reparent(""))
            .unwrap();
        assert_eq!(s, Category::base("S"));
    }

    #[test]
    fn rename_and_move_to_base_checks_new_name() {
        let (store, engine) = setup(&[("A", ""), ("S", "A")]);
        PartPlacement::default()
            .create(&store, part("111", "S"))
            .unwrap();
        // Parts still reference "S"; the new name "T" holds none.
        let t = engine
            .update(
                &store,
                "S",
                CategoryUpdate {
                    name: Some("T".into()),
                    parent_name: Some(String::new()),
                },
            )
            .unwrap();
        assert_eq!(t, Category::base("T"));
    }

    #[test]
    fn rename_carries_parts_when_configured() {
        let store = InMemoryDocumentStore::new();
        let engine = CategoryHierarchy::new(EngineConfig::strict());
        engine.create(&store, Category::base("A")).unwrap();
        engine.create(&store, Category::new("S", "A")).unwrap();
        PartPlacement::default()
            .create(&store, part("111", "S"))
            .unwrap();

        engine
            .update(&store, "S", CategoryUpdate::rename("T"))
            .unwrap();
        let moved = PartPlacement::default().get(&store, "111").unwrap();
        assert_eq!(moved.category, "T");

        let err = engine
            .update(
                &store,
                "T",
                CategoryUpdate {
                    name: Some("U".into()),
                    parent_name: Some(String::new()),
                },
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::BaseCategoryHasParts { .. }));
        assert!(engine.get(&store, "T").is_ok());
    }

    #[test]
    fn rename_cannot_adopt_an_ancestor() {
        let (store, engine) = setup(&[("X", ""), ("A", "X")]);
        engine
            .update(&store, "X", CategoryUpdate::reparent("N"))
            .unwrap();
        let err = engine
            .update(&store, "A", CategoryUpdate::rename("N"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::ParentCycle { name, .. } if name == "N"));
        assert_eq!(parent_of(&store, &engine, "A"), "X");
        assert!(engine.get(&store, "N").is_err());
    }

    #[test]
    fn rename_onto_own_dangling_parent_is_a_cycle() {
        let (store, engine) = setup(&[("X", ""), ("A", "X")]);
        engine
            .update(&store, "A", CategoryUpdate::reparent("N"))
            .unwrap();
        let err = engine
            .update(&store, "A", CategoryUpdate::rename("N"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::ParentCycle { .. }));
    }

    #[test]
    fn create_cannot_adopt_an_ancestor() {
        let (store, engine) = setup(&[("X", ""), ("A", "X")]);
        engine
            .update(&store, "X", CategoryUpdate::reparent("N"))
            .unwrap();
        let err = engine
            .create(&store, Category::new("N", "A"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::ParentCycle { .. }));
        assert!(engine.get(&store, "N").is_err());
        assert!(audit_tree(&store)
            .unwrap()
            .violations
            .iter()
            .all(|v| matches!(v, Violation::DanglingParent { .. })));
    }

    #[test]
    fn dangling_children_are_adopted_when_acyclic() {
        let (store, engine) = setup(&[("A", ""), ("S", "A")]);
        engine
            .update(&store, "S", CategoryUpdate::reparent("N"))
            .unwrap();
        engine.create(&store, Category::new("N", "A")).unwrap();
        assert_eq!(
            engine.children(&store, "N").unwrap(),
            vec![Category::new("S", "N")]
        );
        assert!(audit_tree(&store).unwrap().is_consistent());
    }

    // ---- delete ----

    #[test]
    fn delete_relinks_children_to_grandparent() {
        let (store, engine) = setup(&[("Root", ""), ("Mid", "Root"), ("L1", "Mid"), ("L2", "Mid")]);
        engine.delete(&store, "Mid").unwrap();
        assert!(engine.get(&store, "Mid").is_err());
        assert_eq!(parent_of(&store, &engine, "L1"), "Root");
        assert_eq!(parent_of(&store, &engine, "L2"), "Root");
    }

    #[test]
    fn delete_base_makes_children_base() {
        let (store, engine) = setup(&[("Root", ""), ("C1", "Root"), ("G", "C1")]);
        engine.delete(&store, "Root").unwrap();
        assert!(engine.get(&store, "C1").unwrap().is_base());
        assert_eq!(parent_of(&store, &engine, "G"), "C1");
    }

    #[test]
    fn delete_rejected_when_parts_belong_to_category() {
        let (store, engine) = setup(&[("A", ""), ("B", "A")]);
        PartPlacement::default()
            .create(&store, part("1", "B"))
            .unwrap();
        let err = engine.delete(&store, "B").unwrap_err();
        assert!(matches!(err, CatalogError::PartsAssociated { .. }));
        assert!(engine.get(&store, "B").is_ok());
    }

    #[test]
    fn delete_rejected_when_child_has_parts() {
        let (store, engine) = setup(&[("A", ""), ("B", "A"), ("C", "A")]);
        PartPlacement::default()
            .create(&store, part("1", "C"))
            .unwrap();
        let err = engine.delete(&store, "A").unwrap_err();
        match err {
            CatalogError::ChildHasParts { name, child } => {
                assert_eq!(name, "A");
                assert_eq!(child, "C");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(engine.list(&store).unwrap().len(), 3);
    }

    #[test]
    fn delete_missing_category_is_not_found() {
        let (store, engine) = setup(&[]);
        let err = engine.delete(&store, "ghost").unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound { .. }));
    }

    // ---- reads ----

    #[test]
    fn children_and_ancestors() {
        let (store, engine) = setup(&[("A", ""), ("B", "A"), ("C", "B"), ("D", "B")]);
        let children: Vec<String> = engine
            .children(&store, "B")
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(children, vec!["C", "D"]);

        let chain: Vec<String> = engine
            .ancestors(&store, "D")
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(chain, vec!["B", "A"]);
        assert!(engine.ancestors(&store, "A").unwrap().is_empty());
        assert!(engine.children(&store, "ghost").is_err());
    }

    // ---- configuration ----

    /// A store that only supports one-at-a-time writes.
    struct SequentialOnly(InMemoryDocumentStore);

    impl DocumentStore for SequentialOnly {
        fn find_one(&self, c: Collection, f: &Filter) -> StoreResult<Option<catalog_store::Document>> {
            self.0.find_one(c, f)
        }
        fn find_many(&self, c: Collection, f: &Filter) -> StoreResult<Vec<catalog_store::Document>> {
            self.0.find_many(c, f)
        }
        fn insert_one(&self, c: Collection, d: catalog_store::Document) -> StoreResult<()> {
            self.0.insert_one(c, d)
        }
        fn update_one(&self, c: Collection, f: &Filter, u: &Update) -> StoreResult<u64> {
            self.0.update_one(c, f, u)
        }
        fn update_many(&self, c: Collection, f: &Filter, u: &Update) -> StoreResult<u64> {
            self.0.update_many(c, f, u)
        }
        fn delete_one(&self, c: Collection, f: &Filter) -> StoreResult<u64> {
            self.0.delete_one(c, f)
        }
        fn apply_batch(&self, _ops: &[WriteOp]) -> StoreResult<Vec<u64>> {
            Err(StoreError::Unsupported("batch".into()))
        }
    }

    #[test]
    fn atomic_cascades_need_a_capable_store() {
        let store = SequentialOnly(InMemoryDocumentStore::new());
        let engine = CategoryHierarchy::new(EngineConfig {
            atomic_cascades: true,
            ..Default::default()
        });
        engine.create(&store, Category::base("A")).unwrap();
        let err = engine.delete(&store, "A").unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));

        let sequential = CategoryHierarchy::default();
        sequential.delete(&store, "A").unwrap();
    }

    #[test]
    fn atomic_and_sequential_cascades_agree() {
        for config in [EngineConfig::default(), EngineConfig::strict()] {
            let store = InMemoryDocumentStore::new();
            let engine = CategoryHierarchy::new(config);
            for (name, parent) in [("R", ""), ("M", "R"), ("L", "M")] {
                engine.create(&store, Category::new(name, parent)).unwrap();
            }
            engine
                .update(&store, "M", CategoryUpdate::rename("N"))
                .unwrap();
            engine.delete(&store, "N").unwrap();
            assert_eq!(parent_of(&store, &engine, "L"), "R");
            assert!(audit_tree(&store).unwrap().is_consistent());
        }
    }

    // ---- properties ----

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

        #[derive(Clone, Debug)]
        enum Op {
            Create(usize, Option<usize>),
            Rename(usize, usize),
            Reparent(usize, Option<usize>),
            Delete(usize),
            AddPart(usize),
            RemovePart(u8),
        }

        fn op() -> impl Strategy<Value = Op> {
            let idx = 0..NAMES.len();
            prop_oneof![
                (idx.clone(), proptest::option::of(idx.clone())).prop_map(|(n, p)| Op::Create(n, p)),
                (idx.clone(), idx.clone()).prop_map(|(a, b)| Op::Rename(a, b)),
                (idx.clone(), proptest::option::of(idx.clone()))
                    .prop_map(|(n, p)| Op::Reparent(n, p)),
                idx.clone().prop_map(Op::Delete),
                idx.prop_map(Op::AddPart),
                any::<u8>().prop_map(Op::RemovePart),
            ]
        }

        proptest! {
            #[test]
            fn engine_operations_keep_the_tree_consistent(ops in proptest::collection::vec(op(), 1..40)) {
                let store = InMemoryDocumentStore::new();
                let engine = CategoryHierarchy::new(EngineConfig {
                    atomic_cascades: false,
                    rename_cascades_to_parts: true,
                });
                let parts = PartPlacement::default();
                let mut next_serial = 0u32;

                for op in ops {
                    // Rejections are expected; only the resulting state matters.
                    let _ = match op.clone() {
                        Op::Create(n, p) => engine
                            .create(&store, Category::new(NAMES[n], p.map_or("", |p| NAMES[p])))
                            .map(|_| ()),
                        Op::Rename(a, b) => engine
                            .update(&store, NAMES[a], CategoryUpdate::rename(NAMES[b]))
                            .map(|_| ()),
                        // The parent may not exist; that leaves a dangling link.
                        Op::Reparent(n, p) => {
                            let parent = p.map_or("", |p| NAMES[p]);
                            engine
                                .update(&store, NAMES[n], CategoryUpdate::reparent(parent))
                                .map(|_| ())
                        }
                        Op::Delete(n) => engine.delete(&store, NAMES[n]),
                        Op::AddPart(n) => {
                            next_serial += 1;
                            parts
                                .create(&store, part(&next_serial.to_string(), NAMES[n]))
                                .map(|_| ())
                        }
                        Op::RemovePart(k) => {
                            let serial = (u32::from(k) % (next_serial + 1)).to_string();
                            parts.delete(&store, &serial)
                        }
                    };

                    let report = audit_tree(&store).unwrap();
                    let broken: Vec<_> = report
                        .violations
                        .iter()
                        .filter(|v| !matches!(v, Violation::DanglingParent { .. }))
                        .collect();
                    prop_assert!(broken.is_empty(), "violations after {:?}: {:?}", op, broken);
                }
            }
        }

        #[test]
        fn audit_flags_dangling_reparent() {
            let (store, engine) = setup(&[("A", ""), ("S", "A")]);
            engine
                .update(&store, "S", CategoryUpdate::reparent("nowhere"))
                .unwrap();
            let report = audit_tree(&store).unwrap();
            assert!(report
                .violations
                .contains(&Violation::DanglingParent {
                    category: "S".into(),
                    parent_name: "nowhere".into(),
                }));
        }
    }
}
