//! Demo data for a fresh catalog.

use catalog_store::{Collection, Document, DocumentStore, Filter};
use catalog_types::{Category, Location, Part};
use serde_json::Value;
use tracing::info;

use crate::error::CatalogResult;
use crate::hierarchy::{find_category, CategoryHierarchy};
use crate::placement::{find_part, PartPlacement};

/// Field on the `demo_config` marker document.
pub const SEEDED_FLAG: &str = "has_inserted_demo_examples";

pub const DEMO_BASE_CATEGORY: &str = "DemoMainCategory";
pub const DEMO_SUB_CATEGORIES: [&str; 2] = ["DemoSubCategoryA", "DemoSubCategoryB"];

/// Insert the demo categories and parts unless a previous run already did.
///
/// Returns `true` if data was inserted. A marker document in the
/// `demo_config` collection records that seeding happened, so deleting the
/// demo records does not bring them back on the next start. A run that
/// failed before writing the marker is completed by the next one.
pub fn seed_demo_data<S: DocumentStore + ?Sized>(
    store: &S,
    categories: &CategoryHierarchy,
    parts: &PartPlacement,
) -> CatalogResult<bool> {
    if store.exists(Collection::DemoConfig, &Filter::eq(SEEDED_FLAG, true))? {
        return Ok(false);
    }

    // Records left by an interrupted run are kept; the rest are filled in.
    let mut wanted = vec![Category::base(DEMO_BASE_CATEGORY)];
    wanted.extend(
        DEMO_SUB_CATEGORIES
            .iter()
            .map(|sub| Category::new(*sub, DEMO_BASE_CATEGORY)),
    );
    for category in wanted {
        if find_category(store, &category.name)?.is_none() {
            categories.create(store, category)?;
        }
    }

    for (index, sub) in DEMO_SUB_CATEGORIES.iter().enumerate() {
        for slot in 1..=3 {
            let part = demo_part(index * 3 + slot, sub);
            if find_part(store, &part.serial_number)?.is_none() {
                parts.create(store, part)?;
            }
        }
    }

    let mut marker = Document::new();
    marker.insert(SEEDED_FLAG.to_string(), Value::Bool(true));
    marker.insert(
        "seeded_at".to_string(),
        Value::from(chrono::Utc::now().to_rfc3339()),
    );
    store.insert_one(Collection::DemoConfig, marker)?;

    info!(categories = 3, parts = 6, "demo data inserted");
    Ok(true)
}

fn demo_part(serial: usize, category: &str) -> Part {
    Part {
        serial_number: format!("#{serial}"),
        name: format!("Demo part {serial}"),
        description: format!("Sample part stored under {category}"),
        category: category.to_string(),
        quantity: 10,
        price: 19.99,
        location: Location {
            room: "Demo room".into(),
            bookcase: "1".into(),
            shelf: "2".into(),
            cuvette: "3".into(),
            column: serial as i64,
            row: 1,
        },
    }
}
