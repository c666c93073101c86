//! Domain records for the inventory catalog.
//!
//! The catalog stores two independent kinds of record that refer to each
//! other by natural key:
//!
//! - [`Category`]: a node in the category tree, linked to its parent by
//!   `parent_name`. An empty `parent_name` marks a *base* category.
//! - [`Part`]: an inventory item filed under a non-base category and
//!   stored at a physical [`Location`].
//!
//! Patch payloads ([`CategoryUpdate`], [`PartUpdate`], [`LocationUpdate`])
//! carry only the fields a caller wants to change. [`PartSearch`] is the
//! sparse equality filter used by part search.

pub mod category;
pub mod error;
pub mod names;
pub mod part;
pub mod search;

pub use category::{Category, CategoryUpdate};
pub use error::{Result, TypeError};
pub use names::{validate_category_name, validate_serial_number};
pub use part::{Location, LocationUpdate, Part, PartUpdate};
pub use search::PartSearch;
