//! Part records and their physical locations.

use serde::{Deserialize, Serialize};

/// Where a part is physically kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub room: String,
    pub bookcase: String,
    pub shelf: String,
    pub cuvette: String,
    pub column: i64,
    pub row: i64,
}

impl Location {
    /// Overlay the fields present in `update` on top of this location.
    ///
    /// Fields the update leaves out keep their current value.
    pub fn merged(&self, update: &LocationUpdate) -> Location {
        Location {
            room: update.room.clone().unwrap_or_else(|| self.room.clone()),
            bookcase: update
                .bookcase
                .clone()
                .unwrap_or_else(|| self.bookcase.clone()),
            shelf: update.shelf.clone().unwrap_or_else(|| self.shelf.clone()),
            cuvette: update
                .cuvette
                .clone()
                .unwrap_or_else(|| self.cuvette.clone()),
            column: update.column.unwrap_or(self.column),
            row: update.row.unwrap_or(self.row),
        }
    }
}

/// An inventory item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Unique natural key.
    pub serial_number: String,
    pub name: String,
    pub description: String,
    /// Name of the (non-base) category this part is filed under.
    pub category: String,
    pub quantity: i64,
    pub price: f64,
    pub location: Location,
}

/// Field-level patch for a [`Location`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationUpdate {
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub bookcase: Option<String>,
    #[serde(default)]
    pub shelf: Option<String>,
    #[serde(default)]
    pub cuvette: Option<String>,
    #[serde(default)]
    pub column: Option<i64>,
    #[serde(default)]
    pub row: Option<i64>,
}

impl LocationUpdate {
    pub fn is_empty(&self) -> bool {
        self.room.is_none()
            && self.bookcase.is_none()
            && self.shelf.is_none()
            && self.cuvette.is_none()
            && self.column.is_none()
            && self.row.is_none()
    }
}

/// Partial update of a part.
///
/// The serial number is the part's identity and cannot be patched. A
/// `location` patch is merged into the stored location, see
/// [`Location::merged`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub location: Option<LocationUpdate>,
}

impl PartUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.quantity.is_none()
            && self.price.is_none()
            && self.location.as_ref().map_or(true, LocationUpdate::is_empty)
    }
}
