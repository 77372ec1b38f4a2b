use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use equiptrack_core::{DomainError, DomainResult, Entity, ItemId};

use crate::catalog::{Catalog, ItemStatus, ItemType, Location};

/// A tracked piece of equipment (current state only; provenance lives in the
/// audit log).
///
/// # Invariants
/// - `id` and `created_at` never change once assigned.
/// - `location` changes only through relocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub item_type: ItemType,
    /// Free text; not unique. Kept as text even when it looks numeric.
    pub serial_number: String,
    pub specs: String,
    pub location: Location,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Materialize a validated registration under the id the ledger assigned.
    pub fn from_new(id: ItemId, new: NewItem, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            item_type: new.item_type,
            serial_number: new.serial_number,
            specs: new.specs,
            location: new.location,
            status: new.status,
            created_at,
        }
    }

    /// Snapshot of this item after moving to `to`. Nothing else changes.
    pub fn relocated(&self, to: Location) -> Self {
        Self {
            location: to,
            ..self.clone()
        }
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A registration that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub item_type: ItemType,
    pub serial_number: String,
    pub specs: String,
    pub location: Location,
    pub status: ItemStatus,
}

/// Command: register a new piece of equipment (raw operator input).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegisterEquipment {
    pub name: String,
    pub item_type: String,
    pub serial_number: String,
    pub specs: String,
    pub location: String,
    pub status: String,
}

impl RegisterEquipment {
    /// Check the command against the catalog before anything touches storage.
    pub fn validate(&self, catalog: &Catalog) -> DomainResult<NewItem> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        let item_type = catalog.item_type(&self.item_type)?;
        let location = catalog.location(&self.location)?;
        let status = if self.status.trim().is_empty() {
            ItemStatus::default()
        } else {
            catalog.status(&self.status)?
        };

        Ok(NewItem {
            name: name.to_string(),
            item_type,
            serial_number: self.serial_number.trim().to_string(),
            specs: self.specs.trim().to_string(),
            location,
            status,
        })
    }
}

/// Command: move an existing item to another location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocateEquipment {
    pub item_id: ItemId,
    pub to_location: String,
    pub comment: String,
}

impl RelocateEquipment {
    pub fn validate(&self, catalog: &Catalog) -> DomainResult<Location> {
        catalog.location(&self.to_location)
    }
}
