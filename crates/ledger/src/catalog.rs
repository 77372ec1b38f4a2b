//! Enumerated sets that constrain equipment input: locations, equipment
//! types and statuses.
//!
//! Locations and types are closed per deployment but may be extended through
//! configuration, so they are validated against a [`Catalog`] rather than
//! hard-coded as enums. Statuses are fixed.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use equiptrack_core::{DomainError, DomainResult, ValueObject};

pub const DEFAULT_LOCATIONS: &[&str] = &[
    "Office",
    "Warehouse",
    "Repair",
    "Site North",
    "Site South",
    "Site East",
];

pub const DEFAULT_ITEM_TYPES: &[&str] = &[
    "cartridge", "mouse", "keyboard", "monitor", "printer", "laptop", "other",
];

/// A named place equipment can be at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    /// Wrap a value read back from the store.
    ///
    /// Stored rows are trusted as-is: a location that was later removed from
    /// the catalog still has to be readable.
    pub fn from_cell(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for Location {}

/// An equipment category (cartridge, laptop, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemType(String);

impl ItemType {
    pub fn from_cell(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for ItemType {}

/// Equipment condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ItemStatus {
    #[default]
    New,
    Working,
    InRepair,
    Empty,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 4] = [
        ItemStatus::New,
        ItemStatus::Working,
        ItemStatus::InRepair,
        ItemStatus::Empty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::New => "new",
            ItemStatus::Working => "working",
            ItemStatus::InRepair => "in-repair",
            ItemStatus::Empty => "empty",
        }
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ItemStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::validation(format!("unknown status '{wanted}'")))
    }
}

impl ValueObject for ItemStatus {}

/// The closed sets of locations and equipment types accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    locations: Vec<String>,
    item_types: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            locations: DEFAULT_LOCATIONS.iter().map(|s| s.to_string()).collect(),
            item_types: DEFAULT_ITEM_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Catalog {
    /// Build a catalog from explicit sets.
    ///
    /// Both sets must be non-empty, entries must be non-blank and unique
    /// ignoring case.
    pub fn new(
        locations: impl IntoIterator<Item = impl Into<String>>,
        item_types: impl IntoIterator<Item = impl Into<String>>,
    ) -> DomainResult<Self> {
        let locations = normalize_set("locations", locations)?;
        let item_types = normalize_set("item_types", item_types)?;
        Ok(Self {
            locations,
            item_types,
        })
    }

    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.locations.iter().map(|s| Location(s.clone()))
    }

    pub fn item_types(&self) -> impl Iterator<Item = ItemType> + '_ {
        self.item_types.iter().map(|s| ItemType(s.clone()))
    }

    pub fn statuses(&self) -> &'static [ItemStatus] {
        &ItemStatus::ALL
    }

    /// Resolve user input to a catalog location (canonical spelling).
    pub fn location(&self, input: &str) -> DomainResult<Location> {
        lookup(&self.locations, input)
            .map(Location)
            .ok_or_else(|| DomainError::validation(format!("unknown location '{}'", input.trim())))
    }

    /// Resolve user input to a catalog equipment type (canonical spelling).
    pub fn item_type(&self, input: &str) -> DomainResult<ItemType> {
        lookup(&self.item_types, input)
            .map(ItemType)
            .ok_or_else(|| DomainError::validation(format!("unknown item type '{}'", input.trim())))
    }

    pub fn status(&self, input: &str) -> DomainResult<ItemStatus> {
        input.parse()
    }
}

fn lookup(set: &[String], input: &str) -> Option<String> {
    let wanted = input.trim();
    set.iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(wanted))
        .cloned()
}

fn normalize_set(
    what: &str,
    values: impl IntoIterator<Item = impl Into<String>>,
) -> DomainResult<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(DomainError::validation(format!("{what} cannot contain blank entries")));
        }
        if out.iter().any(|existing| existing.eq_ignore_ascii_case(&value)) {
            return Err(DomainError::validation(format!("{what} contains duplicate '{value}'")));
        }
        out.push(value);
    }
    if out.is_empty() {
        return Err(DomainError::validation(format!("{what} cannot be empty")));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_resolves_case_insensitively() {
        let catalog = Catalog::default();
        assert_eq!(catalog.location(" warehouse ").unwrap().as_str(), "Warehouse");
        assert_eq!(catalog.item_type("LAPTOP").unwrap().as_str(), "laptop");
        assert_eq!(catalog.status("In-Repair").unwrap(), ItemStatus::InRepair);
    }

    #[test]
    fn unknown_values_are_validation_errors() {
        let catalog = Catalog::default();
        assert!(matches!(catalog.location("Moon"), Err(DomainError::Validation(_))));
        assert!(matches!(catalog.item_type("toaster"), Err(DomainError::Validation(_))));
        assert!(matches!(catalog.status("broken"), Err(DomainError::Validation(_))));
    }

    #[test]
    fn custom_catalog_rejects_duplicates_and_blanks() {
        assert!(Catalog::new(["Office", "office"], ["laptop"]).is_err());
        assert!(Catalog::new(["Office", " "], ["laptop"]).is_err());
        assert!(Catalog::new(Vec::<String>::new(), ["laptop"]).is_err());

        let catalog = Catalog::new(["HQ", "Depot"], ["phone"]).unwrap();
        assert_eq!(catalog.locations().count(), 2);
        assert!(catalog.location("Office").is_err());
        assert_eq!(catalog.item_type("Phone").unwrap().as_str(), "phone");
    }

    #[test]
    fn status_labels_round_trip() {
        for status in ItemStatus::ALL {
            assert_eq!(status.as_str().parse::<ItemStatus>().unwrap(), status);
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any casing/padding of a known location resolves to its canonical spelling.
            #[test]
            fn location_lookup_ignores_case_and_padding(
                idx in 0..DEFAULT_LOCATIONS.len(),
                upper in prop::collection::vec(any::<bool>(), 16),
                pad in 0usize..3,
            ) {
                let canonical = DEFAULT_LOCATIONS[idx];
                let mangled: String = canonical
                    .chars()
                    .zip(upper.iter().cycle())
                    .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
                    .collect();
                let input = format!("{}{}{}", " ".repeat(pad), mangled, " ".repeat(pad));

                let resolved = Catalog::default().location(&input).unwrap();
                prop_assert_eq!(resolved.as_str(), canonical);
            }
        }
    }
}
