//! Strongly-typed sequential identifiers.
//!
//! Both tables assign ids densely from zero: the n-th data row (header not
//! counted) carries id `n`. The backing store keeps ids as text, so every id
//! type round-trips through `Display`/`FromStr`.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a tracked piece of equipment (row in `items`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

/// Identifier of an audit log entry (row in `history`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

macro_rules! impl_seq_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Id assigned to the row appended after `row_count` existing data rows.
            pub const fn from_row_count(row_count: usize) -> Self {
                Self(row_count as u64)
            }

            pub const fn value(&self) -> u64 {
                self.0
            }

            /// Textual form as written to the backing store.
            pub fn as_cell(&self) -> String {
                self.0.to_string()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| DomainError::validation(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }
    };
}

impl_seq_newtype!(ItemId, "ItemId");
impl_seq_newtype!(EntryId, "EntryId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_count_maps_to_dense_ids() {
        assert_eq!(ItemId::from_row_count(0), ItemId::new(0));
        assert_eq!(EntryId::from_row_count(7).value(), 7);
    }

    #[test]
    fn parses_trimmed_text_cells() {
        assert_eq!(" 12 ".parse::<ItemId>().unwrap(), ItemId::new(12));
        assert_eq!(ItemId::new(12).as_cell(), "12");
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = "abc".parse::<EntryId>().unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.starts_with("EntryId")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!("-1".parse::<ItemId>().is_err());
    }
}
