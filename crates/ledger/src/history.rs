//! Audit trail records.
//!
//! History entries are facts: append-only, never edited, never deleted. Item
//! name and locations are snapshots taken when the action happened.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use equiptrack_core::{DomainError, Entity, EntryId, ItemId};

use crate::catalog::Location;
use crate::item::Item;

/// What happened to the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    Register,
    Relocate,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Register => "REGISTER",
            AuditAction::Relocate => "RELOCATE",
        }
    }
}

impl core::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "REGISTER" => Ok(AuditAction::Register),
            "RELOCATE" => Ok(AuditAction::Relocate),
            other => Err(DomainError::validation(format!("unknown audit action '{other}'"))),
        }
    }
}

/// An audit record that has not been assigned an id or timestamp yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub action: AuditAction,
    pub item_id: ItemId,
    pub item_name: String,
    /// `None` for registrations.
    pub from_location: Option<Location>,
    pub to_location: Location,
    pub comment: String,
}

impl NewHistoryEntry {
    pub fn registered(item: &Item) -> Self {
        Self {
            action: AuditAction::Register,
            item_id: item.id,
            item_name: item.name.clone(),
            from_location: None,
            to_location: item.location.clone(),
            comment: String::new(),
        }
    }

    pub fn relocated(before: &Item, after: &Item, comment: impl Into<String>) -> Self {
        Self {
            action: AuditAction::Relocate,
            item_id: after.id,
            item_name: before.name.clone(),
            from_location: Some(before.location.clone()),
            to_location: after.location.clone(),
            comment: comment.into(),
        }
    }
}

/// A committed row of the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub action: AuditAction,
    /// Weak reference; used for lookup/display only.
    pub item_id: ItemId,
    pub item_name: String,
    pub from_location: Option<Location>,
    pub to_location: Location,
    pub date_time: DateTime<Utc>,
    pub comment: String,
}

impl HistoryEntry {
    pub fn from_new(id: EntryId, new: NewHistoryEntry, date_time: DateTime<Utc>) -> Self {
        Self {
            id,
            action: new.action,
            item_id: new.item_id,
            item_name: new.item_name,
            from_location: new.from_location,
            to_location: new.to_location,
            date_time,
            comment: new.comment,
        }
    }
}

impl Entity for HistoryEntry {
    type Id = EntryId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
