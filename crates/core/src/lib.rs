//! `equiptrack-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage, no IO).

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{EntryId, ItemId};
pub use value_object::ValueObject;
