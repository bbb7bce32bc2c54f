//! Student record domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep field-format validation next to the types it guards.
//!
//! # Invariants
//! - Every record is identified by a store-assigned positive `RecordId`.
//! - Records are validated once and never mutated afterwards.

pub mod record;
pub mod validate;
