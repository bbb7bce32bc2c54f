//! Derived-view query engines.
//!
//! # Responsibility
//! - Filter, sort and paginate record sequences without owning them.
//! - Keep every engine a pure function of its inputs.
//!
//! # Invariants
//! - Engines never reorder or drop records beyond what their query asks for.
//! - Empty specs are identity transforms.

pub mod filter;
pub mod page;
pub mod sort;
