//! Persistence gateway abstractions and implementations.
//!
//! # Responsibility
//! - Define the load/save contract the record store depends on.
//! - Keep file formats and I/O details out of the store.
//!
//! # Invariants
//! - Loaded records are fully validated; invalid persisted data is an error,
//!   never silently dropped.
//! - `save` replaces the whole persisted collection.

pub mod json_file;
pub mod memory;
pub mod record_repo;
