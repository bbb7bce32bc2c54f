//! Record store services.
//!
//! # Responsibility
//! - Own record state and the derived table view.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod observer;
pub mod projection;
pub mod record_store;
