//! FRB bridge crate for the Rollbook desktop UI.

pub mod api;
