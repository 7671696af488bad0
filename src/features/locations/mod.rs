//! Post locations. Administrator-owned reference data; read-only here, an
//! unpublished location is simply hidden from rendered pages.

pub mod models;
pub mod services;
