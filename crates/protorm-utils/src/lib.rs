//! Naming helpers shared by the schema resolver and the code synthesizer.
//!
//! Table, column, and join-table names must match what the relational layer
//! derives on its own, so the casing and inflection rules here are fixed and
//! covered by tests.

pub mod case;
pub mod inflection;

pub use case::{camel_case, rust_ident_case, to_db_name};
pub use inflection::{plural, singular};
