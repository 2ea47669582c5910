//! ## Crate layout
//! - `build`: code synthesizer and the `build!` helper for build scripts.
//! - `core`: runtime surface of generated code: storage traits, request
//!   context, hooks, special column types, and errors.
//! - `schema`: descriptor input, type catalog, and entity resolution.
//! - `utils`: naming helpers shared by the schema and the synthesizer.
//!
//! Generated files reach the runtime through `::protorm::core`, so a
//! consumer only has to depend on this crate and on prost.

pub use protorm_build as build;
pub use protorm_core as core;
pub use protorm_schema as schema;
pub use protorm_utils as utils;

/// re-exports
///
/// generated wire types can use these, stops the user having to specify
/// all the dependencies in the Cargo.toml file manually
pub mod __reexports {
    pub use prost;
    pub use prost_types;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Macros
//

pub use protorm_build::build;

///
/// Prelude
/// everything a hook implementation or a storage backend needs
///

pub mod prelude {
    pub use crate::core::prelude::*;
}
