//! Relational entity models resolved from annotated message descriptors.
//!
//! The flow is catalog (every file) → entity resolution → association
//! resolution → primary-key stamping → validation. The result is a
//! [`node::Schema`] that the code synthesizer walks once per file.

pub mod build;
pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod node;
pub mod resolve;
pub mod types;
pub mod validate;

use crate::{build::BuildError, resolve::ResolveError};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        config::Config,
        err,
        error::ErrorTree,
        node::*,
        types::{AssociationKind, Cascade, Engine, EnumMode, Kind, Label, MarkerMatch, Scalar},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    BuildError(#[from] BuildError),

    #[error(transparent)]
    ResolveError(#[from] ResolveError),
}

#[cfg(test)]
pub(crate) mod fixtures;
