//! Runtime surface for protorm-generated data-access code: storage traits,
//! request context and hook registry, special column types, and the named
//! error kinds every generated operation returns.

pub mod context;
pub mod db;
pub mod error;
pub mod resource;
pub mod types;
pub mod value;

pub use prost_types::FieldMask;

///
/// Prelude
///
/// Everything generated code and hook implementations need in scope.
///

pub mod prelude {
    pub use crate::{
        FieldMask,
        context::{Context, Hooks, Identity},
        db::{Association, Database, Model, Predicate},
        error::{ConversionError, OrmError},
        resource::{Identifier, ResourceCodec, ResourceValue},
        types::{BoolArray, Float64Array, Inet, Int64Array, Jsonb, StringArray},
        value::Value,
    };
}
