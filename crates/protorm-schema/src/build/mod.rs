use crate::{
    Error, ThisError, catalog::Catalog, descriptor::CompilationUnit, node::Schema, prelude::*,
    resolve::Resolver, validate::validate_schema,
};

///
/// BuildError
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error("validation failed: {0}")]
    Validation(ErrorTree),
}

/// Resolve and validate every mappable message of the unit.
///
/// Any fatal problem aborts the whole unit; no partial schema is returned.
pub fn build_schema(unit: &CompilationUnit, config: &Config) -> Result<Schema, Error> {
    let catalog = Catalog::from_unit(unit, config);
    let schema = Resolver::new(config, catalog).resolve(unit)?;

    validate_schema(&schema).map_err(BuildError::Validation)?;

    Ok(schema)
}
