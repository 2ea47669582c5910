//! Schema validation orchestration.

pub mod column;
pub mod naming;

use crate::{error::ErrorTree, node::Schema};

/// Run every unit-wide check and report all problems at once.
pub(crate) fn validate_schema(schema: &Schema) -> Result<(), ErrorTree> {
    let mut errors = ErrorTree::new();

    naming::validate_table_naming(schema, &mut errors);
    naming::validate_generated_naming(schema, &mut errors);
    column::validate_columns(schema, &mut errors);

    errors.result()
}
