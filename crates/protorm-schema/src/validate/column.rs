use crate::prelude::*;
use std::collections::BTreeSet;

/// Field and column names must be unique within an entity.
pub fn validate_columns(schema: &Schema, errs: &mut ErrorTree) {
    for (entity_path, entity) in &schema.entities {
        let mut tree = ErrorTree::new();
        let mut names = BTreeSet::new();
        let mut columns = BTreeSet::new();

        for field in &entity.fields {
            if !names.insert(field.name.as_str()) {
                err!(tree, "duplicate field '{}'", field.name);
                continue;
            }
            if !field.storage.is_association() && !columns.insert(field.column_name()) {
                err!(tree, "duplicate column '{}'", field.column_name());
            }
        }

        errs.merge_for(entity_path.clone(), tree);
    }
}

///
/// TESTS
///
