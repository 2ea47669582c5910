use crate::prelude::*;
use std::collections::BTreeMap;

pub fn validate_table_naming(schema: &Schema, errs: &mut ErrorTree) {
    let mut tables: BTreeMap<&str, &str> = BTreeMap::new();

    for (entity_path, entity) in &schema.entities {
        if let Some(prev) = tables.insert(&entity.table_name, entity_path) {
            err!(
                errs,
                "duplicate table name '{}' for '{prev}' and '{entity_path}'",
                entity.table_name
            );
        }
    }
}

pub fn validate_generated_naming(schema: &Schema, errs: &mut ErrorTree) {
    for (entity_path, entity) in &schema.entities {
        let mut scoped = vec![entity.package.as_str()];
        scoped.extend(entity.scope.iter().map(String::as_str));
        scoped.push(&entity.generated_name);
        let generated = scoped
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(".");

        if schema.catalog.lookup(&generated).is_some_and(|e| e.full_name == generated) {
            errs.add_for(
                entity_path.clone(),
                format!("generated type '{}' collides with message '{generated}'", entity.generated_name),
            );
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::{Error, build::{BuildError, build_schema}, fixtures::*, prelude::*};

    #[test]
    fn duplicate_tables_and_generated_names() {
        let result = build_schema(
            &unit(vec![file(
                "shop.proto",
                "shop",
                vec![
                    msg("Widget").ormable().field(scalar("id", Kind::String)).build(),
                    msg("Gadget")
                        .ormable()
                        .table("widgets")
                        .field(scalar("id", Kind::String))
                        .build(),
                    msg("WidgetORM").build(),
                ],
            )]),
            &Config::default(),
        );

        let Err(Error::BuildError(BuildError::Validation(tree))) = result else {
            panic!("validation should fail");
        };
        let text = tree.to_string();

        assert_eq!(tree.len(), 2, "{text}");
        assert!(text.contains("duplicate table name 'widgets'"), "{text}");
        assert!(
            text.contains("shop.Widget: generated type 'WidgetORM' collides"),
            "{text}"
        );
    }
}
