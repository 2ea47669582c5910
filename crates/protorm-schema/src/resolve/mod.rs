//! Multi-pass resolution of mappable messages into entities.

pub mod association;
pub mod fields;
pub mod primary_key;
pub mod special;

use crate::{
    catalog::Catalog,
    descriptor::{CompilationUnit, FileDescriptor, MessageDescriptor},
    prelude::*,
};
use log::debug;
use thiserror::Error as ThisError;

///
/// ResolveError
/// fatal configuration problems; any one aborts the unit
///

#[derive(Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum ResolveError {
    #[error("{entity}.{field}: cannot include field, the name is already taken")]
    DuplicateIncludedField { entity: String, field: String },

    #[error(
        "{entity}.{field}: foreign key '{foreign_key}' on '{target}' conflicts with an existing field of another type"
    )]
    ForeignKeyConflict {
        entity: String,
        field: String,
        target: String,
        foreign_key: String,
    },

    #[error("{entity}: cannot include account_id, the field exists with a type other than String")]
    IncompatibleTenantField { entity: String },

    #[error("{entity}.{field}: association key '{key}' does not exist on '{target}'")]
    MissingAssociationKey {
        entity: String,
        field: String,
        key: String,
        target: String,
    },

    #[error("{entity}.{field}: '{target}' has no primary key")]
    MissingPrimaryKey {
        entity: String,
        field: String,
        target: String,
    },

    #[error("{entity}.{field}: position field '{position}' on '{target}' is not an integer")]
    PositionFieldConflict {
        entity: String,
        field: String,
        target: String,
        position: String,
    },

    #[error("{entity}.{field}: unsupported identifier column type '{hint}'")]
    UnknownIdentifierType {
        entity: String,
        field: String,
        hint: String,
    },

    #[error("{entity}.{field}: message field without a resolvable type name '{name}'")]
    UnknownMessage {
        entity: String,
        field: String,
        name: String,
    },

    #[error("{entity}.{field}: reference_of names unknown message '{name}'")]
    UnknownReference {
        entity: String,
        field: String,
        name: String,
    },
}

///
/// Resolver
/// explicit resolution state for one compilation unit
///

pub struct Resolver {
    schema: Schema,
}

impl Resolver {
    #[must_use]
    pub fn new(config: &Config, catalog: Catalog) -> Self {
        Self {
            schema: Schema::new(config.clone(), catalog),
        }
    }

    /// Run every pass: entities for all files first, since associations
    /// may point anywhere in the unit, then associations, then primary-key
    /// stamping.
    pub fn resolve(mut self, unit: &CompilationUnit) -> Result<Schema, ResolveError> {
        // entities
        for file in &unit.files {
            let mut file_schema = FileSchema {
                name: file.name.clone(),
                package: file.package.clone(),
                ..Default::default()
            };

            for (scope, msg) in mappable_messages(file) {
                let entity =
                    fields::resolve_entity(&self.schema.config, &self.schema.catalog, file, &scope, msg)?;
                debug!("resolved entity {} ({} fields)", entity.full_name, entity.fields.len());

                file_schema.entities.push(entity.full_name.clone());
                self.schema.entities.insert(entity.full_name.clone(), entity);
            }

            self.schema.files.push(file_schema);
        }

        // associations
        for (index, file) in unit.files.iter().enumerate() {
            for (scope, msg) in mappable_messages(file) {
                let full_name = qualified_name(file, &scope, msg);
                association::resolve_associations(&mut self.schema, index, &full_name, msg)?;
            }
        }

        // primary keys
        for entity in self.schema.entities.values_mut() {
            primary_key::stamp_primary_key(entity);
        }

        Ok(self.schema)
    }
}

/// Mappable messages of a file in declaration order, nested ones after
/// their parent.
pub(crate) fn mappable_messages(file: &FileDescriptor) -> Vec<(Vec<String>, &MessageDescriptor)> {
    fn walk<'a>(
        scope: &[String],
        messages: &'a [MessageDescriptor],
        out: &mut Vec<(Vec<String>, &'a MessageDescriptor)>,
    ) {
        for msg in messages.iter().filter(|m| !m.map_entry) {
            if msg.is_ormable() {
                out.push((scope.to_vec(), msg));
            }

            let mut inner = scope.to_vec();
            inner.push(msg.name.clone());
            walk(&inner, &msg.nested_messages, out);
        }
    }

    let mut out = Vec::new();
    walk(&[], &file.messages, &mut out);

    out
}

pub(crate) fn qualified_name(file: &FileDescriptor, scope: &[String], msg: &MessageDescriptor) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !file.package.is_empty() {
        parts.push(&file.package);
    }
    parts.extend(scope.iter().map(String::as_str));
    parts.push(&msg.name);

    parts.join(".")
}

/// Storage field name for a proto or included field name.
#[must_use]
pub fn field_key(name: &str) -> String {
    protorm_utils::to_db_name(&protorm_utils::camel_case(name))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    #[test]
    fn field_keys_are_snake_case() {
        assert_eq!(field_key("account_id"), "account_id");
        assert_eq!(field_key("CreatedAt"), "created_at");
        assert_eq!(field_key("ownerID"), "owner_id");
    }

    #[test]
    fn nested_mappable_messages_follow_their_parent() {
        let file = file(
            "shop.proto",
            "shop",
            vec![
                msg("Widget")
                    .ormable()
                    .nested(msg("Part").ormable().build())
                    .build(),
                msg("Plain").nested(msg("Inner").ormable().build()).build(),
            ],
        );

        let names: Vec<String> = mappable_messages(&file)
            .into_iter()
            .map(|(scope, m)| qualified_name(&file, &scope, m))
            .collect();

        assert_eq!(names, vec!["shop.Widget", "shop.Widget.Part", "shop.Plain.Inner"]);
    }
}
