use crate::{node::Entity, prelude::*, resolve::ResolveError};

/// First field tagged `primary_key`, else the first field named `id`.
#[must_use]
pub fn has_primary_key(entity: &Entity) -> bool {
    locate(entity).is_some()
}

pub fn find_primary_key(entity: &Entity) -> Result<(&str, &Field), ResolveError> {
    locate(entity)
        .map(|field| (field.name.as_str(), field))
        .ok_or_else(|| ResolveError::MissingPrimaryKey {
            entity: entity.full_name.clone(),
            field: String::new(),
            target: entity.full_name.clone(),
        })
}

// locate
fn locate(entity: &Entity) -> Option<&Field> {
    entity
        .fields
        .iter()
        .find(|f| f.is_tagged_primary_key())
        .or_else(|| entity.fields.iter().find(|f| f.name.eq_ignore_ascii_case("id")))
}

/// The key's codec is keyed by the entity it identifies.
pub(crate) fn stamp_primary_key(entity: &mut Entity) {
    let Some(index) = entity
        .fields
        .iter()
        .position(Field::is_tagged_primary_key)
        .or_else(|| entity.fields.iter().position(|f| f.name.eq_ignore_ascii_case("id")))
    else {
        return;
    };

    entity.fields[index].origin_message.clone_from(&entity.origin_name);
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build::build_schema, fixtures::*};

    #[test]
    fn tagged_key_wins_over_id() {
        let schema = build_schema(
            &unit(vec![file(
                "shop.proto",
                "shop",
                vec![
                    msg("Widget")
                        .ormable()
                        .field(scalar("id", Kind::String))
                        .field(scalar("code", Kind::String).tag(pk_tag()))
                        .build(),
                ],
            )]),
            &Config::default(),
        )
        .expect("schema should build");

        let widget = schema.entity("shop.Widget").expect("widget entity");
        let (name, _) = find_primary_key(widget).expect("primary key");
        assert_eq!(name, "code");
    }

    #[test]
    fn id_is_matched_case_insensitively_and_absent_key_is_reported() {
        let schema = build_schema(
            &unit(vec![file(
                "shop.proto",
                "shop",
                vec![
                    msg("Widget").ormable().field(scalar("ID", Kind::Int64)).build(),
                    msg("Log").ormable().field(scalar("line", Kind::String)).build(),
                ],
            )]),
            &Config::default(),
        )
        .expect("schema should build");

        let widget = schema.entity("Widget").expect("widget entity");
        assert!(has_primary_key(widget));
        assert_eq!(widget.primary_key().map(|f| f.name.as_str()), Some("id"));

        let log = schema.entity("Log").expect("log entity");
        assert!(!has_primary_key(log));
        assert!(matches!(
            find_primary_key(log),
            Err(ResolveError::MissingPrimaryKey { .. })
        ));
    }
}
