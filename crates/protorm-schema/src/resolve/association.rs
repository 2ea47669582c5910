//! Second pass: association edges between entities.
//!
//! Runs once every entity of the unit exists, since an edge may point at a
//! message declared in a later file. Default foreign keys are injected into
//! the peer (has-one, has-many) or the owner (belongs-to).

use crate::{
    catalog::Catalog,
    descriptor::{AssociationOptions, FieldDescriptor, GormTag, MessageDescriptor},
    prelude::*,
    resolve::{ResolveError, field_key, primary_key::find_primary_key},
};
use log::debug;
use protorm_utils::{camel_case, plural, singular, to_db_name};

///
/// Edge
/// mappable message field awaiting resolution
///

struct Edge<'a> {
    fd: &'a FieldDescriptor,
    peer: String,
    kind: AssociationKind,
    options: AssociationOptions,
}

impl Edge<'_> {
    fn field_camel(&self) -> String {
        camel_case(&self.fd.name)
    }
}

// Site
// error context: the owning entity and the field being resolved
struct Site<'a> {
    entity: &'a str,
    field: &'a str,
}

/// Resolve every association of one entity, in declaration order.
pub fn resolve_associations(
    schema: &mut Schema,
    file_index: usize,
    owner_name: &str,
    msg: &MessageDescriptor,
) -> Result<(), ResolveError> {
    let edges = collect_edges(&schema.catalog, msg);

    for edge in &edges {
        let site = Site {
            entity: owner_name,
            field: &edge.fd.name,
        };
        let count = edges
            .iter()
            .filter(|other| other.peer == edge.peer && same_family(other.kind, edge.kind))
            .count();

        let association = match edge.kind {
            AssociationKind::HasOne | AssociationKind::HasMany => {
                resolve_has(schema, owner_name, edge, count, &site)?
            }
            AssociationKind::BelongsTo => resolve_belongs_to(schema, owner_name, edge, count, &site)?,
            AssociationKind::ManyToMany => {
                resolve_many_to_many(schema, owner_name, edge, count, &site)?
            }
        };
        debug!(
            "{owner_name}.{}: {} {} (fk: {}, key: {})",
            edge.fd.name,
            association.kind,
            association.peer,
            association.foreign_key,
            association.association_foreign_key
        );

        let owner = entity_mut(schema, owner_name, &site)?;
        let owner_package = owner.package.clone();
        let wire = owner
            .wire_field(&edge.fd.name)
            .cloned()
            .ok_or_else(|| unknown(&site, owner_name))?;
        let tag = edge.fd.options.as_ref().and_then(|o| o.tag.clone());

        let mut field = Field::new(
            field_key(&edge.fd.name),
            StorageType::Association {
                peer: edge.peer.clone(),
                kind: edge.kind,
            },
            FieldSource::Wire(wire),
        )
        .with_nullable(!edge.kind.is_many())
        .with_tag(tag)
        .with_origin(&owner.origin_name);
        field.association = Some(association);
        owner.fields.push(field);

        let peer_package = entity(schema, &edge.peer, &site)?.package.clone();
        if peer_package != owner_package
            && let Some(file) = schema.files.get_mut(file_index)
        {
            file.register_type(&edge.peer);
        }
    }

    Ok(())
}

// collect_edges
fn collect_edges<'a>(catalog: &Catalog, msg: &'a MessageDescriptor) -> Vec<Edge<'a>> {
    msg.fields
        .iter()
        .filter(|fd| !fd.is_dropped() && fd.kind == Kind::Message)
        .filter_map(|fd| {
            let entry = catalog.lookup(fd.type_ref()?).filter(|e| e.mappable)?;
            let annotated = fd.options.as_ref().and_then(|o| o.association.clone());
            let annotated_kind = annotated.as_ref().map(|a| a.kind);

            let kind = match (fd.is_repeated(), annotated_kind) {
                (true, Some(AssociationKind::ManyToMany)) => AssociationKind::ManyToMany,
                (true, _) => AssociationKind::HasMany,
                (false, Some(AssociationKind::BelongsTo)) => AssociationKind::BelongsTo,
                (false, _) => AssociationKind::HasOne,
            };

            let mut options = annotated.unwrap_or_else(|| AssociationOptions::new(kind));
            options.kind = kind;

            Some(Edge {
                fd,
                peer: entry.full_name.clone(),
                kind,
                options,
            })
        })
        .collect()
}

// same_family
// has-one and has-many share foreign-key naming
const fn same_family(a: AssociationKind, b: AssociationKind) -> bool {
    matches!(
        (a, b),
        (
            AssociationKind::HasOne | AssociationKind::HasMany,
            AssociationKind::HasOne | AssociationKind::HasMany
        ) | (AssociationKind::BelongsTo, AssociationKind::BelongsTo)
            | (AssociationKind::ManyToMany, AssociationKind::ManyToMany)
    )
}

// resolve_has
// the foreign key lives on the peer and points at the owner
fn resolve_has(
    schema: &mut Schema,
    owner_name: &str,
    edge: &Edge<'_>,
    count: usize,
    site: &Site<'_>,
) -> Result<Association, ResolveError> {
    let owner = entity(schema, owner_name, site)?;
    let owner_origin = owner.origin_name.clone();
    let key = association_key(owner, edge.options.association_foreignkey.as_deref(), site)?;
    let key_camel = camel_case(&key.name);

    let foreign_key = match explicit(edge.options.foreignkey.as_deref()) {
        Some(fk) => field_key(fk),
        None if count > 1 => to_db_name(&format!("{}{owner_origin}{key_camel}", edge.field_camel())),
        None => to_db_name(&format!("{owner_origin}{key_camel}")),
    };

    inject_foreign_key(
        schema,
        &edge.peer,
        &foreign_key,
        &key,
        edge.options.foreignkey_tag.clone(),
        owner_name,
        site,
    )?;

    let position_field = match explicit(edge.options.position_field.as_deref()) {
        Some(position) if edge.kind == AssociationKind::HasMany => {
            let position = field_key(position);
            inject_position(
                schema,
                &edge.peer,
                &position,
                edge.options.position_field_tag.clone(),
                site,
            )?;
            Some(position)
        }
        _ => None,
    };

    Ok(association(edge, foreign_key, key.name, None, position_field))
}

// resolve_belongs_to
// the foreign key lives on the owner and points at the peer
fn resolve_belongs_to(
    schema: &mut Schema,
    owner_name: &str,
    edge: &Edge<'_>,
    count: usize,
    site: &Site<'_>,
) -> Result<Association, ResolveError> {
    let peer = entity(schema, &edge.peer, site)?;
    let peer_origin = peer.origin_name.clone();
    let key = association_key(peer, edge.options.association_foreignkey.as_deref(), site)?;
    let key_camel = camel_case(&key.name);

    let foreign_key = match explicit(edge.options.foreignkey.as_deref()) {
        Some(fk) => field_key(fk),
        None if count == 1 => to_db_name(&format!("{peer_origin}{key_camel}")),
        None => to_db_name(&format!("{}{key_camel}", edge.field_camel())),
    };

    inject_foreign_key(
        schema,
        owner_name,
        &foreign_key,
        &key,
        edge.options.foreignkey_tag.clone(),
        owner_name,
        site,
    )?;

    Ok(association(edge, foreign_key, key.name, None, None))
}

// resolve_many_to_many
// keys stay on both entities; the join table carries the references
fn resolve_many_to_many(
    schema: &Schema,
    owner_name: &str,
    edge: &Edge<'_>,
    count: usize,
    site: &Site<'_>,
) -> Result<Association, ResolveError> {
    let owner = entity(schema, owner_name, site)?;
    let peer = entity(schema, &edge.peer, site)?;
    let foreign_key = association_key(owner, edge.options.foreignkey.as_deref(), site)?.name;
    let key = association_key(peer, edge.options.association_foreignkey.as_deref(), site)?.name;

    let field_camel = edge.field_camel();
    let self_reference = owner.full_name == peer.full_name;

    let name = match explicit(edge.options.jointable.as_deref()) {
        Some(table) => to_db_name(table),
        None if count > 1 || self_reference => {
            to_db_name(&format!("{}{}", owner.origin_name, plural(&field_camel)))
        }
        None => to_db_name(&format!("{}{}", owner.origin_name, plural(&peer.origin_name))),
    };

    let join_foreign_key = match explicit(edge.options.jointable_foreignkey.as_deref()) {
        Some(fk) => to_db_name(fk),
        None => to_db_name(&format!("{}{}", owner.origin_name, camel_case(&foreign_key))),
    };

    let join_association_key = match explicit(edge.options.association_jointable_foreignkey.as_deref())
    {
        Some(fk) => to_db_name(fk),
        None if self_reference => {
            to_db_name(&format!("{}{}", singular(&field_camel), camel_case(&key)))
        }
        None => to_db_name(&format!("{}{}", peer.origin_name, camel_case(&key))),
    };

    let join_table = JoinTable {
        name,
        foreign_key: join_foreign_key,
        association_foreign_key: join_association_key,
    };

    Ok(association(edge, foreign_key, key, Some(join_table), None))
}

// association
fn association(
    edge: &Edge<'_>,
    foreign_key: String,
    association_foreign_key: String,
    join_table: Option<JoinTable>,
    position_field: Option<String>,
) -> Association {
    let o = &edge.options;
    let flags = AssociationFlags {
        autoupdate: o.association_autoupdate,
        autocreate: o.association_autocreate,
        save_reference: o.association_save_reference,
        preload: o.preload,
        clear: o.clear,
        append: o.append,
        replace: o.replace,
    };

    Association {
        kind: edge.kind,
        peer: edge.peer.clone(),
        foreign_key,
        association_foreign_key,
        cascade: flags.cascade(edge.kind),
        join_table,
        position_field,
        flags,
    }
}

// association_key
// an explicit key must exist on the entity, otherwise its primary key
fn association_key(entity: &Entity, explicit_key: Option<&str>, site: &Site<'_>) -> Result<Field, ResolveError> {
    match explicit(explicit_key) {
        Some(name) => {
            let key = field_key(name);
            entity
                .field(&key)
                .cloned()
                .ok_or_else(|| ResolveError::MissingAssociationKey {
                    entity: site.entity.to_string(),
                    field: site.field.to_string(),
                    key,
                    target: entity.full_name.clone(),
                })
        }
        None => find_primary_key(entity)
            .map(|(_, field)| field.clone())
            .map_err(|_| ResolveError::MissingPrimaryKey {
                entity: site.entity.to_string(),
                field: site.field.to_string(),
                target: entity.full_name.clone(),
            }),
    }
}

// inject_foreign_key
// add the key column to `target`, or check the one already there
fn inject_foreign_key(
    schema: &mut Schema,
    target_name: &str,
    foreign_key: &str,
    key: &Field,
    tag: Option<GormTag>,
    owner_name: &str,
    site: &Site<'_>,
) -> Result<(), ResolveError> {
    let owner_origin = entity(schema, owner_name, site)?.origin_name.clone();
    let storage = key.storage.normalized();
    let not_null = tag.as_ref().is_some_and(|t| t.not_null);
    let nullable = !storage.is_never_nullable() && (key.nullable || !not_null);

    let target = entity_mut(schema, target_name, site)?;
    let target_full = target.full_name.clone();

    if let Some(existing) = target.field_mut(foreign_key) {
        if existing.storage.normalized() == storage {
            return Ok(());
        }

        let upgrade = storage.as_scalar().and_then(ResourceStorage::for_scalar);
        if let (StorageType::Special(Special::Identifier(ResourceStorage::Opaque)), Some(rs)) =
            (&existing.storage, upgrade)
        {
            existing.storage = StorageType::Special(Special::Identifier(rs));
            existing.nullable = nullable;
            existing.origin_message = owner_origin;

            return Ok(());
        }

        return Err(ResolveError::ForeignKeyConflict {
            entity: site.entity.to_string(),
            field: site.field.to_string(),
            target: target_full,
            foreign_key: foreign_key.to_string(),
        });
    }

    let field = Field::new(
        foreign_key,
        storage,
        FieldSource::ForeignKey {
            owner: owner_name.to_string(),
        },
    )
    .with_nullable(nullable)
    .with_tag(tag)
    .with_origin(owner_origin);
    target.fields.push(field);

    Ok(())
}

// inject_position
fn inject_position(
    schema: &mut Schema,
    target_name: &str,
    position: &str,
    tag: Option<GormTag>,
    site: &Site<'_>,
) -> Result<(), ResolveError> {
    let target = entity_mut(schema, target_name, site)?;

    match target.field(position) {
        Some(existing) if existing.storage.is_integer() => Ok(()),
        Some(_) => Err(ResolveError::PositionFieldConflict {
            entity: site.entity.to_string(),
            field: site.field.to_string(),
            target: target.full_name.clone(),
            position: position.to_string(),
        }),
        None => {
            let field = Field::new(position, StorageType::Scalar(Scalar::I32), FieldSource::Position)
                .with_tag(tag)
                .with_origin(&target.origin_name);
            target.fields.push(field);

            Ok(())
        }
    }
}

// explicit
fn explicit(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn entity<'s>(schema: &'s Schema, name: &str, site: &Site<'_>) -> Result<&'s Entity, ResolveError> {
    schema.entities.get(name).ok_or_else(|| unknown(site, name))
}

fn entity_mut<'s>(
    schema: &'s mut Schema,
    name: &str,
    site: &Site<'_>,
) -> Result<&'s mut Entity, ResolveError> {
    schema.entities.get_mut(name).ok_or_else(|| unknown(site, name))
}

fn unknown(site: &Site<'_>, name: &str) -> ResolveError {
    ResolveError::UnknownMessage {
        entity: site.entity.to_string(),
        field: site.field.to_string(),
        name: name.to_string(),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, build::build_schema, fixtures::*};

    fn schema(files: Vec<crate::descriptor::FileDescriptor>) -> Result<Schema, Error> {
        build_schema(&unit(files), &Config::default().with_quiet(true))
    }

    fn shop(messages: Vec<MessageDescriptor>) -> Result<Schema, Error> {
        schema(vec![file("shop.proto", "shop", messages)])
    }

    fn widget() -> MessageBuilder {
        msg("Widget").ormable().field(scalar("id", Kind::String))
    }

    fn part() -> MessageBuilder {
        msg("Part").ormable().field(scalar("id", Kind::Int64))
    }

    fn field<'a>(schema: &'a Schema, entity: &str, name: &str) -> &'a Field {
        schema
            .entity(entity)
            .and_then(|e| e.field(name))
            .unwrap_or_else(|| panic!("{entity}.{name} should exist"))
    }

    fn edge<'a>(schema: &'a Schema, entity: &str, name: &str) -> &'a Association {
        field(schema, entity, name)
            .association
            .as_ref()
            .unwrap_or_else(|| panic!("{entity}.{name} should be an association"))
    }

    #[test]
    fn has_many_injects_foreign_key_and_position() {
        let mut options = assoc(AssociationKind::HasMany);
        options.position_field = Some("position".to_string());

        let schema = shop(vec![
            widget()
                .field(message_field("parts", "shop.Part").repeated().association(options))
                .build(),
            part().build(),
        ])
        .expect("schema");

        let parts = edge(&schema, "Widget", "parts");
        assert_eq!(parts.kind, AssociationKind::HasMany);
        assert_eq!(parts.foreign_key, "widget_id");
        assert_eq!(parts.association_foreign_key, "id");
        assert_eq!(parts.cascade, Some(Cascade::Remove));
        assert_eq!(parts.position_field.as_deref(), Some("position"));

        let fk = field(&schema, "Part", "widget_id");
        assert_eq!(fk.storage, StorageType::Scalar(Scalar::String));
        assert!(fk.nullable, "foreign keys are nullable unless tagged not_null");
        assert_eq!(fk.origin_message, "Widget");
        assert_eq!(
            fk.source,
            FieldSource::ForeignKey {
                owner: "shop.Widget".to_string()
            }
        );

        let position = field(&schema, "Part", "position");
        assert_eq!(position.storage, StorageType::Scalar(Scalar::I32));
        assert_eq!(position.source, FieldSource::Position);

        let names: Vec<&str> = schema
            .entity("Widget")
            .map(|e| e.fields.iter().map(|f| f.name.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(names, vec!["id", "parts"], "association fields come last");
    }

    #[test]
    fn has_one_not_null_key_and_repeated_peer_prefix() {
        let mut options = assoc(AssociationKind::HasOne);
        options.foreignkey_tag = Some(GormTag {
            not_null: true,
            ..Default::default()
        });

        let schema = shop(vec![
            widget()
                .field(message_field("main_part", "shop.Part").association(options))
                .field(message_field("spare_part", "shop.Part"))
                .build(),
            part().build(),
        ])
        .expect("schema");

        let main = edge(&schema, "Widget", "main_part");
        assert_eq!(main.kind, AssociationKind::HasOne);
        assert_eq!(main.foreign_key, "main_part_widget_id");
        assert_eq!(edge(&schema, "Widget", "spare_part").foreign_key, "spare_part_widget_id");

        assert!(!field(&schema, "Part", "main_part_widget_id").nullable);
        assert!(field(&schema, "Part", "spare_part_widget_id").nullable);
        assert!(field(&schema, "Widget", "main_part").nullable);
    }

    #[test]
    fn belongs_to_injects_into_owner() {
        let schema = shop(vec![
            widget()
                .field(
                    message_field("maker", "shop.Part").association(assoc(AssociationKind::BelongsTo)),
                )
                .build(),
            part().build(),
        ])
        .expect("schema");

        let maker = edge(&schema, "Widget", "maker");
        assert_eq!(maker.kind, AssociationKind::BelongsTo);
        assert_eq!(maker.foreign_key, "part_id");
        assert_eq!(maker.cascade, None);

        let fk = field(&schema, "Widget", "part_id");
        assert_eq!(fk.storage, StorageType::Scalar(Scalar::I64));
        assert!(schema.entity("Part").is_some_and(|p| p.field("widget_id").is_none()));
    }

    #[test]
    fn many_to_many_join_tables() {
        let m2m = || assoc(AssociationKind::ManyToMany);
        let schema = shop(vec![
            widget()
                .field(message_field("parts", "shop.Part").repeated().association(m2m()))
                .field(message_field("friends", "shop.Widget").repeated().association(m2m()))
                .build(),
            part().build(),
        ])
        .expect("schema");

        let parts = edge(&schema, "Widget", "parts");
        let join = parts.join_table.as_ref().expect("join table");
        assert_eq!(join.name, "widget_parts");
        assert_eq!(join.foreign_key, "widget_id");
        assert_eq!(join.association_foreign_key, "part_id");
        assert_eq!(parts.cascade, Some(Cascade::Replace));

        let friends = edge(&schema, "Widget", "friends");
        let join = friends.join_table.as_ref().expect("join table");
        assert_eq!(join.name, "widget_friends");
        assert_eq!(join.association_foreign_key, "friend_id");

        assert!(
            schema.entity("Part").is_some_and(|p| p.field("widget_id").is_none()),
            "many-to-many injects nothing"
        );
    }

    #[test]
    fn existing_foreign_keys_must_agree() {
        let conflicting = shop(vec![
            widget()
                .field(message_field("parts", "shop.Part").repeated())
                .build(),
            part().field(scalar("widget_id", Kind::Int64)).build(),
        ]);
        assert!(matches!(
            conflicting,
            Err(Error::ResolveError(ResolveError::ForeignKeyConflict { .. }))
        ));

        let agreeing = shop(vec![
            widget()
                .field(message_field("parts", "shop.Part").repeated())
                .build(),
            part().field(scalar("widget_id", Kind::String)).build(),
        ])
        .expect("matching key type");
        assert!(
            !field(&agreeing, "Part", "widget_id").nullable,
            "an existing field keeps its own shape"
        );
    }

    #[test]
    fn opaque_identifier_is_upgraded() {
        let schema = shop(vec![
            widget()
                .field(message_field("parts", "shop.Part").repeated())
                .build(),
            part()
                .field(message_field("widget_id", "atlas.rpc.Identifier"))
                .build(),
        ])
        .expect("schema");

        let fk = field(&schema, "Part", "widget_id");
        assert_eq!(
            fk.storage,
            StorageType::Special(Special::Identifier(ResourceStorage::Text))
        );
        assert_eq!(fk.origin_message, "Widget");
    }

    #[test]
    fn missing_keys_are_reported() {
        let keyless = shop(vec![
            msg("Widget")
                .ormable()
                .field(scalar("name", Kind::String))
                .field(message_field("parts", "shop.Part").repeated())
                .build(),
            part().build(),
        ]);
        assert!(matches!(
            keyless,
            Err(Error::ResolveError(ResolveError::MissingPrimaryKey { ref target, .. })) if target == "shop.Widget"
        ));

        let mut options = assoc(AssociationKind::HasMany);
        options.association_foreignkey = Some("code".to_string());
        let missing = shop(vec![
            widget()
                .field(message_field("parts", "shop.Part").repeated().association(options))
                .build(),
            part().build(),
        ]);
        assert!(matches!(
            missing,
            Err(Error::ResolveError(ResolveError::MissingAssociationKey { ref key, .. })) if key == "code"
        ));
    }

    #[test]
    fn position_field_must_be_an_integer() {
        let mut options = assoc(AssociationKind::HasMany);
        options.position_field = Some("position".to_string());

        let result = shop(vec![
            widget()
                .field(message_field("parts", "shop.Part").repeated().association(options))
                .build(),
            part().field(scalar("position", Kind::String)).build(),
        ]);

        assert!(matches!(
            result,
            Err(Error::ResolveError(ResolveError::PositionFieldConflict { .. }))
        ));
    }

    #[test]
    fn cross_package_peers_are_registered() {
        let schema = schema(vec![
            file(
                "shop.proto",
                "shop",
                vec![
                    widget()
                        .field(message_field("parts", "factory.Part").repeated())
                        .build(),
                ],
            ),
            file("factory.proto", "factory", vec![part().build()]),
        ])
        .expect("schema");

        assert_eq!(schema.files[0].types_to_register, vec!["factory.Part"]);
        assert!(schema.files[1].types_to_register.is_empty());
        assert!(schema.entity("factory.Part").is_some_and(|p| p.has_field("widget_id")));
    }
}
