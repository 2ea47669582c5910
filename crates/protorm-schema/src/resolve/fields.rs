//! First pass: scalar, array, enum and special-type columns of one entity.
//! Mappable message fields are left for the association pass.

use crate::{
    catalog::Catalog,
    descriptor::{ExtraField, FieldDescriptor, FileDescriptor, GormTag, MessageDescriptor},
    prelude::*,
    resolve::{
        ResolveError, field_key,
        special::{Marker, match_marker},
    },
};
use log::{debug, warn};
use protorm_utils::{plural, to_db_name};

/// Build the entity for one mappable message.
pub fn resolve_entity(
    config: &Config,
    catalog: &Catalog,
    file: &FileDescriptor,
    scope: &[String],
    msg: &MessageDescriptor,
) -> Result<Entity, ResolveError> {
    let full_name = super::qualified_name(file, scope, msg);
    let options = msg.options.clone().unwrap_or_default();
    let engine = options.engine.unwrap_or(config.engine);

    let mut entity = Entity {
        origin_name: msg.name.clone(),
        full_name,
        package: file.package.clone(),
        file: file.name.clone(),
        scope: scope.to_vec(),
        generated_name: format!("{}ORM", msg.name),
        table_name: options
            .table
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| plural(&to_db_name(&msg.name))),
        multi_account: options.multi_account,
        engine,
        fields: Vec::new(),
        wire: Vec::new(),
    };

    let resolver = FieldResolver {
        config,
        catalog,
        engine,
        entity: &entity.full_name,
    };

    let mut fields = Vec::new();
    for fd in &msg.fields {
        let wire = wire_field(catalog, fd);
        entity.wire.push(wire.clone());

        if fd.is_dropped() {
            debug!("{}.{}: dropped", entity.full_name, fd.name);
            continue;
        }

        if let Some(name) = fd.options.as_ref().and_then(|o| o.reference_of.as_deref())
            && !catalog.is_known(name)
        {
            return Err(ResolveError::UnknownReference {
                entity: entity.full_name.clone(),
                field: fd.name.clone(),
                name: name.to_string(),
            });
        }

        if let Some(field) = resolver.resolve(fd, wire)? {
            debug!(
                "{}.{}: {:?} (nullable: {})",
                entity.full_name, field.name, field.storage, field.nullable
            );
            fields.push(field.with_origin(&msg.name));
        }
    }
    entity.fields = fields;

    if options.multi_account {
        add_tenant_field(&mut entity)?;
    }

    for extra in &options.include {
        add_included_field(config, engine, &mut entity, extra)?;
    }

    Ok(entity)
}

// wire_field
fn wire_field(catalog: &Catalog, fd: &FieldDescriptor) -> WireField {
    let type_name = fd.type_ref().map(|name| {
        catalog
            .lookup(name)
            .or_else(|| catalog.lookup_enum(name))
            .map_or_else(|| name.to_string(), |entry| entry.full_name.clone())
    });

    WireField {
        proto_name: fd.name.clone(),
        rust_name: protorm_utils::rust_ident_case(&fd.name),
        kind: fd.kind,
        label: fd.label,
        type_name,
        dropped: fd.is_dropped(),
    }
}

///
/// FieldResolver
///

struct FieldResolver<'a> {
    config: &'a Config,
    catalog: &'a Catalog,
    engine: Engine,
    entity: &'a str,
}

impl FieldResolver<'_> {
    // resolve
    // first matching rule wins; None leaves the field out of storage
    fn resolve(&self, fd: &FieldDescriptor, wire: WireField) -> Result<Option<Field>, ResolveError> {
        let name = field_key(&fd.name);
        let tag = fd.options.as_ref().and_then(|o| o.tag.clone());
        let repeated = fd.is_repeated();

        // native arrays
        if repeated
            && self.engine.is_postgres()
            && let Some((scalar, sql)) = array_scalar(fd.kind)
        {
            let tag = tag.unwrap_or_default().with_type(sql);
            let field = Field::new(name, StorageType::Array(scalar), FieldSource::Wire(wire))
                .with_tag(Some(tag));

            return Ok(Some(field));
        }

        let storage = match fd.kind {
            Kind::Enum => StorageType::Enum {
                type_name: wire.type_name.clone().unwrap_or_default(),
                mode: self.config.enums,
                repeated,
            },
            Kind::Message => {
                let Some(type_name) = wire.type_name.clone() else {
                    return Err(ResolveError::UnknownMessage {
                        entity: self.entity.to_string(),
                        field: fd.name.clone(),
                        name: String::new(),
                    });
                };

                if self.catalog.is_mappable(&type_name) {
                    return Ok(None);
                }

                return Ok(self
                    .special(fd, &type_name, tag.as_ref())?
                    .map(|(special, nullable)| {
                        Field::new(name, StorageType::Special(special), FieldSource::Wire(wire))
                            .with_nullable(nullable)
                            .with_tag(tag)
                    }));
            }
            kind => match kind.scalar() {
                Some(scalar) if repeated => StorageType::List(scalar),
                Some(scalar) => StorageType::Scalar(scalar),
                None => return Ok(None),
            },
        };

        Ok(Some(
            Field::new(name, storage, FieldSource::Wire(wire)).with_tag(tag),
        ))
    }

    // special
    // marker storage and nullability, or None when the type is unresolved
    fn special(
        &self,
        fd: &FieldDescriptor,
        type_name: &str,
        tag: Option<&GormTag>,
    ) -> Result<Option<(Special, bool)>, ResolveError> {
        let marker = match match_marker(type_name, self.config.marker_match) {
            Some(marker) if !fd.is_repeated() => marker,
            _ => {
                self.unresolved(fd, type_name);
                return Ok(None);
            }
        };

        let resolved = match marker {
            Marker::Timestamp => (Special::Timestamp, true),
            Marker::Uuid => (Special::Uuid, false),
            Marker::UuidValue => (Special::UuidValue, true),
            Marker::Json if self.engine.is_postgres() => (Special::Json, true),
            Marker::Json => {
                self.unresolved(fd, type_name);
                return Ok(None);
            }
            Marker::Inet => (Special::Inet, true),
            Marker::TimeOnly => (Special::TimeOnly, false),
            Marker::Wrapper(scalar) => (Special::Wrapper(scalar), true),
            Marker::Identifier => {
                let hint = tag.and_then(|t| t.ty.as_deref()).unwrap_or_default();
                let storage = ResourceStorage::from_type_hint(hint).ok_or_else(|| {
                    ResolveError::UnknownIdentifierType {
                        entity: self.entity.to_string(),
                        field: fd.name.clone(),
                        hint: hint.to_string(),
                    }
                })?;
                let required = tag.is_some_and(|t| t.not_null || t.primary_key);
                let nullable = matches!(storage, ResourceStorage::Text | ResourceStorage::Int64)
                    && !required;

                (Special::Identifier(storage), nullable)
            }
        };

        Ok(Some(resolved))
    }

    fn unresolved(&self, fd: &FieldDescriptor, type_name: &str) {
        if !self.config.quiet {
            warn!(
                "{}.{}: type '{type_name}' is not mappable and has no storage representation, field skipped",
                self.entity, fd.name
            );
        }
    }
}

// array_scalar
fn array_scalar(kind: Kind) -> Option<(Scalar, &'static str)> {
    match kind.scalar()? {
        Scalar::Bool => Some((Scalar::Bool, "bool[]")),
        Scalar::F64 => Some((Scalar::F64, "float[]")),
        Scalar::I64 => Some((Scalar::I64, "integer[]")),
        Scalar::String => Some((Scalar::String, "text[]")),
        _ => None,
    }
}

// add_tenant_field
fn add_tenant_field(entity: &mut Entity) -> Result<(), ResolveError> {
    match entity.field(Entity::ACCOUNT_ID) {
        Some(field) if field.storage == StorageType::Scalar(Scalar::String) && !field.nullable => {
            Ok(())
        }
        Some(_) => Err(ResolveError::IncompatibleTenantField {
            entity: entity.full_name.clone(),
        }),
        None => {
            let field = Field::new(
                Entity::ACCOUNT_ID,
                StorageType::Scalar(Scalar::String),
                FieldSource::Tenant,
            )
            .with_origin(&entity.origin_name);
            entity.fields.push(field);

            Ok(())
        }
    }
}

// add_included_field
fn add_included_field(
    config: &Config,
    engine: Engine,
    entity: &mut Entity,
    extra: &ExtraField,
) -> Result<(), ResolveError> {
    let name = field_key(&extra.name);
    if entity.has_field(&name) {
        return Err(ResolveError::DuplicateIncludedField {
            entity: entity.full_name.clone(),
            field: extra.name.clone(),
        });
    }

    let pointer = extra.ty.starts_with('*');
    let raw = extra.ty.trim_start_matches('*');
    let short = raw.rsplit(['.', ':']).next().unwrap_or(raw).to_string();
    let package = extra.package.as_deref().filter(|p| !p.is_empty());

    let storage = if let Some(path) = package {
        StorageType::External {
            path: Some(path.to_string()),
            name: short,
        }
    } else if let Some(scalar) = Scalar::from_type_name(raw) {
        StorageType::Scalar(scalar)
    } else {
        match short.as_str() {
            "Time" => StorageType::Special(Special::Timestamp),
            "UUID" => StorageType::Special(Special::Uuid),
            "Jsonb" if extra.ty == "Jsonb" && engine.is_postgres() => {
                StorageType::Special(Special::Json)
            }
            "Inet" => StorageType::Special(Special::Inet),
            _ => {
                if !config.quiet {
                    warn!(
                        "{}.{}: included type '{}' is not a recognised special type and has no package, assuming it is in scope of the generated code",
                        entity.full_name, extra.name, extra.ty
                    );
                }
                StorageType::External {
                    path: None,
                    name: short,
                }
            }
        }
    };

    let nullable = pointer && !storage.is_never_nullable();
    let field = Field::new(name, storage, FieldSource::Included)
        .with_nullable(nullable)
        .with_tag(extra.tag.clone())
        .with_origin(&entity.origin_name);
    entity.fields.push(field);

    Ok(())
}

///
/// TESTS
///
