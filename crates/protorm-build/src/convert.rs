//! Wire ⇄ storage conversions.
//!
//! Both directions run the same four stages: the before hook, the per-field
//! copy, the stamping of injected columns, and the after hook. Any failure
//! aborts the conversion.

use crate::{
    Error,
    file::{FileContext, ident},
    hooks::Hook,
    model::is_optional,
};
use proc_macro2::TokenStream;
use protorm_schema::prelude::*;
use quote::quote;

///
/// Direction
///

#[derive(Clone, Copy, Eq, PartialEq)]
enum Direction {
    ToOrm,
    ToPb,
}

// generate
pub fn generate(cx: &mut FileContext<'_>, entity: &Entity) -> Result<TokenStream, Error> {
    let core = cx.core().clone();
    let wire = cx.wire_type(&entity.full_name)?;
    let orm = ident(&entity.generated_name);
    let origin = &entity.origin_name;

    let hooks = [
        Hook::before(origin, "ToORM"),
        Hook::after(origin, "ToORM"),
        Hook::before(origin, "ToPB"),
        Hook::after(origin, "ToPB"),
    ];
    let [before_orm, after_orm, before_pb, after_pb] = &hooks;

    let mut to_orm_fields = quote!();
    let mut to_pb_fields = quote!();
    for field in &entity.fields {
        let Some(wire_field) = field.wire().filter(|w| !w.dropped) else {
            continue;
        };

        to_orm_fields.extend(convert_field(cx, field, wire_field, Direction::ToOrm)?);
        to_pb_fields.extend(convert_field(cx, field, wire_field, Direction::ToPb)?);
    }

    let tenant = entity.multi_account.then(|| {
        let account = ident(Entity::ACCOUNT_ID);
        quote!(to.#account = ctx.account_id()?;)
    });
    let positions = stamp_positions(cx, entity)?;

    let before_orm_call = before_orm.call_conversion();
    let after_orm_call = after_orm.call_conversion();
    let before_pb_call = before_pb.call_conversion();
    let after_pb_call = after_pb.call_conversion();

    let declarations = [
        before_orm.declare_conversion(&core, &wire, &quote!(#orm)),
        after_orm.declare_conversion(&core, &wire, &quote!(#orm)),
        before_pb.declare_conversion(&core, &quote!(#orm), &wire),
        after_pb.declare_conversion(&core, &quote!(#orm), &wire),
    ];

    Ok(quote! {
        impl #wire {
            /// Storage form of this message.
            pub fn to_orm(
                &self,
                ctx: &#core::context::Context,
            ) -> Result<#orm, #core::error::OrmError> {
                let mut to = #orm::default();
                #before_orm_call
                #to_orm_fields
                #tenant
                #positions
                #after_orm_call

                Ok(to)
            }
        }

        impl #orm {
            /// Wire form of this row.
            pub fn to_pb(
                &self,
                ctx: &#core::context::Context,
            ) -> Result<#wire, #core::error::OrmError> {
                let mut to = #wire::default();
                #before_pb_call
                #to_pb_fields
                #after_pb_call

                Ok(to)
            }
        }

        #(#declarations)*
    })
}

// convert_field
fn convert_field(
    cx: &mut FileContext<'_>,
    field: &Field,
    wire: &WireField,
    direction: Direction,
) -> Result<TokenStream, Error> {
    let core = cx.core().clone();
    let to_field = ident(if direction == Direction::ToOrm {
        &field.name
    } else {
        &wire.rust_name
    });
    let from_field = ident(if direction == Direction::ToOrm {
        &wire.rust_name
    } else {
        &field.name
    });
    let src = quote!(self.#from_field);

    let tokens = match &field.storage {
        StorageType::Scalar(_) | StorageType::List(_) | StorageType::External { .. } => {
            copy(&to_field, &src, field)
        }
        StorageType::Array(_) => quote!(to.#to_field = #src.clone().into();),
        StorageType::Enum {
            type_name,
            mode,
            repeated,
        } => convert_enum(cx, &to_field, &src, type_name, *mode, *repeated, direction)?,
        StorageType::Association { kind, .. } => {
            convert_association(&to_field, &src, *kind, direction)
        }
        StorageType::Special(special) => match direction {
            Direction::ToOrm => decode_special(*special, field, &to_field, &src, &core),
            Direction::ToPb => encode_special(*special, field, &to_field, &src, &core),
        },
    };

    Ok(tokens)
}

// copy
fn copy(to_field: &proc_macro2::Ident, src: &TokenStream, field: &Field) -> TokenStream {
    if crate::model::is_copy(field) {
        quote!(to.#to_field = #src;)
    } else {
        quote!(to.#to_field.clone_from(&#src);)
    }
}

// convert_enum
// ordinal columns copy the number; name columns go through the enum's
// string names, with unknown values mapping to the empty string and back to 0
fn convert_enum(
    cx: &mut FileContext<'_>,
    to_field: &proc_macro2::Ident,
    src: &TokenStream,
    type_name: &str,
    mode: EnumMode,
    repeated: bool,
    direction: Direction,
) -> Result<TokenStream, Error> {
    if mode == EnumMode::Ordinal {
        return Ok(if repeated {
            quote!(to.#to_field.clone_from(&#src);)
        } else {
            quote!(to.#to_field = #src;)
        });
    }

    let ty = cx.enum_type(type_name)?;
    let one = |v: TokenStream| match direction {
        Direction::ToOrm => quote! {
            #ty::try_from(#v).map_or_else(|_| ::std::string::String::new(), |e| e.as_str_name().to_string())
        },
        Direction::ToPb => quote!(#ty::from_str_name(#v).map_or(0, |e| e as i32)),
    };

    Ok(match (repeated, direction) {
        (false, Direction::ToOrm) => {
            let value = one(src.clone());
            quote!(to.#to_field = #value;)
        }
        (false, Direction::ToPb) => {
            let value = one(quote!(&#src));
            quote!(to.#to_field = #value;)
        }
        (true, Direction::ToOrm) => {
            let value = one(quote!(*v));
            quote!(to.#to_field = #src.iter().map(|v| #value).collect();)
        }
        (true, Direction::ToPb) => {
            let value = one(quote!(v));
            quote!(to.#to_field = #src.iter().map(|v| #value).collect();)
        }
    })
}

// convert_association
fn convert_association(
    to_field: &proc_macro2::Ident,
    src: &TokenStream,
    kind: AssociationKind,
    direction: Direction,
) -> TokenStream {
    let method = match direction {
        Direction::ToOrm => quote!(to_orm),
        Direction::ToPb => quote!(to_pb),
    };

    match (kind.is_many(), direction) {
        (true, _) => quote! {
            to.#to_field = #src
                .iter()
                .map(|v| v.#method(ctx))
                .collect::<Result<::std::vec::Vec<_>, _>>()?;
        },
        (false, Direction::ToOrm) => quote! {
            to.#to_field = #src
                .as_ref()
                .map(|v| v.to_orm(ctx).map(::std::boxed::Box::new))
                .transpose()?;
        },
        (false, Direction::ToPb) => quote! {
            to.#to_field = #src
                .as_ref()
                .map(|v| v.to_pb(ctx))
                .transpose()?
                .map(Into::into);
        },
    }
}

// decode_special
// absent wire values store as None, or as the column's default when the
// column is not nullable
fn decode_special(
    special: Special,
    field: &Field,
    to_field: &proc_macro2::Ident,
    src: &TokenStream,
    core: &TokenStream,
) -> TokenStream {
    let types = quote!(#core::types);
    let origin = &field.origin_message;

    let decode = match special {
        Special::Wrapper(_) => return quote!(to.#to_field.clone_from(&#src);),
        Special::Timestamp => quote!(#types::datetime_from_timestamp(v)),
        Special::Uuid | Special::UuidValue => quote!(#types::parse_uuid(&v.value)),
        Special::Json => quote!(#types::Jsonb::parse(&v.value)),
        Special::Inet => quote!(v.value.parse::<#types::Inet>()),
        Special::TimeOnly => quote!(#types::time_only_from_secs(v.value)),
        Special::Identifier(storage) => {
            let method = match storage {
                ResourceStorage::Bytes => quote!(decode_bytes),
                ResourceStorage::Int64 => quote!(decode_i64),
                ResourceStorage::Opaque => quote!(decode),
                ResourceStorage::Text => quote!(decode_text),
            };
            quote!(ctx.resources().#method(#origin, v))
        }
    };

    let value = quote!(#src.as_ref().map(|v| #decode).transpose()?);
    if is_optional(field) {
        quote!(to.#to_field = #value;)
    } else {
        quote!(to.#to_field = #value.unwrap_or_default();)
    }
}

// encode_special
fn encode_special(
    special: Special,
    field: &Field,
    to_field: &proc_macro2::Ident,
    src: &TokenStream,
    core: &TokenStream,
) -> TokenStream {
    let types = quote!(#core::types);
    let pb = quote!(#core::types::pb);
    let optional = is_optional(field);

    // (expression over `v`, whether it returns a Result)
    let (encode, fallible) = match special {
        Special::Wrapper(_) => return quote!(to.#to_field.clone_from(&#src);),
        Special::Timestamp => (quote!(#types::datetime_to_timestamp(v)), false),
        Special::Uuid => (quote!(#pb::Uuid { value: v.to_string() }), false),
        Special::UuidValue => (quote!(#pb::UuidValue { value: v.to_string() }), false),
        Special::Json => (quote!(v.to_raw().map(|value| #pb::JsonValue { value })), true),
        Special::Inet => (quote!(#pb::InetValue { value: v.to_string() }), false),
        Special::TimeOnly => (
            quote!(#types::time_only_to_secs(v).map(|value| #pb::TimeOnly { value })),
            true,
        ),
        Special::Identifier(_) => {
            // identifiers encode to an optional identifier themselves
            let origin = &field.origin_message;
            let encode = quote!(ctx.resources().encode(#origin, v.clone())?);

            return if optional {
                quote! {
                    to.#to_field = match &#src {
                        Some(v) => #encode,
                        None => None,
                    };
                }
            } else {
                quote! {
                    let v = &#src;
                    to.#to_field = #encode;
                }
            };
        }
    };

    let question = fallible.then(|| quote!(?));
    match (optional, special) {
        (true, _) => {
            let transpose = fallible.then(|| quote!(.transpose()?));
            quote!(to.#to_field = #src.as_ref().map(|v| #encode)#transpose;)
        }
        // empty time of day means unset
        (false, Special::TimeOnly) => quote! {
            if !#src.is_empty() {
                let v = &#src;
                to.#to_field = Some(#encode #question);
            }
        },
        (false, _) => quote! {
            let v = &#src;
            to.#to_field = Some(#encode #question);
        },
    }
}

// stamp_positions
// has-many children record their index in the list
fn stamp_positions(cx: &FileContext<'_>, entity: &Entity) -> Result<TokenStream, Error> {
    let core = cx.core();
    let mut tokens = quote!();

    for (field, assoc) in entity.associations() {
        if assoc.kind != AssociationKind::HasMany {
            continue;
        }
        let Some(position) = &assoc.position_field else {
            continue;
        };

        let peer = cx.entity(&assoc.peer)?;
        let nullable = peer.field(position).is_some_and(is_optional);
        let list = ident(&field.name);
        let position = ident(position);

        let index = quote! {
            ::core::convert::TryFrom::try_from(i).map_err(|_| {
                #core::error::OrmError::from(#core::error::ConversionError::Position(i))
            })?
        };
        let value = if nullable { quote!(Some(#index)) } else { index };

        tokens.extend(quote! {
            for (i, child) in to.#list.iter_mut().enumerate() {
                child.#position = #value;
            }
        });
    }

    Ok(tokens)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::tests::*;
    use protorm_schema::{
        config::Config,
        descriptor::{
            AssociationOptions, CompilationUnit, EnumDescriptor, EnumValue, FileDescriptor,
            GormTag,
        },
        types::{AssociationKind, EnumMode, Kind},
    };
    use quote::ToTokens;

    fn code(unit: &CompilationUnit, config: &Config) -> String {
        render(unit, config).to_token_stream().to_string().replace(' ', "")
    }

    #[test]
    fn conversions_run_hooks_around_the_fields() {
        let code = code(&shop_unit(), &Config::default());

        let before = code.find("WidgetWithBeforeToORM>()").expect("before hook call");
        let field = code.find("to.name.clone_from(&self.name);").expect("field copy");
        let after = code.find("WidgetWithAfterToORM>()").expect("after hook call");
        assert!(before < field && field < after, "hooks wrap the field copy");

        assert!(code.contains("pubtraitWidgetWithBeforeToPB:Send+Sync"));
        assert!(code.contains("::protorm::core::types::datetime_from_timestamp(v)"));
    }

    #[test]
    fn has_many_children_are_converted_and_positioned() {
        let code = code(&shop_unit(), &Config::default());

        assert!(code.contains(".map(|v|v.to_orm(ctx)).collect::<Result<::std::vec::Vec<_>,_>>()?;"));
        assert!(code.contains("for(i,child)into.parts.iter_mut().enumerate()"), "{code}");
        assert!(code.contains("child.position=::core::convert::TryFrom::try_from(i)"));
    }

    #[test]
    fn multi_account_entities_stamp_the_tenant() {
        let mut unit = shop_unit();
        if let Some(options) = unit.files[0].messages[0].options.as_mut() {
            options.multi_account = true;
        }
        let code = code(&unit, &Config::default());

        assert!(code.contains("to.account_id=ctx.account_id()?;"));
    }

    #[test]
    fn name_enums_use_string_names() {
        let mut unit = shop_unit();
        unit.files[0].enums.push(EnumDescriptor {
            name: "Color".to_string(),
            values: vec![EnumValue {
                name: "RED".to_string(),
                number: 0,
            }],
        });
        unit.files[0].messages[0]
            .fields
            .push(typed("color", Kind::Enum, "shop.Color"));

        let ordinal = code(&unit, &Config::default());
        assert!(ordinal.contains("to.color=self.color;"));

        let named = code(&unit, &Config::default().with_enums(EnumMode::Name));
        assert!(named.contains("to.color=Color::try_from(self.color).map_or_else"), "{named}");
        assert!(named.contains("to.color=Color::from_str_name(&self.color).map_or(0,|e|easi32);"));
    }

    #[test]
    fn identifiers_go_through_the_resource_codec() {
        let unit = CompilationUnit {
            files: vec![FileDescriptor {
                name: "contact.proto".to_string(),
                package: "crm".to_string(),
                messages: vec![
                    ormable(
                        "Contact",
                        vec![with_tag(
                            typed("id", Kind::Message, "atlas.rpc.Identifier"),
                            GormTag {
                                ty: Some("integer".to_string()),
                                primary_key: true,
                                ..Default::default()
                            },
                        )],
                    ),
                ],
                enums: Vec::new(),
            }],
        };
        let code = code(&unit, &Config::default());

        assert!(code.contains("ctx.resources().decode_i64(\"Contact\",v)"), "{code}");
        assert!(code.contains(".transpose()?.unwrap_or_default();"), "primary keys are not nullable");
        assert!(code.contains("ctx.resources().encode(\"Contact\",v.clone())"));
    }

    #[test]
    fn belongs_to_peers_are_boxed() {
        let mut unit = shop_unit();
        let owner = ormable("Owner", vec![with_tag(scalar("id", Kind::String), pk())]);
        unit.files[0].messages.push(owner);
        unit.files[0].messages[0].fields.push(with_association(
            typed("owner", Kind::Message, "shop.Owner"),
            AssociationOptions::new(AssociationKind::BelongsTo),
        ));

        let code = code(&unit, &Config::default());
        assert!(code.contains(".map(|v|v.to_orm(ctx).map(::std::boxed::Box::new)).transpose()?;"));
        assert!(code.contains(".map(|v|v.to_pb(ctx)).transpose()?.map(Into::into);"));
    }
}
