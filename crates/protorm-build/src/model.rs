use crate::{
    Error,
    file::{FileContext, ident},
    tag::render_tag,
};
use proc_macro2::TokenStream;
use protorm_schema::prelude::*;
use quote::quote;

// generate
/// Storage struct, its `Model` impl and the table-name accessor.
pub fn generate(cx: &mut FileContext<'_>, entity: &Entity) -> Result<TokenStream, Error> {
    let core = cx.core().clone();
    let name = ident(&entity.generated_name);
    let table = &entity.table_name;
    let doc = format!("Storage model of `{}`, table `{table}`.", entity.full_name);

    let mut fields = quote!();
    for field in &entity.fields {
        let field_ident = ident(&field.name);
        let ty = field_type(cx, field)?;
        let tag = render_tag(field);
        let tag_attr = (!tag.is_empty()).then(|| quote!(#[doc = #tag]));

        fields.extend(quote! {
            #tag_attr
            pub #field_ident: #ty,
        });
    }

    let columns = entity
        .fields
        .iter()
        .filter_map(|field| column_arm(field, &core));

    let (primary_key, primary_key_fn) = match entity.primary_key() {
        Some(pk) => {
            let column = pk.column_name();
            (
                quote!(Some(#column)),
                quote! {
                    Self::PRIMARY_KEY.and_then(|column| self.column(column))
                },
            )
        }
        None => (quote!(None), quote!(None)),
    };

    Ok(quote! {
        #[doc = #doc]
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct #name {
            #fields
        }

        impl #name {
            #[must_use]
            pub const fn table_name() -> &'static str {
                <Self as #core::db::Model>::TABLE_NAME
            }
        }

        impl #core::db::Model for #name {
            const TABLE_NAME: &'static str = #table;
            const PRIMARY_KEY: Option<&'static str> = #primary_key;

            fn primary_key(&self) -> Option<#core::value::Value> {
                #primary_key_fn
            }

            fn column(&self, column: &str) -> Option<#core::value::Value> {
                match column {
                    #(#columns)*
                    _ => None,
                }
            }
        }
    })
}

// field_type
/// Rust type of a storage field.
pub fn field_type(cx: &mut FileContext<'_>, field: &Field) -> Result<TokenStream, Error> {
    let core = cx.core().clone();

    let inner = match &field.storage {
        StorageType::Association { peer, kind } => {
            let peer = cx.orm_type(peer)?;

            return Ok(if kind.is_many() {
                quote!(::std::vec::Vec<#peer>)
            } else {
                quote!(::std::option::Option<::std::boxed::Box<#peer>>)
            });
        }
        StorageType::Array(scalar) => array_type(*scalar, &core),
        StorageType::List(scalar) => quote!(::std::vec::Vec<#scalar>),
        StorageType::Scalar(scalar) => quote!(#scalar),
        StorageType::Enum { mode, repeated, .. } => {
            let elem = match mode {
                EnumMode::Ordinal => quote!(i32),
                EnumMode::Name => quote!(::std::string::String),
            };
            if *repeated {
                quote!(::std::vec::Vec<#elem>)
            } else {
                elem
            }
        }
        StorageType::External { path, name } => {
            let name = ident(name);
            match path {
                Some(path) => {
                    let alias = cx.import(path)?;
                    quote!(#alias::#name)
                }
                None => quote!(#name),
            }
        }
        StorageType::Special(special) => special_type(*special, &core),
    };

    Ok(if is_optional(field) {
        quote!(::std::option::Option<#inner>)
    } else {
        inner
    })
}

/// Field stored as `Option<T>`.
#[must_use]
pub fn is_optional(field: &Field) -> bool {
    field.nullable && !field.storage.is_never_nullable() && !field.storage.is_association()
}

fn array_type(scalar: Scalar, core: &TokenStream) -> TokenStream {
    match scalar {
        Scalar::Bool => quote!(#core::types::BoolArray),
        Scalar::F64 | Scalar::F32 => quote!(#core::types::Float64Array),
        Scalar::String => quote!(#core::types::StringArray),
        _ => quote!(#core::types::Int64Array),
    }
}

fn special_type(special: Special, core: &TokenStream) -> TokenStream {
    match special {
        Special::Identifier(storage) => match storage {
            ResourceStorage::Bytes => quote!(::std::vec::Vec<u8>),
            ResourceStorage::Int64 => quote!(i64),
            ResourceStorage::Opaque => quote!(#core::resource::ResourceValue),
            ResourceStorage::Text => quote!(::std::string::String),
        },
        Special::Inet => quote!(#core::types::Inet),
        Special::Json => quote!(#core::types::Jsonb),
        Special::TimeOnly => quote!(::std::string::String),
        Special::Timestamp => quote!(#core::types::DateTime<#core::types::Utc>),
        Special::Uuid | Special::UuidValue => quote!(#core::types::Uuid),
        Special::Wrapper(scalar) => quote!(#scalar),
    }
}

// is_copy
/// Storage value that is `Copy`, read without a clone.
#[must_use]
pub fn is_copy(field: &Field) -> bool {
    match &field.storage {
        StorageType::Scalar(scalar) | StorageType::Special(Special::Wrapper(scalar)) => {
            !matches!(scalar, Scalar::String | Scalar::Bytes)
        }
        StorageType::Enum {
            mode: EnumMode::Ordinal,
            repeated: false,
            ..
        }
        | StorageType::Special(
            Special::Timestamp
            | Special::Uuid
            | Special::UuidValue
            | Special::Identifier(ResourceStorage::Int64),
        ) => true,
        _ => false,
    }
}

// column_arm
// predicate-readable columns: scalars, keys, uuids, timestamps, enums
fn column_arm(field: &Field, core: &TokenStream) -> Option<TokenStream> {
    let readable = match &field.storage {
        StorageType::Scalar(_) => true,
        StorageType::Enum { repeated, .. } => !repeated,
        StorageType::Special(special) => !matches!(special, Special::Inet | Special::Json),
        _ => false,
    };
    if !readable {
        return None;
    }

    let column = field.column_name();
    let field_ident = ident(&field.name);
    let value = if is_copy(field) {
        quote!(self.#field_ident)
    } else {
        quote!(self.#field_ident.clone())
    };

    Some(quote! {
        #column => Some(#core::value::Value::from(#value)),
    })
}

///
/// TESTS
///
