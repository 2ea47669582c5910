use crate::{
    Error,
    file::{FileContext, crud_fn, ident},
};
use proc_macro2::TokenStream;
use protorm_schema::prelude::*;
use quote::{format_ident, quote};

// generate
/// `default_apply_field_mask_*`: copy the masked fields of `patcher` into
/// `patchee`, recursing into singular peers that have their own key.
pub fn generate(cx: &mut FileContext<'_>, entity: &Entity) -> Result<TokenStream, Error> {
    let core = cx.core().clone();
    let wire = cx.wire_type(&entity.full_name)?;
    let name = crud_fn(entity, "apply_field_mask");

    let mut flags = quote!();
    let mut arms = quote!();
    let mut nested = false;
    let schema = cx.schema;

    for field in &entity.wire {
        let path = field.proto_name.as_str();
        let member = ident(&field.rust_name);
        let singular_message = field.kind == Kind::Message && field.label != Label::Repeated;

        let peer = singular_message
            .then_some(field.type_name.as_deref())
            .flatten()
            .and_then(|t| schema.entity(t))
            .filter(|peer| peer.has_primary_key());

        match peer {
            Some(peer) => {
                nested = true;
                let updated = format_ident!("updated_{}", field.rust_name);
                let apply = cx.entity_fn(&peer.full_name, "apply_field_mask")?;
                let sub = format!("{path}.");
                let sub_prefix = format!("{{prefix}}{path}.");

                flags.extend(quote!(let mut #updated = false;));
                arms.extend(quote! {
                    #path => {
                        #updated = true;
                        patchee.#member.clone_from(&patcher.#member);
                    }
                    f if f.starts_with(#sub) => {
                        if #updated {
                            continue;
                        }
                        #updated = true;

                        match &patcher.#member {
                            Some(child) => #apply(
                                patchee.#member.get_or_insert_with(Default::default),
                                child,
                                &#core::FieldMask {
                                    paths: mask.paths[i..].to_vec(),
                                },
                                &format!(#sub_prefix),
                            )?,
                            None => patchee.#member = None,
                        }
                    }
                });
            }
            None if singular_message => {
                let sub = format!("{path}.");
                arms.extend(quote! {
                    f if f == #path || f.starts_with(#sub) => {
                        patchee.#member.clone_from(&patcher.#member);
                    }
                });
            }
            None => arms.extend(quote! {
                #path => patchee.#member.clone_from(&patcher.#member),
            }),
        }
    }

    let each = if nested {
        quote!((i, path) in mask.paths.iter().enumerate())
    } else {
        quote!(path in &mask.paths)
    };

    Ok(quote! {
        /// Copy the fields named by `mask`, relative to `prefix`, from
        /// `patcher` into `patchee`.
        pub fn #name(
            patchee: &mut #wire,
            patcher: &#wire,
            mask: &#core::FieldMask,
            prefix: &str,
        ) -> Result<(), #core::error::OrmError> {
            #flags

            for #each {
                let Some(field) = path.strip_prefix(prefix) else {
                    continue;
                };

                match field {
                    #arms
                    _ => return Err(#core::error::OrmError::UnknownFieldPath(path.clone())),
                }
            }

            Ok(())
        }
    })
}

///
/// TESTS
///
