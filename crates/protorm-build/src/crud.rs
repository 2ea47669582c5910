//! Default data-access functions and their storage hook points.
//!
//! Every operation is generic over the caller's [`Database`] handle and
//! probes the request context for each of its hooks. Create is always
//! generated; the rest need a primary key.

use crate::{
    Error,
    file::{FileContext, crud_fn, ident},
    hooks::Hook,
    mask,
};
use log::debug;
use proc_macro2::TokenStream;
use protorm_schema::prelude::*;
use quote::quote;

///
/// Operation
/// shared naming for one entity's generated functions
///

struct Operation<'a> {
    entity: &'a Entity,
    core: TokenStream,
    wire: TokenStream,
    orm: proc_macro2::Ident,
}

impl Operation<'_> {
    // storage hook on the storage struct
    fn orm_hook(&self, before: bool, op: &str) -> Hook {
        Hook::new(&self.entity.generated_name, before, op)
    }

    // storage hook on the wire message
    fn wire_hook(&self, before: bool, op: &str) -> Hook {
        Hook::new(&self.entity.origin_name, before, op)
    }

    fn bounds(&self) -> TokenStream {
        let core = &self.core;
        quote!(<D: #core::db::Database + 'static>)
    }

    // key
    // non-zero primary key of `orm`, or EmptyId
    fn key(&self, orm: &TokenStream) -> TokenStream {
        let core = &self.core;
        quote! {
            #core::db::Model::primary_key(&#orm)
                .filter(|key| !key.is_zero())
                .ok_or(#core::error::OrmError::EmptyId)?
        }
    }

    fn pk_column(&self) -> Option<&str> {
        self.entity.primary_key().map(Field::column_name)
    }

    fn tenant_column(&self) -> &str {
        self.entity
            .field(Entity::ACCOUNT_ID)
            .map_or(Entity::ACCOUNT_ID, Field::column_name)
    }
}

// generate
pub fn generate(cx: &mut FileContext<'_>, entity: &Entity) -> Result<TokenStream, Error> {
    let op = Operation {
        entity,
        core: cx.core().clone(),
        wire: cx.wire_type(&entity.full_name)?,
        orm: ident(&entity.generated_name),
    };

    let mut tokens = create(&op);

    let Some(pk) = op.pk_column() else {
        debug!("{}: no primary key, only create is generated", entity.full_name);
        return Ok(tokens);
    };

    tokens.extend(read(&op, pk));
    tokens.extend(delete(&op, pk));
    tokens.extend(delete_set(&op, pk));
    tokens.extend(strict_update(cx, &op, pk)?);
    tokens.extend(patch(&op));
    tokens.extend(mask::generate(cx, entity)?);

    Ok(tokens)
}

// create
fn create(op: &Operation<'_>) -> TokenStream {
    let Operation {
        entity,
        core,
        wire,
        orm,
    } = op;
    let name = crud_fn(entity, "create");
    let bounds = op.bounds();

    let before = op.orm_hook(true, "Create_");
    let after = op.orm_hook(false, "Create_");
    let params = quote!(orm: &mut #orm,);
    let args = quote!(&mut orm,);
    let (before_call, after_call) = (before.call(&args), after.call(&args));
    let (before_decl, after_decl) = (before.declare(core, &params), after.declare(core, &params));

    quote! {
        /// Insert the message as a new row.
        pub fn #name #bounds(
            ctx: &#core::context::Context,
            input: Option<&#wire>,
            mut db: D,
        ) -> Result<#wire, #core::error::OrmError> {
            let input = input.ok_or(#core::error::OrmError::NilArgument)?;
            let mut orm = input.to_orm(ctx)?;
            #before_call
            db.create(&mut orm)?;
            #after_call

            orm.to_pb(ctx)
        }

        #before_decl
        #after_decl
    }
}

// read
fn read(op: &Operation<'_>, pk: &str) -> TokenStream {
    let Operation {
        entity,
        core,
        wire,
        orm,
    } = op;
    let name = crud_fn(entity, "read");
    let bounds = op.bounds();
    let key = op.key(&quote!(orm));

    let scope = entity.multi_account.then(|| {
        let tenant = op.tenant_column();
        let account = ident(Entity::ACCOUNT_ID);
        quote! {
            db = db.scope(#core::db::Predicate::eq(#tenant, orm.#account.clone()));
        }
    });

    let apply_query = op.orm_hook(true, "ReadApplyQuery");
    let find = op.orm_hook(true, "ReadFind");
    let after = op.orm_hook(false, "ReadFind");
    let params = quote!(orm: &#orm,);
    let apply_query_call = apply_query.call(&quote!(&orm,));
    let find_call = find.call(&quote!(&orm,));
    let after_call = after.call(&quote!(&mut found,));
    let declarations = [
        apply_query.declare(core, &params),
        find.declare(core, &params),
        after.declare(core, &quote!(orm: &mut #orm,)),
    ];

    quote! {
        /// Fetch the row identified by the message's primary key.
        pub fn #name #bounds(
            ctx: &#core::context::Context,
            input: Option<&#wire>,
            mut db: D,
        ) -> Result<#wire, #core::error::OrmError> {
            let input = input.ok_or(#core::error::OrmError::NilArgument)?;
            let orm = input.to_orm(ctx)?;
            let key = #key;
            #scope
            #apply_query_call
            #find_call
            let mut found = db
                .find_first::<#orm>(#core::db::Predicate::eq(#pk, key))?
                .ok_or(#core::error::OrmError::NotFound)?;
            #after_call

            found.to_pb(ctx)
        }

        #(#declarations)*
    }
}

// delete
fn delete(op: &Operation<'_>, pk: &str) -> TokenStream {
    let Operation {
        entity,
        core,
        wire,
        orm,
    } = op;
    let name = crud_fn(entity, "delete");
    let bounds = op.bounds();
    let key = op.key(&quote!(orm));

    let scope = entity.multi_account.then(|| {
        let tenant = op.tenant_column();
        quote! {
            db = db.scope(#core::db::Predicate::eq(#tenant, ctx.account_id()?));
        }
    });

    let before = op.orm_hook(true, "Delete_");
    let after = op.orm_hook(false, "Delete_");
    let params = quote!(orm: &#orm,);
    let args = quote!(&orm,);
    let (before_call, after_call) = (before.call(&args), after.call(&args));
    let (before_decl, after_decl) = (before.declare(core, &params), after.declare(core, &params));

    quote! {
        /// Delete the row identified by the message's primary key.
        pub fn #name #bounds(
            ctx: &#core::context::Context,
            input: Option<&#wire>,
            mut db: D,
        ) -> Result<(), #core::error::OrmError> {
            let input = input.ok_or(#core::error::OrmError::NilArgument)?;
            let orm = input.to_orm(ctx)?;
            let key = #key;
            #scope
            #before_call
            db.delete::<#orm>(#core::db::Predicate::eq(#pk, key))?;
            #after_call

            Ok(())
        }

        #before_decl
        #after_decl
    }
}

// delete_set
fn delete_set(op: &Operation<'_>, pk: &str) -> TokenStream {
    let Operation {
        entity,
        core,
        wire,
        orm,
    } = op;
    let name = crud_fn(entity, "delete_set");
    let bounds = op.bounds();
    let key = op.key(&quote!(orm));

    let tenant = entity.multi_account.then(|| {
        let tenant = op.tenant_column();
        quote! {
            let filter = #core::db::Predicate::eq(#tenant, ctx.account_id()?).and(filter);
        }
    });

    let before = op.orm_hook(true, "DeleteSet");
    let after = op.orm_hook(false, "DeleteSet");
    let params = quote!(input: &[#wire],);
    let args = quote!(input,);
    let (before_call, after_call) = (before.call(&args), after.call(&args));
    let (before_decl, after_decl) = (before.declare(core, &params), after.declare(core, &params));

    quote! {
        /// Delete every row identified by the messages, in one statement.
        pub fn #name #bounds(
            ctx: &#core::context::Context,
            input: Option<&[#wire]>,
            mut db: D,
        ) -> Result<(), #core::error::OrmError> {
            let input = input
                .filter(|objects| !objects.is_empty())
                .ok_or(#core::error::OrmError::NilArgument)?;

            let mut keys = ::std::vec::Vec::with_capacity(input.len());
            for object in input {
                let orm = object.to_orm(ctx)?;
                keys.push(#key);
            }
            #before_call

            let filter = #core::db::Predicate::in_list(#pk, keys);
            #tenant
            db.delete::<#orm>(filter)?;
            #after_call

            Ok(())
        }

        #before_decl
        #after_decl
    }
}

// strict_update
fn strict_update(cx: &mut FileContext<'_>, op: &Operation<'_>, pk: &str) -> Result<TokenStream, Error> {
    let Operation {
        entity,
        core,
        wire,
        orm,
    } = op;
    let name = crud_fn(entity, "strict_update");
    let bounds = op.bounds();
    let gateway = cx.schema.config.gateway;

    let scope = entity.multi_account.then(|| {
        let tenant = op.tenant_column();
        let account = ident(Entity::ACCOUNT_ID);
        quote! {
            db = db.scope(#core::db::Predicate::eq(#tenant, orm.#account.clone()));
        }
    });

    let lock = quote! {
        db.lock_for_update::<#orm>(#core::db::Predicate::eq(
            #pk,
            #core::db::Model::primary_key(&orm).unwrap_or_default(),
        ))?
    };
    let (lock, created) = if gateway {
        (
            quote!(let count = #lock;),
            quote! {
                if count == 0 {
                    ctx.set_created();
                }
            },
        )
    } else {
        (quote!(#lock;), quote!())
    };

    let mut cascades = quote!();
    for (field, assoc) in entity.associations() {
        if let Some(cascade) = assoc.cascade {
            cascades.extend(cascade_field(cx, op, field, assoc, cascade)?);
        }
    }

    let cleanup = op.orm_hook(true, "StrictUpdateCleanup");
    let save = op.orm_hook(true, "StrictUpdateSave");
    let after = op.orm_hook(false, "StrictUpdateSave");
    let params = quote!(orm: &mut #orm,);
    let args = quote!(&mut orm,);
    let calls = [cleanup.call(&args), save.call(&args), after.call(&args)];
    let [cleanup_call, save_call, after_call] = &calls;
    let declarations = [
        cleanup.declare(core, &params),
        save.declare(core, &params),
        after.declare(core, &params),
    ];

    Ok(quote! {
        /// Overwrite the row with the message, replacing its child rows
        /// according to each association's cascade policy.
        pub fn #name #bounds(
            ctx: &#core::context::Context,
            input: Option<&#wire>,
            mut db: D,
        ) -> Result<#wire, #core::error::OrmError> {
            let input = input.ok_or(#core::error::OrmError::NilArgument)?;
            let mut orm = input.to_orm(ctx)?;
            #scope
            #lock
            #cleanup_call
            #cascades
            #save_call
            db.save(&mut orm)?;
            #after_call

            let pb = orm.to_pb(ctx)?;
            #created

            Ok(pb)
        }

        #(#declarations)*
    })
}

// cascade_field
// child-set update for one association field before the owner is saved
fn cascade_field(
    cx: &mut FileContext<'_>,
    op: &Operation<'_>,
    field: &Field,
    assoc: &Association,
    cascade: Cascade,
) -> Result<TokenStream, Error> {
    let core = &op.core;
    let orm = &op.orm;
    let peer_entity = cx.entity(&assoc.peer)?;
    let peer = cx.orm_type(&assoc.peer)?;
    let name = field.name.as_str();
    let list = ident(name);

    let children = if assoc.is_many() {
        quote!(orm.#list.as_slice())
    } else {
        quote!(orm.#list.as_deref().map(::std::slice::from_ref).unwrap_or_default())
    };
    let empty = if assoc.is_many() {
        quote!(orm.#list = ::std::vec::Vec::new();)
    } else {
        quote!(orm.#list = None;)
    };

    let tokens = match cascade {
        Cascade::Remove => {
            let key_field = ident(&assoc.association_foreign_key);
            let fk_column = peer_entity
                .field(&assoc.foreign_key)
                .map_or(assoc.foreign_key.as_str(), Field::column_name);
            let keep = peer_entity.primary_key().map(|peer_pk| {
                let peer_pk = peer_pk.column_name();
                quote! {
                    let kept = #children
                        .iter()
                        .filter_map(#core::db::Model::primary_key)
                        .filter(|key| !key.is_zero())
                        .collect::<::std::vec::Vec<_>>();
                    if !kept.is_empty() {
                        filter = filter.and(#core::db::Predicate::not_in(#peer_pk, kept));
                    }
                }
            });

            quote! {
                {
                    let key = #core::value::Value::from(orm.#key_field.clone());
                    if key.is_zero() {
                        return Err(#core::error::OrmError::EmptyId);
                    }
                    #[allow(unused_mut)]
                    let mut filter = #core::db::Predicate::eq(#fk_column, key);
                    #keep
                    db.delete::<#peer>(filter)?;
                }
            }
        }
        Cascade::Clear => quote! {
            db.associate::<#orm, #peer>(&orm, #name, #core::db::Association::Clear)?;
            #empty
        },
        Cascade::Append => quote! {
            db.associate::<#orm, #peer>(&orm, #name, #core::db::Association::Append(#children))?;
            #empty
        },
        Cascade::Replace => quote! {
            db.associate::<#orm, #peer>(&orm, #name, #core::db::Association::Replace(#children))?;
            #empty
        },
    };

    Ok(tokens)
}

// patch
// the patch read needs a wire-level key to build its probe
fn patch(op: &Operation<'_>) -> TokenStream {
    let Operation {
        entity,
        core,
        wire,
        ..
    } = op;

    let Some(pk_wire) = entity.primary_key().and_then(Field::wire) else {
        debug!("{}: primary key is not on the wire, patch skipped", entity.full_name);
        return quote!();
    };
    if entity.multi_account && !entity.has_wire_id() {
        debug!("{}: multi-account without a wire id, patch skipped", entity.full_name);
        return quote!();
    }

    let name = crud_fn(entity, "patch");
    let set_name = crud_fn(entity, "patch_set");
    let read = crud_fn(entity, "read");
    let strict_update = crud_fn(entity, "strict_update");
    let apply = crud_fn(entity, "apply_field_mask");
    let bounds = op.bounds();
    let key = ident(&pk_wire.rust_name);

    let read_hook = op.wire_hook(true, "PatchRead");
    let apply_hook = op.wire_hook(true, "PatchApplyFieldMask");
    let save_hook = op.wire_hook(true, "PatchSave");
    let after_hook = op.wire_hook(false, "PatchSave");
    let params = quote!(input: &#wire, mask: &#core::FieldMask,);
    let args = quote!(input, mask,);
    let calls = [
        read_hook.call(&args),
        apply_hook.call(&args),
        save_hook.call(&args),
        after_hook.call(&args),
    ];
    let [read_call, apply_call, save_call, after_call] = &calls;
    let declarations = [
        read_hook.declare(core, &params),
        apply_hook.declare(core, &params),
        save_hook.declare(core, &params),
        after_hook.declare(core, &params),
    ];

    quote! {
        /// Read the stored row, overwrite the masked fields from the message
        /// and save the result.
        pub fn #name #bounds(
            ctx: &#core::context::Context,
            input: Option<&#wire>,
            mask: &#core::FieldMask,
            mut db: D,
        ) -> Result<#wire, #core::error::OrmError> {
            let input = input.ok_or(#core::error::OrmError::NilArgument)?;
            #read_call

            let probe = #wire {
                #key: input.#key.clone(),
                ..Default::default()
            };
            let mut patchee = #read(ctx, Some(&probe), db.clone())?;
            #apply_call

            #apply(&mut patchee, input, mask, "")?;
            #save_call

            let patched = #strict_update(ctx, Some(&patchee), db.clone())?;
            #after_call

            Ok(patched)
        }

        /// Patch each message with the mask at the same index.
        pub fn #set_name #bounds(
            ctx: &#core::context::Context,
            objects: &[#wire],
            masks: &[#core::FieldMask],
            db: D,
        ) -> Result<::std::vec::Vec<#wire>, #core::error::OrmError> {
            if objects.len() != masks.len() {
                return Err(#core::error::OrmError::BadRepeatedFieldMask {
                    masks: masks.len(),
                    objects: objects.len(),
                });
            }

            objects
                .iter()
                .zip(masks)
                .map(|(object, mask)| #name(ctx, Some(object), mask, db.clone()))
                .collect()
        }

        #(#declarations)*
    }
}

///
/// TESTS
///
