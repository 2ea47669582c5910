use crate::file::ident;
use proc_macro2::{Ident, TokenStream};
use protorm_utils::rust_ident_case;
use quote::{format_ident, quote};

///
/// Hook
///
/// One optional hook point: a generated trait the caller may implement and
/// register on the request context, and the call site that probes for it.
///

pub struct Hook {
    pub trait_ident: Ident,
    pub method: Ident,
    pub before: bool,
}

impl Hook {
    /// `<owner>With<Before|After><op>`, method `snake(<Before|After><op>)`
    /// without any trailing underscore.
    #[must_use]
    pub fn new(owner: &str, before: bool, op: &str) -> Self {
        let when = if before { "Before" } else { "After" };
        let method = rust_ident_case(format!("{when}{}", op.trim_end_matches('_')).as_str());

        Self {
            trait_ident: format_ident!("{}With{}{}", owner, when, op),
            method: ident(&method),
            before,
        }
    }

    #[must_use]
    pub fn before(owner: &str, op: &str) -> Self {
        Self::new(owner, true, op)
    }

    #[must_use]
    pub fn after(owner: &str, op: &str) -> Self {
        Self::new(owner, false, op)
    }

    // declare_conversion
    /// Conversion hook, independent of storage.
    #[must_use]
    pub fn declare_conversion(&self, core: &TokenStream, source: &TokenStream, target: &TokenStream) -> TokenStream {
        let Self {
            trait_ident,
            method,
            ..
        } = self;
        let doc = format!("Called {} the default conversion code.", when(self.before));

        quote! {
            #[doc = #doc]
            pub trait #trait_ident: Send + Sync {
                fn #method(
                    &self,
                    ctx: &#core::context::Context,
                    source: &#source,
                    target: &mut #target,
                ) -> Result<(), #core::error::OrmError>;
            }
        }
    }

    // declare
    /// Storage hook generic over the database handle. Before hooks take the
    /// handle by value and return it, possibly rescoped; after hooks borrow it.
    #[must_use]
    pub fn declare(&self, core: &TokenStream, params: &TokenStream) -> TokenStream {
        let Self {
            trait_ident,
            method,
            before,
        } = self;
        let (db, ret) = if *before {
            (quote!(db: D), quote!(D))
        } else {
            (quote!(db: &mut D), quote!(()))
        };
        let camel_allow = trait_ident
            .to_string()
            .ends_with('_')
            .then(|| quote!(#[allow(non_camel_case_types)]));

        quote! {
            #camel_allow
            pub trait #trait_ident<D: #core::db::Database>: Send + Sync {
                fn #method(
                    &self,
                    ctx: &#core::context::Context,
                    #params
                    #db,
                ) -> Result<#ret, #core::error::OrmError>;
            }
        }
    }

    // call
    /// Probe the context and run the hook when one is registered.
    #[must_use]
    pub fn call(&self, args: &TokenStream) -> TokenStream {
        let Self {
            trait_ident,
            method,
            before,
        } = self;

        if *before {
            quote! {
                if let Some(hook) = ctx.hook::<dyn #trait_ident<D>>() {
                    db = hook.#method(ctx, #args db)?;
                }
            }
        } else {
            quote! {
                if let Some(hook) = ctx.hook::<dyn #trait_ident<D>>() {
                    hook.#method(ctx, #args &mut db)?;
                }
            }
        }
    }

    /// Call site of a conversion hook.
    #[must_use]
    pub fn call_conversion(&self) -> TokenStream {
        let Self {
            trait_ident,
            method,
            ..
        } = self;

        quote! {
            if let Some(hook) = ctx.hook::<dyn #trait_ident>() {
                hook.#method(ctx, self, &mut to)?;
            }
        }
    }
}

const fn when(before: bool) -> &'static str {
    if before { "before" } else { "after" }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_the_hook_convention() {
        let create = Hook::before("WidgetORM", "Create_");
        assert_eq!(create.trait_ident.to_string(), "WidgetORMWithBeforeCreate_");
        assert_eq!(create.method.to_string(), "before_create");

        let read = Hook::after("WidgetORM", "ReadFind");
        assert_eq!(read.trait_ident.to_string(), "WidgetORMWithAfterReadFind");
        assert_eq!(read.method.to_string(), "after_read_find");

        let to_pb = Hook::before("Widget", "ToPB");
        assert_eq!(to_pb.method.to_string(), "before_to_pb");
    }

    #[test]
    fn underscore_traits_allow_the_name() {
        let core = quote!(::protorm::core);
        let declared = Hook::after("WidgetORM", "Delete_")
            .declare(&core, &quote!(orm: &WidgetORM,))
            .to_string();

        assert!(declared.contains("non_camel_case_types"), "{declared}");
        assert!(declared.contains("& mut D"), "after hooks borrow the handle");
    }
}
