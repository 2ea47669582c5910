use crate::{CratePaths, Error};
use proc_macro2::{Ident, Span, TokenStream};
use protorm_schema::{
    catalog::TypeEntry,
    node::{Entity, FileSchema, Schema},
};
use protorm_utils::rust_ident_case;
use quote::{format_ident, quote};
use std::collections::HashMap;
use syn::Path;

///
/// FileContext
///
/// Per-file synthesis state: the import-alias table and the peers the file
/// has to reach in other packages. Created fresh for every output file.
///

pub struct FileContext<'a> {
    pub schema: &'a Schema,
    pub file: &'a FileSchema,
    pub paths: &'a CratePaths,

    /// (path, alias) in first-use order
    imports: Vec<(String, Ident)>,
    counters: HashMap<String, usize>,
}

impl<'a> FileContext<'a> {
    pub fn new(schema: &'a Schema, file: &'a FileSchema, paths: &'a CratePaths) -> Result<Self, Error> {
        let mut cx = Self {
            schema,
            file,
            paths,
            imports: Vec::new(),
            counters: HashMap::new(),
        };

        // registered peers get the first aliases
        for name in &file.types_to_register {
            let package = schema
                .catalog
                .package_of(name)
                .ok_or_else(|| Error::UnknownType(name.clone()))?
                .to_string();
            cx.package_prefix(&package)?;
        }

        Ok(cx)
    }

    /// Runtime crate root, e.g. `::protorm::core`.
    #[must_use]
    pub fn core(&self) -> &TokenStream {
        &self.paths.core
    }

    // import
    /// Alias for a module path, allocated on first use.
    pub fn import(&mut self, path: &str) -> Result<Ident, Error> {
        if let Some((_, alias)) = self.imports.iter().find(|(p, _)| p == path) {
            return Ok(alias.clone());
        }

        let parsed = syn::parse_str::<Path>(path).map_err(|_| Error::InvalidPath(path.to_string()))?;
        let base = parsed
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .ok_or_else(|| Error::InvalidPath(path.to_string()))?;
        let base = base.trim_start_matches("r#").to_string();

        let counter = self.counters.entry(base.clone()).or_insert(0);
        *counter += 1;
        let alias = format_ident!("{}{}", base, *counter);

        self.imports.push((path.to_string(), alias.clone()));

        Ok(alias)
    }

    /// One `use` item per alias, in allocation order.
    pub fn use_items(&self) -> Result<TokenStream, Error> {
        let mut tokens = quote!();

        for (path, alias) in &self.imports {
            let parsed =
                syn::parse_str::<Path>(path).map_err(|_| Error::InvalidPath(path.clone()))?;
            tokens.extend(quote! {
                #[allow(unused_imports)]
                use #parsed as #alias;
            });
        }

        Ok(tokens)
    }

    // package_prefix
    /// Path prefix reaching items of `package`; empty for the file's own.
    pub fn package_prefix(&mut self, package: &str) -> Result<TokenStream, Error> {
        if package == self.file.package {
            return Ok(quote!());
        }

        let mut path = self.schema.config.package_root.clone();
        for segment in package.split('.').filter(|s| !s.is_empty()) {
            path.push_str("::");
            path.push_str(segment);
        }
        let alias = self.import(&path)?;

        Ok(quote!(#alias::))
    }

    /// Path to the prost type of a message.
    pub fn wire_type(&mut self, full_name: &str) -> Result<TokenStream, Error> {
        let entry = self
            .schema
            .catalog
            .lookup(full_name)
            .ok_or_else(|| Error::UnknownType(full_name.to_string()))?
            .clone();

        self.scoped(&entry)
    }

    /// Path to the prost type of an enum.
    pub fn enum_type(&mut self, full_name: &str) -> Result<TokenStream, Error> {
        let entry = self
            .schema
            .catalog
            .lookup_enum(full_name)
            .ok_or_else(|| Error::UnknownType(full_name.to_string()))?
            .clone();

        self.scoped(&entry)
    }

    /// Storage struct of an entity; always at the top of its package module.
    pub fn orm_type(&mut self, full_name: &str) -> Result<TokenStream, Error> {
        let entity = self.entity(full_name)?;
        let (package, name) = (entity.package.clone(), ident(&entity.generated_name));
        let prefix = self.package_prefix(&package)?;

        Ok(quote!(#prefix #name))
    }

    /// A generated function of an entity, reachable from this file.
    pub fn entity_fn(&mut self, full_name: &str, verb: &str) -> Result<TokenStream, Error> {
        let entity = self.entity(full_name)?;
        let (package, name) = (entity.package.clone(), crud_fn(entity, verb));
        let prefix = self.package_prefix(&package)?;

        Ok(quote!(#prefix #name))
    }

    pub fn entity(&self, full_name: &str) -> Result<&'a Entity, Error> {
        self.schema
            .entity(full_name)
            .ok_or_else(|| Error::UnknownType(full_name.to_string()))
    }

    // scoped
    // prost nests types of a message in a snake-case module named after it
    fn scoped(&mut self, entry: &TypeEntry) -> Result<TokenStream, Error> {
        let prefix = self.package_prefix(&entry.package)?;
        let modules = entry.scope.iter().map(|s| ident(&rust_ident_case(s)));
        let name = ident(&entry.name);

        Ok(quote!(#prefix #(#modules::)* #name))
    }
}

// ident
/// Identifier from a name, escaping keywords as raw identifiers.
#[must_use]
pub fn ident(name: &str) -> Ident {
    syn::parse_str::<Ident>(name).unwrap_or_else(|_| Ident::new_raw(name, Span::call_site()))
}

/// `default_<verb>_<snake origin>`; delete-set alone puts `_set` last.
#[must_use]
pub fn crud_fn(entity: &Entity, verb: &str) -> Ident {
    match verb {
        "delete_set" => format_ident!("default_delete_{}_set", entity.fn_suffix()),
        _ => format_ident!("default_{}_{}", verb, entity.fn_suffix()),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use protorm_schema::{
        build::build_schema,
        config::Config,
        descriptor::{AssociationOptions, CompilationUnit, FileDescriptor},
        types::{AssociationKind, Kind},
    };

    fn two_packages() -> CompilationUnit {
        let widget = ormable(
            "Widget",
            vec![
                with_tag(scalar("id", Kind::String), pk()),
                repeated(with_association(
                    typed("parts", Kind::Message, "inventory.Part"),
                    AssociationOptions::new(AssociationKind::HasMany),
                )),
            ],
        );
        let part = ormable("Part", vec![with_tag(scalar("id", Kind::Int64), pk())]);

        CompilationUnit {
            files: vec![
                FileDescriptor {
                    name: "shop.proto".to_string(),
                    package: "shop".to_string(),
                    messages: vec![widget],
                    enums: Vec::new(),
                },
                FileDescriptor {
                    name: "inventory.proto".to_string(),
                    package: "inventory".to_string(),
                    messages: vec![part],
                    enums: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn aliases_are_counted_per_base_name_and_reused() {
        let schema = build_schema(&shop_unit(), &Config::default()).expect("schema");
        let paths = runtime();
        let mut cx = FileContext::new(&schema, &schema.files[0], &paths).expect("context");

        let first = cx.import("crate::money").expect("valid path");
        let second = cx.import("other::money").expect("valid path");
        let again = cx.import("crate::money").expect("valid path");
        let time = cx.import("crate::time").expect("valid path");

        assert_eq!(first.to_string(), "money1");
        assert_eq!(second.to_string(), "money2");
        assert_eq!(again, first, "aliases are stable per path");
        assert_eq!(time.to_string(), "time1");

        let uses = cx.use_items().expect("uses").to_string();
        assert!(uses.contains("use crate :: money as money1"), "{uses}");
        assert!(uses.contains("use other :: money as money2"), "{uses}");
    }

    #[test]
    fn registered_peers_are_imported_up_front() {
        let schema = build_schema(&two_packages(), &Config::default()).expect("schema");
        let paths = runtime();
        let mut cx = FileContext::new(&schema, &schema.files[0], &paths).expect("context");

        assert_eq!(
            cx.use_items().expect("uses").to_string(),
            quote!(#[allow(unused_imports)] use super::inventory as inventory1;).to_string()
        );
        assert_eq!(
            cx.orm_type("inventory.Part").expect("peer").to_string(),
            quote!(inventory1::PartORM).to_string()
        );
        assert_eq!(
            cx.orm_type("shop.Widget").expect("own entity").to_string(),
            quote!(WidgetORM).to_string()
        );
    }

    #[test]
    fn nested_types_live_in_snake_case_modules() {
        let mut outer = ormable("Order", vec![with_tag(scalar("id", Kind::String), pk())]);
        outer.nested_messages.push(ormable(
            "LineItem",
            vec![with_tag(scalar("id", Kind::String), pk())],
        ));
        let unit = CompilationUnit {
            files: vec![FileDescriptor {
                name: "order.proto".to_string(),
                package: "shop".to_string(),
                messages: vec![outer],
                enums: Vec::new(),
            }],
        };
        let schema = build_schema(&unit, &Config::default()).expect("schema");
        let paths = runtime();
        let mut cx = FileContext::new(&schema, &schema.files[0], &paths).expect("context");

        assert_eq!(
            cx.wire_type("shop.Order.LineItem").expect("nested").to_string(),
            quote!(order::LineItem).to_string()
        );
        assert_eq!(
            cx.orm_type("shop.Order.LineItem").expect("nested").to_string(),
            quote!(LineItemORM).to_string()
        );
    }

    #[test]
    fn only_delete_set_puts_the_set_suffix_last() {
        let schema = build_schema(&shop_unit(), &Config::default()).expect("schema");
        let widget = schema.entity("shop.Widget").expect("widget");

        assert_eq!(crud_fn(widget, "delete_set").to_string(), "default_delete_widget_set");
        assert_eq!(crud_fn(widget, "patch_set").to_string(), "default_patch_set_widget");
        assert_eq!(crud_fn(widget, "read").to_string(), "default_read_widget");
    }

    #[test]
    fn keywords_become_raw_identifiers() {
        assert_eq!(ident("type").to_string(), "r#type");
        assert_eq!(ident("name").to_string(), "name");
    }
}
