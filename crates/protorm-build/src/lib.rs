//! Code synthesizer: renders the resolved schema of each input file into
//! Rust source for its storage structs, conversions, hook traits and
//! data-access functions.
//!
//! The output of a file is meant to be `include!`d into the module that
//! holds the prost-generated wire types of the same package.

mod convert;
mod crud;
mod file;
mod hooks;
mod macros;
mod mask;
mod model;
mod paths;
mod tag;

pub use paths::CratePaths;

use crate::file::FileContext;
use log::debug;
use proc_macro2::TokenStream;
use protorm_schema::{
    build::build_schema,
    config::Config,
    descriptor::CompilationUnit,
    node::{FileSchema, Schema},
};
use quote::quote;
use thiserror::Error as ThisError;

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// @generated by protorm. Do not edit.";

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid rust path '{0}'")]
    InvalidPath(String),

    #[error(transparent)]
    Schema(#[from] protorm_schema::Error),

    #[error("type '{0}' is not declared in the compilation unit")]
    UnknownType(String),
}

///
/// GeneratedFile
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedFile {
    /// `<proto stem>.orm.rs`
    pub name: String,
    pub content: String,
}

// generate
/// Resolve the unit and render one source file per input file.
pub fn generate(unit: &CompilationUnit, config: &Config) -> Result<Vec<GeneratedFile>, Error> {
    generate_with_paths(unit, config, &CratePaths::new())
}

/// [`generate`] with an explicit runtime crate path.
pub fn generate_with_paths(
    unit: &CompilationUnit,
    config: &Config,
    paths: &CratePaths,
) -> Result<Vec<GeneratedFile>, Error> {
    let files = generate_tokens_with_paths(unit, config, paths)?;

    Ok(unit
        .files
        .iter()
        .zip(files)
        .map(|(descriptor, tokens)| GeneratedFile {
            name: format!("{}.orm.rs", descriptor.stem()),
            content: format!("{GENERATED_HEADER}\n\n{tokens}\n"),
        })
        .collect())
}

// generate_tokens
/// Raw token streams, one per input file, in input order.
pub fn generate_tokens(unit: &CompilationUnit, config: &Config) -> Result<Vec<TokenStream>, Error> {
    generate_tokens_with_paths(unit, config, &CratePaths::new())
}

fn generate_tokens_with_paths(
    unit: &CompilationUnit,
    config: &Config,
    paths: &CratePaths,
) -> Result<Vec<TokenStream>, Error> {
    let schema = build_schema(unit, config)?;

    schema
        .files
        .iter()
        .map(|file| FileBuilder::new(&schema, file, paths).generate())
        .collect()
}

///
/// FileBuilder
///

pub(crate) struct FileBuilder<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) file: &'a FileSchema,
    pub(crate) paths: &'a CratePaths,
}

impl<'a> FileBuilder<'a> {
    #[must_use]
    pub(crate) const fn new(schema: &'a Schema, file: &'a FileSchema, paths: &'a CratePaths) -> Self {
        Self {
            schema,
            file,
            paths,
        }
    }

    /// Generate every item of the file, preceded by its imports.
    pub(crate) fn generate(self) -> Result<TokenStream, Error> {
        let mut cx = FileContext::new(self.schema, self.file, self.paths)?;
        let mut items = quote!();

        for entity in self.schema.file_entities(self.file) {
            debug!("{}: generating {}", self.file.name, entity.generated_name);

            items.extend(model::generate(&mut cx, entity)?);
            items.extend(convert::generate(&mut cx, entity)?);
            items.extend(crud::generate(&mut cx, entity)?);
        }

        let uses = cx.use_items()?;

        Ok(quote! {
            #uses
            #items
        })
    }
}

///
/// TESTS
///
