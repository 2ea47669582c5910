use crate::{catalog::Catalog, prelude::*};
use std::collections::BTreeMap;

///
/// Schema
/// resolved entities of one compilation unit
///

#[derive(Clone, Debug)]
pub struct Schema {
    pub config: Config,
    pub catalog: Catalog,

    /// Arena keyed by qualified message name.
    pub entities: BTreeMap<String, Entity>,

    /// Input files in order.
    pub files: Vec<FileSchema>,
}

impl Schema {
    #[must_use]
    pub fn new(config: Config, catalog: Catalog) -> Self {
        Self {
            config,
            catalog,
            entities: BTreeMap::new(),
            files: Vec::new(),
        }
    }

    /// Look an entity up by qualified or unique short name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        let name = name.strip_prefix('.').unwrap_or(name);

        self.entities.get(name).or_else(|| {
            self.catalog
                .lookup(name)
                .and_then(|entry| self.entities.get(&entry.full_name))
        })
    }

    /// Entities of a file in declaration order.
    pub fn file_entities<'a>(&'a self, file: &'a FileSchema) -> impl Iterator<Item = &'a Entity> {
        file.entities.iter().filter_map(|name| self.entities.get(name))
    }
}

///
/// FileSchema
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FileSchema {
    pub name: String,
    pub package: String,

    /// Qualified names of the file's entities, in declaration order.
    pub entities: Vec<String>,

    /// Peers from other packages referenced by this file's associations.
    pub types_to_register: Vec<String>,
}

impl FileSchema {
    /// Register a cross-package peer once.
    pub fn register_type(&mut self, full_name: &str) {
        if !self.types_to_register.iter().any(|t| t == full_name) {
            self.types_to_register.push(full_name.to_string());
        }
    }
}
