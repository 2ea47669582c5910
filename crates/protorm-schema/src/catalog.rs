//! Registry of every message and enum type in a compilation unit.

use crate::{
    descriptor::{CompilationUnit, EnumDescriptor, FileDescriptor, MessageDescriptor},
    prelude::*,
    resolve::special::shadowed_marker,
};
use log::{debug, warn};
use std::collections::BTreeMap;

///
/// TypeEntry
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeEntry {
    /// Qualified name without the leading dot.
    pub full_name: String,

    /// Final segment of the name.
    pub name: String,

    pub package: String,
    pub file: String,

    /// Enclosing messages, outermost first.
    pub scope: Vec<String>,

    /// Message annotated `ormable`; always false for enums.
    pub mappable: bool,
}

///
/// Catalog
///

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    messages: BTreeMap<String, TypeEntry>,
    enums: BTreeMap<String, TypeEntry>,
    message_names: BTreeMap<String, Vec<String>>,
    enum_names: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every file of the unit and report marker collisions.
    #[must_use]
    pub fn from_unit(unit: &CompilationUnit, config: &Config) -> Self {
        let mut catalog = Self::new();
        for file in &unit.files {
            catalog.register(file);
        }

        if !config.quiet {
            for (name, marker) in catalog.marker_collisions(config.marker_match) {
                warn!("message '{name}' shadows special type '{marker}' in suffix matching mode");
            }
        }

        catalog
    }

    /// Register the messages (nested included, map entries skipped) and
    /// enums of one file.
    pub fn register(&mut self, file: &FileDescriptor) {
        for message in &file.messages {
            self.register_message(file, &[], message);
        }
        for desc in &file.enums {
            self.register_enum(file, &[], desc);
        }
    }

    fn register_message(&mut self, file: &FileDescriptor, scope: &[String], msg: &MessageDescriptor) {
        if msg.map_entry {
            return;
        }

        let entry = TypeEntry {
            full_name: qualify(&file.package, scope, &msg.name),
            name: msg.name.clone(),
            package: file.package.clone(),
            file: file.name.clone(),
            scope: scope.to_vec(),
            mappable: msg.is_ormable(),
        };
        debug!("catalog: message {} (mappable: {})", entry.full_name, entry.mappable);

        self.message_names
            .entry(entry.name.clone())
            .or_default()
            .push(entry.full_name.clone());
        self.messages.insert(entry.full_name.clone(), entry);

        let mut inner = scope.to_vec();
        inner.push(msg.name.clone());
        for nested in &msg.nested_messages {
            self.register_message(file, &inner, nested);
        }
        for desc in &msg.enums {
            self.register_enum(file, &inner, desc);
        }
    }

    fn register_enum(&mut self, file: &FileDescriptor, scope: &[String], desc: &EnumDescriptor) {
        let entry = TypeEntry {
            full_name: qualify(&file.package, scope, &desc.name),
            name: desc.name.clone(),
            package: file.package.clone(),
            file: file.name.clone(),
            scope: scope.to_vec(),
            mappable: false,
        };
        debug!("catalog: enum {}", entry.full_name);

        self.enum_names
            .entry(entry.name.clone())
            .or_default()
            .push(entry.full_name.clone());
        self.enums.insert(entry.full_name.clone(), entry);
    }

    /// Message by qualified (`.pkg.Msg` or `pkg.Msg`) or unique short name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&TypeEntry> {
        find(&self.messages, &self.message_names, name)
    }

    /// Enum by qualified or unique short name.
    #[must_use]
    pub fn lookup_enum(&self, name: &str) -> Option<&TypeEntry> {
        find(&self.enums, &self.enum_names, name)
    }

    #[must_use]
    pub fn is_mappable(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|entry| entry.mappable)
    }

    /// Any registered message.
    #[must_use]
    pub fn is_known(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    #[must_use]
    pub fn is_enum(&self, name: &str) -> bool {
        self.lookup_enum(name).is_some()
    }

    #[must_use]
    pub fn package_of(&self, name: &str) -> Option<&str> {
        self.lookup(name)
            .or_else(|| self.lookup_enum(name))
            .map(|entry| entry.package.as_str())
    }

    /// Qualified names of every mappable message, sorted.
    #[must_use]
    pub fn all_mappable_names(&self) -> Vec<&str> {
        self.messages
            .values()
            .filter(|entry| entry.mappable)
            .map(|entry| entry.full_name.as_str())
            .collect()
    }

    /// User messages whose short name matches a special marker outside its
    /// canonical package. Qualified matching never collides.
    #[must_use]
    pub fn marker_collisions(&self, mode: MarkerMatch) -> Vec<(&str, &'static str)> {
        if mode == MarkerMatch::Qualified {
            return Vec::new();
        }

        self.messages
            .keys()
            .filter_map(|name| shadowed_marker(name).map(|marker| (name.as_str(), marker)))
            .collect()
    }
}

// qualify
fn qualify(package: &str, scope: &[String], name: &str) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(scope.len() + 2);
    if !package.is_empty() {
        parts.push(package);
    }
    parts.extend(scope.iter().map(String::as_str));
    parts.push(name);

    parts.join(".")
}

// find
fn find<'a>(
    entries: &'a BTreeMap<String, TypeEntry>,
    names: &BTreeMap<String, Vec<String>>,
    name: &str,
) -> Option<&'a TypeEntry> {
    let name = name.strip_prefix('.').unwrap_or(name);

    entries.get(name).or_else(|| match names.get(name).map(Vec::as_slice) {
        Some([only]) => entries.get(only),
        _ => None,
    })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MessageOptions;

    fn message(name: &str, ormable: bool) -> MessageDescriptor {
        MessageDescriptor {
            name: name.to_string(),
            options: ormable.then(|| MessageOptions {
                ormable: true,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn unit() -> CompilationUnit {
        let mut widget = message("Widget", true);
        widget.nested_messages.push(message("Part", true));
        widget.nested_messages.push(MessageDescriptor {
            name: "LabelsEntry".to_string(),
            map_entry: true,
            ..Default::default()
        });
        widget.enums.push(EnumDescriptor {
            name: "Color".to_string(),
            values: Vec::new(),
        });

        CompilationUnit {
            files: vec![
                FileDescriptor {
                    name: "shop/widget.proto".to_string(),
                    package: "shop".to_string(),
                    messages: vec![widget, message("Note", false), message("Timestamp", false)],
                    enums: Vec::new(),
                },
                FileDescriptor {
                    name: "other/note.proto".to_string(),
                    package: "other".to_string(),
                    messages: vec![message("Note", true)],
                    enums: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn registers_nested_messages_and_enums() {
        let catalog = Catalog::from_unit(&unit(), &Config::default().with_quiet(true));

        assert!(catalog.is_mappable(".shop.Widget"));
        assert!(catalog.is_mappable("shop.Widget.Part"));
        assert!(catalog.is_mappable("Part"), "unique short names resolve");
        assert!(!catalog.is_known("shop.Widget.LabelsEntry"), "map entries are skipped");
        assert!(catalog.is_enum("shop.Widget.Color"));
        assert_eq!(
            catalog.lookup("Part").map(|e| e.scope.clone()),
            Some(vec!["Widget".to_string()])
        );
        assert_eq!(catalog.package_of("Color"), Some("shop"));
    }

    #[test]
    fn ambiguous_short_names_need_qualification() {
        let catalog = Catalog::from_unit(&unit(), &Config::default().with_quiet(true));

        assert!(catalog.lookup("Note").is_none(), "two messages are named Note");
        assert!(!catalog.is_mappable("shop.Note"));
        assert!(catalog.is_mappable("other.Note"));
        assert_eq!(
            catalog.all_mappable_names(),
            vec!["other.Note", "shop.Widget", "shop.Widget.Part"]
        );
    }

    #[test]
    fn marker_collisions_only_in_suffix_mode() {
        let catalog = Catalog::from_unit(&unit(), &Config::default().with_quiet(true));

        assert_eq!(
            catalog.marker_collisions(MarkerMatch::Suffix),
            vec![("shop.Timestamp", "google.protobuf.Timestamp")]
        );
        assert!(catalog.marker_collisions(MarkerMatch::Qualified).is_empty());
    }
}
