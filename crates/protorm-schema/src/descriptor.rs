//! Input model: message-type descriptors with their relational-mapping
//! annotations. Read-only to the resolver.
//!
//! Every struct deserializes from JSON with missing keys defaulted, so a
//! descriptor set can be written by hand or exported by a plugin front end.

use crate::prelude::*;

///
/// CompilationUnit
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilationUnit {
    pub files: Vec<FileDescriptor>,
}

impl CompilationUnit {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

///
/// FileDescriptor
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FileDescriptor {
    pub name: String,
    pub package: String,
    pub messages: Vec<MessageDescriptor>,
    pub enums: Vec<EnumDescriptor>,
}

impl FileDescriptor {
    /// File name without directories or the `.proto` extension.
    #[must_use]
    pub fn stem(&self) -> &str {
        let base = self.name.rsplit('/').next().unwrap_or(&self.name);

        base.strip_suffix(".proto").unwrap_or(base)
    }
}

///
/// MessageDescriptor
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MessageDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub nested_messages: Vec<MessageDescriptor>,
    pub enums: Vec<EnumDescriptor>,
    pub map_entry: bool,
    pub options: Option<MessageOptions>,
}

impl MessageDescriptor {
    #[must_use]
    pub fn is_ormable(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.ormable)
    }

    #[must_use]
    pub fn is_multi_account(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.multi_account)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

///
/// EnumDescriptor
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EnumDescriptor {
    pub name: String,
    pub values: Vec<EnumValue>,
}

///
/// EnumValue
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

///
/// FieldDescriptor
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FieldDescriptor {
    pub name: String,

    #[serde(default)]
    pub number: i32,

    pub kind: Kind,

    #[serde(default)]
    pub label: Label,

    /// Referenced message or enum, e.g. `.google.protobuf.Timestamp`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<FieldOptions>,
}

impl FieldDescriptor {
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        self.label.is_repeated()
    }

    #[must_use]
    pub fn is_dropped(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.drop)
    }

    /// Referenced type name without the leading dot.
    #[must_use]
    pub fn type_ref(&self) -> Option<&str> {
        self.type_name
            .as_deref()
            .map(|name| name.strip_prefix('.').unwrap_or(name))
    }
}

///
/// MessageOptions
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MessageOptions {
    pub ormable: bool,
    pub multi_account: bool,
    pub table: Option<String>,
    pub include: Vec<ExtraField>,

    /// Overrides the run-wide engine for this entity.
    pub engine: Option<Engine>,
}

///
/// ExtraField
/// storage-only column declared on the message
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtraField {
    pub name: String,

    /// Type name; a leading `*` makes the column nullable.
    #[serde(rename = "type")]
    pub ty: String,

    /// Rust path the type is imported from.
    pub package: Option<String>,

    pub tag: Option<GormTag>,
}

///
/// FieldOptions
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldOptions {
    pub drop: bool,
    pub tag: Option<GormTag>,
    pub association: Option<AssociationOptions>,

    /// Name of a message this field refers to; must exist in the unit.
    pub reference_of: Option<String>,
}

///
/// GormTag
/// column options rendered into the storage tag
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct GormTag {
    pub column: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub size: u32,
    pub precision: u32,
    pub primary_key: bool,
    pub unique: bool,
    pub default: Option<String>,
    pub not_null: bool,
    pub auto_increment: bool,
    pub index: Option<String>,
    pub unique_index: Option<String>,
    pub embedded: bool,
    pub embedded_prefix: Option<String>,
    pub ignore: bool,

    // legacy association keys, used when the field has no association
    pub foreignkey: Option<String>,
    pub association_foreignkey: Option<String>,
    pub many_to_many: Option<String>,
    pub jointable_foreignkey: Option<String>,
    pub association_jointable_foreignkey: Option<String>,
    pub association_autoupdate: bool,
    pub association_autocreate: bool,
    pub association_save_reference: bool,
    pub preload: bool,
}

impl GormTag {
    /// Copy of the tag with an explicit column type.
    #[must_use]
    pub fn with_type(mut self, ty: &str) -> Self {
        self.ty = Some(ty.to_string());
        self
    }
}

///
/// AssociationOptions
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AssociationOptions {
    pub kind: AssociationKind,

    #[serde(default)]
    pub foreignkey: Option<String>,
    #[serde(default)]
    pub foreignkey_tag: Option<GormTag>,
    #[serde(default)]
    pub association_foreignkey: Option<String>,

    #[serde(default)]
    pub association_autoupdate: bool,
    #[serde(default)]
    pub association_autocreate: bool,
    #[serde(default)]
    pub association_save_reference: bool,
    #[serde(default)]
    pub preload: bool,

    #[serde(default)]
    pub clear: bool,
    #[serde(default)]
    pub append: bool,
    #[serde(default)]
    pub replace: bool,

    /// has_many only
    #[serde(default)]
    pub position_field: Option<String>,
    #[serde(default)]
    pub position_field_tag: Option<GormTag>,

    /// many_to_many only
    #[serde(default)]
    pub jointable: Option<String>,
    #[serde(default)]
    pub jointable_foreignkey: Option<String>,
    #[serde(default)]
    pub association_jointable_foreignkey: Option<String>,
}

impl AssociationOptions {
    #[must_use]
    pub const fn new(kind: AssociationKind) -> Self {
        Self {
            kind,
            foreignkey: None,
            foreignkey_tag: None,
            association_foreignkey: None,
            association_autoupdate: false,
            association_autocreate: false,
            association_save_reference: false,
            preload: false,
            clear: false,
            append: false,
            replace: false,
            position_field: None,
            position_field_tag: None,
            jointable: None,
            jointable_foreignkey: None,
            association_jointable_foreignkey: None,
        }
    }
}

///
/// TESTS
///
