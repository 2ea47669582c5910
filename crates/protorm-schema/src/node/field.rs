use crate::{descriptor::GormTag, prelude::*};

///
/// Field
/// one storage column (or association) of an entity
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Field {
    /// Snake-case Rust identifier of the storage field.
    pub name: String,

    pub storage: StorageType,
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<GormTag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association: Option<Association>,

    /// Message whose short name keys the resource-identifier codec.
    pub origin_message: String,

    pub source: FieldSource,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, storage: StorageType, source: FieldSource) -> Self {
        Self {
            name: name.into(),
            storage,
            nullable: false,
            tag: None,
            association: None,
            origin_message: String::new(),
            source,
        }
    }

    #[must_use]
    pub const fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: Option<GormTag>) -> Self {
        self.tag = tag;
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin_message = origin.into();
        self
    }

    /// Database column; the tag's `column` wins over the field name.
    #[must_use]
    pub fn column_name(&self) -> &str {
        self.tag
            .as_ref()
            .and_then(|t| t.column.as_deref())
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.name)
    }

    #[must_use]
    pub fn is_tagged_primary_key(&self) -> bool {
        self.tag.as_ref().is_some_and(|t| t.primary_key)
    }

    #[must_use]
    pub fn tag_not_null(&self) -> bool {
        self.tag.as_ref().is_some_and(|t| t.not_null)
    }

    #[must_use]
    pub const fn wire(&self) -> Option<&WireField> {
        match &self.source {
            FieldSource::Wire(wire) => Some(wire),
            _ => None,
        }
    }

    /// Scalar-like column that a predicate can compare.
    #[must_use]
    pub fn is_comparable(&self) -> bool {
        match self.storage.normalized() {
            StorageType::Scalar(_) => true,
            StorageType::Special(special) => {
                matches!(special, Special::Uuid | Special::Timestamp)
            }
            _ => false,
        }
    }
}

///
/// FieldSource
/// where a storage field came from
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum FieldSource {
    /// Foreign key injected by an association of `owner`.
    ForeignKey { owner: String },

    /// Extra column from the message options.
    Included,

    /// Has-many position column injected into the peer.
    Position,

    /// `account_id` injected for multi-account entities.
    Tenant,

    Wire(WireField),
}

impl FieldSource {
    #[must_use]
    pub const fn is_wire(&self) -> bool {
        matches!(self, Self::Wire(_))
    }
}

///
/// WireField
/// field of the wire message as declared
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct WireField {
    /// Proto field name, as used in field-mask paths.
    pub proto_name: String,

    /// Rust identifier of the field on the wire struct.
    pub rust_name: String,

    pub kind: Kind,
    pub label: Label,

    /// Qualified referenced message or enum, without the leading dot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    pub dropped: bool,
}

impl WireField {
    #[must_use]
    pub const fn is_repeated(&self) -> bool {
        self.label.is_repeated()
    }

    #[must_use]
    pub const fn is_message(&self) -> bool {
        matches!(self.kind, Kind::Message)
    }
}
