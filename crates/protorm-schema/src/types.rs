use crate::prelude::*;
use derive_more::Display;
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

///
/// Kind
/// proto field kind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum Kind {
    Bool,
    Bytes,
    Double,
    Enum,
    Fixed32,
    Fixed64,
    Float,
    Int32,
    Int64,
    Message,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    String,
    Uint32,
    Uint64,
}

impl Kind {
    /// Storage scalar for builtin kinds; `None` for enums and messages.
    #[must_use]
    pub const fn scalar(self) -> Option<Scalar> {
        let scalar = match self {
            Self::Bool => Scalar::Bool,
            Self::Bytes => Scalar::Bytes,
            Self::Double => Scalar::F64,
            Self::Float => Scalar::F32,
            Self::Int32 | Self::Sint32 | Self::Sfixed32 => Scalar::I32,
            Self::Int64 | Self::Sint64 | Self::Sfixed64 => Scalar::I64,
            Self::Uint32 | Self::Fixed32 => Scalar::U32,
            Self::Uint64 | Self::Fixed64 => Scalar::U64,
            Self::String => Scalar::String,
            Self::Enum | Self::Message => return None,
        };

        Some(scalar)
    }
}

///
/// Label
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    #[default]
    Optional,
    Required,
    Repeated,
}

impl Label {
    #[must_use]
    pub const fn is_repeated(self) -> bool {
        matches!(self, Self::Repeated)
    }
}

///
/// Scalar
/// builtin storage scalar
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum Scalar {
    Bool,
    Bytes,
    F32,
    F64,
    I32,
    I64,
    String,
    U32,
    U64,
}

impl Scalar {
    /// Parse an included-field type name, accepting both proto/Go and
    /// Rust spellings.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        let scalar = match name {
            "bool" => Self::Bool,
            "[]byte" | "bytes" | "Vec<u8>" => Self::Bytes,
            "float32" | "f32" | "float" => Self::F32,
            "float64" | "f64" | "double" => Self::F64,
            "int32" | "i32" => Self::I32,
            "int" | "int64" | "i64" => Self::I64,
            "string" | "String" => Self::String,
            "uint32" | "u32" => Self::U32,
            "uint" | "uint64" | "u64" => Self::U64,
            _ => return None,
        };

        Some(scalar)
    }

    #[must_use]
    pub const fn is_int(self) -> bool {
        matches!(self, Self::I32 | Self::I64 | Self::U32 | Self::U64)
    }

    /// Bytes columns are never wrapped in `Option`.
    #[must_use]
    pub const fn is_bytes(self) -> bool {
        matches!(self, Self::Bytes)
    }
}

impl ToTokens for Scalar {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(match self {
            Self::Bool => quote!(bool),
            Self::Bytes => quote!(::std::vec::Vec<u8>),
            Self::F32 => quote!(f32),
            Self::F64 => quote!(f64),
            Self::I32 => quote!(i32),
            Self::I64 => quote!(i64),
            Self::String => quote!(::std::string::String),
            Self::U32 => quote!(u32),
            Self::U64 => quote!(u64),
        });
    }
}

///
/// AssociationKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    BelongsTo,
    HasMany,
    HasOne,
    ManyToMany,
}

impl AssociationKind {
    /// True for kinds stored as a collection of peers.
    #[must_use]
    pub const fn is_many(self) -> bool {
        matches!(self, Self::HasMany | Self::ManyToMany)
    }
}

///
/// Cascade
/// update-time policy for the child rows of an association
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum Cascade {
    Append,
    Clear,
    Remove,
    Replace,
}

///
/// Engine
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    #[default]
    Unset,
    Postgres,
}

impl Engine {
    /// Native array, JSON, and inet columns.
    #[must_use]
    pub const fn is_postgres(self) -> bool {
        matches!(self, Self::Postgres)
    }
}

///
/// EnumMode
/// enum column representation
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumMode {
    #[default]
    Ordinal,
    Name,
}

///
/// MarkerMatch
/// how special-type markers are recognised
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerMatch {
    /// Final segment of the type name, any package.
    #[default]
    Suffix,

    /// Fully qualified name only.
    Qualified,
}
