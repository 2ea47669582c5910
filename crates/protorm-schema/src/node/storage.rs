use crate::prelude::*;

///
/// ResourceStorage
/// column representation of a resource identifier
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ResourceStorage {
    Bytes,
    Int64,
    Opaque,
    Text,
}

impl ResourceStorage {
    /// Pick the storage from a column `type` hint.
    ///
    /// Returns `None` for hints that cannot hold an identifier.
    #[must_use]
    pub fn from_type_hint(hint: &str) -> Option<Self> {
        let hint = hint.trim().to_ascii_lowercase();

        let storage = match hint.as_str() {
            "" => Self::Opaque,
            "uuid" | "text" | "cidr" | "inet" | "macaddr" => Self::Text,
            "smallint" | "integer" | "bigint" | "numeric" | "smallserial" | "serial"
            | "bigserial" => Self::Int64,
            "jsonb" | "bytea" => Self::Bytes,
            h if h.contains("char") || h.ends_with("[]") => Self::Text,
            _ => return None,
        };

        Some(storage)
    }

    /// Storage matching a plain key column, used when an opaque
    /// identifier is upgraded to carry a foreign key.
    #[must_use]
    pub const fn for_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::String => Some(Self::Text),
            Scalar::I64 => Some(Self::Int64),
            Scalar::Bytes => Some(Self::Bytes),
            _ => None,
        }
    }
}

///
/// Special
/// storage for a recognised marker message
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum Special {
    Identifier(ResourceStorage),
    Inet,
    Json,
    TimeOnly,
    Timestamp,
    Uuid,
    UuidValue,
    Wrapper(Scalar),
}

///
/// StorageType
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum StorageType {
    /// Native array column (Postgres only).
    Array(Scalar),

    /// Reference to another entity, by qualified name.
    Association { peer: String, kind: AssociationKind },

    Enum {
        type_name: String,
        mode: EnumMode,
        repeated: bool,
    },

    /// Included type named by the message options.
    External { path: Option<String>, name: String },

    /// Repeated scalar copied element-wise.
    List(Scalar),

    Scalar(Scalar),

    Special(Special),
}

impl StorageType {
    /// Canonical column shape, used to compare a foreign key with the key
    /// it refers to.
    #[must_use]
    pub fn normalized(&self) -> Self {
        match self {
            Self::Special(special) => match special {
                Special::Wrapper(scalar) => Self::Scalar(*scalar),
                Special::UuidValue => Self::Special(Special::Uuid),
                Special::TimeOnly | Special::Identifier(ResourceStorage::Text) => {
                    Self::Scalar(Scalar::String)
                }
                Special::Identifier(ResourceStorage::Int64) => Self::Scalar(Scalar::I64),
                Special::Identifier(ResourceStorage::Bytes) => Self::Scalar(Scalar::Bytes),
                other => Self::Special(*other),
            },
            Self::Enum {
                mode: EnumMode::Ordinal,
                repeated: false,
                ..
            } => Self::Scalar(Scalar::I32),
            Self::Enum {
                mode: EnumMode::Name,
                repeated: false,
                ..
            } => Self::Scalar(Scalar::String),
            other => other.clone(),
        }
    }

    /// Columns that carry their own empty state and are never wrapped in
    /// `Option`.
    #[must_use]
    pub const fn is_never_nullable(&self) -> bool {
        matches!(
            self,
            Self::Array(_)
                | Self::List(_)
                | Self::Scalar(Scalar::Bytes)
                | Self::Special(Special::Identifier(
                    ResourceStorage::Bytes | ResourceStorage::Opaque
                ))
                | Self::Enum { repeated: true, .. }
        )
    }

    #[must_use]
    pub const fn is_association(&self) -> bool {
        matches!(self, Self::Association { .. })
    }

    /// Integer column able to hold a position index.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self.normalized(), Self::Scalar(s) if s.is_int())
    }

    #[must_use]
    pub const fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Self::Scalar(scalar) => Some(*scalar),
            _ => None,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_type_hints() {
        let cases = [
            ("", Some(ResourceStorage::Opaque)),
            ("UUID", Some(ResourceStorage::Text)),
            ("varchar(36)", Some(ResourceStorage::Text)),
            ("text[]", Some(ResourceStorage::Text)),
            ("BigInt", Some(ResourceStorage::Int64)),
            ("bytea", Some(ResourceStorage::Bytes)),
            ("jsonb", Some(ResourceStorage::Bytes)),
            ("timestamp", None),
        ];

        for (hint, expected) in cases {
            assert_eq!(
                ResourceStorage::from_type_hint(hint),
                expected,
                "type hint '{hint}'"
            );
        }
    }

    #[test]
    fn normalized_shapes_compare_equal() {
        let text_id = StorageType::Special(Special::Identifier(ResourceStorage::Text));
        let wrapped = StorageType::Special(Special::Wrapper(Scalar::String));

        assert_eq!(text_id.normalized(), StorageType::Scalar(Scalar::String));
        assert_eq!(wrapped.normalized(), text_id.normalized());
        assert_eq!(
            StorageType::Special(Special::UuidValue).normalized(),
            StorageType::Special(Special::Uuid).normalized()
        );
        assert_ne!(
            StorageType::Scalar(Scalar::I32).normalized(),
            StorageType::Scalar(Scalar::I64).normalized()
        );
    }

    #[test]
    fn never_nullable_columns() {
        assert!(StorageType::Scalar(Scalar::Bytes).is_never_nullable());
        assert!(StorageType::Special(Special::Identifier(ResourceStorage::Opaque)).is_never_nullable());
        assert!(!StorageType::Special(Special::Uuid).is_never_nullable());
        assert!(StorageType::Scalar(Scalar::U32).is_integer());
        assert!(!StorageType::Special(Special::Timestamp).is_integer());
    }
}
