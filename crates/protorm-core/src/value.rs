use chrono::{DateTime, Utc};
use uuid::Uuid;

///
/// Value
///
/// Column value carried by predicates and primary-key probes.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    Bool(bool),
    Bytes(Vec<u8>),
    Float(f64),
    Int(i64),
    List(Vec<Self>),
    #[default]
    Null,
    Text(String),
    Timestamp(DateTime<Utc>),
    Uint(u64),
    Uuid(Uuid),
}

impl Value {
    /// True when the value is the zero value of its type, which generated
    /// code treats as "no identifier".
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(v) => !v,
            Self::Bytes(v) => v.is_empty(),
            Self::Float(v) => *v == 0.0,
            Self::Int(v) => *v == 0,
            Self::List(v) => v.is_empty(),
            Self::Text(v) => v.is_empty(),
            Self::Timestamp(v) => v.timestamp() == 0 && v.timestamp_subsec_nanos() == 0,
            Self::Uint(v) => *v == 0,
            Self::Uuid(v) => v.is_nil(),
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

// impl_from
macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    f32 => Float,
    f64 => Float,
    String => Text,
    Vec<u8> => Bytes,
    Uuid => Uuid,
    DateTime<Utc> => Timestamp,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(v)
    }
}

///
/// TESTS
///
