//! Wire types of `shop/shop.proto`, in the shape prost emits them, followed
//! by the generated storage code.

use protorm::core::types::pb;

///
/// Widget
///

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Widget {
    #[prost(string, tag = "1")]
    pub id: String,

    #[prost(string, tag = "2")]
    pub name: String,

    #[prost(enumeration = "Color", tag = "3")]
    pub color: i32,

    #[prost(message, repeated, tag = "4")]
    pub parts: Vec<Part>,

    #[prost(message, optional, tag = "5")]
    pub created_at: Option<::prost_types::Timestamp>,

    #[prost(message, optional, tag = "6")]
    pub external_id: Option<pb::UuidValue>,

    #[prost(string, tag = "7")]
    pub internal_note: String,
}

///
/// Part
///

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Part {
    #[prost(int64, tag = "1")]
    pub id: i64,

    #[prost(string, tag = "2")]
    pub label: String,
}

///
/// Note
///

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Note {
    #[prost(string, tag = "1")]
    pub id: String,

    #[prost(string, tag = "2")]
    pub body: String,
}

///
/// Color
///

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Color {
    Unspecified = 0,
    Red = 1,
    Blue = 2,
}

impl Color {
    #[must_use]
    pub const fn as_str_name(self) -> &'static str {
        match self {
            Self::Unspecified => "COLOR_UNSPECIFIED",
            Self::Red => "COLOR_RED",
            Self::Blue => "COLOR_BLUE",
        }
    }

    #[must_use]
    pub fn from_str_name(value: &str) -> Option<Self> {
        match value {
            "COLOR_UNSPECIFIED" => Some(Self::Unspecified),
            "COLOR_RED" => Some(Self::Red),
            "COLOR_BLUE" => Some(Self::Blue),
            _ => None,
        }
    }
}

include!(concat!(env!("OUT_DIR"), "/shop.orm.rs"));
