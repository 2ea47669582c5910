//! Wire messages for the special column types.

///
/// Uuid
/// non-nullable; an absent value stores the nil UUID
///

#[derive(Clone, Eq, Hash, PartialEq, ::prost::Message)]
pub struct Uuid {
    #[prost(string, tag = "1")]
    pub value: String,
}

///
/// UuidValue
///

#[derive(Clone, Eq, Hash, PartialEq, ::prost::Message)]
pub struct UuidValue {
    #[prost(string, tag = "1")]
    pub value: String,
}

///
/// JsonValue
///

#[derive(Clone, Eq, Hash, PartialEq, ::prost::Message)]
pub struct JsonValue {
    #[prost(string, tag = "1")]
    pub value: String,
}

///
/// InetValue
///

#[derive(Clone, Eq, Hash, PartialEq, ::prost::Message)]
pub struct InetValue {
    #[prost(string, tag = "1")]
    pub value: String,
}

///
/// TimeOnly
/// seconds since midnight
///

#[derive(Clone, Copy, Eq, Hash, PartialEq, ::prost::Message)]
pub struct TimeOnly {
    #[prost(uint32, tag = "1")]
    pub value: u32,
}
