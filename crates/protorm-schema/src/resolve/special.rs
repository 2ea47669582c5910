use crate::prelude::*;

///
/// Marker
/// message type with a dedicated storage representation
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum Marker {
    Identifier,
    Inet,
    Json,
    TimeOnly,
    Timestamp,
    Uuid,
    UuidValue,
    Wrapper(Scalar),
}

/// Canonical qualified name of every marker.
pub const MARKERS: &[(&str, Marker)] = &[
    ("google.protobuf.Timestamp", Marker::Timestamp),
    ("gorm.types.UUID", Marker::Uuid),
    ("gorm.types.UUIDValue", Marker::UuidValue),
    ("gorm.types.JSONValue", Marker::Json),
    ("gorm.types.InetValue", Marker::Inet),
    ("gorm.types.TimeOnly", Marker::TimeOnly),
    ("atlas.rpc.Identifier", Marker::Identifier),
    ("google.protobuf.StringValue", Marker::Wrapper(Scalar::String)),
    ("google.protobuf.DoubleValue", Marker::Wrapper(Scalar::F64)),
    ("google.protobuf.FloatValue", Marker::Wrapper(Scalar::F32)),
    ("google.protobuf.Int32Value", Marker::Wrapper(Scalar::I32)),
    ("google.protobuf.Int64Value", Marker::Wrapper(Scalar::I64)),
    ("google.protobuf.UInt32Value", Marker::Wrapper(Scalar::U32)),
    ("google.protobuf.UInt64Value", Marker::Wrapper(Scalar::U64)),
    ("google.protobuf.BoolValue", Marker::Wrapper(Scalar::Bool)),
];

// short_name
fn short_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Recognise a marker by qualified name.
///
/// Suffix mode matches on the final segment only, so a marker declared in
/// any package is accepted.
#[must_use]
pub fn match_marker(full_name: &str, mode: MarkerMatch) -> Option<Marker> {
    let full_name = full_name.strip_prefix('.').unwrap_or(full_name);

    MARKERS
        .iter()
        .find(|(canonical, _)| match mode {
            MarkerMatch::Qualified => *canonical == full_name,
            MarkerMatch::Suffix => short_name(canonical) == short_name(full_name),
        })
        .map(|(_, marker)| *marker)
}

/// Canonical name of the marker a user message would shadow in suffix
/// mode, if any.
#[must_use]
pub fn shadowed_marker(full_name: &str) -> Option<&'static str> {
    MARKERS
        .iter()
        .find(|(canonical, _)| {
            short_name(canonical) == short_name(full_name) && *canonical != full_name
        })
        .map(|(canonical, _)| *canonical)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_mode_matches_any_package() {
        assert_eq!(
            match_marker(".google.protobuf.Timestamp", MarkerMatch::Suffix),
            Some(Marker::Timestamp)
        );
        assert_eq!(
            match_marker("my.types.UUID", MarkerMatch::Suffix),
            Some(Marker::Uuid)
        );
        assert_eq!(
            match_marker("google.protobuf.Int64Value", MarkerMatch::Suffix),
            Some(Marker::Wrapper(Scalar::I64))
        );
        assert_eq!(match_marker("shop.Widget", MarkerMatch::Suffix), None);
    }

    #[test]
    fn qualified_mode_requires_canonical_name() {
        assert_eq!(match_marker("my.types.UUID", MarkerMatch::Qualified), None);
        assert_eq!(
            match_marker("atlas.rpc.Identifier", MarkerMatch::Qualified),
            Some(Marker::Identifier)
        );
    }

    #[test]
    fn shadowing_ignores_the_canonical_package() {
        assert_eq!(shadowed_marker("shop.Timestamp"), Some("google.protobuf.Timestamp"));
        assert_eq!(shadowed_marker("google.protobuf.Timestamp"), None);
        assert_eq!(shadowed_marker("shop.Widget"), None);
    }
}
