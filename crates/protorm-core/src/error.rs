use thiserror::Error as ThisError;

///
/// OrmError
///
/// Failure kinds of generated operations. Callers branch on the variant to
/// tell a missing argument from a missing record or an empty identifier.
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum OrmError {
    #[error("patch request has {masks} field masks for {objects} objects")]
    BadRepeatedFieldMask { masks: usize, objects: usize },

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("empty id in request")]
    EmptyId,

    #[error("hook failed: {0}")]
    Hook(String),

    #[error("identity unavailable: {0}")]
    Identity(String),

    #[error("nil argument in request")]
    NilArgument,

    #[error("record not found")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("unknown field path '{0}' in field mask")]
    UnknownFieldPath(String),
}

impl OrmError {
    /// Construct a hook failure from any displayable cause.
    pub fn hook(cause: impl std::fmt::Display) -> Self {
        Self::Hook(cause.to_string())
    }

    /// Construct a storage failure from any displayable cause.
    pub fn storage(cause: impl std::fmt::Display) -> Self {
        Self::Storage(cause.to_string())
    }
}

///
/// ConversionError
///
/// Malformed special-type payload met while converting between the wire
/// and storage forms.
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum ConversionError {
    #[error("invalid inet address '{0}'")]
    Inet(String),

    #[error("invalid json payload: {0}")]
    Json(String),

    #[error("list position {0} does not fit the position column")]
    Position(usize),

    #[error("resource identifier for '{message}': {reason}")]
    Resource { message: String, reason: String },

    #[error("invalid time of day: {0}")]
    TimeOnly(String),

    #[error("timestamp out of range: {seconds}s {nanos}ns")]
    Timestamp { seconds: i64, nanos: i32 },

    #[error("invalid uuid '{0}'")]
    Uuid(String),
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_errors_lift_into_orm_errors() {
        let err: OrmError = ConversionError::Uuid("nope".to_string()).into();

        assert!(
            matches!(err, OrmError::Conversion(ConversionError::Uuid(_))),
            "conversion errors should keep their kind"
        );
        assert_eq!(err.to_string(), "invalid uuid 'nope'");
    }

    #[test]
    fn bad_repeated_field_mask_reports_both_lengths() {
        let err = OrmError::BadRepeatedFieldMask {
            masks: 1,
            objects: 2,
        };

        assert_eq!(
            err.to_string(),
            "patch request has 1 field masks for 2 objects"
        );
    }
}
