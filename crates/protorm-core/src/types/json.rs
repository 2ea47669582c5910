use crate::error::ConversionError;
use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

///
/// Jsonb
///
/// Binary JSON column; the wire side carries the document as a string.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, From, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Jsonb(pub serde_json::Value);

impl Jsonb {
    /// Parse the wire document.
    pub fn parse(raw: &str) -> Result<Self, ConversionError> {
        serde_json::from_str(raw)
            .map(Self)
            .map_err(|e| ConversionError::Json(e.to_string()))
    }

    /// Serialize back to the wire document.
    pub fn to_raw(&self) -> Result<String, ConversionError> {
        serde_json::to_string(&self.0).map_err(|e| ConversionError::Json(e.to_string()))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn documents_round_trip_semantically() {
        let doc = Jsonb::parse(r#"{ "b": [1, 2], "a": null }"#).expect("valid json");

        assert_eq!(*doc, json!({ "a": null, "b": [1, 2] }));
        assert_eq!(Jsonb::parse(&doc.to_raw().expect("serializes")).expect("reparses"), doc);
    }

    #[test]
    fn malformed_documents_fail() {
        assert!(matches!(
            Jsonb::parse("{ nope"),
            Err(ConversionError::Json(_))
        ));
    }
}
