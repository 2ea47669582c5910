//! Opaque resource identifiers.
//!
//! An `Identifier` column is stored in whatever shape its tag asks for
//! (text, integer, bytes, or opaque). The codec registered for the owning
//! message translates between the wire identifier and that storage value.

use crate::{error::ConversionError, value::Value};
use protorm_utils::to_db_name;
use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};

///
/// Identifier
///
/// Wire form: `<application_name>/<resource_type>/<resource_id>`.
///

#[derive(Clone, Eq, Hash, PartialEq, ::prost::Message)]
pub struct Identifier {
    #[prost(string, tag = "1")]
    pub application_name: String,

    #[prost(string, tag = "2")]
    pub resource_type: String,

    #[prost(string, tag = "3")]
    pub resource_id: String,
}

impl Identifier {
    #[must_use]
    pub fn new(application_name: &str, resource_type: &str, resource_id: &str) -> Self {
        Self {
            application_name: application_name.to_string(),
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.application_name.is_empty() && self.resource_type.is_empty() {
            return f.write_str(&self.resource_id);
        }

        write!(
            f,
            "{}/{}/{}",
            self.application_name, self.resource_type, self.resource_id
        )
    }
}

impl FromStr for Identifier {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((application_name, rest)) = s.split_once('/') else {
            return Ok(Self::new("", "", s));
        };
        let Some((resource_type, resource_id)) = rest.rsplit_once('/') else {
            return Err(ConversionError::Resource {
                message: String::new(),
                reason: format!("'{s}' has no resource type"),
            });
        };

        Ok(Self::new(application_name, resource_type, resource_id))
    }
}

///
/// ResourceValue
///
/// Storage form of an identifier whose column type is not fixed.
///

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum ResourceValue {
    Bytes(Vec<u8>),
    Int(i64),
    #[default]
    Null,
    Text(String),
}

impl From<String> for ResourceValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for ResourceValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<Vec<u8>> for ResourceValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<ResourceValue> for Value {
    fn from(v: ResourceValue) -> Self {
        match v {
            ResourceValue::Bytes(b) => Self::Bytes(b),
            ResourceValue::Int(i) => Self::Int(i),
            ResourceValue::Null => Self::Null,
            ResourceValue::Text(s) => Self::Text(s),
        }
    }
}

///
/// ResourceCodec
///

pub trait ResourceCodec: Send + Sync {
    /// Wire identifier to storage value.
    fn decode(&self, message: &str, id: &Identifier) -> Result<ResourceValue, ConversionError>;

    /// Storage value to wire identifier; `None` for an empty value.
    fn encode(
        &self,
        message: &str,
        value: &ResourceValue,
    ) -> Result<Option<Identifier>, ConversionError>;
}

///
/// DefaultCodec
///
/// Stores the bare resource id and rebuilds the identifier from the
/// message's table-style name.
///

#[derive(Clone, Debug, Default)]
pub struct DefaultCodec {
    pub application_name: String,
}

impl DefaultCodec {
    #[must_use]
    pub const fn new(application_name: String) -> Self {
        Self { application_name }
    }
}

impl ResourceCodec for DefaultCodec {
    fn decode(&self, message: &str, id: &Identifier) -> Result<ResourceValue, ConversionError> {
        if !self.application_name.is_empty()
            && !id.application_name.is_empty()
            && id.application_name != self.application_name
        {
            return Err(resource_error(
                message,
                format!(
                    "application '{}' does not match '{}'",
                    id.application_name, self.application_name
                ),
            ));
        }

        if id.resource_id.is_empty() {
            return Ok(ResourceValue::Null);
        }

        Ok(ResourceValue::Text(id.resource_id.clone()))
    }

    fn encode(
        &self,
        message: &str,
        value: &ResourceValue,
    ) -> Result<Option<Identifier>, ConversionError> {
        let resource_id = match value {
            ResourceValue::Null => return Ok(None),
            ResourceValue::Text(s) if s.is_empty() => return Ok(None),
            ResourceValue::Text(s) => s.clone(),
            ResourceValue::Int(i) => i.to_string(),
            ResourceValue::Bytes(b) => String::from_utf8(b.clone())
                .map_err(|e| resource_error(message, format!("resource id is not utf-8: {e}")))?,
        };

        Ok(Some(Identifier {
            application_name: self.application_name.clone(),
            resource_type: to_db_name(message),
            resource_id,
        }))
    }
}

static DEFAULT_CODEC: DefaultCodec = DefaultCodec {
    application_name: String::new(),
};

///
/// Resources
///
/// Codec registry keyed by owning message name, with a fallback codec.
///

#[derive(Clone, Default)]
pub struct Resources {
    fallback: Option<Arc<dyn ResourceCodec>>,
    codecs: HashMap<String, Arc<dyn ResourceCodec>>,
}

impl Resources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec used for messages without their own registration.
    pub fn set_fallback(&mut self, codec: Arc<dyn ResourceCodec>) -> &mut Self {
        self.fallback = Some(codec);
        self
    }

    pub fn register(&mut self, message: &str, codec: Arc<dyn ResourceCodec>) -> &mut Self {
        self.codecs.insert(message.to_string(), codec);
        self
    }

    fn codec(&self, message: &str) -> &dyn ResourceCodec {
        match (self.codecs.get(message), &self.fallback) {
            (Some(codec), _) | (None, Some(codec)) => codec.as_ref(),
            (None, None) => &DEFAULT_CODEC,
        }
    }

    pub fn decode(&self, message: &str, id: &Identifier) -> Result<ResourceValue, ConversionError> {
        self.codec(message).decode(message, id)
    }

    pub fn decode_text(&self, message: &str, id: &Identifier) -> Result<String, ConversionError> {
        match self.decode(message, id)? {
            ResourceValue::Null => Ok(String::new()),
            ResourceValue::Text(s) => Ok(s),
            ResourceValue::Int(i) => Ok(i.to_string()),
            ResourceValue::Bytes(b) => String::from_utf8(b)
                .map_err(|e| resource_error(message, format!("resource id is not utf-8: {e}"))),
        }
    }

    pub fn decode_i64(&self, message: &str, id: &Identifier) -> Result<i64, ConversionError> {
        match self.decode(message, id)? {
            ResourceValue::Null => Ok(0),
            ResourceValue::Int(i) => Ok(i),
            ResourceValue::Text(s) => s
                .parse()
                .map_err(|e| resource_error(message, format!("'{s}' is not an integer id: {e}"))),
            ResourceValue::Bytes(_) => Err(resource_error(
                message,
                "byte resource id cannot be stored as an integer".to_string(),
            )),
        }
    }

    pub fn decode_bytes(&self, message: &str, id: &Identifier) -> Result<Vec<u8>, ConversionError> {
        match self.decode(message, id)? {
            ResourceValue::Null => Ok(Vec::new()),
            ResourceValue::Bytes(b) => Ok(b),
            ResourceValue::Text(s) => Ok(s.into_bytes()),
            ResourceValue::Int(i) => Ok(i.to_string().into_bytes()),
        }
    }

    pub fn encode(
        &self,
        message: &str,
        value: impl Into<ResourceValue>,
    ) -> Result<Option<Identifier>, ConversionError> {
        self.codec(message).encode(message, &value.into())
    }
}

impl fmt::Debug for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resources")
            .field("codecs", &self.codecs.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

fn resource_error(message: &str, reason: String) -> ConversionError {
    ConversionError::Resource {
        message: message.to_string(),
        reason,
    }
}

///
/// TESTS
///
