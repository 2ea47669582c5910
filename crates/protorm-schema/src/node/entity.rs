use crate::{prelude::*, resolve::primary_key};

///
/// Entity
/// storage model of one mappable message
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Entity {
    /// Short message name, e.g. `Widget`.
    pub origin_name: String,

    /// Qualified message name, e.g. `shop.Widget`.
    pub full_name: String,

    pub package: String,
    pub file: String,

    /// Enclosing messages of a nested message, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,

    /// `origin_name + "ORM"`.
    pub generated_name: String,

    pub table_name: String,
    pub multi_account: bool,
    pub engine: Engine,

    /// Storage fields in declaration order.
    pub fields: Vec<Field>,

    /// Every field of the wire message, dropped ones included.
    pub wire: Vec<WireField>,
}

impl Entity {
    /// Name of the injected tenant column.
    pub const ACCOUNT_ID: &'static str = "account_id";

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Association fields in declaration order.
    pub fn associations(&self) -> impl Iterator<Item = (&Field, &Association)> {
        self.fields
            .iter()
            .filter_map(|f| f.association.as_ref().map(|a| (f, a)))
    }

    /// Identifying field, if any.
    #[must_use]
    pub fn primary_key(&self) -> Option<&Field> {
        primary_key::find_primary_key(self).ok().map(|(_, field)| field)
    }

    #[must_use]
    pub fn has_primary_key(&self) -> bool {
        primary_key::has_primary_key(self)
    }

    /// Wire field by proto name.
    #[must_use]
    pub fn wire_field(&self, proto_name: &str) -> Option<&WireField> {
        self.wire.iter().find(|w| w.proto_name == proto_name)
    }

    /// The wire message declares an `id` field.
    #[must_use]
    pub fn has_wire_id(&self) -> bool {
        self.wire
            .iter()
            .any(|w| w.proto_name.eq_ignore_ascii_case("id"))
    }

    /// Snake-case suffix of the generated CRUD functions.
    #[must_use]
    pub fn fn_suffix(&self) -> String {
        protorm_utils::to_db_name(&self.origin_name)
    }
}
