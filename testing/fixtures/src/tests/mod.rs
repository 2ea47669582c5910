
use crate::shop::{Color, Part, Widget};
use protorm::core::{context::Context, error::OrmError, types::pb};

pub fn ctx() -> Context {
    Context::new()
}

/// Caller acting for `account`.
pub fn tenant(account: &'static str) -> Context {
    Context::new().with_identity(move || Ok::<_, OrmError>(account.to_string()))
}

pub fn part(id: i64, label: &str) -> Part {
    Part {
        id,
        label: label.to_string(),
    }
}

pub fn widget(id: &str, name: &str) -> Widget {
    Widget {
        id: id.to_string(),
        name: name.to_string(),
        color: Color::Red as i32,
        parts: vec![part(1, "bolt"), part(2, "nut")],
        created_at: Some(::prost_types::Timestamp {
            seconds: 1_700_000_000,
            nanos: 250,
        }),
        external_id: Some(pb::UuidValue {
            value: "67e55044-10b1-426f-9247-bb680e5fe0c8".to_string(),
        }),
        internal_note: String::new(),
    }
}
