use protorm_schema::{descriptor::GormTag, node::Field, types::AssociationKind};
use std::fmt::Write;

///
/// AssociationKeys
/// association part of the tag, from the edge or the legacy tag keys
///

#[derive(Default)]
struct AssociationKeys<'a> {
    foreign_key: Option<&'a str>,
    association_foreign_key: Option<&'a str>,
    join_table: Option<&'a str>,
    join_table_foreign_key: Option<&'a str>,
    association_join_table_foreign_key: Option<&'a str>,
    autoupdate: bool,
    autocreate: bool,
    save_reference: bool,
    preload: bool,
    clear: bool,
    replace: bool,
    append: bool,
}

// render_tag
/// Storage tag of a field: `` `gorm:"…" atlas:"…"` ``, or an empty string
/// when there is nothing to say.
#[must_use]
pub fn render_tag(field: &Field) -> String {
    let default = GormTag::default();
    let tag = field.tag.as_ref().unwrap_or(&default);

    let mut gorm = column_part(tag);
    let mut atlas = String::new();

    let keys = match &field.association {
        Some(assoc) => {
            let flags = &assoc.flags;
            let cascades = assoc.kind != AssociationKind::BelongsTo;
            let join = assoc.join_table.as_ref();

            if assoc.kind == AssociationKind::HasMany
                && let Some(position) = &assoc.position_field
            {
                push(&mut atlas, format_args!("position:{position}"));
            }

            AssociationKeys {
                foreign_key: Some(assoc.foreign_key.as_str()),
                association_foreign_key: Some(assoc.association_foreign_key.as_str()),
                join_table: join.map(|j| j.name.as_str()),
                join_table_foreign_key: join.map(|j| j.foreign_key.as_str()),
                association_join_table_foreign_key: join.map(|j| j.association_foreign_key.as_str()),
                autoupdate: flags.autoupdate,
                autocreate: flags.autocreate,
                save_reference: flags.save_reference,
                preload: flags.preload,
                clear: cascades && flags.clear,
                replace: cascades && flags.replace,
                append: cascades && flags.append,
            }
        }
        None => AssociationKeys {
            foreign_key: tag.foreignkey.as_deref(),
            association_foreign_key: tag.association_foreignkey.as_deref(),
            join_table: tag.many_to_many.as_deref(),
            join_table_foreign_key: tag.jointable_foreignkey.as_deref(),
            association_join_table_foreign_key: tag.association_jointable_foreignkey.as_deref(),
            autoupdate: tag.association_autoupdate,
            autocreate: tag.association_autocreate,
            save_reference: tag.association_save_reference,
            preload: tag.preload,
            ..Default::default()
        },
    };

    association_part(&mut gorm, &keys);

    let mut parts = Vec::new();
    if !gorm.is_empty() {
        parts.push(format!("gorm:\"{gorm}\""));
    }
    if !atlas.is_empty() {
        parts.push(format!("atlas:\"{atlas}\""));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!("`{}`", parts.join(" "))
    }
}

// column_part
fn column_part(tag: &GormTag) -> String {
    let mut out = String::new();

    if let Some(column) = non_empty(tag.column.as_deref()) {
        push(&mut out, format_args!("column:{column}"));
    }
    if let Some(ty) = non_empty(tag.ty.as_deref()) {
        push(&mut out, format_args!("type:{ty}"));
    }
    if tag.size > 0 {
        push(&mut out, format_args!("size:{}", tag.size));
    }
    if tag.precision > 0 {
        push(&mut out, format_args!("precision:{}", tag.precision));
    }
    if tag.primary_key {
        push(&mut out, format_args!("primary_key"));
    }
    if tag.unique {
        push(&mut out, format_args!("unique"));
    }
    if let Some(default) = non_empty(tag.default.as_deref()) {
        push(&mut out, format_args!("default:{default}"));
    }
    if tag.not_null {
        push(&mut out, format_args!("not null"));
    }
    if tag.auto_increment {
        push(&mut out, format_args!("auto_increment"));
    }
    if let Some(index) = non_empty(tag.index.as_deref()) {
        push(&mut out, format_args!("index:{index}"));
    }
    if let Some(index) = non_empty(tag.unique_index.as_deref()) {
        push(&mut out, format_args!("unique_index:{index}"));
    }
    if tag.embedded {
        push(&mut out, format_args!("embedded"));
    }
    if let Some(prefix) = non_empty(tag.embedded_prefix.as_deref()) {
        push(&mut out, format_args!("embedded_prefix:{prefix}"));
    }
    if tag.ignore {
        push(&mut out, format_args!("-"));
    }

    out
}

// association_part
fn association_part(out: &mut String, keys: &AssociationKeys<'_>) {
    if let Some(fk) = non_empty(keys.foreign_key) {
        push(out, format_args!("foreignkey:{fk}"));
    }
    if let Some(key) = non_empty(keys.association_foreign_key) {
        push(out, format_args!("association_foreignkey:{key}"));
    }
    if let Some(table) = non_empty(keys.join_table) {
        push(out, format_args!("many2many:{table}"));
    }
    if let Some(fk) = non_empty(keys.join_table_foreign_key) {
        push(out, format_args!("jointable_foreignkey:{fk}"));
    }
    if let Some(fk) = non_empty(keys.association_join_table_foreign_key) {
        push(out, format_args!("association_jointable_foreignkey:{fk}"));
    }
    if keys.autoupdate {
        push(out, format_args!("association_autoupdate:true"));
    }
    if keys.autocreate {
        push(out, format_args!("association_autocreate:true"));
    }
    if keys.save_reference {
        push(out, format_args!("association_save_reference:true"));
    }
    if keys.preload {
        push(out, format_args!("preload:true"));
    }

    // one cascade flag at most
    if keys.clear {
        push(out, format_args!("clear:true"));
    } else if keys.replace {
        push(out, format_args!("replace:true"));
    } else if keys.append {
        push(out, format_args!("append:true"));
    }
}

fn push(out: &mut String, item: std::fmt::Arguments<'_>) {
    if !out.is_empty() {
        out.push(';');
    }
    let _ = out.write_fmt(item);
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

///
/// TESTS
///
