//! Descriptor builders for resolver and validation tests.

use crate::{
    descriptor::{
        AssociationOptions, CompilationUnit, EnumDescriptor, ExtraField, FieldDescriptor,
        FieldOptions, FileDescriptor, GormTag, MessageDescriptor, MessageOptions,
    },
    prelude::*,
};

pub fn unit(files: Vec<FileDescriptor>) -> CompilationUnit {
    CompilationUnit { files }
}

pub fn file(name: &str, package: &str, messages: Vec<MessageDescriptor>) -> FileDescriptor {
    FileDescriptor {
        name: name.to_string(),
        package: package.to_string(),
        messages,
        enums: Vec::new(),
    }
}

pub fn enum_desc(name: &str) -> EnumDescriptor {
    EnumDescriptor {
        name: name.to_string(),
        values: Vec::new(),
    }
}

///
/// MessageBuilder
///

pub struct MessageBuilder(MessageDescriptor);

pub fn msg(name: &str) -> MessageBuilder {
    MessageBuilder(MessageDescriptor {
        name: name.to_string(),
        ..Default::default()
    })
}

impl MessageBuilder {
    fn options(&mut self) -> &mut MessageOptions {
        self.0.options.get_or_insert_with(MessageOptions::default)
    }

    pub fn ormable(mut self) -> Self {
        self.options().ormable = true;
        self
    }

    pub fn multi_account(mut self) -> Self {
        self.options().multi_account = true;
        self
    }

    pub fn table(mut self, table: &str) -> Self {
        self.options().table = Some(table.to_string());
        self
    }

    pub fn engine(mut self, engine: Engine) -> Self {
        self.options().engine = Some(engine);
        self
    }

    pub fn include(mut self, name: &str, ty: &str, package: Option<&str>) -> Self {
        self.options().include.push(ExtraField {
            name: name.to_string(),
            ty: ty.to_string(),
            package: package.map(str::to_string),
            tag: None,
        });
        self
    }

    pub fn field(mut self, mut field: FieldDescriptor) -> Self {
        if field.number == 0 {
            field.number = i32::try_from(self.0.fields.len() + 1).unwrap_or(i32::MAX);
        }
        self.0.fields.push(field);
        self
    }

    pub fn nested(mut self, nested: MessageDescriptor) -> Self {
        self.0.nested_messages.push(nested);
        self
    }

    pub fn nested_enum(mut self, desc: EnumDescriptor) -> Self {
        self.0.enums.push(desc);
        self
    }

    pub fn build(self) -> MessageDescriptor {
        self.0
    }
}

pub fn scalar(name: &str, kind: Kind) -> FieldDescriptor {
    FieldDescriptor {
        name: name.to_string(),
        number: 0,
        kind,
        label: Label::Optional,
        type_name: None,
        options: None,
    }
}

pub fn message_field(name: &str, type_name: &str) -> FieldDescriptor {
    FieldDescriptor {
        type_name: Some(format!(".{type_name}")),
        ..scalar(name, Kind::Message)
    }
}

pub fn enum_field(name: &str, type_name: &str) -> FieldDescriptor {
    FieldDescriptor {
        type_name: Some(format!(".{type_name}")),
        ..scalar(name, Kind::Enum)
    }
}

pub fn pk_tag() -> GormTag {
    GormTag {
        primary_key: true,
        ..Default::default()
    }
}

pub fn assoc(kind: AssociationKind) -> AssociationOptions {
    AssociationOptions::new(kind)
}

///
/// FieldExt
///

pub trait FieldExt {
    fn repeated(self) -> Self;
    fn dropped(self) -> Self;
    fn tag(self, tag: GormTag) -> Self;
    fn association(self, association: AssociationOptions) -> Self;
    fn reference_of(self, name: &str) -> Self;
}

impl FieldExt for FieldDescriptor {
    fn repeated(mut self) -> Self {
        self.label = Label::Repeated;
        self
    }

    fn dropped(mut self) -> Self {
        self.options.get_or_insert_with(FieldOptions::default).drop = true;
        self
    }

    fn tag(mut self, tag: GormTag) -> Self {
        self.options.get_or_insert_with(FieldOptions::default).tag = Some(tag);
        self
    }

    fn association(mut self, association: AssociationOptions) -> Self {
        self.options.get_or_insert_with(FieldOptions::default).association = Some(association);
        self
    }

    fn reference_of(mut self, name: &str) -> Self {
        self.options.get_or_insert_with(FieldOptions::default).reference_of = Some(name.to_string());
        self
    }
}
