//! Declarations as numbered members.
//!
//! A `SourceCodeInfo.Location.path` names nothing; it alternates protobuf
//! field numbers of `descriptor.proto` messages with indices into repeated
//! members. This module carries, per declaration kind, the static table of
//! those field numbers and an accessor that returns the member as a [`Value`].
//!
//! The tables list every member of `descriptor.proto` (including ones this
//! crate does not model, such as options and reserved ranges) so that a path
//! through an unmodelled member is told apart from a path that is simply
//! wrong for the declaration.

use crate::{
    EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FileDescriptor, MessageDescriptor,
    MethodDescriptor, OneofDescriptor, ServiceDescriptor,
};
use std::fmt;

// =============================================================================
// Field tables
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Optional,
    Repeated,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Optional => "optional",
            Label::Repeated => "repeated",
        }
    }
}

/// One member of a `descriptor.proto` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub number: i32,
    pub name: &'static str,
    pub label: Label,
}

const fn opt(number: i32, name: &'static str) -> FieldSpec {
    FieldSpec {
        number,
        name,
        label: Label::Optional,
    }
}

const fn rep(number: i32, name: &'static str) -> FieldSpec {
    FieldSpec {
        number,
        name,
        label: Label::Repeated,
    }
}

// google.protobuf.FileDescriptorProto
const FILE_FIELDS: &[FieldSpec] = &[
    opt(1, "name"),
    opt(2, "package"),
    rep(3, "dependency"),
    rep(4, "message_type"),
    rep(5, "enum_type"),
    rep(6, "service"),
    rep(7, "extension"),
    opt(8, "options"),
    opt(9, "source_code_info"),
    rep(10, "public_dependency"),
    rep(11, "weak_dependency"),
    opt(12, "syntax"),
    opt(14, "edition"),
];

// google.protobuf.DescriptorProto
const MESSAGE_FIELDS: &[FieldSpec] = &[
    opt(1, "name"),
    rep(2, "field"),
    rep(3, "nested_type"),
    rep(4, "enum_type"),
    rep(5, "extension_range"),
    rep(6, "extension"),
    opt(7, "options"),
    rep(8, "oneof_decl"),
    rep(9, "reserved_range"),
    rep(10, "reserved_name"),
];

// google.protobuf.FieldDescriptorProto
const FIELD_FIELDS: &[FieldSpec] = &[
    opt(1, "name"),
    opt(2, "extendee"),
    opt(3, "number"),
    opt(4, "label"),
    opt(5, "type"),
    opt(6, "type_name"),
    opt(7, "default_value"),
    opt(8, "options"),
    opt(9, "oneof_index"),
    opt(10, "json_name"),
    opt(17, "proto3_optional"),
];

// google.protobuf.OneofDescriptorProto
const ONEOF_FIELDS: &[FieldSpec] = &[opt(1, "name"), opt(2, "options")];

// google.protobuf.EnumDescriptorProto
const ENUM_FIELDS: &[FieldSpec] = &[
    opt(1, "name"),
    rep(2, "value"),
    opt(3, "options"),
    rep(4, "reserved_range"),
    rep(5, "reserved_name"),
];

// google.protobuf.EnumValueDescriptorProto
const ENUM_VALUE_FIELDS: &[FieldSpec] = &[opt(1, "name"), opt(2, "number"), opt(3, "options")];

// google.protobuf.ServiceDescriptorProto
const SERVICE_FIELDS: &[FieldSpec] = &[opt(1, "name"), rep(2, "method"), opt(3, "options")];

// google.protobuf.MethodDescriptorProto
const METHOD_FIELDS: &[FieldSpec] = &[
    opt(1, "name"),
    opt(2, "input_type"),
    opt(3, "output_type"),
    opt(4, "options"),
    opt(5, "client_streaming"),
    opt(6, "server_streaming"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    File,
    Message,
    Field,
    Oneof,
    Enum,
    EnumValue,
    Service,
    Method,
}

impl DeclKind {
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            DeclKind::File => FILE_FIELDS,
            DeclKind::Message => MESSAGE_FIELDS,
            DeclKind::Field => FIELD_FIELDS,
            DeclKind::Oneof => ONEOF_FIELDS,
            DeclKind::Enum => ENUM_FIELDS,
            DeclKind::EnumValue => ENUM_VALUE_FIELDS,
            DeclKind::Service => SERVICE_FIELDS,
            DeclKind::Method => METHOD_FIELDS,
        }
    }

    pub fn field(self, number: i32) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|spec| spec.number == number)
    }

    /// The `descriptor.proto` message this kind stands for.
    pub fn proto_name(self) -> &'static str {
        match self {
            DeclKind::File => "FileDescriptorProto",
            DeclKind::Message => "DescriptorProto",
            DeclKind::Field => "FieldDescriptorProto",
            DeclKind::Oneof => "OneofDescriptorProto",
            DeclKind::Enum => "EnumDescriptorProto",
            DeclKind::EnumValue => "EnumValueDescriptorProto",
            DeclKind::Service => "ServiceDescriptorProto",
            DeclKind::Method => "MethodDescriptorProto",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.proto_name())
    }
}

// =============================================================================
// Values
// =============================================================================

/// A borrowed declaration of any kind.
#[derive(Debug, Clone, Copy)]
pub enum DeclRef<'a> {
    File(&'a FileDescriptor),
    Message(&'a MessageDescriptor),
    Field(&'a FieldDescriptor),
    Oneof(&'a OneofDescriptor),
    Enum(&'a EnumDescriptor),
    EnumValue(&'a EnumValueDescriptor),
    Service(&'a ServiceDescriptor),
    Method(&'a MethodDescriptor),
}

/// The shape of a declaration member.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    /// A string member, e.g. `package` or an entry of `dependency`.
    Scalar(&'a str),
    /// A nested declaration.
    Node(DeclRef<'a>),
    /// A repeated member.
    List(Vec<Value<'a>>),
    /// An optional member that is not set.
    Absent,
    /// A member that is not a declaration or a string (options, numbers,
    /// ranges); carries the member's type for diagnostics.
    Opaque(&'static str),
}

impl Value<'_> {
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Node(_) => "declaration",
            Value::List(_) => "list",
            Value::Absent => "absent",
            Value::Opaque(_) => "opaque",
        }
    }
}

fn scalar(s: &Option<String>) -> Value<'_> {
    s.as_deref().map_or(Value::Absent, Value::Scalar)
}

fn strings(items: &[String]) -> Value<'_> {
    Value::List(items.iter().map(|s| Value::Scalar(s.as_str())).collect())
}

fn nodes<'a, T>(items: &'a [T], wrap: fn(&'a T) -> DeclRef<'a>) -> Value<'a> {
    Value::List(items.iter().map(|item| Value::Node(wrap(item))).collect())
}

impl<'a> DeclRef<'a> {
    pub fn kind(&self) -> DeclKind {
        match self {
            DeclRef::File(_) => DeclKind::File,
            DeclRef::Message(_) => DeclKind::Message,
            DeclRef::Field(_) => DeclKind::Field,
            DeclRef::Oneof(_) => DeclKind::Oneof,
            DeclRef::Enum(_) => DeclKind::Enum,
            DeclRef::EnumValue(_) => DeclKind::EnumValue,
            DeclRef::Service(_) => DeclKind::Service,
            DeclRef::Method(_) => DeclKind::Method,
        }
    }

    pub fn name(&self) -> Option<&'a str> {
        match *self {
            DeclRef::File(d) => d.name.as_deref(),
            DeclRef::Message(d) => d.name.as_deref(),
            DeclRef::Field(d) => d.name.as_deref(),
            DeclRef::Oneof(d) => d.name.as_deref(),
            DeclRef::Enum(d) => d.name.as_deref(),
            DeclRef::EnumValue(d) => d.name.as_deref(),
            DeclRef::Service(d) => d.name.as_deref(),
            DeclRef::Method(d) => d.name.as_deref(),
        }
    }

    /// Look up the member with the given `descriptor.proto` field number.
    ///
    /// `None` means the number is not a member of this kind at all.
    pub fn member(&self, number: i32) -> Option<(&'static FieldSpec, Value<'a>)> {
        let spec = self.kind().field(number)?;
        Some((spec, self.value_of(spec)))
    }

    fn value_of(&self, spec: &'static FieldSpec) -> Value<'a> {
        match (*self, spec.number) {
            (DeclRef::File(d), 1) => scalar(&d.name),
            (DeclRef::File(d), 2) => scalar(&d.package),
            (DeclRef::File(d), 3) => strings(&d.dependency),
            (DeclRef::File(d), 4) => nodes(&d.message_type, DeclRef::Message),
            (DeclRef::File(d), 5) => nodes(&d.enum_type, DeclRef::Enum),
            (DeclRef::File(d), 6) => nodes(&d.service, DeclRef::Service),
            (DeclRef::File(d), 7) => nodes(&d.extension, DeclRef::Field),
            (DeclRef::File(d), 12) => scalar(&d.syntax),

            (DeclRef::Message(d), 1) => scalar(&d.name),
            (DeclRef::Message(d), 2) => nodes(&d.field, DeclRef::Field),
            (DeclRef::Message(d), 3) => nodes(&d.nested_type, DeclRef::Message),
            (DeclRef::Message(d), 4) => nodes(&d.enum_type, DeclRef::Enum),
            (DeclRef::Message(d), 6) => nodes(&d.extension, DeclRef::Field),
            (DeclRef::Message(d), 8) => nodes(&d.oneof_decl, DeclRef::Oneof),
            (DeclRef::Message(d), 10) => strings(&d.reserved_name),

            (DeclRef::Field(d), 1) => scalar(&d.name),
            (DeclRef::Field(d), 2) => scalar(&d.extendee),
            (DeclRef::Field(d), 6) => scalar(&d.type_name),
            (DeclRef::Field(d), 7) => scalar(&d.default_value),
            (DeclRef::Field(d), 10) => scalar(&d.json_name),

            (DeclRef::Oneof(d), 1) => scalar(&d.name),

            (DeclRef::Enum(d), 1) => scalar(&d.name),
            (DeclRef::Enum(d), 2) => nodes(&d.value, DeclRef::EnumValue),
            (DeclRef::Enum(d), 5) => strings(&d.reserved_name),

            (DeclRef::EnumValue(d), 1) => scalar(&d.name),

            (DeclRef::Service(d), 1) => scalar(&d.name),
            (DeclRef::Service(d), 2) => nodes(&d.method, DeclRef::Method),

            (DeclRef::Method(d), 1) => scalar(&d.name),
            (DeclRef::Method(d), 2) => scalar(&d.input_type),
            (DeclRef::Method(d), 3) => scalar(&d.output_type),

            _ => Value::Opaque(spec.name),
        }
    }
}
