//! Protobuf descriptor input (compiler requests + descriptor sets).
//!
//! Two encodings are accepted and converge on one model:
//!
//! - **JSON**, as written by `buf build --as-file-descriptor-set -o x.json`
//!   or by any protobuf JSON mapping of `CodeGeneratorRequest`.
//! - **Binary**, as handed to a `protoc` plugin on stdin, or written by
//!   `protoc --include_source_info --descriptor_set_out`.
//!
//! The binary path decodes with `prost-types` and converts; enum members
//! (`label`, `type`) are kept as their proto names (`LABEL_REPEATED`) so both
//! encodings produce identical models.
//!
//! [`schema`] exposes the model as a tree of numbered members, which is what
//! `SourceCodeInfo` paths index into.

use prost::Message as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod schema;

pub use schema::{DeclKind, DeclRef, FieldSpec, Label, Value};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to parse descriptor JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to decode binary descriptor: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("file `{0}` is not part of the descriptor set")]
    UnknownFile(String),
}

// =============================================================================
// Model
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodeGeneratorRequest {
    pub file_to_generate: Vec<String>,
    pub parameter: Option<String>,
    pub proto_file: Vec<FileDescriptor>,
}

impl CodeGeneratorRequest {
    /// Wrap a descriptor set as a request.
    ///
    /// With an empty `files`, every file of the set is generated.
    pub fn from_descriptor_set(
        set: FileDescriptorSet,
        files: &[String],
    ) -> Result<Self, DescriptorError> {
        let mut request = Self {
            file_to_generate: set.file.iter().filter_map(|f| f.name.clone()).collect(),
            parameter: None,
            proto_file: set.file,
        };
        request.select_files(files)?;
        Ok(request)
    }

    /// Replace `file_to_generate` with `files`; an empty `files` keeps it.
    ///
    /// Every selected name must be one of `proto_file`.
    pub fn select_files(&mut self, files: &[String]) -> Result<(), DescriptorError> {
        if files.is_empty() {
            return Ok(());
        }
        for wanted in files {
            if !self
                .proto_file
                .iter()
                .any(|f| f.name.as_deref() == Some(wanted.as_str()))
            {
                return Err(DescriptorError::UnknownFile(wanted.clone()));
            }
        }
        self.file_to_generate = files.to_vec();
        Ok(())
    }

    /// Files listed in `file_to_generate`, in `proto_file` order.
    ///
    /// Files only present as imports are skipped.
    pub fn files_to_generate(&self) -> impl Iterator<Item = &FileDescriptor> + '_ {
        self.proto_file.iter().filter(|file| {
            self.file_to_generate
                .iter()
                .any(|gen| file.name.as_deref() == Some(gen.as_str()))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDescriptorSet {
    pub file: Vec<FileDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: Option<String>,
    pub package: Option<String>,
    pub dependency: Vec<String>,
    pub message_type: Vec<MessageDescriptor>,
    pub enum_type: Vec<EnumDescriptor>,
    pub service: Vec<ServiceDescriptor>,
    pub extension: Vec<FieldDescriptor>,
    pub source_code_info: Option<SourceCodeInfo>,
    pub syntax: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessageDescriptor {
    pub name: Option<String>,
    pub field: Vec<FieldDescriptor>,
    pub nested_type: Vec<MessageDescriptor>,
    pub enum_type: Vec<EnumDescriptor>,
    pub extension: Vec<FieldDescriptor>,
    pub oneof_decl: Vec<OneofDescriptor>,
    pub reserved_name: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: Option<String>,
    pub number: Option<i32>,
    #[serde(deserialize_with = "label_name")]
    pub label: Option<String>,
    #[serde(rename = "type", deserialize_with = "type_name")]
    pub typ: Option<String>,
    pub type_name: Option<String>,
    pub extendee: Option<String>,
    pub default_value: Option<String>,
    pub oneof_index: Option<i32>,
    pub json_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneofDescriptor {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnumDescriptor {
    pub name: Option<String>,
    pub value: Vec<EnumValueDescriptor>,
    pub reserved_name: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumValueDescriptor {
    pub name: Option<String>,
    pub number: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceDescriptor {
    pub name: Option<String>,
    pub method: Vec<MethodDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MethodDescriptor {
    pub name: Option<String>,
    pub input_type: Option<String>,
    pub output_type: Option<String>,
    pub client_streaming: Option<bool>,
    pub server_streaming: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCodeInfo {
    pub location: Vec<Location>,
}

/// One `SourceCodeInfo.Location`: a declaration path plus the comments found
/// around it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    pub path: Vec<i32>,
    pub span: Vec<i32>,
    pub leading_comments: Option<String>,
    pub trailing_comments: Option<String>,
    pub leading_detached_comments: Vec<String>,
}

impl Location {
    pub fn leading(&self) -> &str {
        self.leading_comments.as_deref().unwrap_or("")
    }
}

// Protobuf JSON allows enums as names or numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum EnumRepr {
    Name(String),
    Number(i32),
}

fn label_name<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EnumRepr>::deserialize(de)?.map(|repr| match repr {
        EnumRepr::Name(name) => name,
        EnumRepr::Number(n) => label_from_i32(n),
    }))
}

fn type_name<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<EnumRepr>::deserialize(de)?.map(|repr| match repr {
        EnumRepr::Name(name) => name,
        EnumRepr::Number(n) => type_from_i32(n),
    }))
}

fn label_from_i32(n: i32) -> String {
    prost_types::field_descriptor_proto::Label::try_from(n)
        .map(|l| l.as_str_name().to_string())
        .unwrap_or_else(|_| n.to_string())
}

fn type_from_i32(n: i32) -> String {
    prost_types::field_descriptor_proto::Type::try_from(n)
        .map(|t| t.as_str_name().to_string())
        .unwrap_or_else(|_| n.to_string())
}

// =============================================================================
// Loading
// =============================================================================

pub fn parse_request_json(text: &str) -> Result<CodeGeneratorRequest, DescriptorError> {
    Ok(serde_json::from_str(text)?)
}

pub fn parse_descriptor_set_json(text: &str) -> Result<FileDescriptorSet, DescriptorError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode a binary `google.protobuf.compiler.CodeGeneratorRequest`.
pub fn decode_request(bytes: &[u8]) -> Result<CodeGeneratorRequest, DescriptorError> {
    let raw = prost_types::compiler::CodeGeneratorRequest::decode(bytes)?;
    Ok(CodeGeneratorRequest {
        file_to_generate: raw.file_to_generate,
        parameter: raw.parameter,
        proto_file: raw.proto_file.into_iter().map(Into::into).collect(),
    })
}

/// Decode a binary `google.protobuf.FileDescriptorSet`.
pub fn decode_descriptor_set(bytes: &[u8]) -> Result<FileDescriptorSet, DescriptorError> {
    let raw = prost_types::FileDescriptorSet::decode(bytes)?;
    Ok(FileDescriptorSet {
        file: raw.file.into_iter().map(Into::into).collect(),
    })
}

/// Load a request from any supported encoding.
///
/// JSON is detected by its first non-whitespace byte. JSON objects carrying
/// `protoFile` are requests; anything else is read as a descriptor set. Binary
/// input is tried as a request first. A descriptor set's files (field 1)
/// either fail to decode there or land in `file_to_generate` (also field 1),
/// never in `proto_file` (field 15), so a request without files falls back to
/// the set.
pub fn load_request(bytes: &[u8], files: &[String]) -> Result<CodeGeneratorRequest, DescriptorError> {
    let first = bytes.iter().copied().find(|b| !b.is_ascii_whitespace());
    if first == Some(b'{') {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if value.get("protoFile").is_some() {
            let mut request: CodeGeneratorRequest = serde_json::from_value(value)?;
            request.select_files(files)?;
            return Ok(request);
        }
        let set: FileDescriptorSet = serde_json::from_value(value)?;
        return CodeGeneratorRequest::from_descriptor_set(set, files);
    }

    if let Ok(mut request) = decode_request(bytes) {
        if !request.proto_file.is_empty() {
            request.select_files(files)?;
            return Ok(request);
        }
    }
    let set = decode_descriptor_set(bytes)?;
    CodeGeneratorRequest::from_descriptor_set(set, files)
}

// =============================================================================
// prost-types → model
// =============================================================================

impl From<prost_types::FileDescriptorProto> for FileDescriptor {
    fn from(raw: prost_types::FileDescriptorProto) -> Self {
        Self {
            name: raw.name,
            package: raw.package,
            dependency: raw.dependency,
            message_type: raw.message_type.into_iter().map(Into::into).collect(),
            enum_type: raw.enum_type.into_iter().map(Into::into).collect(),
            service: raw.service.into_iter().map(Into::into).collect(),
            extension: raw.extension.into_iter().map(Into::into).collect(),
            source_code_info: raw.source_code_info.map(Into::into),
            syntax: raw.syntax,
        }
    }
}

impl From<prost_types::DescriptorProto> for MessageDescriptor {
    fn from(raw: prost_types::DescriptorProto) -> Self {
        Self {
            name: raw.name,
            field: raw.field.into_iter().map(Into::into).collect(),
            nested_type: raw.nested_type.into_iter().map(Into::into).collect(),
            enum_type: raw.enum_type.into_iter().map(Into::into).collect(),
            extension: raw.extension.into_iter().map(Into::into).collect(),
            oneof_decl: raw
                .oneof_decl
                .into_iter()
                .map(|o| OneofDescriptor { name: o.name })
                .collect(),
            reserved_name: raw.reserved_name,
        }
    }
}

impl From<prost_types::FieldDescriptorProto> for FieldDescriptor {
    fn from(raw: prost_types::FieldDescriptorProto) -> Self {
        Self {
            name: raw.name,
            number: raw.number,
            label: raw.label.map(label_from_i32),
            typ: raw.r#type.map(type_from_i32),
            type_name: raw.type_name,
            extendee: raw.extendee,
            default_value: raw.default_value,
            oneof_index: raw.oneof_index,
            json_name: raw.json_name,
        }
    }
}

impl From<prost_types::EnumDescriptorProto> for EnumDescriptor {
    fn from(raw: prost_types::EnumDescriptorProto) -> Self {
        Self {
            name: raw.name,
            value: raw
                .value
                .into_iter()
                .map(|v| EnumValueDescriptor {
                    name: v.name,
                    number: v.number,
                })
                .collect(),
            reserved_name: raw.reserved_name,
        }
    }
}

impl From<prost_types::ServiceDescriptorProto> for ServiceDescriptor {
    fn from(raw: prost_types::ServiceDescriptorProto) -> Self {
        Self {
            name: raw.name,
            method: raw
                .method
                .into_iter()
                .map(|m| MethodDescriptor {
                    name: m.name,
                    input_type: m.input_type,
                    output_type: m.output_type,
                    client_streaming: m.client_streaming,
                    server_streaming: m.server_streaming,
                })
                .collect(),
        }
    }
}

impl From<prost_types::SourceCodeInfo> for SourceCodeInfo {
    fn from(raw: prost_types::SourceCodeInfo) -> Self {
        Self {
            location: raw
                .location
                .into_iter()
                .map(|l| Location {
                    path: l.path,
                    span: l.span,
                    leading_comments: l.leading_comments,
                    trailing_comments: l.trailing_comments,
                    leading_detached_comments: l.leading_detached_comments,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message as _;

    const SET_JSON: &str = r#"{
      "file": [
        {
          "name": "general.proto",
          "package": "general",
          "messageType": [
            { "name": "RequestMessage",
              "field": [{ "name": "input", "number": 1, "label": "LABEL_OPTIONAL", "type": 9 }] }
          ],
          "sourceCodeInfo": {
            "location": [
              { "path": [2], "span": [3, 0, 16], "leadingComments": " General package\n" }
            ]
          }
        },
        { "name": "google/api/annotations.proto", "package": "google.api" }
      ]
    }"#;

    #[test]
    fn descriptor_set_json_parses_camel_case_and_numeric_enums() {
        let set = parse_descriptor_set_json(SET_JSON).expect("parse");
        assert_eq!(set.file.len(), 2);
        let field = &set.file[0].message_type[0].field[0];
        assert_eq!(field.label.as_deref(), Some("LABEL_OPTIONAL"));
        assert_eq!(field.typ.as_deref(), Some("TYPE_STRING"));
        let loc = &set.file[0].source_code_info.as_ref().expect("sci").location[0];
        assert_eq!(loc.path, vec![2]);
        assert_eq!(loc.leading(), " General package\n");
    }

    #[test]
    fn load_request_limits_generation_to_requested_files() {
        let files = vec!["general.proto".to_string()];
        let request = load_request(SET_JSON.as_bytes(), &files).expect("load");
        let names: Vec<_> = request
            .files_to_generate()
            .filter_map(|f| f.name.as_deref())
            .collect();
        assert_eq!(names, vec!["general.proto"]);
    }

    #[test]
    fn load_request_without_files_generates_everything() {
        let request = load_request(SET_JSON.as_bytes(), &[]).expect("load");
        assert_eq!(request.files_to_generate().count(), 2);
    }

    #[test]
    fn unknown_requested_file_is_an_error() {
        let files = vec!["missing.proto".to_string()];
        let err = load_request(SET_JSON.as_bytes(), &files).unwrap_err();
        assert!(matches!(err, DescriptorError::UnknownFile(name) if name == "missing.proto"));
    }

    #[test]
    fn binary_request_roundtrips_through_prost() {
        let raw = prost_types::compiler::CodeGeneratorRequest {
            file_to_generate: vec!["a.proto".to_string()],
            proto_file: vec![prost_types::FileDescriptorProto {
                name: Some("a.proto".to_string()),
                package: Some("a".to_string()),
                message_type: vec![prost_types::DescriptorProto {
                    name: Some("Widget".to_string()),
                    field: vec![prost_types::FieldDescriptorProto {
                        name: Some("id".to_string()),
                        number: Some(1),
                        label: Some(3),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let bytes = raw.encode_to_vec();

        let request = load_request(&bytes, &[]).expect("decode");
        assert_eq!(request.file_to_generate, vec!["a.proto".to_string()]);
        let field = &request.proto_file[0].message_type[0].field[0];
        assert_eq!(field.name.as_deref(), Some("id"));
        assert_eq!(field.label.as_deref(), Some("LABEL_REPEATED"));
    }

    #[test]
    fn request_selection_rejects_files_it_does_not_carry() {
        let json = r#"{
          "fileToGenerate": ["a.proto"],
          "protoFile": [{ "name": "a.proto" }, { "name": "b.proto" }]
        }"#;
        let files = vec!["b.proto".to_string()];
        let request = load_request(json.as_bytes(), &files).expect("load");
        assert_eq!(request.file_to_generate, files);

        let files = vec!["missing.proto".to_string()];
        let err = load_request(json.as_bytes(), &files).unwrap_err();
        assert!(matches!(err, DescriptorError::UnknownFile(name) if name == "missing.proto"));

        let raw = prost_types::compiler::CodeGeneratorRequest {
            file_to_generate: vec!["a.proto".to_string()],
            proto_file: vec![prost_types::FileDescriptorProto {
                name: Some("a.proto".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = load_request(&raw.encode_to_vec(), &files).unwrap_err();
        assert!(matches!(err, DescriptorError::UnknownFile(name) if name == "missing.proto"));
    }

    #[test]
    fn binary_descriptor_set_falls_back_from_request_decoding() {
        let raw = prost_types::FileDescriptorSet {
            file: vec![prost_types::FileDescriptorProto {
                name: Some("b.proto".to_string()),
                ..Default::default()
            }],
        };
        let request = load_request(&raw.encode_to_vec(), &[]).expect("decode");
        assert_eq!(request.file_to_generate, vec!["b.proto".to_string()]);
        assert_eq!(request.proto_file.len(), 1);
    }
}
