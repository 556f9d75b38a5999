//! The documentation tree ("deftree").
//!
//! One node per documented declaration, nested the way the `.proto` source
//! nests them:
//!
//! ```text
//! MicroserviceDefinition            (package)
//! └── ProtoFile                     "general.proto"
//!     ├── Message                   "RequestMessage"
//!     │   ├── MessageField          "input"
//!     │   ├── Message               (nested)
//!     │   └── Enum                  (nested)
//!     ├── Enum ── EnumValue
//!     └── Service ── ServiceMethod
//! ```
//!
//! Every node is found from its parent by exact name, so a name path such as
//! `["general.proto", "RequestMessage", "input"]` addresses a single node.

use protodoc_descriptor::{
    CodeGeneratorRequest, EnumDescriptor, FieldDescriptor, FileDescriptor, MessageDescriptor,
    MethodDescriptor, ServiceDescriptor,
};
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Contracts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeftreeError {
    #[error("cannot find node `{missing}` (name path {path:?})")]
    NodeNotFound { path: Vec<String>, missing: String },

    #[error("name path is empty")]
    EmptyPath,

    #[error("name `{name}` is ambiguous under {parent:?}")]
    Ambiguous { parent: Vec<String>, name: String },
}

impl DeftreeError {
    /// The name path simply has no node in this tree.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DeftreeError::NodeNotFound { .. })
    }
}

/// A named, documentable node.
pub trait Describable {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn set_description(&mut self, text: &str);
    fn children(&self) -> Vec<&dyn Describable>;
    fn children_mut(&mut self) -> Vec<&mut dyn Describable>;
}

/// The write side used while recovering comments.
pub trait Deftree {
    /// Package-level documentation.
    fn set_description(&mut self, text: &str);

    /// Document the node reached by following `name_path` from the root.
    fn set_comment(&mut self, name_path: &[String], text: &str) -> Result<(), DeftreeError>;
}

/// Follow `name_path` below `root` and set the description of the node found.
pub fn set_comment_by_name_path(
    root: &mut dyn Describable,
    name_path: &[String],
    text: &str,
) -> Result<(), DeftreeError> {
    if name_path.is_empty() {
        return Err(DeftreeError::EmptyPath);
    }

    let mut node = root;
    for (depth, segment) in name_path.iter().enumerate() {
        let current = node;
        let mut matches = current
            .children_mut()
            .into_iter()
            .filter(|child| child.name() == segment.as_str());
        let next = matches.next().ok_or_else(|| DeftreeError::NodeNotFound {
            path: name_path.to_vec(),
            missing: segment.clone(),
        })?;
        if matches.next().is_some() {
            return Err(DeftreeError::Ambiguous {
                parent: name_path[..depth].to_vec(),
                name: segment.clone(),
            });
        }
        node = next;
    }
    node.set_description(text);
    Ok(())
}

/// Read-side counterpart of [`set_comment_by_name_path`]; an empty path is
/// the root itself.
pub fn get_by_name_path<'a>(
    root: &'a dyn Describable,
    name_path: &[String],
) -> Option<&'a dyn Describable> {
    let mut node = root;
    for segment in name_path {
        node = node
            .children()
            .into_iter()
            .find(|child| child.name() == segment.as_str())?;
    }
    Some(node)
}

macro_rules! describable {
    ($ty:ty $(, $child:ident)*) => {
        impl Describable for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn description(&self) -> &str {
                &self.description
            }

            fn set_description(&mut self, text: &str) {
                self.description = text.to_string();
            }

            fn children(&self) -> Vec<&dyn Describable> {
                #[allow(unused_mut)]
                let mut out: Vec<&dyn Describable> = Vec::new();
                $(out.extend(self.$child.iter().map(|c| c as &dyn Describable));)*
                out
            }

            fn children_mut(&mut self) -> Vec<&mut dyn Describable> {
                #[allow(unused_mut)]
                let mut out: Vec<&mut dyn Describable> = Vec::new();
                $(out.extend(self.$child.iter_mut().map(|c| c as &mut dyn Describable));)*
                out
            }
        }
    };
}

// =============================================================================
// Nodes
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MicroserviceDefinition {
    pub name: String,
    pub description: String,
    pub files: Vec<ProtoFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProtoFile {
    pub name: String,
    pub description: String,
    pub package: String,
    pub messages: Vec<Message>,
    pub enums: Vec<Enum>,
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Message {
    pub name: String,
    pub description: String,
    pub fields: Vec<MessageField>,
    pub nested: Vec<Message>,
    pub enums: Vec<Enum>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageField {
    pub name: String,
    pub description: String,
    pub number: i32,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Enum {
    pub name: String,
    pub description: String,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub description: String,
    pub number: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Service {
    pub name: String,
    pub description: String,
    pub methods: Vec<ServiceMethod>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceMethod {
    pub name: String,
    pub description: String,
    pub request_type: String,
    pub response_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

describable!(MicroserviceDefinition, files);
describable!(ProtoFile, messages, enums, services);
describable!(Message, fields, nested, enums);
describable!(MessageField);
describable!(Enum, values);
describable!(EnumValue);
describable!(Service, methods);
describable!(ServiceMethod);

impl Deftree for MicroserviceDefinition {
    fn set_description(&mut self, text: &str) {
        self.description = text.to_string();
    }

    fn set_comment(&mut self, name_path: &[String], text: &str) -> Result<(), DeftreeError> {
        set_comment_by_name_path(self, name_path, text)
    }
}

impl MicroserviceDefinition {
    pub fn get(&self, name_path: &[String]) -> Option<&dyn Describable> {
        get_by_name_path(self, name_path)
    }

    /// Build an undocumented tree holding the files to generate.
    ///
    /// The root takes the package of the first such file.
    pub fn from_request(request: &CodeGeneratorRequest) -> Self {
        let files: Vec<ProtoFile> = request.files_to_generate().map(ProtoFile::from).collect();
        Self {
            name: files.first().map(|f| f.package.clone()).unwrap_or_default(),
            description: String::new(),
            files,
        }
    }
}

// =============================================================================
// Descriptor → node
// =============================================================================

fn name_of(name: &Option<String>) -> String {
    name.clone().unwrap_or_default()
}

fn type_ref(name: &Option<String>) -> String {
    name.as_deref()
        .unwrap_or_default()
        .trim_start_matches('.')
        .to_string()
}

fn enum_suffix(value: &Option<String>, prefix: &str) -> String {
    let value = value.as_deref().unwrap_or_default();
    value
        .strip_prefix(prefix)
        .unwrap_or(value)
        .to_ascii_lowercase()
}

impl From<&FileDescriptor> for ProtoFile {
    fn from(file: &FileDescriptor) -> Self {
        Self {
            name: name_of(&file.name),
            description: String::new(),
            package: name_of(&file.package),
            messages: file.message_type.iter().map(Message::from).collect(),
            enums: file.enum_type.iter().map(Enum::from).collect(),
            services: file.service.iter().map(Service::from).collect(),
        }
    }
}

impl From<&MessageDescriptor> for Message {
    fn from(msg: &MessageDescriptor) -> Self {
        Self {
            name: name_of(&msg.name),
            description: String::new(),
            fields: msg.field.iter().map(MessageField::from).collect(),
            nested: msg.nested_type.iter().map(Message::from).collect(),
            enums: msg.enum_type.iter().map(Enum::from).collect(),
        }
    }
}

impl From<&FieldDescriptor> for MessageField {
    fn from(field: &FieldDescriptor) -> Self {
        let field_type = if field.type_name.is_some() {
            type_ref(&field.type_name)
        } else {
            enum_suffix(&field.typ, "TYPE_")
        };
        Self {
            name: name_of(&field.name),
            description: String::new(),
            number: field.number.unwrap_or_default(),
            label: enum_suffix(&field.label, "LABEL_"),
            field_type,
        }
    }
}

impl From<&EnumDescriptor> for Enum {
    fn from(e: &EnumDescriptor) -> Self {
        Self {
            name: name_of(&e.name),
            description: String::new(),
            values: e
                .value
                .iter()
                .map(|v| EnumValue {
                    name: name_of(&v.name),
                    description: String::new(),
                    number: v.number.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

impl From<&ServiceDescriptor> for Service {
    fn from(svc: &ServiceDescriptor) -> Self {
        Self {
            name: name_of(&svc.name),
            description: String::new(),
            methods: svc.method.iter().map(ServiceMethod::from).collect(),
        }
    }
}

impl From<&MethodDescriptor> for ServiceMethod {
    fn from(m: &MethodDescriptor) -> Self {
        Self {
            name: name_of(&m.name),
            description: String::new(),
            request_type: type_ref(&m.input_type),
            response_type: type_ref(&m.output_type),
            client_streaming: m.client_streaming.unwrap_or_default(),
            server_streaming: m.server_streaming.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn tree() -> MicroserviceDefinition {
        MicroserviceDefinition {
            name: "general".to_string(),
            files: vec![ProtoFile {
                name: "general.proto".to_string(),
                messages: vec![Message {
                    name: "RequestMessage".to_string(),
                    fields: vec![MessageField {
                        name: "input".to_string(),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn set_comment_follows_names() {
        let mut tree = tree();
        let target = path(&["general.proto", "RequestMessage", "input"]);
        tree.set_comment(&target, "the input").unwrap();
        assert_eq!(tree.get(&target).unwrap().description(), "the input");
        assert_eq!(tree.get(&[]).unwrap().name(), "general");
    }

    #[test]
    fn missing_node_is_reported_as_not_found() {
        let mut tree = tree();
        let err = tree
            .set_comment(&path(&["general.proto", "Nope"]), "x")
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("cannot find node"));
    }

    #[test]
    fn empty_and_ambiguous_paths_are_other_errors() {
        let mut tree = tree();
        assert_eq!(tree.set_comment(&[], "x"), Err(DeftreeError::EmptyPath));

        tree.files[0].enums.push(Enum {
            name: "RequestMessage".to_string(),
            ..Default::default()
        });
        let err = tree
            .set_comment(&path(&["general.proto", "RequestMessage"]), "x")
            .unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(
            err,
            DeftreeError::Ambiguous {
                parent: path(&["general.proto"]),
                name: "RequestMessage".to_string()
            }
        );
    }

    #[test]
    fn from_request_keeps_only_files_to_generate() {
        let request = CodeGeneratorRequest {
            file_to_generate: vec!["a.proto".to_string()],
            parameter: None,
            proto_file: vec![
                FileDescriptor {
                    name: Some("dep.proto".to_string()),
                    package: Some("dep".to_string()),
                    ..Default::default()
                },
                FileDescriptor {
                    name: Some("a.proto".to_string()),
                    package: Some("a.v1".to_string()),
                    message_type: vec![MessageDescriptor {
                        name: Some("Widget".to_string()),
                        field: vec![FieldDescriptor {
                            name: Some("parts".to_string()),
                            number: Some(2),
                            label: Some("LABEL_REPEATED".to_string()),
                            typ: Some("TYPE_MESSAGE".to_string()),
                            type_name: Some(".a.v1.Part".to_string()),
                            ..Default::default()
                        }],
                        ..Default::default()
                    }],
                    ..Default::default()
                },
            ],
        };

        let tree = MicroserviceDefinition::from_request(&request);
        assert_eq!(tree.name, "a.v1");
        assert_eq!(tree.files.len(), 1);
        let field = &tree.files[0].messages[0].fields[0];
        assert_eq!(field.label, "repeated");
        assert_eq!(field.field_type, "a.v1.Part");
        assert_eq!(field.number, 2);
    }
}
