//! Protobuf documentation tree + comment recovery.
//!
//! `protoc` hands plugins the parsed declarations of each file, and, in
//! `SourceCodeInfo`, the comments found in the source keyed by integer paths
//! into those declarations. This crate turns that pair into a documentation
//! tree where each declaration node carries its own comment:
//!
//! - [`scrub`]: raw comment text → documentation text
//! - [`resolve`]: location path → name path (`["api.proto", "Foo", "bar"]`)
//! - [`associate_comments`]: drive both over a request and write into a [`Deftree`]
//!
//! ```text
//! CodeGeneratorRequest ──► MicroserviceDefinition::from_request ──► tree
//!          │                                                        ▲
//!          └── SourceCodeInfo ──► resolve ──► scrub ──► set_comment ┘
//! ```

pub mod associate;
pub mod resolve;
pub mod scrub;
pub mod tree;

pub use associate::{associate_comments, AssociationReport};
pub use resolve::{resolve, resolve_in_file, ResolveError};
pub use scrub::scrub;
pub use tree::{
    get_by_name_path, set_comment_by_name_path, Deftree, DeftreeError, Describable, Enum,
    EnumValue, Message, MessageField, MicroserviceDefinition, ProtoFile, Service, ServiceMethod,
};

/// Build the tree for `request` and document it from its source info.
pub fn document_request(
    request: &protodoc_descriptor::CodeGeneratorRequest,
) -> (MicroserviceDefinition, AssociationReport) {
    let mut tree = MicroserviceDefinition::from_request(request);
    let report = associate_comments(&mut tree, request);
    (tree, report)
}
