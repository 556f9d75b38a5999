//! `protoc` plugin mode.
//!
//! ```text
//! protoc --plugin=protoc-gen-protodoc=$(which protodoc) --protodoc_out=. api.proto
//! ```
//!
//! (with `protoc-gen-protodoc` a wrapper running `protodoc plugin`). The
//! documented tree is returned as a single `<package>.deftree.json` file.

use anyhow::{Context, Result};
use prost::Message as _;
use prost_types::compiler::{code_generator_response, CodeGeneratorResponse};
use protodoc_deftree::document_request;
use std::io::{Read, Write};

/// Run one request/response exchange over stdin/stdout.
pub fn run_plugin() -> Result<()> {
    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .context("failed to read CodeGeneratorRequest from stdin")?;

    let response = respond(&input);

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&response.encode_to_vec())
        .context("failed to write CodeGeneratorResponse")?;
    stdout.flush()?;
    Ok(())
}

/// Build the response for one encoded request. Decode failures are reported
/// through the response's `error`, as protoc expects.
pub fn respond(input: &[u8]) -> CodeGeneratorResponse {
    let request = match protodoc_descriptor::decode_request(input) {
        Ok(request) => request,
        Err(err) => {
            tracing::error!(error = %err, "cannot decode plugin request");
            return CodeGeneratorResponse {
                error: Some(err.to_string()),
                ..Default::default()
            };
        }
    };

    let (tree, report) = document_request(&request);
    tracing::info!(
        files = report.files,
        applied = report.applied,
        unresolved = report.unresolved,
        tree_misses = report.tree_misses,
        "documented plugin request"
    );

    let content = match serde_json::to_string_pretty(&tree) {
        Ok(json) => json,
        Err(err) => {
            return CodeGeneratorResponse {
                error: Some(format!("cannot render documentation tree: {err}")),
                ..Default::default()
            }
        }
    };

    let stem = if tree.name.is_empty() {
        "deftree".to_string()
    } else {
        tree.name.clone()
    };
    CodeGeneratorResponse {
        file: vec![code_generator_response::File {
            name: Some(format!("{stem}.deftree.json")),
            content: Some(content),
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message as _;
    use prost_types::source_code_info::Location;
    use prost_types::{DescriptorProto, FileDescriptorProto, SourceCodeInfo};

    #[test]
    fn plugin_response_carries_documented_tree() {
        let request = prost_types::compiler::CodeGeneratorRequest {
            file_to_generate: vec!["svc.proto".to_string()],
            proto_file: vec![FileDescriptorProto {
                name: Some("svc.proto".to_string()),
                package: Some("svc".to_string()),
                message_type: vec![DescriptorProto {
                    name: Some("Ping".to_string()),
                    ..Default::default()
                }],
                source_code_info: Some(SourceCodeInfo {
                    location: vec![Location {
                        path: vec![4, 0],
                        leading_comments: Some(" Ping is a probe.\n".to_string()),
                        ..Default::default()
                    }],
                }),
                ..Default::default()
            }],
            ..Default::default()
        };

        let response = respond(&request.encode_to_vec());
        assert!(response.error.is_none());
        assert_eq!(response.file.len(), 1);
        assert_eq!(response.file[0].name.as_deref(), Some("svc.deftree.json"));
        let content = response.file[0].content.as_deref().unwrap_or_default();
        let json: serde_json::Value = serde_json::from_str(content).unwrap();
        assert_eq!(
            json["files"][0]["messages"][0]["description"],
            "Ping is a probe."
        );
    }

    #[test]
    fn undecodable_request_is_reported_in_the_response() {
        let response = respond(&[0xff, 0xff, 0xff]);
        assert!(response.error.is_some());
        assert!(response.file.is_empty());
    }
}
