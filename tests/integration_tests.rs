//! Integration tests for the complete comment-recovery pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - descriptor JSON → request model
//! - request → documentation tree
//! - source info → comments on tree nodes
//!
//! Run with: cargo test --test integration_tests

use protodoc_deftree::{
    associate_comments, document_request, AssociationReport, Deftree, Describable,
    MicroserviceDefinition,
};

fn fixture(name: &str) -> Vec<u8> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

fn name_path(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn description(tree: &MicroserviceDefinition, parts: &[&str]) -> String {
    tree.get(&name_path(parts))
        .unwrap_or_else(|| panic!("no node at {parts:?}"))
        .description()
        .to_string()
}

// ============================================================================
// End-to-end: general.proto
// ============================================================================

#[test]
fn test_general_proto_comments_land_on_their_declarations() {
    let request =
        protodoc_descriptor::load_request(&fixture("general/request.json"), &[]).expect("load");
    let (tree, _) = document_request(&request);

    assert_eq!(tree.name, "general");
    assert_eq!(tree.description, "General package");
    assert_eq!(
        description(&tree, &["general.proto", "RequestMessage"]),
        "RequestMessage is so foo"
    );
    assert_eq!(
        description(&tree, &["general.proto", "ProtoService", "ProtoMethod"]),
        "ProtoMethod is simple."
    );
    assert_eq!(
        description(&tree, &["general.proto", "ProtoService"]),
        "ProtoService is a service"
    );
    assert_eq!(
        description(&tree, &["general.proto", "RequestMessage", "input"]),
        "The caller's input.\nSpans two lines."
    );
    assert_eq!(
        description(&tree, &["general.proto", "Status", "STATUS_OK"]),
        "Everything went fine."
    );
}

#[test]
fn test_general_proto_report_accounts_for_every_commented_location() {
    let request =
        protodoc_descriptor::load_request(&fixture("general/request.json"), &[]).expect("load");
    let (_, report) = document_request(&request);

    assert_eq!(
        report,
        AssociationReport {
            files: 1,
            locations: 11,
            descriptions: 1,
            applied: 7,
            // method option + out-of-range message index
            unresolved: 2,
            // oneof `result` has no tree node
            tree_misses: 1,
            tree_errors: 0,
        }
    );
}

#[test]
fn test_imported_files_stay_undocumented() {
    let request =
        protodoc_descriptor::load_request(&fixture("general/request.json"), &[]).expect("load");
    let (tree, _) = document_request(&request);

    assert_eq!(tree.files.len(), 1);
    let json = serde_json::to_string(&tree).expect("serialize");
    assert!(!json.contains("Imported documentation"));
}

#[test]
fn test_selecting_the_imported_file_documents_it_instead() {
    let files = vec!["google/api/annotations.proto".to_string()];
    let request =
        protodoc_descriptor::load_request(&fixture("general/request.json"), &files).expect("load");
    let (tree, report) = document_request(&request);

    assert_eq!(tree.name, "google.api");
    assert_eq!(report.applied, 1);
    assert_eq!(
        description(&tree, &["google/api/annotations.proto", "HttpRule"]),
        "Imported documentation that must not be copied."
    );
}

// ============================================================================
// Tree written through the Deftree contract only
// ============================================================================

#[test]
fn test_association_into_prebuilt_tree_with_missing_nodes() {
    let request =
        protodoc_descriptor::load_request(&fixture("general/request.json"), &[]).expect("load");

    let mut tree = MicroserviceDefinition::from_request(&request);
    tree.files[0].services.clear();

    let report = associate_comments(&mut tree, &request);
    assert_eq!(report.tree_misses, 3);
    assert_eq!(report.tree_errors, 0);
    assert_eq!(
        description(&tree, &["general.proto", "ResponseMessage"]),
        "ResponseMessage is so bar"
    );

    Deftree::set_description(&mut tree, "overridden");
    assert_eq!(tree.description, "overridden");
}
