//! Copy `SourceCodeInfo` comments onto the documentation tree.
//!
//! Each file to generate is scanned in the order the compiler emitted its
//! locations. A location qualifies when it carries a leading comment (or more
//! than one detached comment). Its path is resolved to a name path, and the
//! scrubbed comment is written to the node with that name path. One bad
//! location never stops the pass: it is logged and counted in the returned
//! [`AssociationReport`].

use crate::resolve::resolve_in_file;
use crate::scrub::scrub;
use crate::tree::Deftree;
use protodoc_descriptor::{CodeGeneratorRequest, FileDescriptor, Location};
use serde::Serialize;

/// What one association pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AssociationReport {
    /// Files scanned (files to generate).
    pub files: usize,
    /// Locations that carried a comment.
    pub locations: usize,
    /// Package-level comments written to the root.
    pub descriptions: usize,
    /// Comments written to a node.
    pub applied: usize,
    /// Paths the resolver could not turn into a name path.
    pub unresolved: usize,
    /// Name paths with no node in the tree.
    pub tree_misses: usize,
    /// Other failures reported by the tree.
    pub tree_errors: usize,
}

/// libprotoc emits a location for every declaration; only the commented ones
/// are worth walking, and those always point at concrete declarations.
fn has_comment(location: &Location) -> bool {
    location.leading().len() > 1 || location.leading_detached_comments.len() > 1
}

/// Attach the comments of every file to generate in `request` to `tree`.
///
/// Later comments for the same name path overwrite earlier ones.
pub fn associate_comments<T: Deftree + ?Sized>(
    tree: &mut T,
    request: &CodeGeneratorRequest,
) -> AssociationReport {
    let mut report = AssociationReport::default();
    for file in request.files_to_generate() {
        report.files += 1;
        associate_file(tree, file, &mut report);
    }

    tracing::debug!(
        files = report.files,
        locations = report.locations,
        applied = report.applied,
        unresolved = report.unresolved,
        tree_misses = report.tree_misses,
        tree_errors = report.tree_errors,
        "comment association finished"
    );
    report
}

fn associate_file<T: Deftree + ?Sized>(
    tree: &mut T,
    file: &FileDescriptor,
    report: &mut AssociationReport,
) {
    let file_name = file.name.as_deref().unwrap_or("<unknown>");
    let Some(info) = &file.source_code_info else {
        tracing::debug!(file = file_name, "no source code info; nothing to associate");
        return;
    };

    for location in info.location.iter().filter(|l| has_comment(l)) {
        report.locations += 1;
        let lead = location.leading();

        // The package statement is the one place a comment attaches to a
        // bare member instead of a declaration.
        if location.path.len() == 1 {
            tracing::debug!(
                file = file_name,
                path = ?location.path,
                comment = ?lead,
                "comment describes the package"
            );
            tree.set_description(&scrub(lead));
            report.descriptions += 1;
            continue;
        }

        let name_path = match resolve_in_file(&location.path, file) {
            Ok(name_path) => name_path,
            Err(err) => {
                report.unresolved += 1;
                if err.is_internal() {
                    tracing::warn!(
                        file = file_name,
                        path = ?location.path,
                        error = %err,
                        "location path is inconsistent with its descriptor"
                    );
                } else {
                    tracing::debug!(
                        file = file_name,
                        path = ?location.path,
                        comment = ?lead,
                        error = %err,
                        "cannot place comment"
                    );
                }
                continue;
            }
        };

        match tree.set_comment(&name_path, &scrub(lead)) {
            Ok(()) => {
                report.applied += 1;
                tracing::trace!(name_path = ?name_path, "comment attached");
            }
            Err(err) if err.is_not_found() => {
                report.tree_misses += 1;
                tracing::debug!(
                    file = file_name,
                    path = ?location.path,
                    name_path = ?name_path,
                    "no tree node for comment"
                );
            }
            Err(err) => {
                report.tree_errors += 1;
                tracing::warn!(
                    file = file_name,
                    name_path = ?name_path,
                    error = %err,
                    "cannot set comment"
                );
            }
        }
    }
}
