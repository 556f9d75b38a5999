//! `SourceCodeInfo` path → name path.
//!
//! A location path such as `[4, 2, 2, 0]` reads as "member 4 of the file
//! (`message_type`), entry 2; member 2 of that message (`field`), entry 0".
//! Walking it against the file collects the name of every declaration passed
//! on the way: `["api.proto", "Foo", "baz"]`. That list is what the
//! documentation tree is addressed by.

use protodoc_descriptor::{DeclKind, DeclRef, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("{kind} has no member with field number {number}")]
    NoSuchField { kind: DeclKind, number: i32 },

    #[error("index {index} is out of bounds for `{field}` (length {len})")]
    IndexOutOfBounds {
        field: &'static str,
        index: i32,
        len: usize,
    },

    #[error("path ends on the member label `{field}` of {kind}; comments attach to declarations")]
    FieldLabelTerminus { kind: DeclKind, field: &'static str },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot unwrap {what}")]
    Unwrap { what: String },
}

impl ResolveError {
    /// Faults that well-formed compiler output never produces, as opposed to
    /// paths that merely go somewhere the resolver cannot name.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ResolveError::FieldLabelTerminus { .. } | ResolveError::Unwrap { .. }
        )
    }
}

/// Resolve `path` against `node` into the names of the declarations it
/// passes through, starting with `node`'s own name.
///
/// Each step consumes a field number, plus an index when the member is
/// repeated, so recursion depth is bounded by the nesting of the `.proto`
/// file.
pub fn resolve(path: &[i32], node: Value<'_>) -> Result<Vec<String>, ResolveError> {
    let (name, decl) = match node {
        Value::Scalar(s) => (s, None),
        Value::Node(decl) => {
            let name = decl.name().ok_or_else(|| ResolveError::Unwrap {
                what: format!("unnamed {}", decl.kind()),
            })?;
            (name, Some(decl))
        }
        Value::Absent => {
            return Err(ResolveError::Unwrap {
                what: "an unset optional member".to_string(),
            })
        }
        other => {
            return Err(ResolveError::TypeMismatch {
                expected: "declaration",
                found: other.shape(),
            })
        }
    };

    let Some((&number, rest)) = path.split_first() else {
        return Ok(vec![name.to_string()]);
    };

    let Some(decl) = decl else {
        return Err(ResolveError::TypeMismatch {
            expected: "declaration",
            found: "scalar",
        });
    };

    let (spec, member) = decl.member(number).ok_or(ResolveError::NoSuchField {
        kind: decl.kind(),
        number,
    })?;

    tracing::trace!(
        kind = %decl.kind(),
        decl = name,
        field = spec.name,
        label = spec.label.as_str(),
        remaining = ?rest,
        "descending into member"
    );

    if rest.is_empty() {
        return Err(ResolveError::FieldLabelTerminus {
            kind: decl.kind(),
            field: spec.name,
        });
    }

    let mut names = vec![name.to_string()];
    match member {
        Value::List(mut items) => {
            let index = rest[0];
            let len = items.len();
            let slot = usize::try_from(index).ok().filter(|&i| i < len).ok_or(
                ResolveError::IndexOutOfBounds {
                    field: spec.name,
                    index,
                    len,
                },
            )?;
            let item = items.swap_remove(slot);
            names.extend(resolve(&rest[1..], item)?);
        }
        other => names.extend(resolve(rest, other)?),
    }
    Ok(names)
}

/// Resolve a location path rooted at a file declaration.
pub fn resolve_in_file(
    path: &[i32],
    file: &protodoc_descriptor::FileDescriptor,
) -> Result<Vec<String>, ResolveError> {
    resolve(path, Value::Node(DeclRef::File(file)))
}
