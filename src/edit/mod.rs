// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Visual-edit reconciliation.
//!
//! Maps an edit made against a rendered element back onto the source text.
//! The primary strategy resolves the element's path in a fresh parse and
//! splices into its exact byte range; the fallback matches by tag plus
//! literal original content (first match in document order, candidate count
//! reported). A miss is an explicit error, never a silent no-op.

use std::fmt;

use smol_str::SmolStr;

use crate::dom::{
    find_by_tag_and_content, parse_document, resolve_path, serialize_open_tag, Attribute, DomTree,
    NodeIndex, NodePath,
};
use crate::model::{Document, DocumentId, EditSession};

/// The element an edit targets.
///
/// `path` is the rendered-element handle; without one (or when it no longer
/// resolves) reconciliation falls back to content matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub path: Option<NodePath>,
    pub tag: SmolStr,
    pub original_content: String,
}

/// How the edited element was located in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// The element path resolved and its content matched; the splice used
    /// the exact byte range.
    ExactSpan,
    /// Content matching found exactly one candidate.
    ContentUnique,
    /// Content matching found several candidates; the first in document
    /// order was replaced.
    ContentFirst { candidates: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub new_source: String,
    pub strategy: MatchStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// No element with the target tag carries the original content.
    NoMatch { tag: SmolStr },
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch { tag } => {
                write!(f, "no <{tag}> element matches the edited content")
            }
        }
    }
}

impl std::error::Error for ReconcileError {}

/// Replaces the target element's content (and re-serialized open tag) in
/// `source`, returning the new text and the strategy that located it.
pub fn reconcile(
    source: &str,
    target: &EditTarget,
    new_content: &str,
    attrs: &[Attribute],
) -> Result<ReconcileOutcome, ReconcileError> {
    let tree = parse_document(source);

    if let Some(path) = &target.path {
        if let Some(index) = resolve_path(&tree, path) {
            if element_matches(&tree, source, index, target) {
                let new_source = splice(source, &tree, index, &target.tag, new_content, attrs);
                return Ok(ReconcileOutcome {
                    new_source,
                    strategy: MatchStrategy::ExactSpan,
                });
            }
        }
    }

    let candidates =
        find_by_tag_and_content(&tree, source, target.tag.as_str(), &target.original_content);
    let Some(&first) = candidates.first() else {
        return Err(ReconcileError::NoMatch {
            tag: target.tag.clone(),
        });
    };

    let strategy = if candidates.len() == 1 {
        MatchStrategy::ContentUnique
    } else {
        MatchStrategy::ContentFirst {
            candidates: candidates.len(),
        }
    };
    let new_source = splice(source, &tree, first, &target.tag, new_content, attrs);
    Ok(ReconcileOutcome {
        new_source,
        strategy,
    })
}

fn element_matches(tree: &DomTree, source: &str, index: NodeIndex, target: &EditTarget) -> bool {
    let Some(node) = tree.node(index) else {
        return false;
    };
    node.tag() == Some(target.tag.as_str())
        && node
            .content_span()
            .is_some_and(|span| span.slice(source) == target.original_content)
}

fn splice(
    source: &str,
    tree: &DomTree,
    index: NodeIndex,
    tag: &str,
    new_content: &str,
    attrs: &[Attribute],
) -> String {
    let node = tree.node(index).expect("splice target exists");
    let span = node.span();

    let mut out = String::with_capacity(source.len() + new_content.len());
    out.push_str(&source[..span.start]);
    out.push_str(&serialize_open_tag(tag, attrs));
    out.push_str(new_content);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
    out.push_str(&source[span.end..]);
    out
}

/// The result of committing an edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub new_rev: u64,
    pub strategy: MatchStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The document changed since the session captured its handle.
    Conflict { base_rev: u64, current_rev: u64 },
    /// The session targets a different document.
    DocumentMismatch {
        expected: DocumentId,
        found: DocumentId,
    },
    Reconcile(ReconcileError),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict {
                base_rev,
                current_rev,
            } => write!(
                f,
                "stale element handle (base_rev={base_rev}, current_rev={current_rev})"
            ),
            Self::DocumentMismatch { expected, found } => {
                write!(f, "edit session targets {expected}, not {found}")
            }
            Self::Reconcile(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for EditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Reconcile(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReconcileError> for EditError {
    fn from(err: ReconcileError) -> Self {
        Self::Reconcile(err)
    }
}

/// Commits a visual edit session against its document.
///
/// The commit is applied with optimistic concurrency: the session's base
/// revision must still be the document's current revision, otherwise the
/// rendered handle is stale and the edit is rejected untouched. On success
/// the document source is replaced and its revision bumped.
pub fn commit_edit(
    document: &mut Document,
    session: &EditSession,
    new_content: &str,
    attrs: &[Attribute],
) -> Result<CommitResult, EditError> {
    if session.document_id() != document.document_id() {
        return Err(EditError::DocumentMismatch {
            expected: session.document_id().clone(),
            found: document.document_id().clone(),
        });
    }

    let current_rev = document.rev();
    if session.base_rev() != current_rev {
        return Err(EditError::Conflict {
            base_rev: session.base_rev(),
            current_rev,
        });
    }

    let target = EditTarget {
        path: Some(session.path().clone()),
        tag: SmolStr::new(session.tag()),
        original_content: session.original_content().to_owned(),
    };
    let outcome = reconcile(document.source(), &target, new_content, attrs)?;
    document.set_source(outcome.new_source);

    Ok(CommitResult {
        new_rev: document.rev(),
        strategy: outcome.strategy,
    })
}
