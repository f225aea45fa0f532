// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use crate::dom::NodePath;

use super::ids::DocumentId;

/// One in-progress visual edit against a rendered element.
///
/// Created when the user starts editing an element in the preview pane and
/// destroyed on commit or discard; at most one session is open at a time.
/// `base_rev` pins the document revision the rendered handle was taken from,
/// so commits against a document that changed underneath are rejected
/// instead of splicing into the wrong bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    document_id: DocumentId,
    base_rev: u64,
    path: NodePath,
    tag: SmolStr,
    original_content: String,
}

impl EditSession {
    pub fn new(
        document_id: DocumentId,
        base_rev: u64,
        path: NodePath,
        tag: SmolStr,
        original_content: impl Into<String>,
    ) -> Self {
        Self {
            document_id,
            base_rev,
            path,
            tag,
            original_content: original_content.into(),
        }
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn base_rev(&self) -> u64 {
        self.base_rev
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The element's serialized content as captured when editing began.
    pub fn original_content(&self) -> &str {
        &self.original_content
    }
}
