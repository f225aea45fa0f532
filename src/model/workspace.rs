// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::document::Document;
use super::edit_session::EditSession;
use super::file_kind::FileKind;
use super::ids::DocumentId;

/// One entry of the ingested project tree.
///
/// Binary files appear here with path and size but have no document id; they
/// are listed, never opened in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    name: String,
    kind: FileKind,
    size: u64,
    document_id: Option<DocumentId>,
}

impl ProjectEntry {
    pub fn new(
        name: impl Into<String>,
        kind: FileKind,
        size: u64,
        document_id: Option<DocumentId>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
            document_id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        self.document_id.as_ref()
    }

    pub fn is_editable(&self) -> bool {
        self.document_id.is_some()
    }
}

/// The top-level container the TUI runs against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Workspace {
    project_name: Option<String>,
    documents: BTreeMap<DocumentId, Document>,
    tree: BTreeMap<String, ProjectEntry>,
    active_document_id: Option<DocumentId>,
    edit_session: Option<EditSession>,
    next_document_seq: u64,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }

    pub fn set_project_name(&mut self, name: Option<String>) {
        self.project_name = name;
    }

    pub fn documents(&self) -> &BTreeMap<DocumentId, Document> {
        &self.documents
    }

    pub fn document(&self, document_id: &DocumentId) -> Option<&Document> {
        self.documents.get(document_id)
    }

    pub fn document_mut(&mut self, document_id: &DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(document_id)
    }

    /// The ingested file tree keyed by workspace-relative path.
    pub fn tree(&self) -> &BTreeMap<String, ProjectEntry> {
        &self.tree
    }

    pub fn active_document_id(&self) -> Option<&DocumentId> {
        self.active_document_id.as_ref()
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.active_document_id
            .as_ref()
            .and_then(|id| self.documents.get(id))
    }

    pub fn active_document_mut(&mut self) -> Option<&mut Document> {
        let id = self.active_document_id.clone()?;
        self.documents.get_mut(&id)
    }

    pub fn set_active_document_id(&mut self, document_id: Option<DocumentId>) {
        self.active_document_id = document_id;
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit_session.as_ref()
    }

    /// Begins a visual edit session; any previous session is discarded, so
    /// at most one is ever open.
    pub fn begin_edit_session(&mut self, session: EditSession) {
        self.edit_session = Some(session);
    }

    pub fn take_edit_session(&mut self) -> Option<EditSession> {
        self.edit_session.take()
    }

    fn allocate_document_id(&mut self) -> DocumentId {
        self.next_document_seq = self.next_document_seq.saturating_add(1);
        DocumentId::new(format!("doc:{:04}", self.next_document_seq)).expect("valid document id")
    }

    /// Opens a text file as a document and lists it in the tree.
    ///
    /// Returns the id of the new document. The first opened document becomes
    /// active.
    pub fn open_document(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
        kind: FileKind,
        source: impl Into<String>,
    ) -> DocumentId {
        let name = name.into();
        let path = path.into();
        let document_id = self.allocate_document_id();
        let document = Document::new(document_id.clone(), name.clone(), path.clone(), kind, source);
        let size = document.size() as u64;
        self.documents.insert(document_id.clone(), document);
        self.tree
            .insert(path, ProjectEntry::new(name, kind, size, Some(document_id.clone())));

        if self.active_document_id.is_none() {
            self.active_document_id = Some(document_id.clone());
        }
        document_id
    }

    /// Lists a binary file in the tree without opening it.
    pub fn list_binary(&mut self, name: impl Into<String>, path: impl Into<String>, kind: FileKind, size: u64) {
        self.tree
            .insert(path.into(), ProjectEntry::new(name, kind, size, None));
    }

    /// Closes a document, removing its tree entry and clearing any edit
    /// session that targeted it. The next remaining document (if any)
    /// becomes active.
    pub fn close_document(&mut self, document_id: &DocumentId) -> Option<Document> {
        let document = self.documents.remove(document_id)?;
        self.tree.retain(|_, entry| entry.document_id() != Some(document_id));

        if self
            .edit_session
            .as_ref()
            .is_some_and(|session| session.document_id() == document_id)
        {
            self.edit_session = None;
        }

        if self.active_document_id.as_ref() == Some(document_id) {
            self.active_document_id = self.documents.keys().next().cloned();
        }
        Some(document)
    }

    /// Drops all documents and tree entries, e.g. when a new project folder
    /// replaces the current one.
    pub fn clear(&mut self) {
        self.project_name = None;
        self.documents.clear();
        self.tree.clear();
        self.active_document_id = None;
        self.edit_session = None;
    }
}
