// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core model types: documents, workspace, edit sessions, file kinds.

pub mod document;
pub mod edit_session;
pub mod file_kind;
pub mod ids;
pub mod workspace;

pub use document::Document;
pub use edit_session::EditSession;
pub use file_kind::FileKind;
pub use ids::{DeployId, DocumentId, Id, IdError, SiteId};
pub use workspace::{ProjectEntry, Workspace};
