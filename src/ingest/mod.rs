// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! File and folder ingestion.
//!
//! Accepts user-selected files or a dropped directory, filters by extension
//! and size, and yields path/content pairs. Text kinds are read into memory;
//! binary kinds are listed only. A rejected entry never aborts the batch: it
//! is reported per item and skipped.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::{FileKind, Workspace};

/// Maximum accepted file size; a file of exactly this size is accepted and
/// one byte more is rejected.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug)]
pub enum IngestError {
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {path:?}: {source}"),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// One skipped entry and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRejection {
    Oversize { path: String, size: u64 },
    UnsupportedType { path: String },
    ReadFailed { path: String, message: String },
}

impl fmt::Display for FileRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oversize { path, size } => {
                write!(f, "{path}: {size} bytes exceeds the {MAX_FILE_SIZE} byte limit")
            }
            Self::UnsupportedType { path } => write!(f, "{path}: unsupported file type"),
            Self::ReadFailed { path, message } => write!(f, "{path}: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedFile {
    pub rel_path: String,
    pub name: String,
    pub kind: FileKind,
    pub size: u64,
    /// `None` for binary kinds; they are listed but never opened.
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngestReport {
    /// Set when a whole directory was ingested (the project root's name).
    pub project_name: Option<String>,
    pub files: Vec<IngestedFile>,
    pub rejected: Vec<FileRejection>,
}

/// Ingests a directory tree as a project.
pub fn ingest_dir(root: &Path) -> Result<IngestReport, IngestError> {
    let mut report = IngestReport {
        project_name: root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        ..IngestReport::default()
    };
    walk(root, root, &mut report)?;
    Ok(report)
}

/// Ingests an explicit list of files (no project context).
pub fn ingest_files(paths: &[PathBuf]) -> Result<IngestReport, IngestError> {
    let mut report = IngestReport::default();
    for path in paths {
        let rel_path = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        ingest_one(path, rel_path, &mut report)?;
    }
    Ok(report)
}

fn walk(root: &Path, dir: &Path, report: &mut IngestReport) -> Result<(), IngestError> {
    let entries = fs::read_dir(dir).map_err(|source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            walk(root, &path, report)?;
            continue;
        }
        let rel_path = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        ingest_one(&path, rel_path, report)?;
    }
    Ok(())
}

fn ingest_one(path: &Path, rel_path: String, report: &mut IngestReport) -> Result<(), IngestError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| rel_path.clone());

    let Some(kind) = FileKind::from_file_name(&name) else {
        report.rejected.push(FileRejection::UnsupportedType { path: rel_path });
        return Ok(());
    };

    let metadata = fs::metadata(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let size = metadata.len();
    if size > MAX_FILE_SIZE {
        report.rejected.push(FileRejection::Oversize {
            path: rel_path,
            size,
        });
        return Ok(());
    }

    let text = if kind.is_editable() {
        match fs::read(path) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) => {
                report.rejected.push(FileRejection::ReadFailed {
                    path: rel_path,
                    message: err.to_string(),
                });
                return Ok(());
            }
        }
    } else {
        None
    };

    report.files.push(IngestedFile {
        rel_path,
        name,
        kind,
        size,
        text,
    });
    Ok(())
}

/// Applies an ingest report to a workspace.
///
/// A project ingest (directory) replaces the current workspace contents;
/// loose files are added to whatever is open.
pub fn apply_report(workspace: &mut Workspace, report: &IngestReport) {
    if let Some(project_name) = &report.project_name {
        workspace.clear();
        workspace.set_project_name(Some(project_name.clone()));
    }

    for file in &report.files {
        match &file.text {
            Some(text) => {
                workspace.open_document(
                    file.name.clone(),
                    file.rel_path.clone(),
                    file.kind,
                    text.clone(),
                );
            }
            None => {
                workspace.list_binary(file.name.clone(), file.rel_path.clone(), file.kind, file.size);
            }
        }
    }
}
