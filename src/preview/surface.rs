// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Owns the transient snapshot backing the "open externally" affordance.
///
/// Each refresh writes a fresh snapshot file and releases the previous one
/// immediately after installing the new handle, so the snapshot directory
/// never grows beyond a single file no matter how often the preview reloads.
#[derive(Debug)]
pub struct PreviewSurface {
    dir: PathBuf,
    seq: u64,
    current: Option<PathBuf>,
}

#[derive(Debug)]
pub enum SurfaceError {
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot write preview snapshot {path:?}: {source}")
            }
        }
    }
}

impl std::error::Error for SurfaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl PreviewSurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            seq: 0,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Writes a new snapshot of `html` and releases the superseded one.
    pub fn refresh(&mut self, html: &str) -> Result<&Path, SurfaceError> {
        fs::create_dir_all(&self.dir).map_err(|source| SurfaceError::Io {
            path: self.dir.clone(),
            source,
        })?;

        self.seq = self.seq.saturating_add(1);
        let path = self.dir.join(format!("preview-{:06}.html", self.seq));
        fs::write(&path, html).map_err(|source| SurfaceError::Io {
            path: path.clone(),
            source,
        })?;

        let previous = self.current.replace(path);
        if let Some(previous) = previous {
            let _ = fs::remove_file(previous);
        }
        Ok(self.current.as_deref().expect("snapshot just installed"))
    }

    /// Removes the current snapshot, if any.
    pub fn release(&mut self) {
        if let Some(path) = self.current.take() {
            let _ = fs::remove_file(path);
        }
    }
}

impl Drop for PreviewSurface {
    fn drop(&mut self) {
        self.release();
        let _ = fs::remove_dir(&self.dir);
    }
}

#[cfg(test)]
mod tests {
    use super::PreviewSurface;
    use std::fs;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "halimede-surface-test-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn refresh_releases_the_prior_snapshot() {
        let dir = temp_dir("refresh");
        let mut surface = PreviewSurface::new(&dir);

        let first = surface.refresh("<p>one</p>").expect("first refresh").to_path_buf();
        assert!(first.is_file());

        let second = surface.refresh("<p>two</p>").expect("second refresh").to_path_buf();
        assert!(second.is_file());
        assert!(!first.exists(), "superseded snapshot must be released");
        assert_ne!(first, second);

        let entries = fs::read_dir(&dir).expect("read dir").count();
        assert_eq!(entries, 1);

        surface.release();
        assert!(!second.exists());
    }

    #[test]
    fn drop_cleans_up_snapshot_and_directory() {
        let dir = temp_dir("drop");
        {
            let mut surface = PreviewSurface::new(&dir);
            surface.refresh("<p>x</p>").expect("refresh");
        }
        assert!(!dir.exists());
    }
}
