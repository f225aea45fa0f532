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
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::publish::{DeployRecord, GithubConnection, NetlifyConnection, TargetKind};

const GITHUB_CONNECTION_FILENAME: &str = "github-connection.json";
const NETLIFY_CONNECTION_FILENAME: &str = "netlify-connection.json";
const AUTO_DEPLOY_FILENAME: &str = "auto-deploy.json";
const LAYOUT_FILENAME: &str = "layout.json";
const GITHUB_HISTORY_FILENAME: &str = "github-history.json";
const NETLIFY_HISTORY_FILENAME: &str = "netlify-history.json";

/// Rolling deployment history cap per target.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot access {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "cannot encode {path:?}: {source}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// Per-target auto-deploy-on-save flags.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoDeployFlags {
    pub github: bool,
    pub netlify: bool,
}

impl AutoDeployFlags {
    pub fn get(&self, target: TargetKind) -> bool {
        match target {
            TargetKind::Github => self.github,
            TargetKind::Netlify => self.netlify,
        }
    }

    pub fn set(&mut self, target: TargetKind, enabled: bool) {
        match target {
            TargetKind::Github => self.github = enabled,
            TargetKind::Netlify => self.netlify = enabled,
        }
    }
}

/// Persisted panel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutState {
    /// Editor pane share of the split, in percent.
    pub editor_percent: u16,
    pub preview_visible: bool,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            editor_percent: 55,
            preview_visible: true,
        }
    }
}

/// The injected persistence port: a folder of small JSON files, one per
/// concern (connections, auto-deploy flags, layout, deploy history).
///
/// Missing or corrupt files degrade to defaults on load; writes are atomic
/// (temp file + rename) with opt-in durable flushing.
#[derive(Debug, Clone)]
pub struct ConfigFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl ConfigFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn load_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StoreError> {
        let path = self.file(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        // Corrupt state degrades to defaults rather than wedging the app.
        Ok(serde_json::from_slice(&bytes).ok())
    }

    fn save_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let path = self.file(name);
        let mut bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        bytes.push(b'\n');
        write_atomic(&self.root, &path, &bytes, self.durability)
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        let path = self.file(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    pub fn load_github_connection(&self) -> Result<Option<GithubConnection>, StoreError> {
        self.load_json(GITHUB_CONNECTION_FILENAME)
    }

    pub fn save_github_connection(&self, connection: &GithubConnection) -> Result<(), StoreError> {
        self.save_json(GITHUB_CONNECTION_FILENAME, connection)
    }

    pub fn load_netlify_connection(&self) -> Result<Option<NetlifyConnection>, StoreError> {
        self.load_json(NETLIFY_CONNECTION_FILENAME)
    }

    pub fn save_netlify_connection(
        &self,
        connection: &NetlifyConnection,
    ) -> Result<(), StoreError> {
        self.save_json(NETLIFY_CONNECTION_FILENAME, connection)
    }

    pub fn load_auto_deploy(&self) -> Result<AutoDeployFlags, StoreError> {
        Ok(self.load_json(AUTO_DEPLOY_FILENAME)?.unwrap_or_default())
    }

    pub fn save_auto_deploy(&self, flags: &AutoDeployFlags) -> Result<(), StoreError> {
        self.save_json(AUTO_DEPLOY_FILENAME, flags)
    }

    pub fn load_layout(&self) -> Result<Option<LayoutState>, StoreError> {
        self.load_json(LAYOUT_FILENAME)
    }

    pub fn save_layout(&self, layout: &LayoutState) -> Result<(), StoreError> {
        self.save_json(LAYOUT_FILENAME, layout)
    }

    fn history_filename(target: TargetKind) -> &'static str {
        match target {
            TargetKind::Github => GITHUB_HISTORY_FILENAME,
            TargetKind::Netlify => NETLIFY_HISTORY_FILENAME,
        }
    }

    /// Deployment history for a target, most recent first.
    pub fn history(&self, target: TargetKind) -> Result<Vec<DeployRecord>, StoreError> {
        Ok(self
            .load_json(Self::history_filename(target))?
            .unwrap_or_default())
    }

    /// Prepends a record to the target's rolling history, evicting beyond
    /// [`HISTORY_LIMIT`]. Returns the updated history.
    pub fn record_deploy(
        &self,
        target: TargetKind,
        record: DeployRecord,
    ) -> Result<Vec<DeployRecord>, StoreError> {
        let mut history = self.history(target)?;
        history.insert(0, record);
        history.truncate(HISTORY_LIMIT);
        self.save_json(Self::history_filename(target), &history)?;
        Ok(history)
    }

    /// Forgets a target entirely: connection, auto-deploy flag, history.
    pub fn clear_target(&self, target: TargetKind) -> Result<(), StoreError> {
        match target {
            TargetKind::Github => self.remove(GITHUB_CONNECTION_FILENAME)?,
            TargetKind::Netlify => self.remove(NETLIFY_CONNECTION_FILENAME)?,
        }
        self.remove(Self::history_filename(target))?;

        let mut flags = self.load_auto_deploy()?;
        flags.set(target, false);
        self.save_auto_deploy(&flags)
    }
}

fn write_atomic(
    root: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    fs::create_dir_all(root).map_err(|source| StoreError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let Some(parent) = path.parent() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no parent"),
        });
    };
    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".halimede.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    file.write_all(contents).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    }
    drop(file);

    fs::rename(&tmp_path, path).map_err(|source| {
        let _ = fs::remove_file(&tmp_path);
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::{AutoDeployFlags, ConfigFolder, LayoutState, HISTORY_LIMIT};
    use crate::model::DeployId;
    use crate::publish::{DeployRecord, DeployState, GithubConnection, TargetKind};

    fn temp_config(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "halimede-store-test-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn record(id: &str) -> DeployRecord {
        DeployRecord {
            id: DeployId::new(id).expect("deploy id"),
            target: TargetKind::Github,
            url: None,
            state: DeployState::Ready,
            message: "update".to_owned(),
            timestamp_ms: 0,
        }
    }

    fn github_connection() -> GithubConnection {
        GithubConnection {
            token: "ghp_x".to_owned(),
            owner: "octo".to_owned(),
            repo: "site".to_owned(),
            branch: "main".to_owned(),
            file_path: "index.html".to_owned(),
        }
    }

    #[test]
    fn connection_round_trips() {
        let folder = ConfigFolder::new(temp_config("conn"));
        assert!(folder.load_github_connection().expect("load").is_none());

        folder
            .save_github_connection(&github_connection())
            .expect("save");
        let loaded = folder.load_github_connection().expect("load").expect("some");
        assert_eq!(loaded, github_connection());

        let _ = fs::remove_dir_all(folder.root());
    }

    #[test]
    fn history_is_capped_and_newest_first() {
        let folder = ConfigFolder::new(temp_config("history"));

        for n in 0..(HISTORY_LIMIT + 1) {
            folder
                .record_deploy(TargetKind::Github, record(&format!("d{n}")))
                .expect("record");
        }

        let history = folder.history(TargetKind::Github).expect("history");
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].id.as_str(), "d10", "newest first");
        assert!(
            history.iter().all(|entry| entry.id.as_str() != "d0"),
            "the oldest entry is evicted"
        );

        let _ = fs::remove_dir_all(folder.root());
    }

    #[test]
    fn corrupt_files_degrade_to_defaults() {
        let folder = ConfigFolder::new(temp_config("corrupt"));
        fs::create_dir_all(folder.root()).expect("create dir");
        fs::write(folder.root().join("auto-deploy.json"), b"{not json").expect("write");
        fs::write(folder.root().join("layout.json"), b"]]").expect("write");

        assert_eq!(folder.load_auto_deploy().expect("load"), AutoDeployFlags::default());
        assert_eq!(folder.load_layout().expect("load"), None);

        let _ = fs::remove_dir_all(folder.root());
    }

    #[test]
    fn layout_round_trips() {
        let folder = ConfigFolder::new(temp_config("layout"));
        let layout = LayoutState {
            editor_percent: 70,
            preview_visible: false,
        };
        folder.save_layout(&layout).expect("save");
        assert_eq!(folder.load_layout().expect("load"), Some(layout));

        let _ = fs::remove_dir_all(folder.root());
    }

    #[test]
    fn clearing_a_target_forgets_connection_history_and_flag() {
        let folder = ConfigFolder::new(temp_config("clear"));
        folder
            .save_github_connection(&github_connection())
            .expect("save connection");
        folder
            .record_deploy(TargetKind::Github, record("d1"))
            .expect("record");
        let mut flags = AutoDeployFlags::default();
        flags.set(TargetKind::Github, true);
        folder.save_auto_deploy(&flags).expect("save flags");

        folder.clear_target(TargetKind::Github).expect("clear");

        assert!(folder.load_github_connection().expect("load").is_none());
        assert!(folder.history(TargetKind::Github).expect("history").is_empty());
        assert!(!folder.load_auto_deploy().expect("flags").github);

        let _ = fs::remove_dir_all(folder.root());
    }
}
