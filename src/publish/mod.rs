// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Publish targets.
//!
//! Two remote targets share this surface: the GitHub contents API and the
//! Netlify sites/deploys API. Both expose authentication, a publish
//! operation producing a [`DeployRecord`], and bounded retry with fixed
//! backoff on rate-limit responses. Deployment history is persisted by the
//! config store, not here.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::model::{DeployId, Workspace};

pub mod archive;
pub mod github;
pub mod netlify;

pub use archive::{write_zip, ArchiveError};
pub use github::{GithubClient, GithubConnection, GITHUB_API_BASE};
pub use netlify::{
    DeployMethod, NetlifyClient, NetlifyConnection, NetlifySite, NetlifyUser, NETLIFY_API_BASE,
};

/// Fixed retry policy for rate-limited requests.
pub(crate) const RETRY_ATTEMPTS: usize = 3;
pub(crate) const RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Github,
    Netlify,
}

impl TargetKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Github => "GitHub",
            Self::Netlify => "Netlify",
        }
    }
}

/// Lifecycle state of one deployment; `Ready` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployState {
    New,
    Preparing,
    Uploading,
    Processing,
    Building,
    Ready,
    Error,
    Unknown,
}

impl DeployState {
    pub fn from_api_str(state: &str) -> Self {
        match state {
            "new" => Self::New,
            "preparing" | "prepared" => Self::Preparing,
            "uploading" | "uploaded" => Self::Uploading,
            "processing" => Self::Processing,
            "building" => Self::Building,
            "ready" | "current" => Self::Ready,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }

    pub fn status_message(&self) -> &'static str {
        match self {
            Self::New => "Deployment created",
            Self::Preparing => "Preparing deployment...",
            Self::Uploading => "Uploading files...",
            Self::Processing => "Processing deployment...",
            Self::Building => "Building site...",
            Self::Ready => "Deployment complete!",
            Self::Error => "Deployment failed",
            Self::Unknown => "Deployment in progress...",
        }
    }
}

/// One publish attempt against a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployRecord {
    pub id: DeployId,
    pub target: TargetKind,
    pub url: Option<String>,
    pub state: DeployState,
    pub message: String,
    pub timestamp_ms: u64,
}

/// The files a publish operation ships, keyed by target-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileSet {
    files: BTreeMap<String, Vec<u8>>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files
            .iter()
            .map(|(path, contents)| (path.as_str(), contents.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Collects every open text document; binary tree entries carry no
    /// content and are not shipped.
    pub fn from_workspace(workspace: &Workspace) -> Self {
        let mut set = Self::new();
        for document in workspace.documents().values() {
            set.insert(document.path(), document.source().as_bytes().to_vec());
        }
        set
    }
}

#[derive(Debug)]
pub enum PublishError {
    MissingCredentials,
    /// A non-2xx response, with the server-provided message when present.
    Http { status: u16, message: String },
    RateLimited { attempts: usize },
    Transport { message: String },
    /// The response body did not have the expected shape.
    UnexpectedResponse { message: String },
    /// A deployment reached a terminal error state.
    DeployFailed { message: String },
    /// Status polling exhausted its attempt budget.
    Timeout { polls: usize },
    Archive(ArchiveError),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredentials => f.write_str("no credentials configured for this target"),
            Self::Http { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::RateLimited { attempts } => {
                write!(f, "rate limited after {attempts} attempts")
            }
            Self::Transport { message } => write!(f, "request failed: {message}"),
            Self::UnexpectedResponse { message } => {
                write!(f, "unexpected response: {message}")
            }
            Self::DeployFailed { message } => write!(f, "deployment failed: {message}"),
            Self::Timeout { polls } => {
                write!(f, "deployment did not reach a terminal state after {polls} polls")
            }
            Self::Archive(err) => write!(f, "cannot build archive: {err}"),
        }
    }
}

impl std::error::Error for PublishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Archive(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PublishError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

impl From<ArchiveError> for PublishError {
    fn from(err: ArchiveError) -> Self {
        Self::Archive(err)
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Sends a request, retrying on 429 with fixed backoff.
///
/// `build` is invoked once per attempt because a request builder is consumed
/// by sending. Transport errors retry on the same budget; any other response
/// (success or failure alike) is returned to the caller for classification.
pub(crate) async fn send_with_retry<F>(build: F) -> Result<reqwest::Response, PublishError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_transport: Option<PublishError> = None;
    for attempt in 0..RETRY_ATTEMPTS {
        match build().send().await {
            Ok(response) if response.status().as_u16() == 429 => {
                if attempt + 1 == RETRY_ATTEMPTS {
                    return Err(PublishError::RateLimited {
                        attempts: RETRY_ATTEMPTS,
                    });
                }
                tokio::time::sleep(RETRY_DELAY * (attempt as u32 + 1)).await;
            }
            Ok(response) => return Ok(response),
            Err(err) => {
                if attempt + 1 == RETRY_ATTEMPTS {
                    return Err(err.into());
                }
                last_transport = Some(err.into());
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
    Err(last_transport.unwrap_or(PublishError::RateLimited {
        attempts: RETRY_ATTEMPTS,
    }))
}

/// Converts a non-2xx response into [`PublishError::Http`], preferring the
/// server's own `message` field.
pub(crate) async fn error_from_response(response: reqwest::Response) -> PublishError {
    let status = response.status().as_u16();
    let message = match response.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(|message| message.as_str())
            .map(str::to_owned)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => String::from("(no response body)"),
    };
    PublishError::Http { status, message }
}
