// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! GitHub contents-API publish target.
//!
//! Publishing a file is a create-or-update: look up the existing blob SHA
//! (a missing file simply yields none, and the update proceeds without a
//! revision identifier), then PUT the base64-encoded content with a commit
//! message.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::model::DeployId;

use super::{
    error_from_response, now_millis, send_with_retry, DeployRecord, DeployState, FileSet,
    PublishError, TargetKind,
};

pub const GITHUB_API_BASE: &str = "https://api.github.com";

const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("halimede/", env!("CARGO_PKG_VERSION"));

/// Persisted connection settings for the GitHub target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubConnection {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Repo path the active document publishes to (e.g. `docs/index.html`).
    pub file_path: String,
}

impl GithubConnection {
    pub fn repo_slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    connection: GithubConnection,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    commit: Option<CommitInfo>,
    content: Option<ContentInfo>,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentInfo {
    html_url: Option<String>,
}

impl GithubClient {
    pub fn new(connection: GithubConnection) -> Result<Self, PublishError> {
        Self::with_api_base(connection, GITHUB_API_BASE)
    }

    pub fn with_api_base(
        connection: GithubConnection,
        api_base: impl Into<String>,
    ) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.into(),
            connection,
        })
    }

    pub fn connection(&self) -> &GithubConnection {
        &self.connection
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("token {}", self.connection.token))
            .header("Accept", ACCEPT_HEADER)
    }

    /// Validates the token against the repository endpoint.
    pub async fn authenticate(&self) -> Result<(), PublishError> {
        let url = format!(
            "{}/repos/{}/{}",
            self.api_base, self.connection.owner, self.connection.repo
        );
        let response = send_with_retry(|| self.request(reqwest::Method::GET, &url)).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            self.connection.owner,
            self.connection.repo,
            path.trim_start_matches('/')
        )
    }

    /// Fetches the blob SHA of an existing file; `None` when the file does
    /// not exist yet.
    async fn existing_file_sha(&self, path: &str) -> Result<Option<String>, PublishError> {
        let url = self.contents_url(path);
        let response = send_with_retry(|| self.request(reqwest::Method::GET, &url)).await?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let contents: ContentsResponse =
            response
                .json()
                .await
                .map_err(|err| PublishError::UnexpectedResponse {
                    message: err.to_string(),
                })?;
        Ok(Some(contents.sha))
    }

    /// Creates or updates every file in the set with one commit each.
    pub async fn publish(
        &self,
        files: &FileSet,
        message: &str,
    ) -> Result<DeployRecord, PublishError> {
        let mut last_commit: Option<String> = None;
        let mut last_url: Option<String> = None;

        for (path, contents) in files.iter() {
            let sha = self.existing_file_sha(path).await?;

            let mut body = serde_json::json!({
                "message": message,
                "content": STANDARD.encode(contents),
                "branch": self.connection.branch,
            });
            if let Some(sha) = &sha {
                body["sha"] = serde_json::Value::String(sha.clone());
            }

            let url = self.contents_url(path);
            let response =
                send_with_retry(|| self.request(reqwest::Method::PUT, &url).json(&body)).await?;
            if !response.status().is_success() {
                return Err(error_from_response(response).await);
            }

            let update: UpdateResponse =
                response
                    .json()
                    .await
                    .map_err(|err| PublishError::UnexpectedResponse {
                        message: err.to_string(),
                    })?;
            last_commit = update.commit.and_then(|commit| commit.sha);
            last_url = update.content.and_then(|content| content.html_url);
        }

        let timestamp_ms = now_millis();
        let id = last_commit
            .and_then(|sha| DeployId::new(sha).ok())
            .unwrap_or_else(|| {
                DeployId::new(format!("gh-{timestamp_ms}")).expect("valid deploy id")
            });
        Ok(DeployRecord {
            id,
            target: TargetKind::Github,
            url: last_url,
            state: DeployState::Ready,
            message: message.to_owned(),
            timestamp_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{GithubClient, GithubConnection};
    use crate::publish::{FileSet, PublishError};

    fn connection() -> GithubConnection {
        GithubConnection {
            token: "ghp_test".to_owned(),
            owner: "octo".to_owned(),
            repo: "site".to_owned(),
            branch: "main".to_owned(),
            file_path: "index.html".to_owned(),
        }
    }

    fn client(server: &MockServer) -> GithubClient {
        GithubClient::with_api_base(connection(), server.uri()).expect("client")
    }

    #[tokio::test]
    async fn authenticate_checks_the_repository() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/site"))
            .and(header("Authorization", "token ghp_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "full_name": "octo/site"
            })))
            .mount(&server)
            .await;

        client(&server).authenticate().await.expect("authenticate");
    }

    #[tokio::test]
    async fn authenticate_surfaces_the_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/site"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Bad credentials"
            })))
            .mount(&server)
            .await;

        let err = client(&server).authenticate().await.unwrap_err();
        match err {
            PublishError::Http { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Bad credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn publishing_a_new_file_sends_no_sha() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/site/contents/index.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/octo/site/contents/index.html"))
            .and(body_partial_json(serde_json::json!({
                "message": "Update index.html",
                "branch": "main",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "commit": { "sha": "abc123" },
                "content": { "html_url": "https://github.com/octo/site/blob/main/index.html" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut files = FileSet::new();
        files.insert("index.html", b"<p>hi</p>".to_vec());

        let record = client(&server)
            .publish(&files, "Update index.html")
            .await
            .expect("publish");
        assert_eq!(record.id.as_str(), "abc123");
        assert_eq!(
            record.url.as_deref(),
            Some("https://github.com/octo/site/blob/main/index.html")
        );
    }

    #[tokio::test]
    async fn publishing_an_existing_file_includes_its_sha() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/site/contents/index.html"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sha": "oldsha"
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/octo/site/contents/index.html"))
            .and(body_partial_json(serde_json::json!({ "sha": "oldsha" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "commit": { "sha": "def456" },
                "content": { "html_url": null }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut files = FileSet::new();
        files.insert("index.html", b"<p>hi</p>".to_vec());

        let record = client(&server)
            .publish(&files, "Update index.html")
            .await
            .expect("publish");
        assert_eq!(record.id.as_str(), "def456");
    }
}
