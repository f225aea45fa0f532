// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Netlify sites/deploys publish target.
//!
//! Deploys either upload a ZIP archive of the file set or negotiate by SHA1
//! file digest (the API answers with the files it still needs, which are
//! then uploaded individually). Either way the deploy is polled at a fixed
//! interval until it reaches a terminal state or the poll budget runs out.

use std::collections::HashMap;
use std::time::Duration;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::model::{DeployId, SiteId};

use super::{
    error_from_response, now_millis, send_with_retry, write_zip, DeployRecord, DeployState,
    FileSet, PublishError, TargetKind,
};

pub const NETLIFY_API_BASE: &str = "https://api.netlify.com/api/v1";

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_POLLS: usize = 60;

/// Persisted connection settings for the Netlify target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetlifyConnection {
    pub token: String,
    pub site_id: Option<SiteId>,
    pub site_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetlifyUser {
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl NetlifyUser {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("(unknown)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetlifySite {
    pub id: SiteId,
    pub name: String,
    pub url: Option<String>,
    pub ssl_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct NetlifyDeploy {
    id: String,
    state: String,
    ssl_url: Option<String>,
    deploy_ssl_url: Option<String>,
    #[serde(default)]
    required: Vec<String>,
}

/// How a deploy ships its files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployMethod {
    /// Single archive upload; fast and simple.
    ZipArchive,
    /// SHA1 digest negotiation; only changed files are uploaded.
    FileDigest,
}

pub struct NetlifyClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    poll_interval: Duration,
    max_polls: usize,
}

impl NetlifyClient {
    pub fn new(token: impl Into<String>) -> Result<Self, PublishError> {
        Self::with_api_base(token, NETLIFY_API_BASE)
    }

    pub fn with_api_base(
        token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            api_base: api_base.into(),
            token: token.into(),
            poll_interval: POLL_INTERVAL,
            max_polls: MAX_POLLS,
        })
    }

    /// Overrides the status-poll cadence (tests use a fast one).
    pub fn with_polling(mut self, poll_interval: Duration, max_polls: usize) -> Self {
        self.poll_interval = poll_interval;
        self.max_polls = max_polls;
        self
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
    }

    /// Validates the token by fetching the account it belongs to.
    pub async fn authenticate(&self) -> Result<NetlifyUser, PublishError> {
        let url = format!("{}/user", self.api_base);
        let response = send_with_retry(|| self.request(reqwest::Method::GET, &url)).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        response
            .json()
            .await
            .map_err(|err| PublishError::UnexpectedResponse {
                message: err.to_string(),
            })
    }

    pub async fn list_sites(&self) -> Result<Vec<NetlifySite>, PublishError> {
        let url = format!("{}/sites", self.api_base);
        let response = send_with_retry(|| self.request(reqwest::Method::GET, &url)).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        response
            .json()
            .await
            .map_err(|err| PublishError::UnexpectedResponse {
                message: err.to_string(),
            })
    }

    /// Reuses a site matching `desired_name` (or any site this tool created
    /// earlier), creating one when none matches.
    pub async fn find_or_create_site(
        &self,
        desired_name: Option<&str>,
    ) -> Result<NetlifySite, PublishError> {
        let sites = self.list_sites().await?;
        let existing = sites.into_iter().find(|site| {
            desired_name.is_some_and(|name| site.name == name) || site.name.contains("halimede")
        });
        if let Some(site) = existing {
            return Ok(site);
        }

        let name = desired_name
            .map(str::to_owned)
            .unwrap_or_else(|| format!("halimede-site-{}", now_millis()));
        let body = serde_json::json!({
            "name": name,
            "processing_settings": { "html": { "pretty_urls": true } },
        });
        let url = format!("{}/sites", self.api_base);
        let response =
            send_with_retry(|| self.request(reqwest::Method::POST, &url).json(&body)).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        response
            .json()
            .await
            .map_err(|err| PublishError::UnexpectedResponse {
                message: err.to_string(),
            })
    }

    /// Runs one full deployment: create, upload, poll to terminal state.
    pub async fn deploy(
        &self,
        site_id: &SiteId,
        files: &FileSet,
        method: DeployMethod,
        message: &str,
    ) -> Result<DeployRecord, PublishError> {
        let created = match method {
            DeployMethod::ZipArchive => self.create_zip_deploy(site_id, files).await?,
            DeployMethod::FileDigest => self.create_digest_deploy(site_id, files).await?,
        };
        let finished = self.poll_deploy(&created.id).await?;

        let timestamp_ms = now_millis();
        let id = DeployId::new(finished.id.clone())
            .unwrap_or_else(|_| DeployId::new(format!("nl-{timestamp_ms}")).expect("deploy id"));
        Ok(DeployRecord {
            id,
            target: TargetKind::Netlify,
            url: finished.deploy_ssl_url.or(finished.ssl_url),
            state: DeployState::Ready,
            message: message.to_owned(),
            timestamp_ms,
        })
    }

    async fn create_zip_deploy(
        &self,
        site_id: &SiteId,
        files: &FileSet,
    ) -> Result<NetlifyDeploy, PublishError> {
        let archive = write_zip(files)?;
        let url = format!("{}/sites/{}/deploys", self.api_base, site_id);
        let response = send_with_retry(|| {
            self.request(reqwest::Method::POST, &url)
                .header("Content-Type", "application/zip")
                .body(archive.clone())
        })
        .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        response
            .json()
            .await
            .map_err(|err| PublishError::UnexpectedResponse {
                message: err.to_string(),
            })
    }

    async fn create_digest_deploy(
        &self,
        site_id: &SiteId,
        files: &FileSet,
    ) -> Result<NetlifyDeploy, PublishError> {
        let entries: Vec<(&str, &[u8])> = files.iter().collect();
        let digests: Vec<(String, String)> = entries
            .par_iter()
            .map(|&(path, contents)| (digest_path(path), sha1_hex(contents)))
            .collect();

        let mut digest_map = serde_json::Map::new();
        for (path, sha) in &digests {
            digest_map.insert(path.clone(), serde_json::Value::String(sha.clone()));
        }
        let body = serde_json::json!({ "files": digest_map, "async": true });

        let url = format!("{}/sites/{}/deploys", self.api_base, site_id);
        let response =
            send_with_retry(|| self.request(reqwest::Method::POST, &url).json(&body)).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        let deploy: NetlifyDeploy =
            response
                .json()
                .await
                .map_err(|err| PublishError::UnexpectedResponse {
                    message: err.to_string(),
                })?;

        self.upload_required(&deploy, files, &digests).await?;
        Ok(deploy)
    }

    /// Uploads the files the deploy still needs. `required` entries are
    /// matched by path; SHA references are resolved through the digest list.
    async fn upload_required(
        &self,
        deploy: &NetlifyDeploy,
        files: &FileSet,
        digests: &[(String, String)],
    ) -> Result<(), PublishError> {
        if deploy.required.is_empty() {
            return Ok(());
        }

        let by_sha: HashMap<&str, &str> = digests
            .iter()
            .map(|(path, sha)| (sha.as_str(), path.as_str()))
            .collect();

        for needed in &deploy.required {
            let path = if by_sha.contains_key(needed.as_str()) {
                by_sha[needed.as_str()].to_owned()
            } else {
                digest_path(needed)
            };
            let Some(contents) = files.get(path.trim_start_matches('/')) else {
                continue;
            };

            let url = self.file_upload_url(&deploy.id, &path)?;
            let body = contents.to_vec();
            let response = send_with_retry(|| {
                self.http
                    .put(url.clone())
                    .header("Authorization", format!("Bearer {}", self.token))
                    .header("Content-Type", "application/octet-stream")
                    .body(body.clone())
            })
            .await?;
            if !response.status().is_success() {
                return Err(error_from_response(response).await);
            }
        }
        Ok(())
    }

    fn file_upload_url(&self, deploy_id: &str, path: &str) -> Result<reqwest::Url, PublishError> {
        let mut url =
            reqwest::Url::parse(&self.api_base).map_err(|err| PublishError::Transport {
                message: err.to_string(),
            })?;
        url.path_segments_mut()
            .map_err(|()| PublishError::Transport {
                message: "cannot-be-a-base API URL".to_owned(),
            })?
            .pop_if_empty()
            .extend(["deploys", deploy_id, "files"])
            .extend(path.trim_start_matches('/').split('/'));
        Ok(url)
    }

    /// Polls until the deploy is terminal; a non-terminal state after the
    /// poll budget is a timeout, never an infinite loop.
    async fn poll_deploy(&self, deploy_id: &str) -> Result<NetlifyDeploy, PublishError> {
        let url = format!("{}/deploys/{}", self.api_base, deploy_id);
        for _ in 0..self.max_polls {
            let response = send_with_retry(|| self.request(reqwest::Method::GET, &url)).await?;
            if !response.status().is_success() {
                return Err(error_from_response(response).await);
            }
            let deploy: NetlifyDeploy =
                response
                    .json()
                    .await
                    .map_err(|err| PublishError::UnexpectedResponse {
                        message: err.to_string(),
                    })?;

            match DeployState::from_api_str(&deploy.state) {
                DeployState::Ready => return Ok(deploy),
                DeployState::Error => {
                    return Err(PublishError::DeployFailed {
                        message: format!("deploy {deploy_id} entered the error state"),
                    });
                }
                _ => tokio::time::sleep(self.poll_interval).await,
            }
        }
        Err(PublishError::Timeout {
            polls: self.max_polls,
        })
    }
}

fn digest_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{sha1_hex, DeployMethod, NetlifyClient};
    use crate::model::SiteId;
    use crate::publish::{FileSet, PublishError};

    fn client(server: &MockServer) -> NetlifyClient {
        NetlifyClient::with_api_base("nl_test", server.uri())
            .expect("client")
            .with_polling(Duration::from_millis(1), 5)
    }

    fn site_id() -> SiteId {
        SiteId::new("site-1").expect("site id")
    }

    fn files() -> FileSet {
        let mut files = FileSet::new();
        files.insert("index.html", b"<p>hi</p>".to_vec());
        files
    }

    #[test]
    fn sha1_matches_known_digest() {
        assert_eq!(sha1_hex(b"hello"), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    }

    #[tokio::test]
    async fn authenticate_returns_the_account() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("Authorization", "Bearer nl_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "email": "dev@example.com",
                "full_name": "Dev"
            })))
            .mount(&server)
            .await;

        let user = client(&server).authenticate().await.expect("authenticate");
        assert_eq!(user.display_name(), "Dev");
    }

    #[tokio::test]
    async fn find_or_create_creates_a_site_when_none_matches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sites"))
            .and(body_partial_json(serde_json::json!({
                "name": "my-site",
                "processing_settings": { "html": { "pretty_urls": true } }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "site-1",
                "name": "my-site",
                "url": "http://my-site.netlify.app",
                "ssl_url": "https://my-site.netlify.app"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let site = client(&server)
            .find_or_create_site(Some("my-site"))
            .await
            .expect("site");
        assert_eq!(site.name, "my-site");
    }

    #[tokio::test]
    async fn zip_deploy_uploads_an_archive_and_polls_to_ready() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sites/site-1/deploys"))
            .and(header("Content-Type", "application/zip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "dep-1",
                "state": "uploading"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/deploys/dep-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "dep-1",
                "state": "ready",
                "ssl_url": "https://my-site.netlify.app"
            })))
            .mount(&server)
            .await;

        let record = client(&server)
            .deploy(&site_id(), &files(), DeployMethod::ZipArchive, "deploy")
            .await
            .expect("deploy");
        assert_eq!(record.id.as_str(), "dep-1");
        assert_eq!(record.url.as_deref(), Some("https://my-site.netlify.app"));
    }

    #[tokio::test]
    async fn digest_deploy_uploads_only_required_files() {
        let server = MockServer::start().await;
        let sha = sha1_hex(b"<p>hi</p>");
        Mock::given(method("POST"))
            .and(path("/sites/site-1/deploys"))
            .and(body_partial_json(serde_json::json!({
                "files": { "/index.html": sha },
                "async": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "dep-2",
                "state": "preparing",
                "required": ["/index.html"]
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/deploys/dep-2/files/index.html"))
            .and(header("Content-Type", "application/octet-stream"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/deploys/dep-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "dep-2",
                "state": "ready"
            })))
            .mount(&server)
            .await;

        let record = client(&server)
            .deploy(&site_id(), &files(), DeployMethod::FileDigest, "deploy")
            .await
            .expect("deploy");
        assert_eq!(record.id.as_str(), "dep-2");
    }

    #[tokio::test]
    async fn polling_past_the_budget_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sites/site-1/deploys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "dep-3",
                "state": "uploading"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/deploys/dep-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "dep-3",
                "state": "building"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .deploy(&site_id(), &files(), DeployMethod::ZipArchive, "deploy")
            .await
            .unwrap_err();
        match err {
            PublishError::Timeout { polls } => assert_eq!(polls, 5),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
