//! GitHub REST client: the source-control collaborator.

use crate::clients::ChangeRequestSource;
use crate::error::{ApiError, System};
use crate::models::ChangeRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

const SYSTEM: System = System::SourceControl;

/// GitHub REST v3 client. The base URL is configurable for Enterprise hosts.
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl GithubClient {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("changelogd/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network {
                system: SYSTEM,
                message: e.to_string(),
            })?;

        let api_base: String = api_base.into();
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn request(&self, url: &str, accept: &'static str) -> reqwest::RequestBuilder {
        let mut req = self.http.get(url).header("Accept", accept);
        if !self.token.is_empty() {
            req = req.bearer_auth(&self.token);
        }
        req
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
    ) -> Result<T, ApiError> {
        let resp = self
            .request(url, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| ApiError::from_request(SYSTEM, e))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Err(ApiError::from_status(SYSTEM, status, resource));
        }

        resp.json::<T>().await.map_err(|e| ApiError::Decode {
            system: SYSTEM,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ChangeRequestSource for GithubClient {
    async fn list_closed(
        &self,
        owner: &str,
        repo: &str,
        base: Option<&str>,
    ) -> Result<Vec<ChangeRequest>, ApiError> {
        let mut url = format!(
            "{}/repos/{owner}/{repo}/pulls?state=closed&sort=updated&direction=desc&per_page=100",
            self.api_base
        );
        if let Some(base) = base {
            url.push_str("&base=");
            url.push_str(base);
        }

        let pulls: Vec<RawPull> = self.get_json(&url, "pull requests").await?;
        Ok(pulls.into_iter().map(ChangeRequest::from).collect())
    }

    async fn detail(&self, owner: &str, repo: &str, number: u64) -> Result<ChangeRequest, ApiError> {
        let url = format!("{}/repos/{owner}/{repo}/pulls/{number}", self.api_base);
        let pull: RawPull = self
            .get_json(&url, &format!("pull request #{number}"))
            .await?;
        Ok(ChangeRequest::from(pull))
    }

    async fn file_at_ref(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<Vec<u8>>, ApiError> {
        let url = format!(
            "{}/repos/{owner}/{repo}/contents/{path}?ref={git_ref}",
            self.api_base
        );

        // The raw media type skips the base64 detour of the JSON content API
        let resp = self
            .request(&url, "application/vnd.github.raw+json")
            .send()
            .await
            .map_err(|e| ApiError::from_request(SYSTEM, e))?;

        let status = resp.status().as_u16();
        if status == 404 {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(ApiError::from_status(SYSTEM, status, path));
        }

        let bytes = resp.bytes().await.map_err(|e| ApiError::Decode {
            system: SYSTEM,
            message: e.to_string(),
        })?;
        Ok(Some(bytes.to_vec()))
    }
}

#[derive(Debug, Deserialize)]
struct RawPull {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<RawUser>,
    #[serde(default)]
    merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    merged_by: Option<RawUser>,
    #[serde(default)]
    merge_commit_sha: Option<String>,
    base: RawBase,
    head: RawHead,
    #[serde(default)]
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawBase {
    #[serde(rename = "ref")]
    git_ref: String,
}

#[derive(Debug, Deserialize)]
struct RawHead {
    sha: String,
}

impl From<RawPull> for ChangeRequest {
    fn from(raw: RawPull) -> Self {
        ChangeRequest {
            number: raw.number,
            title: raw.title,
            body: raw.body,
            author: raw.user.map(|u| u.login).unwrap_or_default(),
            merged_by: raw.merged_by.map(|u| u.login),
            merged_at: raw.merged_at,
            base_branch: raw.base.git_ref,
            head_sha: raw.head.sha,
            merge_commit_sha: raw.merge_commit_sha,
            html_url: raw.html_url,
        }
    }
}
