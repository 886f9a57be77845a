//! Confluence-style REST client: the document-store collaborator.
//!
//! Writes are optimistic: the caller sends the version it read plus one, and
//! a concurrent writer shows up as HTTP 409, surfaced as a distinct conflict
//! error. No retry here.

use crate::clients::DocumentStore;
use crate::error::{ApiError, System};
use crate::models::Page;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const SYSTEM: System = System::Wiki;

pub struct WikiClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    api_token: String,
}

impl WikiClient {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        api_token: impl Into<String>,
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

        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.into(),
            api_token: api_token.into(),
        })
    }

    fn content_url(&self, page_id: &str) -> String {
        format!("{}/rest/api/content/{page_id}", self.base_url)
    }
}

#[async_trait]
impl DocumentStore for WikiClient {
    async fn get_page(&self, page_id: &str) -> Result<Page, ApiError> {
        let url = format!("{}?expand=body.storage,version", self.content_url(page_id));
        let resp = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.api_token))
            .send()
            .await
            .map_err(|e| ApiError::from_request(SYSTEM, e))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Err(ApiError::from_status(
                SYSTEM,
                status,
                &format!("page {page_id}"),
            ));
        }

        let raw: RawPage = resp.json().await.map_err(|e| ApiError::Decode {
            system: SYSTEM,
            message: e.to_string(),
        })?;
        Ok(Page::from(raw))
    }

    async fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        new_version: u64,
    ) -> Result<Page, ApiError> {
        let payload = json!({
            "id": page_id,
            "type": "page",
            "title": title,
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            },
            "version": { "number": new_version }
        });

        let resp = self
            .http
            .put(self.content_url(page_id))
            .basic_auth(&self.username, Some(&self.api_token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ApiError::from_request(SYSTEM, e))?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Err(ApiError::from_status(
                SYSTEM,
                status,
                &format!("page {page_id}"),
            ));
        }

        let raw: RawPage = resp.json().await.map_err(|e| ApiError::Decode {
            system: SYSTEM,
            message: e.to_string(),
        })?;
        Ok(Page::from(raw))
    }
}

#[derive(Debug, Deserialize)]
struct RawPage {
    id: String,
    title: String,
    #[serde(default)]
    body: Option<RawBody>,
    version: RawVersion,
}

#[derive(Debug, Deserialize)]
struct RawBody {
    #[serde(default)]
    storage: Option<RawStorage>,
}

#[derive(Debug, Deserialize)]
struct RawStorage {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct RawVersion {
    number: u64,
}

impl From<RawPage> for Page {
    fn from(raw: RawPage) -> Self {
        Page {
            id: raw.id,
            title: raw.title,
            body: raw
                .body
                .and_then(|b| b.storage)
                .map(|s| s.value)
                .unwrap_or_default(),
            version: raw.version.number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_page_maps_to_page() {
        let json = r#"{
            "id": "12345",
            "title": "Release history",
            "body": {"storage": {"value": "<p>hi</p>", "representation": "storage"}},
            "version": {"number": 7}
        }"#;

        let raw: RawPage = serde_json::from_str(json).unwrap();
        let page = Page::from(raw);

        assert_eq!(page.id, "12345");
        assert_eq!(page.body, "<p>hi</p>");
        assert_eq!(page.version, 7);
    }
}
