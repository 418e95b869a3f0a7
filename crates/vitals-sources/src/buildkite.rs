//! Buildkite REST client.
//!
//! Implements [`DeploymentHistory`] over the builds listing endpoint with
//! the production filter applied server-side: passed builds on `master`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use vitals_core::{DeploymentHistory, EvidenceRecord, Page, Result, VitalsError};

use crate::pagination::has_next_page;
use crate::{http_client, PER_PAGE};

const DEFAULT_BASE_URL: &str = "https://api.buildkite.com/v2";

/// Branch considered "production" for deployment counting.
const DEPLOY_BRANCH: &str = "master";

pub struct BuildkiteClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl BuildkiteClient {
    pub fn new(token: &str) -> Result<Self> {
        Ok(BuildkiteClient {
            http: http_client()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.to_string(),
        })
    }

    /// Point the client at a different API root (tests, proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct BuildResponse {
    author: Option<Person>,
    creator: Option<Person>,
    finished_at: Option<DateTime<Utc>>,
    web_url: String,
    state: String,
    blocked: bool,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Person {
    name: String,
}

impl BuildResponse {
    fn into_record(self) -> Option<EvidenceRecord> {
        // A build without a finish time is still running and cannot be
        // placed in the reverse-chronological window.
        let finished_at = self.finished_at?;
        let author = self
            .author
            .or(self.creator)
            .map(|person| person.name)
            .unwrap_or_else(|| "unknown".to_string());
        Some(EvidenceRecord::Deployment {
            author,
            finished_at,
            web_url: self.web_url,
            state: self.state,
            blocked: self.blocked,
            message: self.message.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl DeploymentHistory for BuildkiteClient {
    async fn builds_page(&self, org: &str, pipeline: &str, page: u32) -> Result<Page> {
        let url = format!(
            "{}/organizations/{}/pipelines/{}/builds",
            self.base_url, org, pipeline
        );
        let query = [
            ("state", "passed".to_string()),
            ("branch", DEPLOY_BRANCH.to_string()),
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await
            .map_err(VitalsError::http)?;
        let response = response.error_for_status().map_err(VitalsError::http)?;
        let has_next = has_next_page(response.headers());
        let builds: Vec<BuildResponse> = response.json().await.map_err(VitalsError::http)?;

        let records: Vec<EvidenceRecord> = builds
            .into_iter()
            .filter_map(BuildResponse::into_record)
            .collect();
        debug!(org, pipeline, page, count = records.len(), has_next, "build page fetched");
        Ok(Page { records, has_next })
    }
}
