//! GitHub Enterprise REST client.
//!
//! Implements [`RepositoryHost`] (metadata + one-pager lookup) and
//! [`CommitHistory`] (newest-first commit pages) against a GitHub Enterprise
//! v3 API base URL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use vitals_core::{
    CommitHistory, EvidenceRecord, Page, RepositoryHost, RepositoryInfo, Result, VitalsError,
};

use crate::pagination::has_next_page;
use crate::{http_client, PER_PAGE};

pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    /// Build a client against an enterprise API base URL, e.g.
    /// `https://github.example.com/api/v3`.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Ok(GitHubClient {
            http: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn repo_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}", self.base_url, owner, repo)
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        self.http
            .get(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .query(query)
            .send()
            .await
            .map_err(VitalsError::http)
    }
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    html_url: String,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitListItem {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: Option<CommitIdent>,
    committer: Option<CommitIdent>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct CommitIdent {
    name: String,
    date: DateTime<Utc>,
}

impl CommitListItem {
    fn into_record(self) -> Option<EvidenceRecord> {
        let CommitDetail {
            author,
            committer,
            message,
        } = self.commit;
        // Author name for attribution, committer date for ordering, each
        // falling back to the other identity when absent.
        let committed_at = committer
            .as_ref()
            .or(author.as_ref())
            .map(|ident| ident.date)?;
        let name = author
            .or(committer)
            .map(|ident| ident.name)
            .unwrap_or_else(|| "unknown".to_string());
        Some(EvidenceRecord::Commit {
            author: name,
            committed_at,
            message,
        })
    }
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<RepositoryInfo> {
        let response = self.get(&self.repo_url(owner, repo), &[]).await?;
        let response = response.error_for_status().map_err(VitalsError::http)?;
        let repo: RepoResponse = response.json().await.map_err(VitalsError::http)?;
        Ok(RepositoryInfo {
            name: repo.name,
            html_url: repo.html_url,
            language: repo.language,
        })
    }

    async fn content_url(&self, owner: &str, repo: &str, path: &str) -> Result<Option<String>> {
        let url = format!("{}/contents/{}", self.repo_url(owner, repo), path);
        let response = self.get(&url, &[]).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status().map_err(VitalsError::http)?;
        let content: ContentResponse = response.json().await.map_err(VitalsError::http)?;
        Ok(content.html_url)
    }
}

#[async_trait]
impl CommitHistory for GitHubClient {
    async fn commits_page(&self, owner: &str, repo: &str, page: u32) -> Result<Page> {
        let url = format!("{}/commits", self.repo_url(owner, repo));
        let query = [
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];
        let response = self.get(&url, &query).await?;
        let response = response.error_for_status().map_err(VitalsError::http)?;
        let has_next = has_next_page(response.headers());
        let items: Vec<CommitListItem> = response.json().await.map_err(VitalsError::http)?;

        let records: Vec<EvidenceRecord> = items
            .into_iter()
            .filter_map(CommitListItem::into_record)
            .collect();
        debug!(owner, repo, page, count = records.len(), has_next, "commit page fetched");
        Ok(Page { records, has_next })
    }
}
