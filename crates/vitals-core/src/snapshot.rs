//! Repository snapshot: metadata plus one-pager presence.
//!
//! Fetched fresh per report request, never cached. Every lookup failure
//! degrades to absence so a best-effort report can still be rendered.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Filenames probed for the one-page design document, in order. The first
/// hit wins.
pub const ONE_PAGER_CANDIDATES: [&str; 2] = ["1pager.md", "1Pager.md"];

/// Repository metadata as returned by the source-control host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub html_url: String,
    /// Primary language; absent for empty or unclassified repositories.
    pub language: Option<String>,
}

/// Point-in-time view of a repository for one report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub name: String,
    pub html_url: String,
    pub language: Option<String>,
    /// HTML URL of the one-pager document, when one of the candidate
    /// filenames resolves.
    pub one_pager_url: Option<String>,
}

/// Read side of the source-control host needed for a snapshot.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<RepositoryInfo>;

    /// Resolve a path inside the repository to its HTML URL. `Ok(None)` is
    /// the not-found signal; `Err` is reserved for transport failures.
    async fn content_url(&self, owner: &str, repo: &str, path: &str) -> Result<Option<String>>;
}

/// Fetch a snapshot of `owner/repo`.
///
/// Metadata failures and one-pager lookup failures are logged and degrade
/// to absence; this function never fails the report.
pub async fn fetch_snapshot(host: &dyn RepositoryHost, owner: &str, repo: &str) -> RepositorySnapshot {
    let info = match host.get_repository(owner, repo).await {
        Ok(info) => Some(info),
        Err(err) => {
            warn!(owner, repo, error = %err, "repository metadata lookup failed");
            None
        }
    };

    let mut one_pager_url = None;
    for path in ONE_PAGER_CANDIDATES {
        match host.content_url(owner, repo, path).await {
            Ok(Some(url)) => {
                one_pager_url = Some(url);
                break;
            }
            Ok(None) => {}
            Err(err) => {
                warn!(owner, repo, path, error = %err, "one-pager lookup failed");
            }
        }
    }

    match info {
        Some(info) => RepositorySnapshot {
            name: info.name,
            html_url: info.html_url,
            language: info.language,
            one_pager_url,
        },
        // Metadata unavailable: report with what the request carried.
        None => RepositorySnapshot {
            name: repo.to_string(),
            html_url: String::new(),
            language: None,
            one_pager_url,
        },
    }
}
