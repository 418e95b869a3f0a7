//! Report orchestration: snapshot + two collector runs + rendering.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::collect::{collect, CollectionPolicy, EvidenceSource, Page, RetryingSource};
use crate::dispatch::ReportGenerator;
use crate::error::Result;
use crate::report::{render, Report};
use crate::snapshot::{fetch_snapshot, RepositoryHost};

/// Page fetch attempts per evidence source before giving up a page.
const PAGE_FETCH_ATTEMPTS: u32 = 3;

/// Commit history of one repository, paginated newest-first.
#[async_trait]
pub trait CommitHistory: Send + Sync {
    async fn commits_page(&self, owner: &str, repo: &str, page: u32) -> Result<Page>;
}

/// Deployment history of one pipeline, paginated newest-first.
#[async_trait]
pub trait DeploymentHistory: Send + Sync {
    async fn builds_page(&self, org: &str, pipeline: &str, page: u32) -> Result<Page>;
}

/// Binds a [`CommitHistory`] to one repository so the generic collector can
/// page through it.
struct RepoCommits<'a> {
    history: &'a dyn CommitHistory,
    owner: &'a str,
    repo: &'a str,
}

#[async_trait]
impl EvidenceSource for RepoCommits<'_> {
    async fn fetch_page(&self, page: u32) -> Result<Page> {
        self.history.commits_page(self.owner, self.repo, page).await
    }
}

/// Binds a [`DeploymentHistory`] to one pipeline.
struct PipelineBuilds<'a> {
    history: &'a dyn DeploymentHistory,
    org: &'a str,
    pipeline: &'a str,
}

#[async_trait]
impl EvidenceSource for PipelineBuilds<'_> {
    async fn fetch_page(&self, page: u32) -> Result<Page> {
        self.history.builds_page(self.org, self.pipeline, page).await
    }
}

/// The full report pipeline behind the dispatcher.
///
/// Best-effort by contract: every lookup degrades to absence or an empty
/// list, so `generate` always returns a report.
pub struct HealthReporter {
    host: Arc<dyn RepositoryHost>,
    commits: Arc<dyn CommitHistory>,
    deployments: Arc<dyn DeploymentHistory>,
    /// GitHub owner the target repositories live under.
    owner: String,
    /// Buildkite organization slug.
    org: String,
}

impl HealthReporter {
    pub fn new(
        host: Arc<dyn RepositoryHost>,
        commits: Arc<dyn CommitHistory>,
        deployments: Arc<dyn DeploymentHistory>,
        owner: impl Into<String>,
        org: impl Into<String>,
    ) -> Self {
        HealthReporter {
            host,
            commits,
            deployments,
            owner: owner.into(),
            org: org.into(),
        }
    }

    /// Deployment pipelines are named `{owner}-{repo}`.
    fn pipeline_slug(&self, target: &str) -> String {
        format!("{}-{}", self.owner, target)
    }
}

#[async_trait]
impl ReportGenerator for HealthReporter {
    async fn generate(&self, target: &str) -> Report {
        let now = Utc::now();
        let snapshot = fetch_snapshot(self.host.as_ref(), &self.owner, target).await;

        let commit_source = RetryingSource::new(
            RepoCommits {
                history: self.commits.as_ref(),
                owner: &self.owner,
                repo: target,
            },
            PAGE_FETCH_ATTEMPTS,
        );
        let commits = collect(&commit_source, &CollectionPolicy::recent_commits(now)).await;

        let pipeline = self.pipeline_slug(target);
        let deployment_source = RetryingSource::new(
            PipelineBuilds {
                history: self.deployments.as_ref(),
                org: &self.org,
                pipeline: &pipeline,
            },
            PAGE_FETCH_ATTEMPTS,
        );
        let deployments = collect(
            &deployment_source,
            &CollectionPolicy::recent_deployments(now),
        )
        .await;

        debug!(
            target,
            commits = commits.len(),
            deployments = deployments.len(),
            one_pager = snapshot.one_pager_url.is_some(),
            "evidence collected"
        );
        render(&snapshot, &commits, &deployments, now)
    }
}
