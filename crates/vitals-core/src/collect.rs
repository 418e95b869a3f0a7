//! Bounded window collection over paginated, newest-first evidence sources.
//!
//! The collector walks pages from an [`EvidenceSource`] and stops as soon as
//! a record-count quota or a time-window cutoff is satisfied. Because the
//! source order is strictly newest-first, an out-of-window record is a hard
//! short-circuit: nothing after it can qualify, so scanning and paging both
//! stop immediately. Records failing the inclusion predicate are skipped
//! silently and never count toward the quota.

use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use std::time::Duration;
use tracing::warn;

use crate::error::Result;
use crate::record::EvidenceRecord;

/// Commit quota: two distinct recent commits are enough evidence of activity.
pub const COMMIT_QUOTA: usize = 2;
/// Deployment quota: three production deployments in the window.
pub const DEPLOYMENT_QUOTA: usize = 3;
/// Commit lookback window in months.
pub const COMMIT_WINDOW_MONTHS: u32 = 6;
/// Deployment lookback window in months.
pub const DEPLOYMENT_WINDOW_MONTHS: u32 = 3;

/// One page of records from a remote source, newest-first.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub records: Vec<EvidenceRecord>,
    /// Whether the source reports a further page. `false` means exhaustion,
    /// which is a normal stop, not an error.
    pub has_next: bool,
}

/// A remote source of paginated, reverse-chronological evidence.
///
/// Pages are 1-based. Implementations must return records strictly
/// newest-first; the collector's short-circuit relies on it.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<Page>;
}

type IncludeFn = Box<dyn Fn(&EvidenceRecord) -> bool + Send + Sync>;

/// Stopping and filtering rules for one collection run.
pub struct CollectionPolicy {
    /// Hard upper bound on the number of collected records.
    pub max_count: usize,
    /// Records strictly before this instant end the collection.
    pub cutoff: DateTime<Utc>,
    include: IncludeFn,
}

impl CollectionPolicy {
    pub fn new(
        max_count: usize,
        cutoff: DateTime<Utc>,
        include: impl Fn(&EvidenceRecord) -> bool + Send + Sync + 'static,
    ) -> Self {
        CollectionPolicy {
            max_count,
            cutoff,
            include: Box::new(include),
        }
    }

    /// Policy for commit history: up to [`COMMIT_QUOTA`] commits from the
    /// last six months, merge commits excluded.
    pub fn recent_commits(now: DateTime<Utc>) -> Self {
        Self::new(
            COMMIT_QUOTA,
            now - Months::new(COMMIT_WINDOW_MONTHS),
            |record| match record {
                EvidenceRecord::Commit { message, .. } => !message.contains("Merge pull request"),
                _ => false,
            },
        )
    }

    /// Policy for deployment history: up to [`DEPLOYMENT_QUOTA`] passed,
    /// unblocked builds from the last quarter, audit runs excluded.
    pub fn recent_deployments(now: DateTime<Utc>) -> Self {
        Self::new(
            DEPLOYMENT_QUOTA,
            now - Months::new(DEPLOYMENT_WINDOW_MONTHS),
            |record| match record {
                EvidenceRecord::Deployment {
                    state,
                    blocked,
                    message,
                    ..
                } => state == "passed" && !blocked && message != "Audit",
                _ => false,
            },
        )
    }

    /// Whether a record should be kept. Exclusion is silent: skipped records
    /// never count toward the quota.
    pub fn include(&self, record: &EvidenceRecord) -> bool {
        (self.include)(record)
    }
}

/// Collect evidence from `source` under `policy`.
///
/// Walks pages newest-first and returns as soon as one of these holds:
/// - a record's timestamp is strictly before `policy.cutoff`
/// - the result already holds `policy.max_count` records
/// - the source reports no further page (exhaustion)
///
/// A page fetch error is logged and ends the collection with whatever was
/// already gathered; whether more pages existed is unknowable at that point,
/// so stopping is the only termination-safe reading of tolerate-and-continue.
/// Retry policy belongs to the source, see [`RetryingSource`].
pub async fn collect<S>(source: &S, policy: &CollectionPolicy) -> Vec<EvidenceRecord>
where
    S: EvidenceSource + ?Sized,
{
    let mut collected = Vec::new();
    if policy.max_count == 0 {
        return collected;
    }

    let mut page_number = 1u32;
    loop {
        let page = match source.fetch_page(page_number).await {
            Ok(page) => page,
            Err(err) => {
                warn!(page = page_number, error = %err, "evidence page fetch failed, keeping what was gathered");
                return collected;
            }
        };

        for record in page.records {
            if record.timestamp() < policy.cutoff || collected.len() == policy.max_count {
                return collected;
            }
            if !policy.include(&record) {
                continue;
            }
            collected.push(record);
        }

        if !page.has_next {
            return collected;
        }
        page_number += 1;
    }
}

/// Bounded-retry decorator for an [`EvidenceSource`].
///
/// Keeps transport flakiness out of the collector: a page fetch is retried
/// up to `attempts` times with a short pause, and only the final error is
/// surfaced.
pub struct RetryingSource<S> {
    inner: S,
    attempts: u32,
    backoff: Duration,
}

impl<S> RetryingSource<S> {
    pub fn new(inner: S, attempts: u32) -> Self {
        RetryingSource {
            inner,
            attempts: attempts.max(1),
            backoff: Duration::from_millis(250),
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

#[async_trait]
impl<S: EvidenceSource> EvidenceSource for RetryingSource<S> {
    async fn fetch_page(&self, page: u32) -> Result<Page> {
        let mut attempt = 1;
        loop {
            match self.inner.fetch_page(page).await {
                Ok(result) => return Ok(result),
                Err(err) if attempt < self.attempts => {
                    warn!(page, attempt, error = %err, "page fetch failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VitalsError;
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn commit(days_ago: i64, message: &str) -> EvidenceRecord {
        EvidenceRecord::Commit {
            author: "dana".to_string(),
            committed_at: Utc::now() - ChronoDuration::days(days_ago),
            message: message.to_string(),
        }
    }

    fn deployment(days_ago: i64, state: &str, blocked: bool, message: &str) -> EvidenceRecord {
        EvidenceRecord::Deployment {
            author: "sam".to_string(),
            finished_at: Utc::now() - ChronoDuration::days(days_ago),
            web_url: format!("https://ci.example.com/builds/{days_ago}"),
            state: state.to_string(),
            blocked,
            message: message.to_string(),
        }
    }

    /// Scripted source: one `Page` per element, `has_next` set between them.
    struct ScriptedSource {
        pages: Vec<Vec<EvidenceRecord>>,
        fetches: AtomicU32,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Vec<EvidenceRecord>>) -> Self {
            ScriptedSource {
                pages,
                fetches: AtomicU32::new(0),
            }
        }

        fn fetch_count(&self) -> u32 {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EvidenceSource for ScriptedSource {
        async fn fetch_page(&self, page: u32) -> Result<Page> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let index = (page - 1) as usize;
            match self.pages.get(index) {
                Some(records) => Ok(Page {
                    records: records.clone(),
                    has_next: index + 1 < self.pages.len(),
                }),
                None => Ok(Page::default()),
            }
        }
    }

    /// Source that always errors.
    struct FailingSource;

    #[async_trait]
    impl EvidenceSource for FailingSource {
        async fn fetch_page(&self, _page: u32) -> Result<Page> {
            Err(VitalsError::http("boom"))
        }
    }

    /// Test: output never exceeds the quota, taken in source order.
    #[tokio::test]
    async fn test_quota_bounds_output_length() {
        let records: Vec<_> = (0..5).map(|i| deployment(i, "passed", false, "deploy")).collect();
        let source = ScriptedSource::new(vec![records.clone()]);
        let policy = CollectionPolicy::recent_deployments(Utc::now());

        let out = collect(&source, &policy).await;
        assert_eq!(out.len(), 3, "quota must cap the result");
        assert_eq!(out, records[..3].to_vec(), "first three in source order");
    }

    /// Test: no record strictly older than the cutoff appears, and hitting
    /// one ends paging entirely.
    #[tokio::test]
    async fn test_cutoff_is_hard_short_circuit() {
        let pages = vec![
            vec![commit(1, "fix"), commit(400, "ancient"), commit(2, "in-window but after stop")],
            vec![commit(3, "never fetched")],
        ];
        let source = ScriptedSource::new(pages);
        let policy = CollectionPolicy::recent_commits(Utc::now());

        let out = collect(&source, &policy).await;
        assert_eq!(out.len(), 1, "records after the short-circuit are not scanned");
        assert!(
            matches!(&out[0], EvidenceRecord::Commit { message, .. } if message == "fix"),
            "only the record before the out-of-window one survives"
        );
        assert_eq!(source.fetch_count(), 1, "no further pages fetched");
    }

    /// Test: excluded records are skipped silently and never count toward
    /// the quota.
    #[tokio::test]
    async fn test_excluded_records_do_not_count() {
        let source = ScriptedSource::new(vec![vec![
            commit(1, "fix bug"),
            commit(2, "Merge pull request #5"),
            commit(3, "add feature"),
        ]]);
        let policy = CollectionPolicy::recent_commits(Utc::now());

        let out = collect(&source, &policy).await;
        let messages: Vec<_> = out
            .iter()
            .map(|r| match r {
                EvidenceRecord::Commit { message, .. } => message.clone(),
                other => panic!("expected commit, got {other:?}"),
            })
            .collect();
        assert_eq!(messages, vec!["fix bug", "add feature"]);
    }

    /// Test: deployment predicate keeps only passed, unblocked, non-audit builds.
    #[tokio::test]
    async fn test_deployment_predicate() {
        let source = ScriptedSource::new(vec![vec![
            deployment(1, "passed", false, "release 12"),
            deployment(2, "passed", true, "held at gate"),
            deployment(3, "failed", false, "broken"),
            deployment(4, "passed", false, "Audit"),
            deployment(5, "passed", false, "release 11"),
        ]]);
        let policy = CollectionPolicy::recent_deployments(Utc::now());

        let out = collect(&source, &policy).await;
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| matches!(
            r,
            EvidenceRecord::Deployment { state, blocked, .. } if state == "passed" && !blocked
        )));
    }

    /// Test: an exhausted source (no pages) yields empty, not an error.
    #[tokio::test]
    async fn test_zero_pages_is_empty_not_error() {
        let source = ScriptedSource::new(vec![]);
        let policy = CollectionPolicy::recent_commits(Utc::now());
        let out = collect(&source, &policy).await;
        assert!(out.is_empty());
    }

    /// Test: quota spanning multiple pages, order preserved across the page
    /// boundary.
    #[tokio::test]
    async fn test_collection_spans_pages_in_order() {
        let pages = vec![
            vec![deployment(1, "passed", false, "a"), deployment(2, "failed", false, "x")],
            vec![deployment(3, "passed", false, "b"), deployment(4, "passed", false, "c")],
        ];
        let source = ScriptedSource::new(pages);
        let policy = CollectionPolicy::recent_deployments(Utc::now());

        let out = collect(&source, &policy).await;
        let messages: Vec<_> = out
            .iter()
            .map(|r| match r {
                EvidenceRecord::Deployment { message, .. } => message.clone(),
                other => panic!("expected deployment, got {other:?}"),
            })
            .collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
        assert_eq!(source.fetch_count(), 2);
    }

    /// Test: quota 0 returns empty without contacting the source.
    #[tokio::test]
    async fn test_zero_quota_skips_fetch() {
        let source = ScriptedSource::new(vec![vec![commit(1, "fix")]]);
        let policy = CollectionPolicy::new(0, Utc::now() - ChronoDuration::days(30), |_| true);
        let out = collect(&source, &policy).await;
        assert!(out.is_empty());
        assert_eq!(source.fetch_count(), 0);
    }

    /// Test: a fetch error keeps what was gathered instead of failing.
    #[tokio::test]
    async fn test_fetch_error_keeps_partial_result() {
        struct FailsOnSecondPage(ScriptedSource);

        #[async_trait]
        impl EvidenceSource for FailsOnSecondPage {
            async fn fetch_page(&self, page: u32) -> Result<Page> {
                if page >= 2 {
                    return Err(VitalsError::http("503"));
                }
                let mut first = self.0.fetch_page(page).await?;
                first.has_next = true;
                Ok(first)
            }
        }

        let source = FailsOnSecondPage(ScriptedSource::new(vec![vec![commit(1, "fix")]]));
        let policy = CollectionPolicy::recent_commits(Utc::now());
        let out = collect(&source, &policy).await;
        assert_eq!(out.len(), 1, "partial result survives the failed page");
    }

    /// Test: retry decorator recovers from transient failures and gives up
    /// after the attempt budget.
    #[tokio::test]
    async fn test_retrying_source() {
        struct FlakySource {
            calls: AtomicU32,
        }

        #[async_trait]
        impl EvidenceSource for FlakySource {
            async fn fetch_page(&self, _page: u32) -> Result<Page> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    return Err(VitalsError::http("reset by peer"));
                }
                Ok(Page::default())
            }
        }

        let flaky = RetryingSource::new(FlakySource { calls: AtomicU32::new(0) }, 3)
            .with_backoff(Duration::from_millis(1));
        assert!(flaky.fetch_page(1).await.is_ok(), "second attempt succeeds");

        let hopeless = RetryingSource::new(FailingSource, 2).with_backoff(Duration::from_millis(1));
        assert!(hopeless.fetch_page(1).await.is_err(), "budget exhausted surfaces the error");
    }
}
