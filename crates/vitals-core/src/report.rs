//! Report synthesis: pure rendering of collected evidence into the
//! four-section scorecard.
//!
//! Section order, explicit empty-case sentinels and 1-based numbering are
//! part of the output contract; the wording uses Slack mrkdwn. Pass a fixed
//! `now` to get deterministic output.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::collect::{COMMIT_WINDOW_MONTHS, DEPLOYMENT_WINDOW_MONTHS};
use crate::record::EvidenceRecord;
use crate::snapshot::RepositorySnapshot;

const DATE_FORMAT: &str = "%Y-%m-%d";
const RULE: &str = "==================================================================\n";

/// A rendered scorecard. Purely derived; lives for one request-response
/// cycle only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub body: String,
}

/// Render the scorecard for one repository.
pub fn render(
    snapshot: &RepositorySnapshot,
    commits: &[EvidenceRecord],
    deployments: &[EvidenceRecord],
    now: DateTime<Utc>,
) -> Report {
    let mut body = String::new();
    body.push_str(RULE);
    body.push('\n');
    body.push_str(&language_section(snapshot));
    body.push_str(&commits_section(snapshot, commits, now));
    body.push_str(&deployments_section(snapshot, deployments, now));
    body.push_str(&one_pager_section(snapshot));
    body.push_str(RULE);

    Report {
        title: title(snapshot),
        body,
    }
}

fn title(snapshot: &RepositorySnapshot) -> String {
    format!(
        "System Health Report for <{}|{}>\n",
        snapshot.html_url, snapshot.name
    )
}

fn language_section(snapshot: &RepositorySnapshot) -> String {
    let language = snapshot.language.as_deref().unwrap_or("unknown");
    format!(
        "_General purpose programming language marked as *\"Adopt\"* or *\"Consult\"* on Tech Radar?_\n\
         The primary language of *{}* is: `{}`\n\n\n",
        snapshot.name, language
    )
}

fn commits_section(
    snapshot: &RepositorySnapshot,
    commits: &[EvidenceRecord],
    now: DateTime<Utc>,
) -> String {
    let from = (now - Months::new(COMMIT_WINDOW_MONTHS)).format(DATE_FORMAT);
    let to = now.format(DATE_FORMAT);
    let mut section = format!(
        "_Two or more people have contributed to this codebase, in the last six months?_\n\
         The recent commits for *{}* in the last *{}* months (between *{}* and *{}*) is: \n",
        snapshot.name, COMMIT_WINDOW_MONTHS, from, to
    );

    if commits.is_empty() {
        section.push_str(&format!(
            "Sorry there is no commit in the last *{}* months for *{}*!\n",
            COMMIT_WINDOW_MONTHS, snapshot.name
        ));
    } else {
        for (index, record) in commits.iter().enumerate() {
            if let EvidenceRecord::Commit {
                author,
                committed_at,
                message,
            } = record
            {
                section.push_str(&format!(
                    "{}. Name: {}, Commit Date: {}, Commit Message: {} \n",
                    index + 1,
                    author,
                    committed_at.format(DATE_FORMAT),
                    message
                ));
            }
        }
    }
    section.push_str("\n\n");
    section
}

fn deployments_section(
    snapshot: &RepositorySnapshot,
    deployments: &[EvidenceRecord],
    now: DateTime<Utc>,
) -> String {
    let from = (now - Months::new(DEPLOYMENT_WINDOW_MONTHS)).format(DATE_FORMAT);
    let to = now.format(DATE_FORMAT);
    let mut section = format!(
        "_Three or more production deployments, this quarter?_\n\
         The recent prod deployments for *{}* in the last *{}* months (between *{}* and *{}*) is: \n",
        snapshot.name, DEPLOYMENT_WINDOW_MONTHS, from, to
    );

    if deployments.is_empty() {
        section.push_str(&format!(
            "Sorry there is no deployments in the last *{}* months for *{}*!\n",
            DEPLOYMENT_WINDOW_MONTHS, snapshot.name
        ));
    } else {
        for (index, record) in deployments.iter().enumerate() {
            if let EvidenceRecord::Deployment {
                author,
                finished_at,
                web_url,
                ..
            } = record
            {
                section.push_str(&format!(
                    "{}. Name: {}, Deployment Date: {}, Build URL: <{}|here> \n",
                    index + 1,
                    author,
                    finished_at.format(DATE_FORMAT),
                    web_url
                ));
            }
        }
    }
    section.push_str("\n\n");
    section
}

fn one_pager_section(snapshot: &RepositorySnapshot) -> String {
    match &snapshot.one_pager_url {
        Some(url) => format!(
            "_1Pager documentation is stored in Git?_\n\
             1Pager documentation for *{}* is stored in <{}|git>\n",
            snapshot.name, url
        ),
        None => format!(
            "_1Pager documentation is stored in Git?_\n\
             cannot find 1Pager documentation for *{}*\n",
            snapshot.name
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot() -> RepositorySnapshot {
        RepositorySnapshot {
            name: "billing".to_string(),
            html_url: "https://github.example.com/acme/billing".to_string(),
            language: Some("Kotlin".to_string()),
            one_pager_url: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap()
    }

    /// Test: the four sections appear in their fixed order.
    #[test]
    fn test_section_order() {
        let report = render(&snapshot(), &[], &[], now());
        let language = report.body.find("primary language").expect("language section");
        let commits = report.body.find("recent commits").expect("commits section");
        let deployments = report.body.find("prod deployments").expect("deployments section");
        let one_pager = report.body.find("1Pager documentation").expect("doc section");
        assert!(language < commits && commits < deployments && deployments < one_pager);
    }

    /// Test: empty evidence lists render the explicit sentinels.
    #[test]
    fn test_empty_sentinels() {
        let report = render(&snapshot(), &[], &[], now());
        assert!(report.body.contains("Sorry there is no commit in the last *6* months"));
        assert!(report.body.contains("Sorry there is no deployments in the last *3* months"));
        assert!(report.body.contains("cannot find 1Pager documentation"));
    }

    /// Test: listed records are numbered from 1 and carry the %Y-%m-%d date.
    #[test]
    fn test_record_listing() {
        let commits = vec![
            EvidenceRecord::Commit {
                author: "dana".to_string(),
                committed_at: Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap(),
                message: "fix rounding".to_string(),
            },
            EvidenceRecord::Commit {
                author: "sam".to_string(),
                committed_at: Utc.with_ymd_and_hms(2026, 7, 15, 9, 0, 0).unwrap(),
                message: "add invoice export".to_string(),
            },
        ];
        let deployments = vec![EvidenceRecord::Deployment {
            author: "dana".to_string(),
            finished_at: Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap(),
            web_url: "https://ci.example.com/builds/42".to_string(),
            state: "passed".to_string(),
            blocked: false,
            message: "release".to_string(),
        }];

        let report = render(&snapshot(), &commits, &deployments, now());
        assert!(report
            .body
            .contains("1. Name: dana, Commit Date: 2026-08-01, Commit Message: fix rounding"));
        assert!(report
            .body
            .contains("2. Name: sam, Commit Date: 2026-07-15, Commit Message: add invoice export"));
        assert!(report.body.contains(
            "1. Name: dana, Deployment Date: 2026-08-20, Build URL: <https://ci.example.com/builds/42|here>"
        ));
    }

    /// Test: title links the repository; unknown language renders a
    /// placeholder instead of failing.
    #[test]
    fn test_title_and_unknown_language() {
        let mut snap = snapshot();
        snap.language = None;
        let report = render(&snap, &[], &[], now());
        assert_eq!(
            report.title,
            "System Health Report for <https://github.example.com/acme/billing|billing>\n"
        );
        assert!(report.body.contains("`unknown`"));
    }

    /// Test: the one-pager URL is linked when present.
    #[test]
    fn test_one_pager_link() {
        let mut snap = snapshot();
        snap.one_pager_url = Some("https://github.example.com/acme/billing/blob/main/1pager.md".to_string());
        let report = render(&snap, &[], &[], now());
        assert!(report
            .body
            .contains("is stored in <https://github.example.com/acme/billing/blob/main/1pager.md|git>"));
    }
}
