//! Evidence records: the units of history the scorecard is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of historical evidence, as fetched from a remote source.
///
/// Immutable once constructed; owned by the collector call that produced it
/// and discarded after the report is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvidenceRecord {
    /// A commit on the repository's default branch.
    Commit {
        author: String,
        committed_at: DateTime<Utc>,
        message: String,
    },
    /// A finished build on the repository's deployment pipeline.
    Deployment {
        author: String,
        finished_at: DateTime<Utc>,
        web_url: String,
        state: String,
        blocked: bool,
        message: String,
    },
}

impl EvidenceRecord {
    /// The timestamp the collector orders and windows on: commit time for
    /// commits, finish time for deployments.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            EvidenceRecord::Commit { committed_at, .. } => *committed_at,
            EvidenceRecord::Deployment { finished_at, .. } => *finished_at,
        }
    }

    /// Display name of the person behind the record.
    pub fn author(&self) -> &str {
        match self {
            EvidenceRecord::Commit { author, .. } => author,
            EvidenceRecord::Deployment { author, .. } => author,
        }
    }
}
