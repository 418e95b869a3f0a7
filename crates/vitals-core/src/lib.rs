//! vitals core domain logic.
//!
//! Canonical definitions for the health scorecard pipeline:
//! - `EvidenceRecord`: one unit of historical data (commit or deployment)
//! - `CollectionPolicy` + `collect`: bounded newest-first evidence collection
//! - `RepositorySnapshot`: repository metadata plus one-pager presence
//! - `Report` + `render`: the four-section scorecard
//! - `Dispatcher`: the mention-driven event loop
//!
//! All network access happens behind the seam traits defined here
//! (`EvidenceSource`, `RepositoryHost`, `CommitHistory`, `DeploymentHistory`,
//! `ChatTransport`); concrete clients live in `vitals-sources`.

pub mod collect;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod snapshot;

// Re-export main types and errors
pub use collect::{collect, CollectionPolicy, EvidenceSource, Page, RetryingSource};
pub use command::{parse_command, HealthCommand};
pub use config::Environments;
pub use dispatch::{ChatTransport, Dispatcher, ReportGenerator};
pub use error::{Result, VitalsError};
pub use event::{CallbackEvent, EventCallback, EventEnvelope, MentionEvent, SocketEvent};
pub use pipeline::{CommitHistory, DeploymentHistory, HealthReporter};
pub use record::EvidenceRecord;
pub use report::{render, Report};
pub use snapshot::{fetch_snapshot, RepositoryHost, RepositoryInfo, RepositorySnapshot};

/// vitals core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
