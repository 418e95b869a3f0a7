//! Concrete adapters for the external collaborators of vitals:
//! - GitHub Enterprise (repository metadata, content lookup, commit history)
//! - Buildkite (deployment history)
//! - Slack (Web API replies and the Socket Mode event transport)
//!
//! Each adapter implements the seam traits from `vitals-core` and flattens
//! its transport errors into [`vitals_core::VitalsError`].

pub mod buildkite;
pub mod github;
pub mod pagination;
pub mod slack;

pub use buildkite::BuildkiteClient;
pub use github::GitHubClient;
pub use slack::{SlackClient, SlackTransport, SocketConnection, SocketModeClient};

/// vitals sources version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User agent sent on every outbound HTTP request.
pub(crate) const USER_AGENT: &str = concat!("vitals/", env!("CARGO_PKG_VERSION"));

/// Records requested per page; both evidence APIs cap at 100.
pub(crate) const PER_PAGE: u32 = 100;

/// Default timeout for evidence and chat HTTP calls. The collector's paging
/// loop must never block indefinitely on a misbehaving source.
pub(crate) const HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

pub(crate) fn http_client() -> vitals_core::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(vitals_core::VitalsError::http)
}
