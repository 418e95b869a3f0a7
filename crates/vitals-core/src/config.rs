//! Process configuration bundle.
//!
//! Built once at startup from environment variables and read-only for the
//! rest of the process lifetime. Loading the `.env` file itself happens in
//! the daemon binary before this constructor runs.

use crate::error::{Result, VitalsError};

/// Immutable configuration for all external collaborators.
#[derive(Debug, Clone)]
pub struct Environments {
    /// GitHub Enterprise base API URL
    pub base_url: String,
    /// GitHub API token
    pub github_token: String,
    /// Buildkite API token
    pub buildkite_token: String,
    /// Buildkite organization slug
    pub org: String,
    /// Slack app-level token (socket mode)
    pub slack_app_token: String,
    /// Slack bot auth token (Web API)
    pub slack_auth_token: String,
    /// GitHub owner all target repositories live under
    pub repo_owner: String,
}

impl Environments {
    /// Load the configuration from environment variables.
    ///
    /// Fails fast on the first missing variable; the process must not start
    /// with a partial configuration.
    pub fn from_env() -> Result<Self> {
        Ok(Environments {
            base_url: require("BASE_URL")?,
            github_token: require("GITHUB_TOKEN")?,
            buildkite_token: require("BUILDKITE_TOKEN")?,
            org: require("ORG")?,
            slack_app_token: require("SLACKAPP_TOKEN")?,
            slack_auth_token: require("SLACKAUTH_TOKEN")?,
            repo_owner: require("REPO_OWNER")?,
        })
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| VitalsError::Config(format!("missing required environment variable {name}")))
}
