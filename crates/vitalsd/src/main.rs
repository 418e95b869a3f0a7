//! vitals daemon: connects to Slack in socket mode and answers health
//! report mentions until interrupted.

use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use vitals_core::{Dispatcher, Environments, HealthReporter};
use vitals_sources::{BuildkiteClient, GitHubClient, SlackClient, SlackTransport, SocketModeClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine; the variables may come from the environment.
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let environments = Environments::from_env()?;
    tracing::info!("starting vitals health bot");

    // Client construction fails fast; a partially usable client must not run.
    let github = Arc::new(GitHubClient::new(
        &environments.base_url,
        &environments.github_token,
    )?);
    let buildkite = Arc::new(BuildkiteClient::new(&environments.buildkite_token)?);
    let reporter = Arc::new(HealthReporter::new(
        github.clone(),
        github,
        buildkite,
        environments.repo_owner.clone(),
        environments.org.clone(),
    ));

    let connection = SocketModeClient::new(&environments.slack_app_token)?
        .connect()
        .await?;
    let transport = Arc::new(SlackTransport::new(
        SlackClient::new(&environments.slack_auth_token)?,
        connection.ack_sender(),
    ));

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            signal_cancel.cancel();
        }
    });

    let dispatcher = Dispatcher::new(connection.events, transport, reporter, cancel);
    dispatcher.run().await;

    connection.task.abort();
    tracing::info!("vitals health bot stopped");
    Ok(())
}
